//! Generating synthetic branch traces.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::branch::*;

/// Base address of the first branch in a synthetic program.
const BASE: usize = 0x0040_0000;

/// The behavior of a single static branch in a synthetic program.
#[derive(Clone, Debug)]
enum Site {
    /// A conditional branch taken with a fixed probability
    Biased { pc: usize, tgt: usize, p_taken: f64 },

    /// A loop back-edge: taken 'trip - 1' times, then not-taken once
    Loop { pc: usize, tgt: usize, trip: usize, count: usize },

    /// A conditional branch following a repeating pattern of outcomes
    Pattern { pc: usize, tgt: usize, bits: u32, len: u32, pos: u32 },

    /// An indirect jump choosing between a few targets
    Indirect { pc: usize, targets: Vec<usize> },

    /// A direct jump
    Jump { pc: usize, tgt: usize },
}
impl Site {
    fn random(rng: &mut StdRng, pc: usize) -> Self {
        let tgt = pc.wrapping_add(rng.gen_range(1..0x100) * 4);
        match rng.gen_range(0..8) {
            0 | 1 => Site::Biased {
                pc, tgt, p_taken: if rng.gen() { 0.95 } else { 0.05 },
            },
            2 => Site::Biased { pc, tgt, p_taken: rng.gen_range(0.0..1.0) },
            3 | 4 => Site::Loop {
                pc, tgt, trip: rng.gen_range(2..16), count: 0,
            },
            5 => Site::Pattern {
                pc, tgt, bits: rng.gen(), len: rng.gen_range(2..8), pos: 0,
            },
            6 => Site::Indirect {
                pc,
                targets: (0..rng.gen_range(1..4))
                    .map(|_| BASE + rng.gen_range(0..0x1_0000) * 4)
                    .collect(),
            },
            _ => Site::Jump { pc, tgt },
        }
    }

    /// Execute this branch, returning the resulting record.
    fn step(&mut self, rng: &mut StdRng) -> BranchRecord {
        match self {
            Site::Biased { pc, tgt, p_taken } => {
                let outcome = Outcome::from_bool(rng.gen_bool(*p_taken));
                BranchRecord::new(*pc, *tgt, BranchKind::DirectBranch, outcome)
            },
            Site::Loop { pc, tgt, trip, count } => {
                *count += 1;
                let outcome = if *count == *trip {
                    *count = 0;
                    Outcome::N
                } else {
                    Outcome::T
                };
                BranchRecord::new(*pc, *tgt, BranchKind::DirectBranch, outcome)
            },
            Site::Pattern { pc, tgt, bits, len, pos } => {
                let outcome = Outcome::from_bool((*bits >> *pos) & 1 != 0);
                *pos = (*pos + 1) % *len;
                BranchRecord::new(*pc, *tgt, BranchKind::DirectBranch, outcome)
            },
            Site::Indirect { pc, targets } => {
                let tgt = targets[rng.gen_range(0..targets.len())];
                BranchRecord::new(*pc, tgt, BranchKind::IndirectJump, Outcome::T)
            },
            Site::Jump { pc, tgt } => {
                BranchRecord::new(*pc, *tgt, BranchKind::DirectJump, Outcome::T)
            },
        }
    }
}

/// A synthetic program: a fixed list of static branches which are executed
/// in order, over and over again.
pub struct SyntheticTrace {
    pub data: Vec<BranchRecord>,
}
impl SyntheticTrace {
    /// Number of static branches in a generated program.
    pub const NUM_SITES: usize = 64;

    /// Generate 'len' records from a program built with the provided seed.
    pub fn generate(len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pc = BASE;
        let mut sites: Vec<Site> = Vec::with_capacity(Self::NUM_SITES);
        for _ in 0..Self::NUM_SITES {
            pc += rng.gen_range(1..0x40) * 4;
            sites.push(Site::random(&mut rng, pc));
        }

        let mut data = Vec::with_capacity(len);
        for idx in (0..sites.len()).cycle().take(len) {
            data.push(sites[idx].step(&mut rng));
        }
        Self { data }
    }

    pub fn as_slice(&self) -> &[BranchRecord] { &self.data }
}
