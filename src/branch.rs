//! Types for representing branches and branch outcomes.

use bitvec::prelude::*;

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn vec_from_bitvec(bits: &BitVec) -> Vec<Self> {
        bits.iter().map(|b| (*b).into()).collect()
    }
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }
    pub fn is_taken(&self) -> bool {
        matches!(self, Self::T)
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        Self::from_bool(x)
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        x.is_taken()
    }
}

/// Representing different kinds of branch/control-flow instructions.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A direct conditional branch instruction.
    DirectBranch = BranchFlags::BRN_FLAG,

    /// An indirect conditional branch instruction.
    IndirectBranch = BranchFlags::BRN_FLAG | BranchFlags::IND_FLAG,

    /// A direct unconditional jump instruction.
    DirectJump   = BranchFlags::JMP_FLAG,

    /// An indirect unconditional jump instruction.
    IndirectJump = BranchFlags::JMP_FLAG | BranchFlags::IND_FLAG,

    /// A direct procedure call instruction.
    DirectCall   = BranchFlags::CALL_FLAG,

    /// An indirect procedure call instruction.
    IndirectCall = BranchFlags::CALL_FLAG | BranchFlags::IND_FLAG,

    /// A return instruction.
    Return       = BranchFlags::RET_FLAG | BranchFlags::IND_FLAG,
}
impl BranchKind {
    const DIRECT_BRANCH: u32 = BranchFlags::BRN_FLAG;
    const INDIRECT_BRANCH: u32 = BranchFlags::BRN_FLAG | BranchFlags::IND_FLAG;
    const DIRECT_JUMP: u32 = BranchFlags::JMP_FLAG;
    const DIRECT_CALL: u32 = BranchFlags::CALL_FLAG;
    const INDIRECT_CALL: u32 = BranchFlags::CALL_FLAG | BranchFlags::IND_FLAG;
    const INDIRECT_JUMP: u32 = BranchFlags::JMP_FLAG | BranchFlags::IND_FLAG;
    const RETURN: u32 = BranchFlags::RET_FLAG | BranchFlags::IND_FLAG;

    /// Decode the kind bits of some [BranchFlags].
    /// Returns [None] for combinations that don't name a kind of branch.
    pub fn from_bits(x: u32) -> Option<Self> {
        match x & BranchFlags::KIND_MASK {
            Self::DIRECT_BRANCH   => Some(Self::DirectBranch),
            Self::INDIRECT_BRANCH => Some(Self::IndirectBranch),
            Self::DIRECT_JUMP     => Some(Self::DirectJump),
            Self::DIRECT_CALL     => Some(Self::DirectCall),
            Self::INDIRECT_JUMP   => Some(Self::IndirectJump),
            Self::INDIRECT_CALL   => Some(Self::IndirectCall),
            Self::RETURN          => Some(Self::Return),
            _ => None,
        }
    }
}

/// Flags classifying a branch.
///
/// NOTE: The bit layout matches the 'flags' word in binary trace records
/// (see [crate::trace]).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchFlags(pub u32);
impl BranchFlags {

    pub const BRN_FLAG: u32   = (1 << 0);
    pub const JMP_FLAG: u32   = (1 << 1);
    pub const CALL_FLAG: u32  = (1 << 2);
    pub const RET_FLAG: u32   = (1 << 3);
    pub const IND_FLAG: u32   = (1 << 4);
    pub const TAKEN_FLAG: u32 = (1 << 5);

    const KIND_MASK: u32 = 0b01_1111;

    pub fn is_conditional(&self) -> bool { self.0 & Self::BRN_FLAG != 0 }
    pub fn is_indirect(&self) -> bool { self.0 & Self::IND_FLAG != 0 }
    pub fn is_taken(&self) -> bool { self.0 & Self::TAKEN_FLAG != 0 }

    pub fn kind(&self) -> Option<BranchKind> {
        BranchKind::from_bits(self.0)
    }

    pub fn new(kind: BranchKind, outcome: Outcome) -> Self {
        let kbits = kind as u32;
        let tbits = if outcome.is_taken() { Self::TAKEN_FLAG } else { 0 };
        Self(kbits | tbits)
    }

    /// Flags describing some branch without a resolved outcome.
    pub fn from_kind(kind: BranchKind) -> Self {
        Self(kind as u32)
    }
}

/// The information about a branch that is available to a predictor
/// *before* the branch is resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BranchInfo {
    /// The program counter value for this branch
    pub address: usize,

    /// Flags classifying this branch
    pub flags: BranchFlags,
}
impl BranchInfo {
    pub fn new(address: usize, kind: BranchKind) -> Self {
        Self { address, flags: BranchFlags::from_kind(kind) }
    }

    /// A direct conditional branch at the given address.
    pub fn conditional(address: usize) -> Self {
        Self::new(address, BranchKind::DirectBranch)
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.flags.is_conditional()
    }

    /// Returns 'true' if this instruction indirectly specifies the target.
    pub fn is_indirect(&self) -> bool {
        self.flags.is_indirect()
    }
}


/// A record of branch execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: usize,

    /// The target address evaluated for this branch
    pub tgt: usize,

    pub flags: BranchFlags,
}
impl BranchRecord {
    pub fn new(pc: usize, tgt: usize, kind: BranchKind, outcome: Outcome)
        -> Self
    {
        Self { pc, tgt, flags: BranchFlags::new(kind, outcome) }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_bool(self.flags.is_taken())
    }
    pub fn kind(&self) -> Option<BranchKind> {
        self.flags.kind()
    }

    /// The part of this record visible to a predictor.
    pub fn info(&self) -> BranchInfo {
        BranchInfo {
            address: self.pc,
            flags: BranchFlags(self.flags.0 & !BranchFlags::TAKEN_FLAG),
        }
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.flags.is_conditional()
    }

    /// Returns 'true' if this instruction indirectly specifies the target.
    pub fn is_indirect(&self) -> bool {
        self.flags.is_indirect()
    }
}
