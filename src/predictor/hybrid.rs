//! A hybrid predictor modeled after the outcome predictors in the Pentium M.
//!
//! Combines a bimodal "fallback" component with a tagged, set-associative
//! "global" component indexed by a hash of the branch address and a path
//! history register. The global component provides a prediction whenever
//! it holds an entry for the branch; otherwise the fallback component is
//! used, and the fallback counter is used to seed a new global entry.

pub mod global;
pub mod stat;

pub use global::*;
pub use stat::*;

use log::{ debug, trace };

use crate::branch::*;
use crate::history::*;
use crate::predictor::*;

/// Returns a mask with bits 'lo' through 'hi' [inclusive] set.
pub const fn mask(lo: u32, hi: u32) -> usize {
    assert!(lo <= hi && hi < usize::BITS);
    (usize::MAX >> (usize::BITS - 1 - (hi - lo))) << lo
}

/// Number of entries in the fallback component.
pub const FALLBACK_SIZE: usize = 4096;

/// Fallback index bits taken from the branch address.
pub const FALLBACK_INDEX_MASK: usize = mask(0, 11);

/// Global component row bits taken from the hash.
pub const GLOBAL_INDEX_MASK: usize = mask(6, 14);

/// Global component tag bits taken from the hash.
pub const GLOBAL_TAG_MASK: usize = mask(0, 5);

/// Path history bits preserved by an update (before shifting).
pub const PATH_KEEP_MASK: usize = mask(0, 12);

/// Address bits mixed into path history for a conditional branch.
pub const PATH_ADDR_MASK: usize = mask(4, 18);

/// Declared address bits for an indirect branch in path history.
pub const PATH_INDIRECT_MASK: usize = mask(10, 18);

/// Address bits mixed into path history for an indirect branch. The
/// declared mask is shifted down, then applied to the unshifted address.
pub const PATH_INDIRECT_ADDR_MASK: usize = PATH_INDIRECT_MASK >> 5;

/// Target bits mixed into path history for an indirect branch.
pub const TARGET_MASK: usize = mask(0, 5);

/// Path history bits used by the hash.
pub const PATH_MASK: usize = mask(0, 14);

/// Address bits in the upper part of the hash.
pub const HASH_ADDR_HI_MASK: usize = mask(13, 18);

/// Address bits in the lower part of the hash.
pub const HASH_ADDR_LO_MASK: usize = mask(4, 12);

/// Path history bits in the upper part of the hash.
pub const HASH_PATH_HI_MASK: usize = mask(0, 5);

/// Path history bits in the lower part of the hash.
pub const HASH_PATH_LO_MASK: usize = mask(6, 14);

/// Number of bits in the path history register.
pub const PATH_HISTORY_BITS: usize = 19;

/// Configuration for the counters in the fallback component.
pub const FALLBACK_CTR: SaturatingCounterConfig = SaturatingCounterConfig {
    max: 3, default: 1
};

/// The component used to make a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    /// The bimodal component
    Fallback,

    /// The tagged global component
    Global,
}

/// State carried from [HybridPredictor::predict] to [HybridPredictor::update].
#[derive(Debug, PartialEq, Eq)]
pub struct HybridHandle {
    /// The predicted branch
    pub info: BranchInfo,

    /// Index into the fallback component
    pub index: usize,

    /// Row in the global component
    pub row: usize,

    /// Tag for the global component
    pub tag: u16,

    /// The component providing the prediction
    pub provider: Provider,

    /// Predicted direction
    pub direction: Outcome,
}
impl Prediction for HybridHandle {
    fn info(&self) -> &BranchInfo { &self.info }
    fn direction(&self) -> Outcome { self.direction }
    fn target(&self) -> usize { 0 }
}

/// A hybrid predictor with a 4096-entry bimodal component and a 4-way,
/// 512-row tagged global component.
#[derive(Clone, Debug)]
pub struct HybridPredictor {
    /// Bimodal component
    fallback: PatternHistoryTable,

    /// Tagged global component
    global: GlobalTable,

    /// Path history
    phr: PathHistoryRegister,

    pub stat: HybridStats,
}
impl HybridPredictor {
    pub fn new() -> Self {
        Self {
            fallback: PatternHistoryTable::new(FALLBACK_SIZE, FALLBACK_CTR),
            global: GlobalTable::new(),
            phr: PathHistoryRegister::new(PATH_HISTORY_BITS),
            stat: HybridStats::new(),
        }
    }

    /// Compute the fallback component index for a branch at 'address'.
    pub fn fallback_index(address: usize) -> usize {
        let index = address & FALLBACK_INDEX_MASK;
        assert!(index < FALLBACK_SIZE);
        index
    }

    /// Compute the global component row and tag for a branch at 'address'.
    pub fn global_index(&self, address: usize) -> (usize, u16) {
        let path = self.phr.value() & PATH_MASK;

        // Address bits [18:13] and path bits [5:0] form the upper part of
        // the hash, address bits [12:4] and path bits [14:6] the lower part.
        let hi = ((address & HASH_ADDR_HI_MASK) >> HASH_ADDR_HI_MASK.trailing_zeros())
            ^ (path & HASH_PATH_HI_MASK);
        let lo = ((address & HASH_ADDR_LO_MASK) >> HASH_ADDR_LO_MASK.trailing_zeros())
            ^ ((path & HASH_PATH_LO_MASK) >> HASH_PATH_LO_MASK.trailing_zeros());
        let hash = (hi << HASH_ADDR_LO_MASK.count_ones()) + lo;

        let row = (hash & GLOBAL_INDEX_MASK) >> GLOBAL_INDEX_MASK.trailing_zeros();
        let tag = hash & GLOBAL_TAG_MASK;
        assert!(row < GLOBAL_ROWS, "global row {:#x} out of bounds", row);
        assert!(tag < (1 << GLOBAL_TAG_BITS), "global tag {:#x} too wide", tag);
        (row, tag as u16)
    }

    /// Bits from a resolved branch which are mixed into path history.
    fn path_bits(info: &BranchInfo, target: usize) -> usize {
        let cond_bits = if info.is_conditional() {
            info.address & PATH_ADDR_MASK
        } else {
            0
        };
        let ind_bits = if info.is_indirect() {
            (info.address & PATH_INDIRECT_ADDR_MASK) + (target & TARGET_MASK)
        } else {
            0
        };
        cond_bits | ind_bits
    }

    /// Returns the fallback component.
    pub fn fallback(&self) -> &PatternHistoryTable { &self.fallback }

    /// Returns the global component.
    pub fn global(&self) -> &GlobalTable { &self.global }

    /// Returns the current path history.
    pub fn path_history(&self) -> &PathHistoryRegister { &self.phr }

    fn record(&mut self, provider: Provider, hit: bool) {
        let ctr = match (provider, hit) {
            (Provider::Fallback, true)  => &mut self.stat.fallback_hits,
            (Provider::Fallback, false) => &mut self.stat.fallback_miss,
            (Provider::Global, true)    => &mut self.stat.global_hits,
            (Provider::Global, false)   => &mut self.stat.global_miss,
        };
        *ctr += 1;
    }
}

impl Default for HybridPredictor {
    fn default() -> Self { Self::new() }
}

impl BranchPredictor for HybridPredictor {
    type Handle = HybridHandle;

    fn name(&self) -> &'static str { "HybridPredictor" }

    fn reset(&mut self) {
        self.fallback.reset();
        self.global.reset();
        self.phr.reset();
        self.stat = HybridStats::new();
    }

    fn predict(&self, info: &BranchInfo) -> HybridHandle {
        let index = Self::fallback_index(info.address);
        if !info.is_conditional() {
            return HybridHandle {
                info: *info,
                index,
                row: 0,
                tag: 0,
                provider: Provider::Fallback,
                direction: Outcome::T,
            };
        }

        let (row, tag) = self.global_index(info.address);
        let confidence = self.global.probe(row, tag);
        let (provider, direction) = if confidence < GLOBAL_MISS {
            let taken = confidence >= CONFIDENCE_CTR.threshold();
            (Provider::Global, Outcome::from_bool(taken))
        } else {
            (Provider::Fallback, self.fallback.get_entry(index).predict())
        };
        trace!("hybrid {:#x}: row={:#05x} tag={:#04x} {:?} {:?}",
            info.address, row, tag, provider, direction);

        HybridHandle { info: *info, index, row, tag, provider, direction }
    }

    fn update(&mut self, handle: HybridHandle, outcome: Outcome, target: usize) {
        self.stat.clk += 1;

        // Path history is updated for every kind of branch
        let bits = Self::path_bits(&handle.info, target);
        self.phr.shift_in(PATH_KEEP_MASK, 2, bits);

        if !handle.info.is_conditional() {
            return;
        }
        self.record(handle.provider, handle.direction == outcome);

        let fallback = self.fallback.get_entry_mut(handle.index);
        fallback.update(outcome);
        let seed = fallback.value();

        match handle.provider {
            Provider::Global => {
                let trained = self.global.train(handle.row, handle.tag, outcome);
                debug_assert!(trained, "hybrid {:#x}: no global entry for \
                    row={:#05x} tag={:#04x}", handle.info.address, handle.row,
                    handle.tag);
            },
            Provider::Fallback => {
                match self.global.allocate(handle.row, handle.tag, seed) {
                    Some(way) => {
                        debug!("hybrid {:#x}: allocated row={:#05x} way={} \
                            tag={:#04x} confidence={}",
                            handle.info.address, handle.row, way, handle.tag,
                            seed
                        );
                        self.stat.alcs += 1;
                    },
                    None => {
                        self.stat.failed_alcs += 1;
                    },
                }
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn masks() {
        assert_eq!(FALLBACK_INDEX_MASK, 0xfff);
        assert_eq!(GLOBAL_INDEX_MASK, 0x7fc0);
        assert_eq!(GLOBAL_TAG_MASK, 0x3f);
        assert_eq!(PATH_KEEP_MASK, 0x1fff);
        assert_eq!(PATH_ADDR_MASK, 0x7fff0);
        assert_eq!(PATH_INDIRECT_MASK, 0x7fc00);
        assert_eq!(PATH_INDIRECT_ADDR_MASK, mask(5, 13));
        assert_eq!(HASH_ADDR_HI_MASK, 0x7e000);
        assert_eq!(HASH_ADDR_LO_MASK, 0x1ff0);
        assert_eq!(HASH_PATH_LO_MASK, 0x7fc0);
        assert_eq!(PATH_MASK, 0x7fff);
        assert_eq!(mask(0, 63), usize::MAX);
    }

    #[test]
    fn cold_prediction_uses_fallback() {
        let p = HybridPredictor::new();
        assert!(p.fallback().iter().all(|c| c.value() == 1));
        assert!(p.global().iter().all(|e| e.tag.is_none()));

        let h = p.predict(&BranchInfo::conditional(0x1234));
        assert_eq!(h.provider, Provider::Fallback);
        assert_eq!(h.direction(), Outcome::N);
        assert_eq!(h.target(), 0);
        assert_eq!(h.index, 0x234);
        assert_eq!(p.global().probe(h.row, h.tag), GLOBAL_MISS);
    }

    #[test]
    fn unconditional_is_taken() {
        let mut p = HybridPredictor::new();
        let info = BranchInfo::new(0x8000, BranchKind::DirectCall);
        let h = p.predict(&info);
        assert_eq!(h.provider, Provider::Fallback);
        assert_eq!(h.direction(), Outcome::T);
        p.update(h, Outcome::T, 0x4000);
        // Direct, unconditional branches don't contribute to path history
        assert_eq!(p.path_history().value(), 0);
        assert_eq!(p.fallback().get_entry(0).value(), 1);
        assert_eq!(p.stat.alcs, 0);
    }

    #[test]
    fn hash_fields() {
        let p = HybridPredictor::new();
        // With empty path history: address [12:4] is the low nine bits of
        // the hash, and address [18:13] is the upper six bits.
        let (row, tag) = p.global_index(0b101010_110011001_1111);
        assert_eq!(tag, 0b011001);
        assert_eq!(row, 0b101010_110);
    }

    #[test]
    fn end_to_end() {
        let mut p = HybridPredictor::new();

        // Address bits [18:4] are zero, so path history stays empty
        let info = BranchInfo::conditional(0x8);

        let h = p.predict(&info);
        assert_eq!(h.provider, Provider::Fallback);
        assert_eq!(h.direction, Outcome::N);
        let (row, tag) = (h.row, h.tag);
        p.update(h, Outcome::T, 0);
        assert_eq!(p.path_history().value(), 0);

        // A global entry is seeded from the updated fallback counter
        assert_eq!(p.fallback().get_entry(0x8).value(), 2);
        assert_eq!(p.global().probe(row, tag), 2);
        assert_eq!(p.stat.alcs, 1);

        for _ in 0..3 {
            let h = p.predict(&info);
            assert_eq!(h.provider, Provider::Global);
            assert_eq!(h.direction, Outcome::T);
            p.update(h, Outcome::T, 0);
        }
        assert_eq!(p.fallback().get_entry(0x8).value(), 3);
        assert_eq!(p.global().probe(row, tag), 3);
        let way = p.global().lookup(row, tag).unwrap();
        assert_eq!(p.global().get_entry(row)[way].recency.value(), 4);
        assert_eq!(p.stat.global_hits, 3);
        assert_eq!(p.stat.fallback_miss, 1);

        // The global entry now disagrees with a not-taken streak
        for _ in 0..2 {
            let h = p.predict(&info);
            assert_eq!(h.provider, Provider::Global);
            p.update(h, Outcome::N, 0);
        }
        assert_eq!(p.predict(&info).direction, Outcome::N);
    }

    #[test]
    fn indirect_path_history() {
        let mut p = HybridPredictor::new();
        let jmp = BranchInfo::new(0x7c00, BranchKind::IndirectJump);
        let h = p.predict(&jmp);
        assert_eq!(h.direction(), Outcome::T);
        p.update(h, Outcome::T, 0xff);
        // Address bits [13:5] in place, plus target bits [5:0]
        assert_eq!(p.path_history().value(), 0x3c00 + 0x3f);

        // Direct jump: history is shifted, nothing is mixed in
        let h = p.predict(&BranchInfo::new(0x10, BranchKind::DirectJump));
        p.update(h, Outcome::T, 0x20);
        assert_eq!(p.path_history().value(), 0x3c3f << 2);

        // Conditional branch: address bits [18:4] are mixed in
        let h = p.predict(&BranchInfo::conditional(0x12345));
        p.update(h, Outcome::N, 0);
        assert_eq!(p.path_history().value(),
            ((0xf0fc & PATH_KEEP_MASK) << 2) ^ 0x12340);

        // Address bits above bit 13 don't reach path history
        let mut q = HybridPredictor::new();
        let h = q.predict(&BranchInfo::new(0x7_c000, BranchKind::IndirectCall));
        q.update(h, Outcome::T, 0x40);
        assert_eq!(q.path_history().value(), 0);
    }

    #[test]
    fn reset_clears_state() {
        let mut p = HybridPredictor::new();
        for addr in 0..64usize {
            let info = BranchInfo::conditional(addr << 4);
            let h = p.predict(&info);
            p.update(h, Outcome::T, 0);
        }
        assert!(p.global().utilization() > 0.0);
        p.reset();
        assert_eq!(p.path_history().value(), 0);
        assert_eq!(p.global().utilization(), 0.0);
        assert!(p.fallback().iter().all(|c| c.value() == 1));
        assert_eq!(p.stat, HybridStats::new());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no global entry")]
    fn global_handle_without_entry() {
        let mut p = HybridPredictor::new();
        let info = BranchInfo::conditional(0x8);
        let mut h = p.predict(&info);
        assert_eq!(h.provider, Provider::Fallback);
        h.provider = Provider::Global;
        p.update(h, Outcome::T, 0);
    }

    fn kind() -> impl Strategy<Value = BranchKind> {
        prop_oneof![
            Just(BranchKind::DirectBranch),
            Just(BranchKind::IndirectBranch),
            Just(BranchKind::DirectJump),
            Just(BranchKind::IndirectJump),
            Just(BranchKind::DirectCall),
            Just(BranchKind::IndirectCall),
            Just(BranchKind::Return),
        ]
    }

    proptest! {
        #[test]
        fn state_stays_in_bounds(
            brns in proptest::collection::vec(
                (any::<usize>(), kind(), any::<bool>(), any::<usize>()),
                1..256
            ),
        ) {
            let mut p = HybridPredictor::new();
            for (addr, kind, taken, tgt) in brns {
                let info = BranchInfo::new(addr, kind);
                let h = p.predict(&info);
                prop_assert!(h.index < FALLBACK_SIZE);
                prop_assert!(h.row < GLOBAL_ROWS);
                prop_assert!((h.tag as usize) < (1 << GLOBAL_TAG_BITS));
                let row = h.row;
                p.update(h, Outcome::from_bool(taken), tgt);

                prop_assert!(p.path_history().value() < (1 << PATH_HISTORY_BITS));
                for e in p.global().get_entry(row).iter() {
                    prop_assert!(e.confidence.value() <= CONFIDENCE_CTR.max);
                    prop_assert!(e.recency.value() <= RECENCY_CTR.max);
                }
            }
            prop_assert!(p.fallback().iter().all(|c| c.value() <= FALLBACK_CTR.max));
        }
    }
}
