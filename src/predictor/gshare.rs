//! A "gshare" predictor: a single table of counters indexed by global
//! history XOR'ed with the program counter.

use log::trace;

use crate::branch::*;
use crate::history::*;
use crate::predictor::*;

/// State carried from [GsharePredictor::predict] to [GsharePredictor::update].
#[derive(Debug, PartialEq, Eq)]
pub struct GshareHandle {
    /// The predicted branch
    pub info: BranchInfo,

    /// Index of the counter used to make this prediction
    pub index: usize,

    /// Predicted direction
    pub direction: Outcome,
}
impl Prediction for GshareHandle {
    fn info(&self) -> &BranchInfo { &self.info }
    fn direction(&self) -> Outcome { self.direction }
    fn target(&self) -> usize { 0 }
}

/// A 32768-entry gshare predictor with a history length of 15.
///
/// Only predicts the direction of conditional branches. Unconditional
/// branches are always predicted 'taken'.
#[derive(Clone, Debug)]
pub struct GsharePredictor {
    /// Table of 2-bit counters
    pht: PatternHistoryTable,

    /// Global history of conditional branch outcomes
    ghr: HistoryRegister,
}
impl GsharePredictor {
    /// Number of bits used to index the table.
    pub const TABLE_BITS: usize = 15;

    /// Number of outcomes recorded in global history.
    pub const HISTORY_LENGTH: usize = 15;

    const ADDR_MASK: usize = (1 << Self::TABLE_BITS) - 1;

    pub fn new() -> Self {
        Self {
            pht: PatternHistoryTable::new(
                1 << Self::TABLE_BITS,
                SaturatingCounterConfig::TWO_BIT,
            ),
            ghr: HistoryRegister::new(Self::HISTORY_LENGTH),
        }
    }

    /// Compute the table index for a branch at 'address'.
    pub fn index(&self, address: usize) -> usize {
        let hist = self.ghr.value() << (Self::TABLE_BITS - Self::HISTORY_LENGTH);
        let index = hist ^ (address & Self::ADDR_MASK);
        assert!(index < self.pht.size(),
            "gshare index {:#x} out of bounds (ghr={})", index, self.ghr);
        index
    }

    /// Returns the current global history.
    pub fn history(&self) -> &HistoryRegister { &self.ghr }

    /// Returns the table of counters.
    pub fn table(&self) -> &PatternHistoryTable { &self.pht }
}

impl Default for GsharePredictor {
    fn default() -> Self { Self::new() }
}

impl BranchPredictor for GsharePredictor {
    type Handle = GshareHandle;

    fn name(&self) -> &'static str { "GsharePredictor" }

    fn reset(&mut self) {
        self.pht.reset();
        self.ghr.reset();
    }

    fn predict(&self, info: &BranchInfo) -> GshareHandle {
        if info.is_conditional() {
            let index = self.index(info.address);
            let direction = self.pht.get_entry(index).predict();
            trace!("gshare {:#x}: index={:#06x} {:?}",
                info.address, index, direction);
            GshareHandle { info: *info, index, direction }
        } else {
            GshareHandle { info: *info, index: 0, direction: Outcome::T }
        }
    }

    fn update(&mut self, handle: GshareHandle, outcome: Outcome, _target: usize) {
        if !handle.info.is_conditional() {
            return;
        }
        self.pht.get_entry_mut(handle.index).update(outcome);
        self.ghr.push(outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cold_table_predicts_not_taken() {
        let p = GsharePredictor::new();
        assert!(p.table().iter().all(|c| c.value() == 0));
        for addr in [0, 0x4, 0x7fff, 0x1234_5678, usize::MAX] {
            let h = p.predict(&BranchInfo::conditional(addr));
            assert_eq!(h.direction(), Outcome::N);
            assert_eq!(h.target(), 0);
        }
    }

    #[test]
    fn unconditional_is_taken_and_ignored() {
        let mut p = GsharePredictor::new();
        let info = BranchInfo::new(0x100, BranchKind::DirectJump);
        let h = p.predict(&info);
        assert_eq!(h.direction(), Outcome::T);
        p.update(h, Outcome::T, 0x200);
        assert_eq!(p.history().value(), 0);
        assert!(p.table().iter().all(|c| c.value() == 0));
    }

    #[test]
    fn counter_and_history_update() {
        let mut p = GsharePredictor::new();
        let info = BranchInfo::conditional(0);

        // Cold prediction at address 0 uses entry 0
        let h = p.predict(&info);
        assert_eq!(h.index, 0);
        assert_eq!(h.direction, Outcome::N);
        p.update(h, Outcome::T, 0);
        assert_eq!(p.table().get_entry(0).value(), 1);
        assert_eq!(p.history().value(), 0b1);

        // History moved: the same branch now maps onto entry 1
        let h = p.predict(&info);
        assert_eq!(h.index, 1);
        assert_eq!(h.direction, Outcome::N);

        p.update(h, Outcome::T, 0);
        assert_eq!(p.table().get_entry(1).value(), 1);
        assert_eq!(p.history().value(), 0b11);

        // A branch whose address cancels the history keeps hitting entry 3,
        // and its counter saturates there.
        for _ in 0..6 {
            let info = BranchInfo::conditional(p.history().value() ^ 3);
            let h = p.predict(&info);
            assert_eq!(h.index, 3);
            p.update(h, Outcome::T, 0);
        }
        assert_eq!(p.table().get_entry(3).value(), 3);
        let info = BranchInfo::conditional(p.history().value() ^ 3);
        assert_eq!(p.predict(&info).direction, Outcome::T);
    }

    #[test]
    fn always_taken_branch_is_learned() {
        let mut p = GsharePredictor::new();
        let info = BranchInfo::conditional(0x40);

        // Once history is saturated with 'taken', the index is stable and
        // the counter is trained after two more updates.
        let mut last = Outcome::N;
        for _ in 0..(GsharePredictor::HISTORY_LENGTH + 2) {
            let inflight = p.begin(&info);
            last = inflight.resolve(Outcome::T, 0);
        }
        assert_eq!(last, Outcome::N);
        assert_eq!(p.history().value(), 0x7fff);
        let h = p.predict(&info);
        assert_eq!(h.index, 0x7fff ^ 0x40);
        assert_eq!(h.direction(), Outcome::T);
    }

    #[test]
    fn reset_clears_state() {
        let mut p = GsharePredictor::new();
        let info = BranchInfo::conditional(0x10);
        for _ in 0..32 {
            let h = p.predict(&info);
            p.update(h, Outcome::T, 0);
        }
        p.reset();
        assert_eq!(p.history().value(), 0);
        assert!(p.table().iter().all(|c| c.value() == 0));
    }
}
