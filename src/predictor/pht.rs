//! Implementation of a pattern history table (PHT).

use crate::predictor::*;

/// A table of [SaturatingCounter].
#[derive(Clone, Debug)]
pub struct PatternHistoryTable {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,
}
impl PatternHistoryTable {
    pub fn new(size: usize, cfg: SaturatingCounterConfig) -> Self {
        assert!(size.is_power_of_two());
        let data = vec![cfg.build(); size];
        Self { cfg, data }
    }

    /// Returns the counter configuration used for all entries.
    pub fn config(&self) -> SaturatingCounterConfig { self.cfg }

    /// Reset all counters to their default value.
    pub fn reset(&mut self) {
        for ctr in self.data.iter_mut() {
            ctr.reset();
        }
    }

    /// Iterate over all counters in the table.
    pub fn iter(&self) -> impl Iterator<Item = &SaturatingCounter> {
        self.data.iter()
    }
}

impl PredictorTable for PatternHistoryTable {
    type Index = usize;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        assert!(idx < self.size(), "PHT index {:#x} out of bounds", idx);
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        assert!(idx < self.size(), "PHT index {:#x} out of bounds", idx);
        &mut self.data[idx]
    }
}
