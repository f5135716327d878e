//! Implementation of a saturating counter.

use crate::Outcome;
use crate::predictor::StatefulPredictor;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// The largest value the counter can hold
    pub max: u8,
    /// The value of the counter after a reset
    pub default: u8,
}
impl SaturatingCounterConfig {
    /// A 2-bit counter starting in the "strongly not-taken" state.
    pub const TWO_BIT: Self = Self { max: 3, default: 0 };

    /// The smallest value interpreted as 'taken'.
    pub const fn threshold(&self) -> u8 {
        (self.max / 2) + 1
    }

    pub fn storage_bits(&self) -> usize {
        (self.max.ilog2() + 1) as usize
    }
    pub fn build(self) -> SaturatingCounter {
        assert!(self.max > 0 && self.default <= self.max,
            "invalid counter configuration {:?}", self);
        SaturatingCounter {
            cfg: self,
            ctr: self.default,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
///
/// The counter predicts 'taken' when its value is in the upper half of
/// the range `[0, max]`.
#[derive(Clone, Copy, Debug)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    ctr: u8,
}
impl SaturatingCounter {
    pub fn increment(&mut self) {
        if self.ctr < self.cfg.max {
            self.ctr += 1;
        }
    }

    pub fn decrement(&mut self) {
        self.ctr = self.ctr.saturating_sub(1);
    }

    /// Return the current value of the counter.
    pub fn value(&self) -> u8 { self.ctr }

    /// Return the largest value of the counter.
    pub fn max(&self) -> u8 { self.cfg.max }

    /// Set the value of the counter (clamped to the allowed range).
    pub fn set(&mut self, val: u8) {
        self.ctr = val.min(self.cfg.max);
    }

    /// The smallest value interpreted as 'taken'.
    pub fn threshold(&self) -> u8 {
        self.cfg.threshold()
    }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }
    fn predict(&self) -> Outcome {
        Outcome::from_bool(self.ctr >= self.threshold())
    }
    fn reset(&mut self) {
        self.ctr = self.cfg.default;
    }
    fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.increment(),
            Outcome::N => self.decrement(),
        }
    }
}
