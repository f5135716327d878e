//! The tagged, set-associative global component of a [HybridPredictor].
//!
//! [HybridPredictor]: crate::predictor::HybridPredictor

use crate::Outcome;
use crate::predictor::*;

/// Number of ways in each row of the global component.
pub const GLOBAL_WAYS: usize = 4;

/// Number of rows in the global component.
pub const GLOBAL_ROWS: usize = 512;

/// Number of bits in a global component tag.
pub const GLOBAL_TAG_BITS: usize = 6;

/// Value returned by [GlobalTable::probe] when no way matches the tag.
///
/// Confidence counters never reach this value.
pub const GLOBAL_MISS: u8 = 6;

/// Configuration for the confidence counter in a [GlobalEntry].
pub const CONFIDENCE_CTR: SaturatingCounterConfig = SaturatingCounterConfig {
    max: 3, default: 0
};

/// Configuration for the recency counter in a [GlobalEntry].
pub const RECENCY_CTR: SaturatingCounterConfig = SaturatingCounterConfig {
    max: 5, default: 0
};

/// An entry in the global component.
#[derive(Clone, Copy, Debug)]
pub struct GlobalEntry {
    /// Tag associated with this entry ([None] if never allocated)
    pub tag: Option<u16>,

    /// Predicted direction and confidence
    pub confidence: SaturatingCounter,

    /// Number of recent hits, used to pick an entry for replacement
    pub recency: SaturatingCounter,
}
impl GlobalEntry {
    pub fn new() -> Self {
        Self {
            tag: None,
            confidence: CONFIDENCE_CTR.build(),
            recency: RECENCY_CTR.build(),
        }
    }

    /// Returns 'true' if this entry holds the provided tag.
    pub fn tag_matches(&self, tag: u16) -> bool {
        self.tag == Some(tag)
    }

    /// Returns 'true' if this entry is a candidate for replacement.
    pub fn is_replaceable(&self) -> bool {
        self.recency.value() == 0
    }

    /// Replace the contents of this entry.
    pub fn install(&mut self, tag: u16, confidence: u8) {
        self.tag = Some(tag);
        self.confidence.set(confidence);
        self.recency.set(1);
    }

    /// Clear this entry.
    pub fn invalidate(&mut self) {
        self.tag = None;
        self.confidence.reset();
        self.recency.reset();
    }
}

impl Default for GlobalEntry {
    fn default() -> Self { Self::new() }
}

/// A row in the global component.
pub type GlobalRow = [GlobalEntry; GLOBAL_WAYS];

/// The global component: [GLOBAL_ROWS] rows of [GLOBAL_WAYS] tagged entries.
#[derive(Clone, Debug)]
pub struct GlobalTable {
    data: Vec<GlobalRow>,
}
impl GlobalTable {
    pub fn new() -> Self {
        Self {
            data: vec![[GlobalEntry::new(); GLOBAL_WAYS]; GLOBAL_ROWS],
        }
    }

    fn check_tag(tag: u16) {
        assert!((tag as usize) < (1 << GLOBAL_TAG_BITS),
            "global tag {:#x} doesn't fit in {} bits", tag, GLOBAL_TAG_BITS);
    }

    /// Return the confidence counter for 'tag' in 'row', or [GLOBAL_MISS]
    /// when the tag isn't present.
    pub fn probe(&self, row: usize, tag: u16) -> u8 {
        match self.lookup(row, tag) {
            Some(way) => self.get_entry(row)[way].confidence.value(),
            None => GLOBAL_MISS,
        }
    }

    /// Train the entry for 'tag' in 'row' with a resolved outcome.
    ///
    /// Returns 'false' if the tag isn't present.
    pub fn train(&mut self, row: usize, tag: u16, outcome: Outcome) -> bool {
        let Some(way) = self.lookup(row, tag) else {
            return false;
        };
        let entry = &mut self.get_entry_mut(row)[way];
        entry.confidence.update(outcome);
        entry.recency.increment();
        true
    }

    /// Age all entries in 'row' and try to allocate an entry for 'tag'.
    ///
    /// In a single pass over the ways: an entry with a nonzero recency
    /// counter is decremented, and the first entry whose recency counter was
    /// already zero is replaced with 'tag' and the provided confidence.
    /// Returns the way that was replaced, if any.
    pub fn allocate(&mut self, row: usize, tag: u16, confidence: u8)
        -> Option<usize>
    {
        Self::check_tag(tag);
        let mut installed = None;
        for (way, entry) in self.get_entry_mut(row).iter_mut().enumerate() {
            if !entry.is_replaceable() {
                entry.recency.decrement();
            } else if installed.is_none() {
                entry.install(tag, confidence);
                installed = Some(way);
            }
        }
        installed
    }

    /// Clear all entries.
    pub fn reset(&mut self) {
        for entry in self.data.iter_mut().flatten() {
            entry.invalidate();
        }
    }

    /// Iterate over all entries in the table.
    pub fn iter(&self) -> impl Iterator<Item = &GlobalEntry> {
        self.data.iter().flatten()
    }

    /// Returns the percentage of entries that have been allocated.
    pub fn utilization(&self) -> f64 {
        let used = self.iter().filter(|e| e.tag.is_some()).count();
        (used as f64 / self.size() as f64) * 100.0
    }
}

impl Default for GlobalTable {
    fn default() -> Self { Self::new() }
}

impl PredictorTable for GlobalTable {
    type Index = usize;
    type Entry = GlobalRow;

    /// Returns the total number of entries [not rows].
    fn size(&self) -> usize { GLOBAL_ROWS * GLOBAL_WAYS }

    fn get_entry(&self, row: usize) -> &GlobalRow {
        assert!(row < GLOBAL_ROWS, "global row {:#x} out of bounds", row);
        &self.data[row]
    }

    fn get_entry_mut(&mut self, row: usize) -> &mut GlobalRow {
        assert!(row < GLOBAL_ROWS, "global row {:#x} out of bounds", row);
        &mut self.data[row]
    }
}

impl TaggedPredictorTable for GlobalTable {
    type Tag = u16;

    fn ways(&self) -> usize { GLOBAL_WAYS }

    fn lookup(&self, row: usize, tag: u16) -> Option<usize> {
        Self::check_tag(tag);
        self.get_entry(row).iter().position(|e| e.tag_matches(tag))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn recency(t: &GlobalTable, row: usize) -> Vec<u8> {
        t.get_entry(row).iter().map(|e| e.recency.value()).collect()
    }

    #[test]
    fn empty_table_misses() {
        let t = GlobalTable::new();
        assert_eq!(t.probe(0, 0), GLOBAL_MISS);
        assert_eq!(t.probe(GLOBAL_ROWS - 1, 63), GLOBAL_MISS);
        assert_eq!(t.utilization(), 0.0);
        assert_eq!(t.size() / t.ways(), GLOBAL_ROWS);
    }

    #[test]
    fn confidence_saturates() {
        let mut t = GlobalTable::new();
        assert_eq!(t.allocate(7, 0x2a, 1), Some(0));
        for _ in 0..10 {
            assert!(t.train(7, 0x2a, Outcome::T));
            assert!(t.probe(7, 0x2a) <= 3);
        }
        assert_eq!(t.probe(7, 0x2a), 3);
        assert_eq!(t.get_entry(7)[0].recency.value(), 5);
        for _ in 0..10 {
            assert!(t.train(7, 0x2a, Outcome::N));
        }
        assert_eq!(t.probe(7, 0x2a), 0);
        assert!(!t.train(7, 0x2b, Outcome::T));
    }

    #[test]
    fn allocation_ages_the_row() {
        let mut t = GlobalTable::new();
        assert_eq!(t.allocate(0, 1, 2), Some(0));
        assert_eq!(recency(&t, 0), vec![1, 0, 0, 0]);

        // Way 0 is aged in the same pass that installs into way 1
        assert_eq!(t.allocate(0, 2, 2), Some(1));
        assert_eq!(recency(&t, 0), vec![0, 1, 0, 0]);

        // Way 0 was already at zero, so it is replaced first
        assert_eq!(t.allocate(0, 3, 3), Some(0));
        assert_eq!(t.probe(0, 1), GLOBAL_MISS);
        assert_eq!(t.probe(0, 3), 3);
        assert_eq!(recency(&t, 0), vec![1, 0, 0, 0]);
    }

    #[test]
    fn confirmed_ways_survive() {
        let mut t = GlobalTable::new();
        for (way, tag) in (10..14).enumerate() {
            let entry = &mut t.get_entry_mut(3)[way];
            entry.install(tag, 2);
            entry.recency.set(way as u8 + 2);
        }
        let before = recency(&t, 3);
        assert!(before.iter().all(|r| *r > 0), "{:?}", before);

        // Every way is busy: no allocation, but everyone gets older
        assert_eq!(t.allocate(3, 20, 1), None);
        let after = recency(&t, 3);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(*a, b - 1);
        }

        // Keep trying until the least-recently-confirmed way is replaced
        let mut victim = None;
        for _ in 0..RECENCY_CTR.max {
            victim = t.allocate(3, 20, 1);
            if victim.is_some() { break; }
        }
        let victim = victim.expect("no way was replaced");
        let min = before.iter().copied().min().unwrap();
        assert_eq!(before[victim], min);
    }

    #[test]
    #[should_panic]
    fn oversized_tag() {
        let t = GlobalTable::new();
        t.probe(0, 1 << GLOBAL_TAG_BITS);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Allocate(u16, u8),
        Train(u16, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u16..8, 0u8..=3).prop_map(|(t, c)| Op::Allocate(t, c)),
            (0u16..8, any::<bool>()).prop_map(|(t, o)| Op::Train(t, o)),
        ]
    }

    proptest! {
        #[test]
        fn replacement_prefers_idle_ways(
            ops in proptest::collection::vec(op(), 1..128),
        ) {
            let mut t = GlobalTable::new();
            for op in ops {
                match op {
                    Op::Allocate(tag, conf) => {
                        let before = recency(&t, 0);
                        let first_idle = before.iter().position(|r| *r == 0);
                        let way = t.allocate(0, tag, conf);
                        prop_assert_eq!(way, first_idle);
                        if let Some(way) = way {
                            prop_assert!(t.get_entry(0)[way].tag_matches(tag));
                        }
                    },
                    Op::Train(tag, taken) => {
                        t.train(0, tag, Outcome::from_bool(taken));
                    },
                }
                for e in t.get_entry(0).iter() {
                    prop_assert!(e.confidence.value() <= CONFIDENCE_CTR.max);
                    prop_assert!(e.recency.value() <= RECENCY_CTR.max);
                }
            }
        }
    }
}
