//! Types for implementing a table of predictors.

/// Interface to a table of predictors.
pub trait PredictorTable {
    /// The type of an index into the table.
    type Index: Copy;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: Self::Index) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: Self::Index) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// Interface to a *tagged* table of predictors, where each index selects a
/// set of entries which are searched by tag.
pub trait TaggedPredictorTable: PredictorTable {
    /// The type of a tag.
    type Tag: Copy + Eq;

    /// Returns the number of entries in each set.
    fn ways(&self) -> usize;

    /// Returns the way in the set selected by 'idx' holding 'tag', if any.
    fn lookup(&self, idx: Self::Index, tag: Self::Tag) -> Option<usize>;
}
