
/// Container for [HybridPredictor] runtime stats.
///
/// [HybridPredictor]: crate::predictor::HybridPredictor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HybridStats {
    /// Correct predictions from the fallback component
    pub fallback_hits: usize,

    /// Incorrect predictions from the fallback component
    pub fallback_miss: usize,

    /// Correct predictions from the global component
    pub global_hits: usize,

    /// Incorrect predictions from the global component
    pub global_miss: usize,

    /// Successful allocations in the global component
    pub alcs: usize,

    /// Failed allocations in the global component
    pub failed_alcs: usize,

    /// Number of updates
    pub clk: usize,
}
impl HybridStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conditional branches predicted by the global component.
    pub fn global_brns(&self) -> usize {
        self.global_hits + self.global_miss
    }

    /// Number of conditional branches predicted by the fallback component.
    pub fn fallback_brns(&self) -> usize {
        self.fallback_hits + self.fallback_miss
    }
}
