
use crate::branch::*;
use crate::predictor::*;

/// State carried from [StubPredictor::predict] to [StubPredictor::update].
#[derive(Debug, PartialEq, Eq)]
pub struct StubHandle {
    /// The predicted branch
    pub info: BranchInfo,
}
impl Prediction for StubHandle {
    fn info(&self) -> &BranchInfo { &self.info }
    fn direction(&self) -> Outcome { Outcome::T }
    fn target(&self) -> usize { 0 }
}

/// A predictor with no state: always predict 'taken' [with an unknown
/// target].
#[derive(Clone, Copy, Debug, Default)]
pub struct StubPredictor;
impl BranchPredictor for StubPredictor {
    type Handle = StubHandle;
    fn name(&self) -> &'static str { "StubPredictor" }
    fn reset(&mut self) {}
    fn predict(&self, info: &BranchInfo) -> StubHandle {
        StubHandle { info: *info }
    }
    fn update(&mut self, _handle: StubHandle, _outcome: Outcome, _target: usize) {}
}
