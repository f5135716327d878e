//! Implementations of different branch predictors.

pub mod table;
pub mod pht;
pub mod counter;
pub mod gshare;
pub mod hybrid;
pub mod stub;

pub use table::*;
pub use pht::*;
pub use counter::*;
pub use gshare::*;
pub use hybrid::*;
pub use stub::*;

use crate::branch::*;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// The result of asking a [BranchPredictor] about a particular branch.
pub trait Prediction {
    /// The branch this prediction was made for.
    fn info(&self) -> &BranchInfo;

    /// The predicted direction.
    fn direction(&self) -> Outcome;

    /// The predicted target address (zero when unknown).
    fn target(&self) -> usize;
}

/// Interface to a predictor which guesses the outcome [and target] of a
/// branch before it is resolved, and is later trained with the resolved
/// outcome [and target].
///
/// A prediction is made with [BranchPredictor::predict], which returns a
/// handle. The handle must be passed back to [BranchPredictor::update] once
/// the branch has been resolved. Predictors assume that only a single branch
/// is in-flight at a time: updates are expected in the same order as the
/// predictions, with no other prediction made in between. Use
/// [BranchPredictor::begin] to have this checked by the compiler.
pub trait BranchPredictor: Sized {
    /// Predictor-specific state carried from a prediction to its update.
    type Handle: Prediction;

    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Make a prediction for the provided branch.
    fn predict(&self, info: &BranchInfo) -> Self::Handle;

    /// Given the handle for some prediction, train the predictor with the
    /// resolved outcome and target of the branch.
    fn update(&mut self, handle: Self::Handle, outcome: Outcome, target: usize);

    /// Make a prediction for the provided branch.
    ///
    /// The returned [InFlight] borrows the predictor until it is resolved,
    /// so no other prediction can be made in the meantime.
    fn begin(&mut self, info: &BranchInfo) -> InFlight<'_, Self> {
        let handle = self.predict(info);
        InFlight { predictor: self, handle }
    }
}

/// A branch which has been predicted but not yet resolved.
#[must_use = "an in-flight branch must be resolved to train the predictor"]
pub struct InFlight<'a, P: BranchPredictor> {
    predictor: &'a mut P,
    handle: P::Handle,
}
impl<'a, P: BranchPredictor> InFlight<'a, P> {
    /// The predicted direction.
    pub fn direction(&self) -> Outcome { self.handle.direction() }

    /// The predicted target address.
    pub fn target(&self) -> usize { self.handle.target() }

    /// The predictor-specific handle for this prediction.
    pub fn handle(&self) -> &P::Handle { &self.handle }

    /// Train the predictor with the resolved outcome and target.
    /// Returns the predicted direction.
    pub fn resolve(self, outcome: Outcome, target: usize) -> Outcome {
        let direction = self.handle.direction();
        self.predictor.update(self.handle, outcome, target);
        direction
    }
}
