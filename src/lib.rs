//! Models of hardware branch outcome predictors.
//!
//! Each predictor implements [BranchPredictor]: a prediction is made with
//! [BranchPredictor::predict] and the returned handle is later passed to
//! [BranchPredictor::update] along with the resolved outcome and target.

pub mod branch;
pub mod history;
pub mod predictor;
pub mod sim;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use history::*;
pub use predictor::*;
pub use trace::*;
