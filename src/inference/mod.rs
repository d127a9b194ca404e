//! Inference module
//!
//! Replays the persisted transformation on one raw row and scores it with the
//! persisted model. The preprocessor is only ever applied with `transform`;
//! serving never refits anything.

mod form;
mod predictor;

pub use form::{PredictionForm, PredictionOutcome};
pub use predictor::Predictor;
