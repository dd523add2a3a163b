//! Scoring model contract for user-item predictions.
//!
//! A scoring model is fitted once on a [`Trainset`](data_loader::Trainset)
//! and then answers point-prediction queries for (user, item) pairs. The
//! prediction adapters in the `pipeline` crate only ever talk to a model
//! through [`ScoringModel`], so any collaborator can be plugged in:
//! - `FnScorer` wraps a closure
//! - `MeanBaseline` predicts from global, user and item rating means
//!
//! Training algorithms such as matrix factorization live outside this
//! workspace; they plug in by implementing [`Fit`] and [`ScoringModel`].

pub mod traits;
pub mod fn_scorer;
pub mod baseline;

use thiserror::Error;

// Re-export main types
pub use traits::{Fit, Prediction, ScoringModel, clip};
pub use fn_scorer::FnScorer;
pub use baseline::MeanBaseline;

/// Errors that can occur when fitting or querying a scoring model
#[derive(Error, Debug, PartialEq)]
pub enum ScoringError {
    #[error("Model {0} has not been fitted")]
    NotFitted(String),

    #[error("Invalid model parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}
