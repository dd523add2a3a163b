//! Core traits for scoring models.

use data_loader::{RatingScale, RawId, Trainset};
use serde::Serialize;

/// Result of a single point-prediction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub user: RawId,
    pub item: RawId,
    /// Estimated score
    pub estimate: f64,
    /// Why the model fell back to a default estimate, if it did
    pub impossible: Option<String>,
}

impl Prediction {
    pub fn new(user: RawId, item: RawId, estimate: f64) -> Self {
        Self {
            user,
            item,
            estimate,
            impossible: None,
        }
    }

    /// A fallback estimate the model could not compute properly
    pub fn impossible(user: RawId, item: RawId, estimate: f64, reason: impl Into<String>) -> Self {
        Self {
            impossible: Some(reason.into()),
            ..Self::new(user, item, estimate)
        }
    }

    pub fn was_impossible(&self) -> bool {
        self.impossible.is_some()
    }
}

/// A trained model that scores (user, item) pairs.
///
/// ## Design Note
/// - `predict` takes `&self`: the model is read-only while predicting
/// - `Send + Sync` lets callers share one fitted model across threads
/// - Unknown users or items are not errors; the model returns a fallback
///   estimate and flags it through [`Prediction::impossible`]
pub trait ScoringModel: Send + Sync {
    /// Returns the name of this model (for logging/debugging)
    fn name(&self) -> &str;

    /// Estimate the score `user` would give `item`
    fn predict(&self, user: &RawId, item: &RawId) -> Prediction;
}

/// Training entry point of a scoring model.
pub trait Fit {
    /// Fit the model on a full trainset, replacing any previous fit
    fn fit(&mut self, trainset: &Trainset) -> anyhow::Result<()>;
}

/// Clamp an estimate into the rating scale
pub fn clip(estimate: f64, scale: RatingScale) -> f64 {
    estimate.clamp(scale.min, scale.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip() {
        let scale = RatingScale::default();
        assert_eq!(clip(7.2, scale), 5.0);
        assert_eq!(clip(-1.0, scale), 1.0);
        assert_eq!(clip(3.3, scale), 3.3);
    }

    #[test]
    fn test_prediction_builders() {
        let pred = Prediction::new(RawId::Int(1), RawId::Int(2), 3.5);
        assert_eq!(pred.estimate, 3.5);
        assert!(!pred.was_impossible());

        let fallback = Prediction::impossible(RawId::Int(1), RawId::Int(9), 3.0, "item is unknown");
        assert!(fallback.was_impossible());
        assert_eq!(fallback.estimate, 3.0);
    }
}
