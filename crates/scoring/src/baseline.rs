//! Mean baseline scorer.
//!
//! Predicts `mu + b_u + b_i`, where `mu` is the global mean rating and the
//! biases are damped mean deviations:
//!
//! - `b_i = sum(r_ui - mu) / (damping + |ratings of i|)`
//! - `b_u = sum(r_ui - mu - b_i) / (damping + |ratings by u|)`
//!
//! Unknown users or items contribute no bias. When neither is known the
//! prediction falls back to `mu` and is flagged impossible. Estimates are
//! clipped to the trainset's rating scale.

use crate::ScoringError;
use crate::traits::{Fit, Prediction, ScoringModel, clip};
use anyhow::Result;
use data_loader::{RatingScale, RawId, Trainset};
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
struct FittedBiases {
    global_mean: f64,
    user_bias: HashMap<RawId, f64>,
    item_bias: HashMap<RawId, f64>,
    scale: RatingScale,
}

/// Global mean plus damped user and item biases.
#[derive(Debug, Clone, Default)]
pub struct MeanBaseline {
    damping: f64,
    fitted: Option<FittedBiases>,
}

impl MeanBaseline {
    /// Create an unfitted baseline with no damping
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the damping term added to every bias denominator (default: 0)
    pub fn with_damping(mut self, damping: f64) -> Result<Self, ScoringError> {
        if !damping.is_finite() || damping < 0.0 {
            return Err(ScoringError::InvalidParameter {
                name: "damping".to_string(),
                reason: format!("must be a finite, non-negative number, got {}", damping),
            });
        }
        self.damping = damping;
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Like [`ScoringModel::predict`], but refuses to answer before `fit`
    pub fn try_predict(&self, user: &RawId, item: &RawId) -> Result<Prediction, ScoringError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| ScoringError::NotFitted(self.name().to_string()))?;

        let user_bias = fitted.user_bias.get(user);
        let item_bias = fitted.item_bias.get(item);
        let estimate = clip(
            fitted.global_mean + user_bias.unwrap_or(&0.0) + item_bias.unwrap_or(&0.0),
            fitted.scale,
        );

        let prediction = match (user_bias, item_bias) {
            (None, None) => Prediction::impossible(
                user.clone(),
                item.clone(),
                estimate,
                "user and item are unknown",
            ),
            _ => Prediction::new(user.clone(), item.clone(), estimate),
        };
        Ok(prediction)
    }
}

impl Fit for MeanBaseline {
    #[instrument(skip(self, trainset), fields(ratings = trainset.n_ratings()))]
    fn fit(&mut self, trainset: &Trainset) -> Result<()> {
        let mu = trainset.global_mean();

        // sum(r_ui - mu) over an item's ratings is count * (mean - mu)
        let item_bias: Vec<f64> = (0..trainset.n_items())
            .map(|i| match trainset.item_stats(i) {
                Some(stats) => {
                    let count = stats.count as f64;
                    count * (stats.mean - mu) / (self.damping + count)
                }
                None => 0.0,
            })
            .collect();

        let user_bias: Vec<f64> = (0..trainset.n_users())
            .map(|u| {
                let ratings = trainset.user_ratings(u);
                let deviation: f64 = ratings.iter().map(|&(i, r)| r - mu - item_bias[i]).sum();
                deviation / (self.damping + ratings.len() as f64)
            })
            .collect();

        let fitted = FittedBiases {
            global_mean: mu,
            user_bias: user_bias
                .into_iter()
                .enumerate()
                .filter_map(|(u, b)| trainset.to_raw_user(u).map(|raw| (raw.clone(), b)))
                .collect(),
            item_bias: item_bias
                .into_iter()
                .enumerate()
                .filter_map(|(i, b)| trainset.to_raw_item(i).map(|raw| (raw.clone(), b)))
                .collect(),
            scale: trainset.rating_scale(),
        };

        debug!(
            "Fitted mean baseline: mu={:.4}, {} user biases, {} item biases",
            mu,
            fitted.user_bias.len(),
            fitted.item_bias.len()
        );
        self.fitted = Some(fitted);
        Ok(())
    }
}

impl ScoringModel for MeanBaseline {
    fn name(&self) -> &str {
        "MeanBaseline"
    }

    fn predict(&self, user: &RawId, item: &RawId) -> Prediction {
        match self.try_predict(user, item) {
            Ok(prediction) => prediction,
            Err(e) => Prediction::impossible(
                user.clone(),
                item.clone(),
                RatingScale::default().midpoint(),
                e.to_string(),
            ),
        }
    }
}
