//! Top-k metrics for ranking predictions.
//!
//! ## Algorithm
//! 1. Relevant items: every item a user has in the truth table
//! 2. Recommended items: the user's k highest predictions (ties keep table
//!    order). NaN predictions are ignored and a repeated item counts once.
//! 3. Per-user scores are averaged over users present in both tables
//!
//! Relevance is binary. NDCG uses `1 / log2(rank + 1)` gains, MAP divides the
//! summed precision at each hit by the number of relevant items.

use crate::{EvaluationError, Result};
use data_loader::{InteractionFrame, RawId};
use pipeline::ColumnConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// All ranking metrics at one cutoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankingReport {
    pub k: usize,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub ndcg_at_k: f64,
    pub map_at_k: f64,
    /// Number of users the metrics were averaged over
    pub n_users: usize,
}

impl RankingReport {
    pub fn compute(
        truth: &InteractionFrame,
        predictions: &InteractionFrame,
        columns: &ColumnConfig,
        k: usize,
    ) -> Result<Self> {
        let hits = UserHits::collect(truth, predictions, columns, k)?;
        Ok(Self {
            k,
            precision_at_k: hits.average(|h| h.precision(k)),
            recall_at_k: hits.average(UserHit::recall),
            ndcg_at_k: hits.average(|h| h.ndcg(k)),
            map_at_k: hits.average(UserHit::average_precision),
            n_users: hits.users.len(),
        })
    }
}

/// Fraction of the top-k that is relevant, averaged over users
pub fn precision_at_k(
    truth: &InteractionFrame,
    predictions: &InteractionFrame,
    columns: &ColumnConfig,
    k: usize,
) -> Result<f64> {
    Ok(UserHits::collect(truth, predictions, columns, k)?.average(|h| h.precision(k)))
}

/// Fraction of relevant items found in the top-k, averaged over users
pub fn recall_at_k(
    truth: &InteractionFrame,
    predictions: &InteractionFrame,
    columns: &ColumnConfig,
    k: usize,
) -> Result<f64> {
    Ok(UserHits::collect(truth, predictions, columns, k)?.average(UserHit::recall))
}

/// Normalized discounted cumulative gain, averaged over users
pub fn ndcg_at_k(
    truth: &InteractionFrame,
    predictions: &InteractionFrame,
    columns: &ColumnConfig,
    k: usize,
) -> Result<f64> {
    Ok(UserHits::collect(truth, predictions, columns, k)?.average(|h| h.ndcg(k)))
}

/// Mean average precision, averaged over users
pub fn map_at_k(
    truth: &InteractionFrame,
    predictions: &InteractionFrame,
    columns: &ColumnConfig,
    k: usize,
) -> Result<f64> {
    Ok(UserHits::collect(truth, predictions, columns, k)?.average(UserHit::average_precision))
}

/// Hit positions of one user's top-k list
#[derive(Debug)]
struct UserHit {
    /// 1-based ranks of relevant items inside the top-k
    hit_ranks: Vec<usize>,
    n_relevant: usize,
}

impl UserHit {
    fn precision(&self, k: usize) -> f64 {
        self.hit_ranks.len() as f64 / k as f64
    }

    fn recall(&self) -> f64 {
        self.hit_ranks.len() as f64 / self.n_relevant as f64
    }

    fn ndcg(&self, k: usize) -> f64 {
        let dcg: f64 = self.hit_ranks.iter().map(|&rank| gain(rank)).sum();
        let idcg: f64 = (1..=self.n_relevant.min(k)).map(gain).sum();
        if idcg == 0.0 { 0.0 } else { dcg / idcg }
    }

    fn average_precision(&self) -> f64 {
        let summed: f64 = self
            .hit_ranks
            .iter()
            .enumerate()
            .map(|(n, &rank)| (n + 1) as f64 / rank as f64)
            .sum();
        summed / self.n_relevant as f64
    }
}

fn gain(rank: usize) -> f64 {
    1.0 / ((rank + 1) as f64).log2()
}

#[derive(Debug)]
struct UserHits {
    users: Vec<UserHit>,
}

impl UserHits {
    fn collect(
        truth: &InteractionFrame,
        predictions: &InteractionFrame,
        columns: &ColumnConfig,
        k: usize,
    ) -> Result<Self> {
        if k == 0 {
            return Err(EvaluationError::InvalidK(k));
        }

        let mut relevant: HashMap<RawId, HashSet<RawId>> = HashMap::new();
        for (user, item) in truth.pairs(&columns.user_col, &columns.item_col)? {
            relevant.entry(user).or_default().insert(item);
        }

        // Scored items per user, users kept in first-appearance order
        let mut order: Vec<RawId> = Vec::new();
        let mut scored: HashMap<RawId, Vec<(RawId, f64)>> = HashMap::new();
        let pairs = predictions.pairs(&columns.user_col, &columns.item_col)?;
        let values = predictions.floats(&columns.prediction_col)?;
        let mut unscored = 0;
        for ((user, item), score) in pairs.into_iter().zip(values) {
            if score.is_nan() {
                unscored += 1;
                continue;
            }
            if !scored.contains_key(&user) {
                order.push(user.clone());
            }
            scored.entry(user).or_default().push((item, score));
        }

        let mut users = Vec::new();
        for user in order {
            let (Some(relevant_items), Some(mut items)) = (relevant.get(&user), scored.remove(&user))
            else {
                continue;
            };
            // Stable sort: equal scores keep table order
            items.sort_by(|a, b| b.1.total_cmp(&a.1));

            // A repeated item counts once, at its best score
            let mut listed = HashSet::new();
            let hit_ranks = items
                .iter()
                .filter(|(item, _)| listed.insert(item))
                .take(k)
                .enumerate()
                .filter(|(_, (item, _))| relevant_items.contains(item))
                .map(|(idx, _)| idx + 1)
                .collect();
            users.push(UserHit {
                hit_ranks,
                n_relevant: relevant_items.len(),
            });
        }

        if unscored > 0 {
            debug!("Skipped {} NaN predictions", unscored);
        }
        debug!("Evaluating top-{} lists of {} common users", k, users.len());
        Ok(Self { users })
    }

    fn average(&self, metric: impl Fn(&UserHit) -> f64) -> f64 {
        if self.users.is_empty() {
            return 0.0;
        }
        self.users.iter().map(metric).sum::<f64>() / self.users.len() as f64
    }
}
