//! # Evaluation Crate
//!
//! Metrics for the two kinds of prediction tables produced by `pipeline`.
//!
//! ### Rating metrics
//! Compare rating predictions with true ratings on the (user, item) pairs
//! both tables share: RMSE, MAE, R squared, explained variance.
//!
//! ### Ranking metrics
//! Compare each user's top-k predicted items with the items the user has in
//! the truth table: precision@k, recall@k, NDCG@k, MAP@k. Scores are
//! averaged over users present in both tables.
//!
//! ## Example Usage
//!
//! ```ignore
//! use evaluation::{RankingReport, RatingReport};
//! use pipeline::ColumnConfig;
//!
//! let columns = ColumnConfig::default();
//! let rating = RatingReport::compute(&test, &rating_preds, &columns)?;
//! let ranking = RankingReport::compute(&test, &ranking_preds, &columns, 10)?;
//! println!("RMSE {:.4}, NDCG@10 {:.4}", rating.rmse, ranking.ndcg_at_k);
//! ```

pub mod rating_metrics;
pub mod ranking_metrics;

use data_loader::DataLoadError;
use thiserror::Error;

// Re-export commonly used items
pub use ranking_metrics::{RankingReport, map_at_k, ndcg_at_k, precision_at_k, recall_at_k};
pub use rating_metrics::{RatingReport, exp_var, mae, rmse, rsquared};

/// Errors that can occur while evaluating predictions
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// Truth and prediction tables share no (user, item) pair
    #[error("No (user, item) pair is shared by the truth and prediction tables")]
    NoOverlap,

    /// Cutoff must select at least one item
    #[error("Invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    /// Reading a column failed
    #[error(transparent)]
    Data(#[from] DataLoadError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EvaluationError>;
