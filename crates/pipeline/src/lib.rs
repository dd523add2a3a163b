//! Prediction adapters that turn a scoring model into prediction tables.
//!
//! This crate provides:
//! - `compute_rating_predictions`: score exactly the observed pairs
//! - `compute_ranking_predictions`: score the user x item cross product,
//!   optionally leaving out already observed pairs
//! - `trainset_to_frame`: turn a trainset back into an interaction table
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{ColumnConfig, compute_rating_predictions, compute_ranking_predictions};
//!
//! let columns = ColumnConfig::default();
//! let rating_preds = compute_rating_predictions(&model, &test, &columns)?;
//! let ranking_preds = compute_ranking_predictions(&model, &train, &columns, false)?;
//! ```
//!
//! Both adapters are single-threaded and deterministic; the model is only
//! borrowed and never mutated.

pub mod config;
pub mod rating;
pub mod ranking;
pub mod trainset_frame;

// Re-export main types
pub use config::ColumnConfig;
pub use rating::compute_rating_predictions;
pub use ranking::compute_ranking_predictions;
pub use trainset_frame::trainset_to_frame;
