//! Error-based metrics for rating predictions.
//!
//! Truth and predictions are inner-joined on (user, item). Both tables are
//! read through the same `ColumnConfig`: the truth table supplies
//! `rating_col`, the prediction table supplies `prediction_col`.

use crate::{EvaluationError, Result};
use data_loader::{InteractionFrame, RawId};
use pipeline::ColumnConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// All rating metrics for one truth/prediction pair of tables
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingReport {
    pub rmse: f64,
    pub mae: f64,
    pub rsquared: f64,
    pub exp_var: f64,
    /// Number of joined (user, item) pairs the metrics were computed on
    pub n_pairs: usize,
}

impl RatingReport {
    pub fn compute(
        truth: &InteractionFrame,
        predictions: &InteractionFrame,
        columns: &ColumnConfig,
    ) -> Result<Self> {
        let joined = join_on_pairs(truth, predictions, columns)?;
        Ok(Self {
            rmse: rmse_of(&joined),
            mae: mae_of(&joined),
            rsquared: rsquared_of(&joined),
            exp_var: exp_var_of(&joined),
            n_pairs: joined.len(),
        })
    }
}

/// Root mean squared error
pub fn rmse(truth: &InteractionFrame, predictions: &InteractionFrame, columns: &ColumnConfig) -> Result<f64> {
    Ok(rmse_of(&join_on_pairs(truth, predictions, columns)?))
}

/// Mean absolute error
pub fn mae(truth: &InteractionFrame, predictions: &InteractionFrame, columns: &ColumnConfig) -> Result<f64> {
    Ok(mae_of(&join_on_pairs(truth, predictions, columns)?))
}

/// Coefficient of determination
pub fn rsquared(truth: &InteractionFrame, predictions: &InteractionFrame, columns: &ColumnConfig) -> Result<f64> {
    Ok(rsquared_of(&join_on_pairs(truth, predictions, columns)?))
}

/// Explained variance
pub fn exp_var(truth: &InteractionFrame, predictions: &InteractionFrame, columns: &ColumnConfig) -> Result<f64> {
    Ok(exp_var_of(&join_on_pairs(truth, predictions, columns)?))
}

/// (true rating, prediction) for every truth row whose pair was predicted
fn join_on_pairs(
    truth: &InteractionFrame,
    predictions: &InteractionFrame,
    columns: &ColumnConfig,
) -> Result<Vec<(f64, f64)>> {
    let predicted: HashMap<(RawId, RawId), f64> = predictions
        .pairs(&columns.user_col, &columns.item_col)?
        .into_iter()
        .zip(predictions.floats(&columns.prediction_col)?)
        .collect();

    let joined: Vec<(f64, f64)> = truth
        .pairs(&columns.user_col, &columns.item_col)?
        .into_iter()
        .zip(truth.floats(&columns.rating_col)?)
        .filter_map(|(pair, actual)| predicted.get(&pair).map(|&p| (actual, p)))
        .collect();

    debug!(
        "Joined {} of {} truth rows with {} predictions",
        joined.len(),
        truth.num_rows(),
        predictions.num_rows()
    );
    if joined.is_empty() {
        return Err(EvaluationError::NoOverlap);
    }
    Ok(joined)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values.iter().copied());
    mean(values.iter().map(|v| (v - m).powi(2)))
}

fn rmse_of(joined: &[(f64, f64)]) -> f64 {
    mean(joined.iter().map(|(t, p)| (t - p).powi(2))).sqrt()
}

fn mae_of(joined: &[(f64, f64)]) -> f64 {
    mean(joined.iter().map(|(t, p)| (t - p).abs()))
}

/// 1 - SS_res / SS_tot; a constant truth scores 1.0 when matched exactly, else 0.0
fn rsquared_of(joined: &[(f64, f64)]) -> f64 {
    let truth_mean = mean(joined.iter().map(|(t, _)| *t));
    let ss_res: f64 = joined.iter().map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = joined.iter().map(|(t, _)| (t - truth_mean).powi(2)).sum();
    degenerate_ratio(ss_res, ss_tot)
}

/// 1 - Var(truth - prediction) / Var(truth)
fn exp_var_of(joined: &[(f64, f64)]) -> f64 {
    let residuals: Vec<f64> = joined.iter().map(|(t, p)| t - p).collect();
    let truths: Vec<f64> = joined.iter().map(|(t, _)| *t).collect();
    degenerate_ratio(variance(&residuals), variance(&truths))
}

fn degenerate_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - numerator / denominator
    }
}
