//! Rating predictions: score exactly the observed (user, item) pairs.
//!
//! Used for error-based evaluation (RMSE, MAE, ...): the output has one row
//! per input row, in input order, so it lines up with the true ratings.

use crate::config::ColumnConfig;
use data_loader::{Column, DType, InteractionFrame, RawId, Result};
use scoring::ScoringModel;
use tracing::{debug, instrument};

/// Predict a score for every (user, item) row of `data`.
///
/// ## Algorithm
/// 1. Read the user and item columns named in `columns`
/// 2. Call `model.predict(user, item)` once per row
/// 3. Emit `[user_col, item_col, prediction_col]`, identifier dtypes unchanged
///
/// No deduplication and no filtering: output rows == input rows.
///
/// # Errors
/// * `ColumnNotFound` if a configured column is missing from `data`
/// * `TypeMismatch` if an identifier column holds floats
#[instrument(skip_all, fields(model = model.name(), rows = data.num_rows()))]
pub fn compute_rating_predictions<M>(
    model: &M,
    data: &InteractionFrame,
    columns: &ColumnConfig,
) -> Result<InteractionFrame>
where
    M: ScoringModel + ?Sized,
{
    let pairs = data.pairs(&columns.user_col, &columns.item_col)?;
    let estimates: Vec<f64> = pairs
        .iter()
        .map(|(user, item)| model.predict(user, item).estimate)
        .collect();

    debug!("Scored {} observed pairs", estimates.len());
    assemble_predictions(
        columns,
        data.dtype(&columns.user_col)?,
        data.dtype(&columns.item_col)?,
        pairs,
        estimates,
    )
}

/// Build a `[user, item, prediction]` frame from scored pairs
pub(crate) fn assemble_predictions(
    columns: &ColumnConfig,
    user_dtype: DType,
    item_dtype: DType,
    pairs: Vec<(RawId, RawId)>,
    estimates: Vec<f64>,
) -> Result<InteractionFrame> {
    let (users, items): (Vec<RawId>, Vec<RawId>) = pairs.into_iter().unzip();

    InteractionFrame::new()
        .with_column(
            columns.user_col.as_str(),
            Column::from_ids(&columns.user_col, user_dtype, users)?,
        )?
        .with_column(
            columns.item_col.as_str(),
            Column::from_ids(&columns.item_col, item_dtype, items)?,
        )?
        .with_column(columns.prediction_col.as_str(), Column::Float64(estimates))
}
