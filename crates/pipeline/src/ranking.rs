//! Ranking predictions: score the user x item cross product.
//!
//! Used for top-K evaluation. Users and items are the distinct values of the
//! input table, in order of first appearance; the cross product is laid out
//! user-major. Already observed pairs are left out unless `recommend_seen`
//! is set.

use crate::config::ColumnConfig;
use crate::rating::assemble_predictions;
use data_loader::{InteractionFrame, RawId, Result};
use scoring::ScoringModel;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Predict scores over every (user, item) combination found in `data`.
///
/// ## Algorithm
/// 1. Collect distinct users and distinct items
/// 2. Put the observed pairs in a HashSet for O(1) membership tests
/// 3. For each user, for each item: skip observed pairs (unless
///    `recommend_seen`), otherwise call `model.predict(user, item)`
///
/// Row counts, with `U` users, `I` items and `S` distinct observed pairs:
/// - `recommend_seen == false`: `U * I - S`, disjoint from the observed pairs
/// - `recommend_seen == true`: `U * I`, containing every observed pair
///
/// # Errors
/// * `ColumnNotFound` if a configured column is missing from `data`
/// * `TypeMismatch` if an identifier column holds floats
#[instrument(skip_all, fields(model = model.name(), rows = data.num_rows(), recommend_seen = recommend_seen))]
pub fn compute_ranking_predictions<M>(
    model: &M,
    data: &InteractionFrame,
    columns: &ColumnConfig,
    recommend_seen: bool,
) -> Result<InteractionFrame>
where
    M: ScoringModel + ?Sized,
{
    let users = data.unique_ids(&columns.user_col)?;
    let items = data.unique_ids(&columns.item_col)?;

    let seen: HashSet<(RawId, RawId)> = if recommend_seen {
        HashSet::new()
    } else {
        data.pairs(&columns.user_col, &columns.item_col)?
            .into_iter()
            .collect()
    };

    let capacity = (users.len() * items.len()).saturating_sub(seen.len());
    let mut pairs = Vec::with_capacity(capacity);
    let mut estimates = Vec::with_capacity(capacity);

    for user in &users {
        for item in &items {
            let pair = (user.clone(), item.clone());
            if seen.contains(&pair) {
                continue;
            }
            estimates.push(model.predict(user, item).estimate);
            pairs.push(pair);
        }
    }

    debug!(
        "Scored {} of {} user-item pairs ({} users, {} items)",
        pairs.len(),
        users.len() * items.len(),
        users.len(),
        items.len()
    );
    assemble_predictions(
        columns,
        data.dtype(&columns.user_col)?,
        data.dtype(&columns.item_col)?,
        pairs,
        estimates,
    )
}
