//! Convert a trainset back into an interaction table.

use crate::config::ColumnConfig;
use data_loader::{Column, DataLoadError, InteractionFrame, RawId, Result, Trainset};

/// Emit `[user_col, item_col, rating_col]` with one row per trainset rating.
///
/// Raw ids are restored in the dtypes of the table the trainset was built
/// from. Rows are grouped by user, in the trainset's inner-id order.
pub fn trainset_to_frame(trainset: &Trainset, columns: &ColumnConfig) -> Result<InteractionFrame> {
    let mut users: Vec<RawId> = Vec::with_capacity(trainset.n_ratings());
    let mut items: Vec<RawId> = Vec::with_capacity(trainset.n_ratings());
    let mut ratings: Vec<f64> = Vec::with_capacity(trainset.n_ratings());

    for (u, i, r) in trainset.all_ratings() {
        let user = trainset.to_raw_user(u).ok_or_else(|| DataLoadError::InvalidValue {
            field: "inner user id".to_string(),
            value: u.to_string(),
        })?;
        let item = trainset.to_raw_item(i).ok_or_else(|| DataLoadError::InvalidValue {
            field: "inner item id".to_string(),
            value: i.to_string(),
        })?;
        users.push(user.clone());
        items.push(item.clone());
        ratings.push(r);
    }

    InteractionFrame::new()
        .with_column(
            columns.user_col.as_str(),
            Column::from_ids(&columns.user_col, trainset.user_dtype(), users)?,
        )?
        .with_column(
            columns.item_col.as_str(),
            Column::from_ids(&columns.item_col, trainset.item_dtype(), items)?,
        )?
        .with_column(columns.rating_col.as_str(), Column::Float64(ratings))
}
