//! Column configuration shared by the prediction adapters.

use data_loader::{
    DEFAULT_ITEM_COL, DEFAULT_PREDICTION_COL, DEFAULT_RATING_COL, DEFAULT_USER_COL,
};

/// Names of the user, item, rating and prediction columns.
///
/// ## Usage
/// ```ignore
/// let columns = ColumnConfig::default()
///     .with_user_col("uid")
///     .with_item_col("iid")
///     .with_prediction_col("pred");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    pub user_col: String,
    pub item_col: String,
    pub rating_col: String,
    pub prediction_col: String,
}

impl ColumnConfig {
    pub fn with_user_col(mut self, name: impl Into<String>) -> Self {
        self.user_col = name.into();
        self
    }

    pub fn with_item_col(mut self, name: impl Into<String>) -> Self {
        self.item_col = name.into();
        self
    }

    pub fn with_rating_col(mut self, name: impl Into<String>) -> Self {
        self.rating_col = name.into();
        self
    }

    pub fn with_prediction_col(mut self, name: impl Into<String>) -> Self {
        self.prediction_col = name.into();
        self
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            user_col: DEFAULT_USER_COL.to_string(),
            item_col: DEFAULT_ITEM_COL.to_string(),
            rating_col: DEFAULT_RATING_COL.to_string(),
            prediction_col: DEFAULT_PREDICTION_COL.to_string(),
        }
    }
}
