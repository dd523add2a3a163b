//! # Data Loader Crate
//!
//! This crate loads, shapes and indexes user-item interaction tables.
//!
//! ## Main Components
//!
//! - **types**: Typed columns, the `InteractionFrame` table, raw identifiers
//! - **parser**: Read MovieLens `.dat` and delimited files, write delimited files
//! - **index**: Build a `Trainset` with dense ids and per-user/per-item stats
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, ColumnNames, RatingScale, Trainset};
//! use std::path::Path;
//!
//! let frame = parser::parse_movielens_ratings(Path::new("data/ml-1m/ratings.dat"), &ColumnNames::default())?;
//! let trainset = Trainset::from_frame(&frame, "userID", "itemID", "rating", RatingScale::default())?;
//!
//! println!("{} users rated {} items", trainset.n_users(), trainset.n_items());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{InnerId, Trainset};
pub use types::{
    // Column defaults
    DEFAULT_ITEM_COL,
    DEFAULT_PREDICTION_COL,
    DEFAULT_RATING_COL,
    DEFAULT_TIMESTAMP_COL,
    DEFAULT_USER_COL,
    // Core types
    Column,
    ColumnNames,
    DType,
    InteractionFrame,
    RatingScale,
    RatingStats,
    RawId,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> InteractionFrame {
        InteractionFrame::new()
            .with_column("userID", Column::Int64(vec![1, 2, 1, 3]))
            .unwrap()
            .with_column(
                "itemID",
                Column::Utf8(vec!["a".into(), "a".into(), "b".into(), "c".into()]),
            )
            .unwrap()
            .with_column("rating", Column::Float64(vec![4.0, 3.0, 5.0, 1.0]))
            .unwrap()
    }

    #[test]
    fn test_frame_creation() {
        let frame = InteractionFrame::new();
        assert_eq!(frame.num_rows(), 0);
        assert_eq!(frame.num_columns(), 0);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_column_lookup() {
        let frame = frame();
        assert_eq!(frame.num_rows(), 4);
        assert_eq!(frame.column_names(), vec!["userID", "itemID", "rating"]);
        assert_eq!(frame.dtype("itemID").unwrap(), DType::Utf8);

        let err = frame.column("uid").unwrap_err();
        assert!(matches!(err, DataLoadError::ColumnNotFound { name } if name == "uid"));
    }

    #[test]
    fn test_length_and_duplicate_checks() {
        let err = frame()
            .with_column("extra", Column::Int64(vec![1]))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::LengthMismatch { expected: 4, found: 1, .. }));

        let err = frame()
            .with_column("rating", Column::Float64(vec![0.0; 4]))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_rename() {
        let renamed = frame()
            .rename(&[("userID", "uid"), ("itemID", "iid")])
            .unwrap();
        assert_eq!(renamed.column_names(), vec!["uid", "iid", "rating"]);
        assert_eq!(renamed.dtype("uid").unwrap(), DType::Int64);

        assert!(frame().rename(&[("missing", "x")]).is_err());
        assert!(frame().rename(&[("userID", "rating")]).is_err());
    }

    #[test]
    fn test_unique_ids_keep_first_appearance() {
        let frame = frame();
        assert_eq!(
            frame.unique_ids("userID").unwrap(),
            vec![RawId::Int(1), RawId::Int(2), RawId::Int(3)]
        );
        assert_eq!(frame.pairs("userID", "itemID").unwrap()[2], (RawId::Int(1), RawId::from("b")));
    }

    #[test]
    fn test_float_column_is_not_an_identifier() {
        let err = frame().ids("rating").unwrap_err();
        assert!(matches!(err, DataLoadError::TypeMismatch { found: DType::Float64, .. }));

        let err = frame().floats("itemID").unwrap_err();
        assert!(matches!(err, DataLoadError::TypeMismatch { found: DType::Utf8, .. }));
    }

    #[test]
    fn test_cast_column() {
        let frame = frame().cast_column("userID", DType::UInt32).unwrap();
        assert_eq!(frame.dtype("userID").unwrap(), DType::UInt32);
        assert_eq!(frame.ids("userID").unwrap()[0], RawId::UInt(1));

        let frame = frame.cast_column("userID", DType::Utf8).unwrap();
        assert_eq!(frame.ids("userID").unwrap()[3], RawId::from("3"));

        let err = frame.cast_column("itemID", DType::Int64).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { ref value, .. } if value == "a"));
    }

    #[test]
    fn test_column_from_ids() {
        let column = Column::from_ids("userID", DType::UInt32, vec![RawId::UInt(7), RawId::UInt(8)]).unwrap();
        assert_eq!(column, Column::UInt32(vec![7, 8]));

        let err = Column::from_ids("userID", DType::UInt32, vec![RawId::Int(7)]).unwrap_err();
        assert!(matches!(err, DataLoadError::TypeMismatch { found: DType::Int64, .. }));
    }
}
