//! Core domain types for user-item interaction tables.
//!
//! An [`InteractionFrame`] is a small columnar table: an ordered list of
//! named, equally long, typed columns. Identifier columns keep the dtype they
//! were loaded with, and every transformation in the workspace hands the same
//! dtype back out.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// Defaults
// =============================================================================

/// Default name of the user identifier column
pub const DEFAULT_USER_COL: &str = "userID";

/// Default name of the item identifier column
pub const DEFAULT_ITEM_COL: &str = "itemID";

/// Default name of the rating column
pub const DEFAULT_RATING_COL: &str = "rating";

/// Default name of the prediction column
pub const DEFAULT_PREDICTION_COL: &str = "prediction";

/// Default name of the timestamp column
pub const DEFAULT_TIMESTAMP_COL: &str = "timestamp";

// =============================================================================
// DType and RawId
// =============================================================================

/// Element type of a [`Column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Int64,
    UInt32,
    Utf8,
    Float64,
}

impl DType {
    /// Whether values of this dtype can serve as user/item identifiers
    pub fn is_identifier(self) -> bool {
        !matches!(self, DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::UInt32 => "uint32",
            DType::Utf8 => "utf8",
            DType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// A raw user or item identifier, as it appears in the source table.
///
/// The variant mirrors the column dtype it came from, so `Int(1)` and
/// `UInt(1)` are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RawId {
    Int(i64),
    UInt(u32),
    Str(String),
}

impl RawId {
    pub fn dtype(&self) -> DType {
        match self {
            RawId::Int(_) => DType::Int64,
            RawId::UInt(_) => DType::UInt32,
            RawId::Str(_) => DType::Utf8,
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(v) => write!(f, "{}", v),
            RawId::UInt(v) => write!(f, "{}", v),
            RawId::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for RawId {
    fn from(v: i64) -> Self {
        RawId::Int(v)
    }
}

impl From<u32> for RawId {
    fn from(v: u32) -> Self {
        RawId::UInt(v)
    }
}

impl From<&str> for RawId {
    fn from(v: &str) -> Self {
        RawId::Str(v.to_string())
    }
}

impl From<String> for RawId {
    fn from(v: String) -> Self {
        RawId::Str(v)
    }
}

// =============================================================================
// Column
// =============================================================================

/// A typed column of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Int64(Vec<i64>),
    UInt32(Vec<u32>),
    Utf8(Vec<String>),
    Float64(Vec<f64>),
}

impl Column {
    /// Empty column of the given dtype with room for `capacity` values
    pub fn empty_like(dtype: DType, capacity: usize) -> Self {
        match dtype {
            DType::Int64 => Column::Int64(Vec::with_capacity(capacity)),
            DType::UInt32 => Column::UInt32(Vec::with_capacity(capacity)),
            DType::Utf8 => Column::Utf8(Vec::with_capacity(capacity)),
            DType::Float64 => Column::Float64(Vec::with_capacity(capacity)),
        }
    }

    /// Build an identifier column of `dtype` from raw ids.
    ///
    /// Fails with `TypeMismatch` if an id's variant does not belong to `dtype`.
    pub fn from_ids<I>(name: &str, dtype: DType, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawId>,
    {
        let iter = ids.into_iter();
        let mut column = Column::empty_like(dtype, iter.size_hint().0);
        for id in iter {
            let found = id.dtype();
            match (&mut column, id) {
                (Column::Int64(v), RawId::Int(x)) => v.push(x),
                (Column::UInt32(v), RawId::UInt(x)) => v.push(x),
                (Column::Utf8(v), RawId::Str(x)) => v.push(x),
                _ => {
                    return Err(DataLoadError::TypeMismatch {
                        column: name.to_string(),
                        expected: dtype.to_string(),
                        found,
                    });
                }
            }
        }
        Ok(column)
    }

    pub fn dtype(&self) -> DType {
        match self {
            Column::Int64(_) => DType::Int64,
            Column::UInt32(_) => DType::UInt32,
            Column::Utf8(_) => DType::Utf8,
            Column::Float64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::UInt32(v) => v.len(),
            Column::Utf8(v) => v.len(),
            Column::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier at `row`; `None` past the end or for float columns
    pub fn id_at(&self, row: usize) -> Option<RawId> {
        match self {
            Column::Int64(v) => v.get(row).map(|&x| RawId::Int(x)),
            Column::UInt32(v) => v.get(row).map(|&x| RawId::UInt(x)),
            Column::Utf8(v) => v.get(row).map(|x| RawId::Str(x.clone())),
            Column::Float64(_) => None,
        }
    }

    /// Numeric value at `row`; `None` past the end or for string columns
    pub fn float_at(&self, row: usize) -> Option<f64> {
        match self {
            Column::Int64(v) => v.get(row).map(|&x| x as f64),
            Column::UInt32(v) => v.get(row).map(|&x| x as f64),
            Column::Float64(v) => v.get(row).copied(),
            Column::Utf8(_) => None,
        }
    }

    /// Render the value at `row` as text (used by the writer)
    pub fn display_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Int64(v) => v.get(row).map(|x| x.to_string()),
            Column::UInt32(v) => v.get(row).map(|x| x.to_string()),
            Column::Utf8(v) => v.get(row).cloned(),
            Column::Float64(v) => v.get(row).map(|x| x.to_string()),
        }
    }
}

// =============================================================================
// InteractionFrame
// =============================================================================

/// Ordered collection of named columns that all have the same length.
///
/// Columns are looked up by name. A lookup that misses returns
/// [`DataLoadError::ColumnNotFound`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionFrame {
    columns: Vec<(String, Column)>,
    num_rows: usize,
}

impl InteractionFrame {
    /// Creates a new, empty frame
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    /// Append a column (builder pattern).
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DataLoadError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && column.len() != self.num_rows {
            return Err(DataLoadError::LengthMismatch {
                column: name,
                expected: self.num_rows,
                found: column.len(),
            });
        }
        self.num_rows = column.len();
        self.columns.push((name, column));
        Ok(self)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| DataLoadError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    pub fn dtype(&self, name: &str) -> Result<DType> {
        self.column(name).map(Column::dtype)
    }

    /// Rename columns. Every old name must exist and new names must stay unique.
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Result<Self> {
        for (old, new) in mapping {
            let position = self
                .columns
                .iter()
                .position(|(n, _)| n == old)
                .ok_or_else(|| DataLoadError::ColumnNotFound {
                    name: old.to_string(),
                })?;
            if old != new && self.has_column(new) {
                return Err(DataLoadError::DuplicateColumn {
                    name: new.to_string(),
                });
            }
            self.columns[position].0 = new.to_string();
        }
        Ok(self)
    }

    /// Convert a column to `dtype` by re-parsing its textual values.
    ///
    /// Used to line up tables whose dtypes were inferred differently, e.g. a
    /// `UInt32` MovieLens id column and an `Int64` CSV id column.
    pub fn cast_column(mut self, name: &str, dtype: DType) -> Result<Self> {
        let position = self
            .columns
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| DataLoadError::ColumnNotFound {
                name: name.to_string(),
            })?;
        let column = &self.columns[position].1;
        if column.dtype() == dtype {
            return Ok(self);
        }

        let texts: Vec<String> = (0..column.len())
            .filter_map(|row| column.display_at(row))
            .collect();
        let invalid = |value: &str| DataLoadError::InvalidValue {
            field: name.to_string(),
            value: value.to_string(),
        };
        let cast = match dtype {
            DType::Int64 => Column::Int64(
                texts
                    .iter()
                    .map(|t| t.parse().map_err(|_| invalid(t.as_str())))
                    .collect::<Result<_>>()?,
            ),
            DType::UInt32 => Column::UInt32(
                texts
                    .iter()
                    .map(|t| t.parse().map_err(|_| invalid(t.as_str())))
                    .collect::<Result<_>>()?,
            ),
            DType::Float64 => Column::Float64(
                texts
                    .iter()
                    .map(|t| t.parse().map_err(|_| invalid(t.as_str())))
                    .collect::<Result<_>>()?,
            ),
            DType::Utf8 => Column::Utf8(texts),
        };
        self.columns[position].1 = cast;
        Ok(self)
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let mut frame = InteractionFrame::new();
        for name in names {
            frame = frame.with_column(*name, self.column(name)?.clone())?;
        }
        Ok(frame)
    }

    /// All values of an identifier column
    pub fn ids(&self, name: &str) -> Result<Vec<RawId>> {
        let column = self.identifier_column(name)?;
        Ok((0..column.len()).filter_map(|row| column.id_at(row)).collect())
    }

    /// Distinct values of an identifier column, in order of first appearance
    pub fn unique_ids(&self, name: &str) -> Result<Vec<RawId>> {
        let mut seen = HashSet::new();
        Ok(self
            .ids(name)?
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect())
    }

    /// Row-wise (user, item) pairs
    pub fn pairs(&self, user_col: &str, item_col: &str) -> Result<Vec<(RawId, RawId)>> {
        let users = self.ids(user_col)?;
        let items = self.ids(item_col)?;
        Ok(users.into_iter().zip(items).collect())
    }

    /// All values of a numeric column as `f64`
    pub fn floats(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column(name)?;
        if column.dtype() == DType::Utf8 {
            return Err(DataLoadError::TypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                found: DType::Utf8,
            });
        }
        Ok((0..column.len()).filter_map(|row| column.float_at(row)).collect())
    }

    fn identifier_column(&self, name: &str) -> Result<&Column> {
        let column = self.column(name)?;
        if !column.dtype().is_identifier() {
            return Err(DataLoadError::TypeMismatch {
                column: name.to_string(),
                expected: "identifier (int64, uint32 or utf8)".to_string(),
                found: column.dtype(),
            });
        }
        Ok(column)
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// Inclusive range of valid rating values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl RatingScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Checked constructor for user-supplied bounds: both finite, `min < max`
    pub fn try_new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(DataLoadError::InvalidValue {
                field: "rating scale".to_string(),
                value: format!("{} - {}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// Precomputed rating statistics for one user or one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    pub mean: f64,
    pub count: u32,
}

/// Names of the columns produced when loading a ratings file without a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub user: String,
    pub item: String,
    pub rating: String,
    pub timestamp: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER_COL.to_string(),
            item: DEFAULT_ITEM_COL.to_string(),
            rating: DEFAULT_RATING_COL.to_string(),
            timestamp: DEFAULT_TIMESTAMP_COL.to_string(),
        }
    }
}
