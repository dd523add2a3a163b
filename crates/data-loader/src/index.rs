//! Trainset building and indexing logic.
//!
//! A [`Trainset`] is the indexed form of an interaction table that scoring
//! models fit on:
//! - raw identifiers are mapped to dense inner ids (first-appearance order)
//! - ratings are grouped per user and per item
//! - per-user and per-item statistics are precomputed with rayon

use crate::error::{DataLoadError, Result};
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Dense index assigned to a user or item inside a trainset
pub type InnerId = usize;

/// Bidirectional mapping between raw ids and dense inner ids
#[derive(Debug, Clone, Default)]
struct IdMap {
    raw_to_inner: HashMap<RawId, InnerId>,
    inner_to_raw: Vec<RawId>,
}

impl IdMap {
    fn intern(&mut self, raw: RawId) -> InnerId {
        if let Some(&inner) = self.raw_to_inner.get(&raw) {
            return inner;
        }
        let inner = self.inner_to_raw.len();
        self.inner_to_raw.push(raw.clone());
        self.raw_to_inner.insert(raw, inner);
        inner
    }

    fn len(&self) -> usize {
        self.inner_to_raw.len()
    }
}

/// Indexed training data for scoring models.
#[derive(Debug, Clone)]
pub struct Trainset {
    users: IdMap,
    items: IdMap,
    user_dtype: DType,
    item_dtype: DType,

    /// Ratings made by each user: (inner item, rating)
    user_ratings: Vec<Vec<(InnerId, f64)>>,
    /// Ratings received by each item: (inner user, rating)
    item_ratings: Vec<Vec<(InnerId, f64)>>,

    user_stats: Vec<RatingStats>,
    item_stats: Vec<RatingStats>,

    n_ratings: usize,
    global_mean: f64,
    rating_scale: RatingScale,
}

impl Trainset {
    /// Build a trainset from the user, item and rating columns of `frame`.
    ///
    /// Steps:
    /// 1. Resolve the three columns (missing names are `ColumnNotFound`)
    /// 2. Intern raw ids and group ratings per user and per item
    /// 3. Compute user and item statistics in parallel
    /// 4. Validate ratings against `rating_scale`
    #[instrument(skip(frame), fields(rows = frame.num_rows()))]
    pub fn from_frame(
        frame: &InteractionFrame,
        user_col: &str,
        item_col: &str,
        rating_col: &str,
        rating_scale: RatingScale,
    ) -> Result<Self> {
        let pairs = frame.pairs(user_col, item_col)?;
        let ratings = frame.floats(rating_col)?;
        if pairs.is_empty() {
            return Err(DataLoadError::EmptyData(
                "cannot build a trainset from an empty table".to_string(),
            ));
        }

        let mut users = IdMap::default();
        let mut items = IdMap::default();
        let mut user_ratings: Vec<Vec<(InnerId, f64)>> = Vec::new();
        let mut item_ratings: Vec<Vec<(InnerId, f64)>> = Vec::new();

        for ((user, item), rating) in pairs.into_iter().zip(ratings.iter().copied()) {
            let u = users.intern(user);
            let i = items.intern(item);
            if u == user_ratings.len() {
                user_ratings.push(Vec::new());
            }
            if i == item_ratings.len() {
                item_ratings.push(Vec::new());
            }
            user_ratings[u].push((i, rating));
            item_ratings[i].push((u, rating));
        }

        let n_ratings = ratings.len();
        let global_mean = ratings.iter().sum::<f64>() / n_ratings as f64;

        let trainset = Self {
            user_stats: compute_stats(&user_ratings),
            item_stats: compute_stats(&item_ratings),
            users,
            items,
            user_dtype: frame.dtype(user_col)?,
            item_dtype: frame.dtype(item_col)?,
            user_ratings,
            item_ratings,
            n_ratings,
            global_mean,
            rating_scale,
        };
        trainset.validate()?;

        debug!(
            "Built trainset: {} users, {} items, {} ratings",
            trainset.n_users(),
            trainset.n_items(),
            trainset.n_ratings()
        );
        Ok(trainset)
    }

    /// Check that every rating is finite and inside the rating scale
    pub fn validate(&self) -> Result<()> {
        for (_, _, rating) in self.all_ratings() {
            if !rating.is_finite() || !self.rating_scale.contains(rating) {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn n_ratings(&self) -> usize {
        self.n_ratings
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn rating_scale(&self) -> RatingScale {
        self.rating_scale
    }

    /// Dtype of the user column the trainset was built from
    pub fn user_dtype(&self) -> DType {
        self.user_dtype
    }

    /// Dtype of the item column the trainset was built from
    pub fn item_dtype(&self) -> DType {
        self.item_dtype
    }

    pub fn to_inner_user(&self, raw: &RawId) -> Option<InnerId> {
        self.users.raw_to_inner.get(raw).copied()
    }

    pub fn to_inner_item(&self, raw: &RawId) -> Option<InnerId> {
        self.items.raw_to_inner.get(raw).copied()
    }

    pub fn to_raw_user(&self, inner: InnerId) -> Option<&RawId> {
        self.users.inner_to_raw.get(inner)
    }

    pub fn to_raw_item(&self, inner: InnerId) -> Option<&RawId> {
        self.items.inner_to_raw.get(inner)
    }

    pub fn knows_user(&self, raw: &RawId) -> bool {
        self.users.raw_to_inner.contains_key(raw)
    }

    pub fn knows_item(&self, raw: &RawId) -> bool {
        self.items.raw_to_inner.contains_key(raw)
    }

    /// Ratings made by a user; empty for unknown inner ids
    pub fn user_ratings(&self, inner: InnerId) -> &[(InnerId, f64)] {
        self.user_ratings
            .get(inner)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Ratings received by an item; empty for unknown inner ids
    pub fn item_ratings(&self, inner: InnerId) -> &[(InnerId, f64)] {
        self.item_ratings
            .get(inner)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn user_stats(&self, inner: InnerId) -> Option<&RatingStats> {
        self.user_stats.get(inner)
    }

    pub fn item_stats(&self, inner: InnerId) -> Option<&RatingStats> {
        self.item_stats.get(inner)
    }

    /// Every rating as (inner user, inner item, rating), grouped by user
    pub fn all_ratings(&self) -> impl Iterator<Item = (InnerId, InnerId, f64)> + '_ {
        self.user_ratings
            .iter()
            .enumerate()
            .flat_map(|(u, ratings)| ratings.iter().map(move |&(i, r)| (u, i, r)))
    }
}

/// Mean and count per group, computed in parallel
fn compute_stats(groups: &[Vec<(InnerId, f64)>]) -> Vec<RatingStats> {
    groups
        .par_iter()
        .map(|ratings| {
            let count = ratings.len() as u32;
            let mean = if count > 0 {
                ratings.iter().map(|&(_, r)| r).sum::<f64>() / count as f64
            } else {
                0.0
            };
            RatingStats { mean, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> InteractionFrame {
        InteractionFrame::new()
            .with_column("userID", Column::Int64(vec![1, 1, 2, 3, 3, 3]))
            .unwrap()
            .with_column("itemID", Column::Int64(vec![10, 20, 10, 10, 20, 30]))
            .unwrap()
            .with_column("rating", Column::Float64(vec![5.0, 3.0, 4.0, 1.0, 2.0, 3.0]))
            .unwrap()
    }

    #[test]
    fn test_build_trainset() {
        let trainset = Trainset::from_frame(
            &sample_frame(),
            "userID",
            "itemID",
            "rating",
            RatingScale::default(),
        )
        .unwrap();

        assert_eq!(trainset.n_users(), 3);
        assert_eq!(trainset.n_items(), 3);
        assert_eq!(trainset.n_ratings(), 6);
        assert!((trainset.global_mean() - 3.0).abs() < 1e-12);
        assert_eq!(trainset.user_dtype(), DType::Int64);

        // Inner ids follow first appearance
        assert_eq!(trainset.to_inner_user(&RawId::Int(1)), Some(0));
        assert_eq!(trainset.to_inner_user(&RawId::Int(3)), Some(2));
        assert_eq!(trainset.to_raw_item(2), Some(&RawId::Int(30)));
        assert!(!trainset.knows_user(&RawId::UInt(1)));
    }

    #[test]
    fn test_stats() {
        let trainset = Trainset::from_frame(
            &sample_frame(),
            "userID",
            "itemID",
            "rating",
            RatingScale::default(),
        )
        .unwrap();

        let user_one = trainset.user_stats(0).unwrap();
        assert_eq!(user_one.count, 2);
        assert!((user_one.mean - 4.0).abs() < 1e-12);

        let item_ten = trainset.item_stats(0).unwrap();
        assert_eq!(item_ten.count, 3);
        assert!((item_ten.mean - 10.0 / 3.0).abs() < 1e-12);

        assert_eq!(trainset.user_ratings(2).len(), 3);
        assert!(trainset.item_ratings(99).is_empty());
        assert_eq!(trainset.all_ratings().count(), 6);
    }

    #[test]
    fn test_rating_outside_scale() {
        let err = Trainset::from_frame(
            &sample_frame(),
            "userID",
            "itemID",
            "rating",
            RatingScale::new(2.0, 5.0),
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_half_star_scale() {
        let content = "userId,movieId,rating\n1,10,0.5\n1,20,4.5\n2,10,3.0\n";
        let frame = crate::parser::parse_delimited_str(content, b',', "ratings.csv").unwrap();

        let err = Trainset::from_frame(&frame, "userId", "movieId", "rating", RatingScale::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { ref value, .. } if value == "0.5"));

        let scale = RatingScale::try_new(0.5, 5.0).unwrap();
        let trainset = Trainset::from_frame(&frame, "userId", "movieId", "rating", scale).unwrap();
        assert_eq!(trainset.rating_scale(), scale);
        assert_eq!(trainset.n_ratings(), 3);

        assert!(RatingScale::try_new(5.0, 1.0).is_err());
        assert!(RatingScale::try_new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_missing_column() {
        let err = Trainset::from_frame(
            &sample_frame(),
            "uid",
            "itemID",
            "rating",
            RatingScale::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::ColumnNotFound { name } if name == "uid"));
    }

    #[test]
    fn test_empty_frame() {
        let frame = sample_frame().select(&["userID"]).unwrap();
        assert!(Trainset::from_frame(&frame, "userID", "userID", "rating", RatingScale::default()).is_err());

        let empty = InteractionFrame::new()
            .with_column("u", Column::Int64(vec![]))
            .unwrap()
            .with_column("i", Column::Int64(vec![]))
            .unwrap()
            .with_column("r", Column::Float64(vec![]))
            .unwrap();
        let err = Trainset::from_frame(&empty, "u", "i", "r", RatingScale::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyData(_)));
    }
}
