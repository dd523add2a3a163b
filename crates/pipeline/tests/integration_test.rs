//! Integration tests for the prediction adapters.
//!
//! A `MeanBaseline` is fitted on a small ratings table (5 users, 4 items,
//! 12 ratings) and the adapters' output is checked against direct
//! point predictions from the same model.

use data_loader::{
    Column, DType, DataLoadError, InteractionFrame, RatingScale, RawId, Trainset,
};
use pipeline::{
    ColumnConfig, compute_ranking_predictions, compute_rating_predictions, trainset_to_frame,
};
use scoring::{Fit, MeanBaseline, ScoringModel};
use std::collections::HashSet;

const TOL: f64 = 0.001;

fn rating_true() -> InteractionFrame {
    InteractionFrame::new()
        .with_column(
            "userID",
            Column::Int64(vec![1, 1, 1, 2, 2, 3, 3, 3, 4, 4, 5, 5]),
        )
        .unwrap()
        .with_column(
            "itemID",
            Column::Int64(vec![1, 2, 3, 1, 4, 2, 3, 4, 1, 3, 2, 4]),
        )
        .unwrap()
        .with_column(
            "rating",
            Column::Float64(vec![5.0, 4.0, 3.0, 4.0, 2.0, 5.0, 4.0, 1.0, 3.0, 2.0, 4.0, 5.0]),
        )
        .unwrap()
}

fn fitted_model(data: &InteractionFrame) -> MeanBaseline {
    let trainset = Trainset::from_frame(data, "userID", "itemID", "rating", RatingScale::default())
        .unwrap();
    let mut model = MeanBaseline::new().with_damping(1.0).unwrap();
    model.fit(&trainset).unwrap();
    model
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOL * b.abs().max(f64::EPSILON)
}

/// Prediction stored in `preds` for one (user, item) pair
fn prediction_for(
    preds: &InteractionFrame,
    columns: &ColumnConfig,
    user: &RawId,
    item: &RawId,
) -> Option<f64> {
    let pairs = preds.pairs(&columns.user_col, &columns.item_col).unwrap();
    let values = preds.floats(&columns.prediction_col).unwrap();
    pairs
        .iter()
        .position(|(u, i)| u == user && i == item)
        .map(|row| values[row])
}

fn column_set(frame: &InteractionFrame) -> HashSet<&str> {
    frame.column_names().into_iter().collect()
}

#[test]
fn test_compute_rating_predictions() {
    let data = rating_true();
    let model = fitted_model(&data);

    let columns = ColumnConfig::default();
    let preds = compute_rating_predictions(&model, &data, &columns).unwrap();
    assert_eq!(column_set(&preds), HashSet::from(["userID", "itemID", "prediction"]));
    assert_eq!(preds.dtype("userID").unwrap(), data.dtype("userID").unwrap());
    assert_eq!(preds.dtype("itemID").unwrap(), data.dtype("itemID").unwrap());
    assert_eq!(preds.num_rows(), data.num_rows());

    let (user, item) = data.pairs("userID", "itemID").unwrap()[0].clone();
    let stored = prediction_for(&preds, &columns, &user, &item).unwrap();
    assert!(approx_eq(stored, model.predict(&user, &item).estimate));

    let renamed = data
        .clone()
        .rename(&[("userID", "uid"), ("itemID", "iid")])
        .unwrap();
    let columns = ColumnConfig::default()
        .with_user_col("uid")
        .with_item_col("iid")
        .with_prediction_col("pred");
    let preds = compute_rating_predictions(&model, &renamed, &columns).unwrap();
    assert_eq!(column_set(&preds), HashSet::from(["uid", "iid", "pred"]));
    assert_eq!(preds.dtype("uid").unwrap(), data.dtype("userID").unwrap());
    assert_eq!(preds.dtype("iid").unwrap(), data.dtype("itemID").unwrap());

    let (user, item) = data.pairs("userID", "itemID").unwrap()[1].clone();
    let stored = prediction_for(&preds, &columns, &user, &item).unwrap();
    assert!(approx_eq(stored, model.predict(&user, &item).estimate));
}

#[test]
fn test_rating_predictions_match_model_for_every_row() {
    let data = rating_true();
    let model = fitted_model(&data);
    let preds = compute_rating_predictions(&model, &data, &ColumnConfig::default()).unwrap();

    let pairs = preds.pairs("userID", "itemID").unwrap();
    let values = preds.floats("prediction").unwrap();
    assert_eq!(pairs, data.pairs("userID", "itemID").unwrap());
    for ((user, item), value) in pairs.iter().zip(values) {
        assert!(approx_eq(value, model.predict(user, item).estimate));
    }
}

#[test]
fn test_renaming_columns_keeps_values() {
    let data = rating_true();
    let model = fitted_model(&data);

    let default_preds = compute_rating_predictions(&model, &data, &ColumnConfig::default()).unwrap();
    let renamed = data
        .clone()
        .rename(&[("userID", "uid"), ("itemID", "iid"), ("rating", "r")])
        .unwrap();
    let columns = ColumnConfig::default()
        .with_user_col("uid")
        .with_item_col("iid")
        .with_rating_col("r")
        .with_prediction_col("pred");
    let renamed_preds = compute_rating_predictions(&model, &renamed, &columns).unwrap();

    assert_eq!(
        default_preds.floats("prediction").unwrap(),
        renamed_preds.floats("pred").unwrap()
    );
}

#[test]
fn test_compute_ranking_predictions() {
    let data = rating_true();
    let n_users = data.unique_ids("userID").unwrap().len();
    let n_items = data.unique_ids("itemID").unwrap().len();
    assert_eq!((n_users, n_items), (5, 4));
    let model = fitted_model(&data);
    let observed: HashSet<(RawId, RawId)> =
        data.pairs("userID", "itemID").unwrap().into_iter().collect();

    // Default: already seen pairs are left out
    let columns = ColumnConfig::default();
    let preds = compute_ranking_predictions(&model, &data, &columns, false).unwrap();
    assert_eq!(column_set(&preds), HashSet::from(["userID", "itemID", "prediction"]));
    assert_eq!(preds.dtype("userID").unwrap(), data.dtype("userID").unwrap());
    assert_eq!(preds.dtype("itemID").unwrap(), data.dtype("itemID").unwrap());

    let (user, item) = preds.pairs("userID", "itemID").unwrap()[0].clone();
    let stored = prediction_for(&preds, &columns, &user, &item).unwrap();
    assert!(approx_eq(stored, model.predict(&user, &item).estimate));

    let predicted: Vec<(RawId, RawId)> = preds.pairs("userID", "itemID").unwrap();
    assert_eq!(predicted.iter().filter(|p| observed.contains(*p)).count(), 0);
    assert_eq!(preds.num_rows(), n_users * n_items - data.num_rows());
    assert_eq!(preds.num_rows(), 8);

    // recommend_seen: the full cross product
    let renamed = data
        .clone()
        .rename(&[("userID", "uid"), ("itemID", "iid"), ("rating", "r")])
        .unwrap();
    let columns = ColumnConfig::default()
        .with_user_col("uid")
        .with_item_col("iid")
        .with_rating_col("r")
        .with_prediction_col("pred");
    let preds = compute_ranking_predictions(&model, &renamed, &columns, true).unwrap();
    assert_eq!(column_set(&preds), HashSet::from(["uid", "iid", "pred"]));
    assert_eq!(preds.dtype("uid").unwrap(), data.dtype("userID").unwrap());
    assert_eq!(preds.dtype("iid").unwrap(), data.dtype("itemID").unwrap());

    let (user, item) = preds.pairs("uid", "iid").unwrap()[1].clone();
    let stored = prediction_for(&preds, &columns, &user, &item).unwrap();
    assert!(approx_eq(stored, model.predict(&user, &item).estimate));

    let predicted: HashSet<(RawId, RawId)> =
        preds.pairs("uid", "iid").unwrap().into_iter().collect();
    assert_eq!(observed.intersection(&predicted).count(), data.num_rows());
    assert_eq!(preds.num_rows(), n_users * n_items);
    assert_eq!(preds.num_rows(), 20);
}

#[test]
fn test_string_identifiers_keep_their_dtype() {
    let data = InteractionFrame::new()
        .with_column("userID", Column::Utf8(vec!["u1".into(), "u2".into()]))
        .unwrap()
        .with_column("itemID", Column::UInt32(vec![100, 200]))
        .unwrap()
        .with_column("rating", Column::Float64(vec![4.0, 2.0]))
        .unwrap();
    let model = fitted_model(&data);

    let preds = compute_ranking_predictions(&model, &data, &ColumnConfig::default(), false).unwrap();
    assert_eq!(preds.num_rows(), 2);
    assert_eq!(preds.dtype("userID").unwrap(), DType::Utf8);
    assert_eq!(preds.dtype("itemID").unwrap(), DType::UInt32);
}

#[test]
fn test_missing_columns_propagate() {
    let data = rating_true();
    let model = fitted_model(&data);
    let columns = ColumnConfig::default().with_user_col("uid");

    let err = compute_rating_predictions(&model, &data, &columns).unwrap_err();
    assert!(matches!(err, DataLoadError::ColumnNotFound { ref name } if name == "uid"));

    let err = compute_ranking_predictions(&model, &data, &columns, true).unwrap_err();
    assert!(matches!(err, DataLoadError::ColumnNotFound { ref name } if name == "uid"));
}

#[test]
fn test_trainset_round_trip_feeds_ranking() {
    let data = rating_true();
    let trainset = Trainset::from_frame(&data, "userID", "itemID", "rating", RatingScale::default())
        .unwrap();
    let frame = trainset_to_frame(&trainset, &ColumnConfig::default()).unwrap();
    assert_eq!(frame.num_rows(), 12);
    assert_eq!(frame.dtype("userID").unwrap(), DType::Int64);

    let model = fitted_model(&data);
    let preds = compute_ranking_predictions(&model, &frame, &ColumnConfig::default(), false).unwrap();
    assert_eq!(preds.num_rows(), 8);
}

#[test]
fn test_dyn_model() -> anyhow::Result<()> {
    let data = rating_true();
    let model: Box<dyn ScoringModel> = Box::new(fitted_model(&data));
    let preds = compute_rating_predictions(model.as_ref(), &data, &ColumnConfig::default())?;
    assert_eq!(preds.num_rows(), 12);
    Ok(())
}
