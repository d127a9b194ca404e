//! Integration test: Preprocessing pipeline end-to-end

use winequality::artifact::Artifact;
use winequality::config::{AppConfig, DEFAULT_CONFIG_DIR};
use winequality::error::PipelineError;
use winequality::preprocessing::{
    build_preprocessor, classify_features, FeaturePartition, FillValue, FittedPreprocessor,
};
use polars::prelude::*;
use std::path::Path;

fn partition() -> FeaturePartition {
    FeaturePartition::new(
        vec!["alcohol".to_string(), "density".to_string()],
        vec!["color".to_string()],
    )
}

fn train_df() -> DataFrame {
    df!(
        "alcohol" => &[Some(9.0), Some(10.0), None, Some(12.0), Some(14.0)],
        "density" => &[0.99, 0.995, 0.997, 0.998, 1.0],
        "color" => &[Some("white"), Some("red"), Some("red"), None, Some("white")],
        "quality" => &[5.0, 6.0, 5.0, 7.0, 6.0]
    )
    .unwrap()
}

fn test_df() -> DataFrame {
    df!(
        "alcohol" => &[100.0, 8.0],
        "density" => &[5.0, 0.99],
        "color" => &["white", "red"]
    )
    .unwrap()
}

#[test]
fn test_fit_transform_shape_and_names() {
    let (fitted, x) = build_preprocessor(&partition()).fit_transform(&train_df()).unwrap();

    assert_eq!(x.dim(), (5, 4));
    assert_eq!(
        fitted.feature_names_out(),
        &["alcohol", "density", "color_red", "color_white"]
    );
    assert_eq!(fitted.n_features_in(), 3);
    assert_eq!(fitted.n_samples_seen(), 5);
    assert!(x.iter().all(|v| v.is_finite()));
}

#[test]
fn test_transform_is_idempotent() {
    let (fitted, _) = build_preprocessor(&partition()).fit_transform(&train_df()).unwrap();
    let first = fitted.transform(&test_df()).unwrap();
    let second = fitted.transform(&test_df()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_statistics_come_from_training_rows_only() {
    let transformer = build_preprocessor(&partition());
    let fitted = transformer.fit(&train_df()).unwrap();
    let before = fitted.numeric_scaler().unwrap().params("alcohol").copied().unwrap();

    // Transforming extreme test rows must leave the fitted statistics alone.
    let _ = fitted.transform(&test_df()).unwrap();
    let after = fitted.numeric_scaler().unwrap().params("alcohol").copied().unwrap();
    assert_eq!(before, after);

    // Median of [9, 10, 12, 14] fills the gap, then the mean is taken.
    assert_eq!(
        fitted.numeric_imputer().unwrap().fill_value("alcohol"),
        Some(&FillValue::Number(11.0))
    );
    assert!((before.mean - 11.2).abs() < 1e-12);
}

#[test]
fn test_most_frequent_tie_goes_to_smallest() {
    let fitted = build_preprocessor(&partition()).fit(&train_df()).unwrap();
    // "red" and "white" both appear twice.
    assert_eq!(
        fitted.categorical_imputer().unwrap().fill_value("color"),
        Some(&FillValue::Text("red".to_string()))
    );
    assert_eq!(
        fitted.encoder().unwrap().categories("color"),
        Some(&["red".to_string(), "white".to_string()][..])
    );
}

#[test]
fn test_unknown_category_encodes_as_zeros() {
    let fitted = build_preprocessor(&partition()).fit(&train_df()).unwrap();
    let row = df!(
        "alcohol" => &[10.0],
        "density" => &[0.995],
        "color" => &["rose"]
    )
    .unwrap();

    let x = fitted.transform(&row).unwrap();
    assert_eq!(x[[0, 2]], 0.0);
    assert_eq!(x[[0, 3]], 0.0);
}

#[test]
fn test_missing_feature_column_is_reported() {
    let fitted = build_preprocessor(&partition()).fit(&train_df()).unwrap();
    let row = df!("alcohol" => &[10.0], "color" => &["red"]).unwrap();

    let err = fitted.transform(&row).unwrap_err();
    assert!(matches!(err, PipelineError::FeatureNotFound(ref c) if c == "density"));
}

#[test]
fn test_text_in_numeric_column_rejected() {
    let fitted = build_preprocessor(&partition()).fit(&train_df()).unwrap();
    let row = df!(
        "alcohol" => &["strong"],
        "density" => &[0.995],
        "color" => &["red"]
    )
    .unwrap();

    let err = fitted.transform(&row).unwrap_err();
    assert!(matches!(err, PipelineError::ValidationError(_)));
}

#[test]
fn test_saved_preprocessor_replays_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("preprocessor.bin");

    let fitted = build_preprocessor(&partition()).fit(&train_df()).unwrap();
    fitted.save(&path).unwrap();
    let loaded = FittedPreprocessor::load(&path).unwrap();

    assert_eq!(loaded.feature_names_out(), fitted.feature_names_out());
    assert_eq!(
        loaded.transform(&test_df()).unwrap(),
        fitted.transform(&test_df()).unwrap()
    );
}

#[test]
fn test_shipped_schema_partition() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_DIR);
    let config = AppConfig::load(dir).unwrap();
    let partition = classify_features(&config.schema);

    assert_eq!(partition.numeric_features.len(), 11);
    assert_eq!(partition.categorical_features, vec!["color".to_string()]);
    assert!(!partition.numeric_features.contains(&"quality".to_string()));
}
