//! Integration test: HTTP prediction surface

use axum::body::Body;
use axum::http::{Request, StatusCode};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use winequality::artifact::Artifact;
use winequality::config::{ElasticNetParams, ModelPredictionConfig};
use winequality::pipeline::fit_model;
use winequality::preprocessing::{build_preprocessor, FeaturePartition};
use winequality::server::{create_router, AppState};

const NUMERIC: [&str; 11] = [
    "fixed_acidity",
    "volatile_acidity",
    "citric_acid",
    "residual_sugar",
    "chlorides",
    "free_sulfur_dioxide",
    "total_sulfur_dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

fn artifacts_in(dir: &Path) -> ModelPredictionConfig {
    ModelPredictionConfig {
        preprocessor_path: dir.join("models").join("preprocessor.bin"),
        model_path: dir.join("models").join("elasticnet.bin"),
    }
}

/// Fit a small preprocessor and model and write both to `dir`.
fn write_artifacts(dir: &Path) -> ModelPredictionConfig {
    let n = 40;
    let mut columns: Vec<Column> = NUMERIC
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let freq = 0.29 + 0.13 * j as f64;
            let values: Vec<f64> = (0..n).map(|i| 1.0 + ((i as f64) * freq).sin()).collect();
            Column::new((*name).into(), values)
        })
        .collect();
    let color: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "red" } else { "white" }).collect();
    columns.push(Column::new("color".into(), color));
    let df = DataFrame::new(columns).unwrap();

    let partition = FeaturePartition::new(
        NUMERIC.iter().map(|s| s.to_string()).collect(),
        vec!["color".to_string()],
    );
    let (preprocessor, x) = build_preprocessor(&partition).fit_transform(&df).unwrap();
    let y = ndarray::Array1::from_shape_fn(n, |i| 5.0 + x[[i, 10]] - 0.5 * x[[i, 1]]);
    let train = ndarray::concatenate(
        ndarray::Axis(1),
        &[x.view(), y.view().insert_axis(ndarray::Axis(1))],
    )
    .unwrap();
    let model = fit_model(&train, &ElasticNetParams::new(0.001, 0.5, 42)).unwrap();

    let config = artifacts_in(dir);
    preprocessor.save(&config.preprocessor_path).unwrap();
    model.save(&config.model_path).unwrap();
    config
}

fn form() -> serde_json::Value {
    serde_json::json!({
        "fixed_acidity": 7.4,
        "volatile_acidity": 0.7,
        "citric_acid": 0.0,
        "residual_sugar": 1.9,
        "chlorides": 0.076,
        "free_sulfur_dioxide": 11.0,
        "total_sulfur_dioxide": 34.0,
        "density": 0.9978,
        "pH": 3.51,
        "sulphates": 0.56,
        "alcohol": 9.4,
        "color": "white"
    })
}

fn post_json(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(artifacts_in(dir.path()))));
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_loaded"], false);
}

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn test_predict_returns_quality_and_score() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(write_artifacts(dir.path())));
    let app = create_router(state.clone());

    let response = app.oneshot(post_json(form().to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let score = json["score"].as_f64().unwrap();
    assert_eq!(json["quality"].as_i64().unwrap(), score.round() as i64);
    assert!(state.is_loaded().await);
}

#[tokio::test]
async fn test_repeated_predictions_match() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(write_artifacts(dir.path()))));

    let first = json_body(app.clone().oneshot(post_json(form().to_string())).await.unwrap()).await;
    let second = json_body(app.oneshot(post_json(form().to_string())).await.unwrap()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_artifacts_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(artifacts_in(dir.path()))));

    let response = app.oneshot(post_json(form().to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("cannot predict: missing artifact"));
}

#[tokio::test]
async fn test_corrupt_artifact_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path());
    std::fs::write(&config.model_path, b"not an artifact").unwrap();
    let app = create_router(Arc::new(AppState::new(config)));

    let response = app.oneshot(post_json(form().to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_predict_with_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(write_artifacts(dir.path()))));

    let response = app.oneshot(post_json("not valid json".to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_with_missing_field() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(write_artifacts(dir.path()))));

    let mut body = form();
    body.as_object_mut().unwrap().remove("alcohol");
    let response = app.oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_without_required_color() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(write_artifacts(dir.path()))));

    let mut body = form();
    body.as_object_mut().unwrap().remove("color");
    let response = app.oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["message"].as_str().unwrap().contains("color"));
}

#[tokio::test]
async fn test_predict_out_of_range_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(write_artifacts(dir.path()))));

    let mut body = form();
    body["chlorides"] = serde_json::json!(1e308);
    let response = app.clone().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("cannot predict"));
    assert!(message.contains("chlorides"));

    body["chlorides"] = serde_json::json!(-5.0);
    let response = app.oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(Arc::new(AppState::new(artifacts_in(dir.path()))));
    let response = app
        .oneshot(Request::builder().uri("/api/train").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
