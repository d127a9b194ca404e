//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::inference::{PredictionForm, PredictionOutcome};

use super::error::{Result, ServerError};
use super::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.is_loaded().await,
    }))
}

/// Score one wine described by a prediction form
pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Json<PredictionForm>, JsonRejection>,
) -> Result<Json<PredictionOutcome>> {
    let Json(form) = form.map_err(|e| ServerError::BadRequest(format!("invalid input: {}", e.body_text())))?;
    form.validate()?;
    let predictor = state.predictor().await?;

    let score = predictor.predict(&form.to_raw_row())?;
    let outcome = PredictionOutcome::from_score(score);
    info!(score, quality = outcome.quality, "Prediction served");
    Ok(Json(outcome))
}
