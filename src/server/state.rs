//! Application state management

use crate::config::ModelPredictionConfig;
use crate::inference::Predictor;
use tokio::sync::RwLock;
use tracing::info;

use super::error::{Result, ServerError};

/// Application state shared across handlers
pub struct AppState {
    pub artifacts: ModelPredictionConfig,
    predictor: RwLock<Option<Predictor>>,
}

impl AppState {
    pub fn new(artifacts: ModelPredictionConfig) -> Self {
        Self {
            artifacts,
            predictor: RwLock::new(None),
        }
    }

    /// Start with an already loaded predictor.
    pub fn with_predictor(artifacts: ModelPredictionConfig, predictor: Predictor) -> Self {
        Self {
            artifacts,
            predictor: RwLock::new(Some(predictor)),
        }
    }

    /// Cached predictor, loading it on first use. A failed load is not cached
    /// so artifacts deployed later are picked up.
    pub async fn predictor(&self) -> Result<Predictor> {
        if let Some(predictor) = self.predictor.read().await.as_ref() {
            return Ok(predictor.clone());
        }

        let mut slot = self.predictor.write().await;
        if let Some(predictor) = slot.as_ref() {
            return Ok(predictor.clone());
        }
        let artifacts = self.artifacts.clone();
        let predictor = tokio::task::spawn_blocking(move || Predictor::load(&artifacts))
            .await
            .map_err(|e| ServerError::Internal(format!("artifact load task failed: {}", e)))?
            .map_err(ServerError::from_load)?;
        info!("Predictor cached for serving");
        *slot = Some(predictor.clone());
        Ok(predictor)
    }

    pub async fn is_loaded(&self) -> bool {
        self.predictor.read().await.is_some()
    }
}
