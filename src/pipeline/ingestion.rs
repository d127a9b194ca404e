//! Raw dataset availability check

use super::Stage;
use crate::config::DataIngestionConfig;
use crate::error::{PipelineError, Result, StageContext};
use std::path::PathBuf;
use tracing::{info, warn};

/// Confirm the raw dataset is present locally and return its path.
///
/// Fetching from the UCI repository is not performed here; the file at
/// `external_path` must already exist.
pub fn check_raw_dataset(config: &DataIngestionConfig) -> Result<PathBuf> {
    let path = &config.external_path;

    if !path.is_file() {
        return Err::<PathBuf, _>(PipelineError::ConfigError(format!(
            "raw dataset for UCI id {} not found at {}; download it and place it there",
            config.uci_dataset_id,
            path.display()
        )))
        .in_stage(Stage::Ingestion.name());
    }

    if config.download {
        warn!(
            uci_dataset_id = config.uci_dataset_id,
            path = %path.display(),
            "Remote download is not supported, using the local copy"
        );
    } else {
        info!(path = %path.display(), "The raw dataset already exists. Skipping download");
    }

    Ok(path.clone())
}
