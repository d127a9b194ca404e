//! Raw dataset column validation

use super::Stage;
use crate::config::{DataValidationConfig, Schema};
use crate::data::load_csv;
use crate::error::{PipelineError, Result, StageContext};
use polars::prelude::DataFrame;
use tracing::{info, warn};

/// Compare the frame's column names, as a set, with `required`.
pub fn validate_columns(df: &DataFrame, required: &[String]) -> Result<()> {
    let mut expected: Vec<&str> = required.iter().map(String::as_str).collect();
    let mut actual: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    expected.sort_unstable();
    actual.sort_unstable();

    if expected == actual {
        info!(columns = expected.len(), "Data column validation successful");
        return Ok(());
    }

    warn!("Data column validation unsuccessful");
    let message = if expected.len() == actual.len() {
        warn!(required = ?expected, found = ?actual, "Number of columns is same. Check column names");
        format!(
            "column names differ: required {:?}, found {:?}",
            expected, actual
        )
    } else {
        warn!(
            required = expected.len(),
            found = actual.len(),
            "Number of columns mismatch"
        );
        format!(
            "column count differs: required {}, found {}",
            expected.len(),
            actual.len()
        )
    };
    Err(PipelineError::ValidationError(message))
}

/// Read the raw dataset and check it against the external data schema.
pub fn validate_raw_dataset(config: &DataValidationConfig, schema: &Schema) -> Result<()> {
    const STAGE: &str = Stage::Validation.name();
    let df = load_csv(&config.external_path).in_stage(STAGE)?;
    validate_columns(&df, schema.external_columns()).in_stage(STAGE)
}
