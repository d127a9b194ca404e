//! CSV reading and writing

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// Read a headered CSV file into a frame.
///
/// The whole file is scanned for schema inference so a column that only turns
/// fractional late in the file is still read as float.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::ArtifactMissing(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "CSV loaded");
    Ok(df)
}

/// Write a frame as a headered CSV file, creating parent directories.
pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    debug!(path = %path.display(), rows = df.height(), "CSV written");
    Ok(())
}
