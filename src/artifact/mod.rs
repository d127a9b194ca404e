//! On-disk artifact format
//!
//! Every binary artifact (fitted preprocessor, fitted model, transformed
//! arrays, prediction vectors) is stored as a bincode-encoded [`Envelope`]
//! wrapping the bincode encoding of a plain serde record. The envelope carries
//! magic bytes, a format version, the artifact kind and a SHA-256 digest of
//! the payload, so a truncated or foreign file is rejected on load instead of
//! being decoded into garbage.
//!
//! Writes go to a sibling temporary file that is renamed into place, so a
//! reader never observes a half-written artifact.

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic bytes at the start of every artifact
pub const MAGIC: [u8; 4] = *b"WQAF";

/// Current envelope version
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Preprocessor,
    Model,
    Array,
    Predictions,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Preprocessor => "preprocessor",
            ArtifactKind::Model => "model",
            ArtifactKind::Array => "array",
            ArtifactKind::Predictions => "predictions",
        };
        f.write_str(name)
    }
}

/// Versioned, checksummed wrapper around a serialized record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub magic: [u8; 4],
    pub format_version: u32,
    pub kind: ArtifactKind,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// Hex SHA-256 of `payload`
    pub checksum: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(kind: ArtifactKind, payload: Vec<u8>) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            kind,
            created_at: chrono::Utc::now().to_rfc3339(),
            checksum: compute_sha256(&payload),
            payload,
        }
    }

    /// Check magic, version, kind and checksum.
    fn verify(&self, expected: ArtifactKind, path: &Path) -> Result<()> {
        let corrupt = |reason: String| PipelineError::CorruptArtifact {
            path: path.display().to_string(),
            reason,
        };

        if self.magic != MAGIC {
            return Err(corrupt("bad magic bytes".to_string()));
        }
        if self.format_version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if self.kind != expected {
            return Err(corrupt(format!(
                "holds a {} artifact, expected {}",
                self.kind, expected
            )));
        }
        if compute_sha256(&self.payload) != self.checksum {
            return Err(corrupt("checksum mismatch".to_string()));
        }
        Ok(())
    }
}

/// Compute SHA-256 hash of data
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// A record that can be persisted as an enveloped artifact
pub trait Artifact: Serialize + DeserializeOwned + Sized {
    const KIND: ArtifactKind;

    /// Write atomically to `path`, creating parent directories.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let payload = bincode::serialize(self)?;
        let bytes = bincode::serialize(&Envelope::new(Self::KIND, payload))?;
        write_atomic(path, &bytes)?;
        debug!(path = %path.display(), kind = %Self::KIND, bytes = bytes.len(), "Artifact saved");
        Ok(())
    }

    /// Read and verify an artifact written by [`Artifact::save`].
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_existing(path)?;
        let corrupt = |reason: String| PipelineError::CorruptArtifact {
            path: path.display().to_string(),
            reason,
        };

        let envelope: Envelope =
            bincode::deserialize(&bytes).map_err(|e| corrupt(format!("undecodable envelope: {}", e)))?;
        envelope.verify(Self::KIND, path)?;
        bincode::deserialize(&envelope.payload)
            .map_err(|e| corrupt(format!("undecodable {} payload: {}", Self::KIND, e)))
    }
}

impl Artifact for Array2<f64> {
    const KIND: ArtifactKind = ArtifactKind::Array;
}

impl Artifact for Array1<f64> {
    const KIND: ArtifactKind = ArtifactKind::Predictions;
}

/// Write `value` as pretty JSON, atomically.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(value)?;
    write_atomic(path, text.as_bytes())?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Read a JSON document written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let bytes = read_existing(path.as_ref())?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn read_existing(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PipelineError::ArtifactMissing(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        PipelineError::from(e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
