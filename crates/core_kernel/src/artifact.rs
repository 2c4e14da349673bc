//! Persisted artifacts
//!
//! Transform steps, the imputation dictionary and the model are JSON files
//! referenced from configuration by paths relative to a fixed root.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading an artifact file
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to deserialize {}: {message}", .path.display())]
    Deserialization { path: PathBuf, message: String },

    #[error("Unsupported format version {found} in {} (expected {expected})", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl ArtifactError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound { .. })
    }

    pub fn deserialization(path: &Path, message: impl ToString) -> Self {
        ArtifactError::Deserialization {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Directory that relative artifact paths are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRoot(PathBuf);

impl ArtifactRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Joins a relative path onto the root; absolute paths pass through
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.0.join(path)
        }
    }
}

impl Default for ArtifactRoot {
    fn default() -> Self {
        Self(PathBuf::from("."))
    }
}

/// Reads and deserializes a JSON artifact
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ArtifactError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|e| ArtifactError::deserialization(path, e))
}

/// Fails with `UnsupportedVersion` unless `found == expected`
pub fn check_version(path: &Path, found: u32, expected: u32) -> Result<(), ArtifactError> {
    if found == expected {
        Ok(())
    } else {
        Err(ArtifactError::UnsupportedVersion {
            path: path.to_path_buf(),
            found,
            expected,
        })
    }
}

/// Reads a JSON artifact that carries a top-level `format_version`
///
/// The version is checked before the document is deserialized into `T`, so
/// a newer layout is reported as `UnsupportedVersion` rather than as a
/// parse failure.
pub fn read_versioned_json<T: DeserializeOwned>(path: &Path, expected: u32) -> Result<T, ArtifactError> {
    let raw: serde_json::Value = read_json(path)?;

    let found = raw
        .get("format_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| ArtifactError::deserialization(path, "missing field `format_version`"))?;
    check_version(path, u32::try_from(found).unwrap_or(u32::MAX), expected)?;

    serde_json::from_value(raw).map_err(|e| ArtifactError::deserialization(path, e))
}
