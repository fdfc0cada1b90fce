use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur during plugin manifest operations
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to decode manifest: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode manifest: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Manifest validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("No manifest file found in {}", .0.display())]
    NotFound(PathBuf),
}

impl ManifestError {
    /// The validation report, when the failure came from the validator.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            ManifestError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
