use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("model artifact missing or unreadable: {path}")]
    ArtifactMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is invalid: {reason}")]
    ArtifactInvalid { path: PathBuf, reason: String },

    #[error("unknown {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error("numeric failure: {what} is {value}")]
    NumericFailure { what: String, value: f64 },
}

impl PredictionError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PredictionError::ArtifactInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_artifact_missing(&self) -> bool {
        matches!(self, PredictionError::ArtifactMissing { .. })
    }
}
