//! Error types for desglose-core.

use thiserror::Error;

use crate::upload::{UploadId, UploadStatus};

/// Structural errors returned by batch mutations.
///
/// These never interrupt a running batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No item with this id is in the batch.
    #[error("{0} is not in the batch")]
    NotFound(UploadId),
    /// Only pending items can be removed.
    #[error("{id} is {status}; only pending uploads can be removed")]
    NotPending { id: UploadId, status: UploadStatus },
    /// The batch cannot be discarded while it is being processed.
    #[error("a batch run is in progress")]
    BatchRunning,
}

/// Failure of a single processing step.
///
/// Recorded on the item as its error message; it is an expected outcome,
/// not a fault of the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProcessError {
    message: String,
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid simulation settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("failure rate must be within 0.0..=1.0, got {0}")]
    InvalidFailureRate(f64),
    #[error("progress step must be within 1..=100, got {0}")]
    InvalidStep(u8),
}
