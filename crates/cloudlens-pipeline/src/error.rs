//! Per-step processing errors and terminal outcomes.

use cloudlens_moderation::ClassifierError;
use cloudlens_processing::TransformError;
use cloudlens_storage::StorageError;
use thiserror::Error;

/// A failure while processing one intake object. Each step has its own
/// variant so tests and log queries can tell failure modes apart.
///
/// For every variant except `Cleanup` the intake object is still in place,
/// so redelivery retries the whole record. `Cleanup` means the destination
/// write succeeded but the intake delete did not; redelivery overwrites the
/// destination idempotently and retries the delete.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to fetch intake object: {0}")]
    Fetch(#[source] StorageError),

    #[error("Unrecognized action prefix: {0}")]
    UnknownAction(String),

    #[error("Content classification failed: {0}")]
    Classify(#[source] ClassifierError),

    #[error("Image transform failed: {0}")]
    Transform(#[source] TransformError),

    #[error("Quarantine write failed: {0}")]
    QuarantineWrite(#[source] StorageError),

    #[error("Output write failed: {0}")]
    OutputWrite(#[source] StorageError),

    #[error("Intake cleanup failed: {0}")]
    Cleanup(#[source] StorageError),
}

/// Terminal state for one intake object.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Flagged unsafe; original bytes preserved in quarantine, intake
    /// deleted, nothing transformed.
    Quarantined { output_key: String },
    /// Passed the gate; derived artifact written, intake deleted.
    Transformed { output_key: String },
    /// Processing stopped; see the error for which step failed.
    Failed { error: ProcessError },
}
