//! Classification abstraction trait.

use async_trait::async_trait;
use cloudlens_core::ModerationLabel;
use thiserror::Error;

/// Classification errors. A classification failure is never treated as a
/// safe verdict; callers must fail the object instead.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classification request failed: {0}")]
    RequestFailed(String),

    #[error("Classifier configuration error: {0}")]
    ConfigError(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Content classification abstraction.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Detect unsafe-content labels in the given image bytes.
    ///
    /// `min_confidence` is a hint to the service; callers apply the
    /// authoritative threshold when building a verdict.
    async fn detect_labels(
        &self,
        image: &[u8],
        min_confidence: f32,
    ) -> ClassifierResult<Vec<ModerationLabel>>;
}
