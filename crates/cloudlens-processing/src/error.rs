//! Transform error types.

use thiserror::Error;

/// Errors from the transform engine. `Decode` covers corrupt or unsupported
/// input; both variants fail the object without touching storage.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Text rendering failed: {0}")]
    TextRender(String),
}
