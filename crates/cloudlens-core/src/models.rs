//! Domain models: upload intent, moderation verdict.
//!
//! The intent attached to an intake object is fully determined by its key and
//! metadata; nothing here performs I/O or consults external state.

use std::collections::HashMap;
use std::fmt;

use crate::constants::{
    CUSTOM_SIZE_METADATA_KEY, CUSTOM_TEXT_METADATA_KEY, DEFAULT_THUMBNAIL_SIZE,
    DEFAULT_WATERMARK_TEXT,
};

/// Split an intake key into its action prefix and object name.
///
/// Keys without a `/` separator are not produced by the upload gateway and
/// are ignored by the pipeline.
pub fn split_intake_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('/')
}

/// Requested processing action, parsed from the intake key's path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    Watermark,
    Thumbnail,
}

impl UploadAction {
    /// Parse an action prefix, case-insensitively. Returns `None` for
    /// unrecognized prefixes; callers decide how to fail.
    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix.to_lowercase().as_str() {
            "watermark" => Some(UploadAction::Watermark),
            "thumbnail" => Some(UploadAction::Thumbnail),
            _ => None,
        }
    }
}

impl fmt::Display for UploadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadAction::Watermark => write!(f, "watermark"),
            UploadAction::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// An action with its per-request parameter resolved from object metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRequest {
    Watermark { text: String },
    Thumbnail { size: u32 },
}

impl TransformRequest {
    /// Resolve the request parameter for `action` from user metadata.
    ///
    /// Missing, empty, or unparseable values fall back to the fixed defaults;
    /// they are never an error.
    pub fn resolve(action: UploadAction, metadata: &HashMap<String, String>) -> Self {
        match action {
            UploadAction::Watermark => {
                let text = metadata
                    .get(CUSTOM_TEXT_METADATA_KEY)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_WATERMARK_TEXT)
                    .to_string();
                TransformRequest::Watermark { text }
            }
            UploadAction::Thumbnail => {
                let size = metadata
                    .get(CUSTOM_SIZE_METADATA_KEY)
                    .and_then(|s| s.trim().parse::<u32>().ok())
                    .filter(|size| *size > 0)
                    .unwrap_or(DEFAULT_THUMBNAIL_SIZE);
                TransformRequest::Thumbnail { size }
            }
        }
    }

    pub fn action(&self) -> UploadAction {
        match self {
            TransformRequest::Watermark { .. } => UploadAction::Watermark,
            TransformRequest::Thumbnail { .. } => UploadAction::Thumbnail,
        }
    }
}

/// The parsed intent for one intake object.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadIntent {
    /// Portion of the intake key after the action prefix; becomes the
    /// output or quarantine key.
    pub object_name: String,
    pub request: TransformRequest,
}

/// A single content-classification detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationLabel {
    pub name: String,
    /// Confidence in [0, 100].
    pub confidence: f32,
}

/// Result of classifying one image.
///
/// Labels below the confidence threshold are dropped at construction, so an
/// image is unsafe exactly when any label survives.
#[derive(Debug, Clone, Default)]
pub struct ModerationVerdict {
    labels: Vec<ModerationLabel>,
}

impl ModerationVerdict {
    pub fn from_labels(labels: Vec<ModerationLabel>, threshold: f32) -> Self {
        let labels = labels
            .into_iter()
            .filter(|label| label.confidence >= threshold)
            .collect();
        Self { labels }
    }

    pub fn is_unsafe(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn labels(&self) -> &[ModerationLabel] {
        &self.labels
    }

    /// Comma-separated label names, for log output.
    pub fn label_names(&self) -> String {
        self.labels
            .iter()
            .map(|label| label.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
