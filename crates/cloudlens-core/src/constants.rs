//! Policy constants shared across the pipeline.

/// Minimum confidence (0-100) for a moderation label to count against an
/// image. Fixed policy, not configurable per request.
pub const MIN_CONFIDENCE: f32 = 80.0;

/// Watermark text used when the uploader supplied none.
pub const DEFAULT_WATERMARK_TEXT: &str = "CloudLens";

/// Thumbnail bounding size used when the uploader supplied none or an
/// unparseable value.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 300;

/// Smallest accepted thumbnail bounding size; smaller requests are clamped.
pub const MIN_THUMBNAIL_SIZE: u32 = 50;

/// Largest accepted thumbnail bounding size; larger requests are clamped.
pub const MAX_THUMBNAIL_SIZE: u32 = 1000;

/// JPEG quality for re-encoded output.
pub const JPEG_QUALITY: u8 = 95;

/// Content type assumed when the object store reports none.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Object metadata key carrying the uploader's watermark text.
pub const CUSTOM_TEXT_METADATA_KEY: &str = "custom-text";

/// Object metadata key carrying the uploader's thumbnail size.
pub const CUSTOM_SIZE_METADATA_KEY: &str = "custom-size";
