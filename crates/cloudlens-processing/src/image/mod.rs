//! Image processing module
//!
//! - Decode/encode helpers with the output-format policy (encode)
//! - Bounding-size thumbnails (thumbnail)
//! - Diagonal text watermarks (watermark)

pub mod encode;
pub mod thumbnail;
pub mod watermark;

pub use thumbnail::Thumbnail;
pub use watermark::Watermark;
