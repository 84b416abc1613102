//! CloudLens Pipeline Library
//!
//! The moderation pipeline: consumes object-created events, enforces the
//! mandatory safety gate, and routes each intake object to exactly one of
//! quarantine, watermark output, or thumbnail output, deleting the intake
//! object only after its destination write succeeded.

pub mod error;
pub mod event;
pub mod pipeline;

pub use error::{PipelineOutcome, ProcessError};
pub use event::{EventRecord, ObjectCreatedEvent};
pub use pipeline::ModerationPipeline;
