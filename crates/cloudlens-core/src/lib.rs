//! CloudLens Core Library
//!
//! This crate provides the domain models, policy constants, and configuration
//! shared across all CloudLens components.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use models::{
    split_intake_key, ModerationLabel, ModerationVerdict, TransformRequest, UploadAction,
    UploadIntent,
};
pub use storage_types::StorageBackend;
