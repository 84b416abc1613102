//! CloudLens Storage Library
//!
//! This crate provides the object store abstraction and its backends. One
//! store handle addresses one logical bucket (uploads, thumbnails,
//! watermarks, quarantine); the pipeline is handed one handle per bucket.
//!
//! Keys must not contain `..` or a leading `/`; the local backend enforces
//! this to keep keys from escaping the bucket directory.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cloudlens_core::StorageBackend;
pub use factory::create_store;
#[cfg(feature = "storage-local")]
pub use local::LocalObjectStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, StorageError, StorageResult, StoredObject};
