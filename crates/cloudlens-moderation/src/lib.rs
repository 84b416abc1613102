//! CloudLens Moderation Library
//!
//! Content-classification abstraction and the AWS Rekognition backend. The
//! pipeline calls the classifier for every intake object before any
//! transformation; there is no bypass path.

#[cfg(feature = "rekognition")]
pub mod rekognition;
pub mod traits;

#[cfg(feature = "rekognition")]
pub use rekognition::RekognitionClassifier;
pub use traits::{Classifier, ClassifierError, ClassifierResult};
