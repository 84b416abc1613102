//! AWS Rekognition content moderation backend
//!
//! Sends image bytes to `DetectModerationLabels` and maps the detections
//! into domain labels.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client as RekognitionClient;
use cloudlens_core::ModerationLabel;

use crate::traits::{Classifier, ClassifierError, ClassifierResult};

/// AWS Rekognition classifier implementation
#[derive(Clone)]
pub struct RekognitionClassifier {
    client: RekognitionClient,
}

impl RekognitionClassifier {
    /// Create a Rekognition client for the given region.
    pub async fn new(region: Option<String>) -> ClassifierResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Ok(Self {
            client: RekognitionClient::new(&config),
        })
    }

    pub fn from_client(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Classifier for RekognitionClassifier {
    async fn detect_labels(
        &self,
        image: &[u8],
        min_confidence: f32,
    ) -> ClassifierResult<Vec<ModerationLabel>> {
        let start = std::time::Instant::now();

        // Bytes variant: the image is already in memory, no S3 round trip
        let rekognition_image = Image::builder().bytes(Blob::new(image)).build();

        let response = self
            .client
            .detect_moderation_labels()
            .image(rekognition_image)
            .min_confidence(min_confidence)
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        let labels: Vec<ModerationLabel> = response
            .moderation_labels()
            .iter()
            .map(|label| ModerationLabel {
                name: label.name().unwrap_or("Unknown").to_string(),
                confidence: label.confidence().unwrap_or(0.0),
            })
            .collect();

        tracing::info!(
            image_size = image.len(),
            label_count = labels.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Moderation labels detected"
        );

        Ok(labels)
    }
}
