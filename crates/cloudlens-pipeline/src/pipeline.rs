//! The moderation pipeline orchestrator.
//!
//! Control flow per intake object is strictly sequential:
//! fetch → classify → branch → write destination → delete intake.
//! The intake object is deleted only after the destination write succeeded,
//! so a failed record can always be retried on redelivery.

use std::sync::Arc;

use cloudlens_core::constants::MIN_CONFIDENCE;
use cloudlens_core::{
    split_intake_key, ModerationVerdict, TransformRequest, UploadAction, UploadIntent,
};
use cloudlens_moderation::Classifier;
use cloudlens_processing::{Thumbnail, Watermark};
use cloudlens_storage::ObjectStore;

use crate::error::{PipelineOutcome, ProcessError};
use crate::event::{EventRecord, ObjectCreatedEvent};

/// Orchestrates moderation-gated transforms over the four logical buckets.
///
/// Holds no mutable state; invocations for distinct objects may run
/// concurrently or in any order.
pub struct ModerationPipeline {
    intake: Arc<dyn ObjectStore>,
    thumbnails: Arc<dyn ObjectStore>,
    watermarks: Arc<dyn ObjectStore>,
    quarantine: Arc<dyn ObjectStore>,
    classifier: Arc<dyn Classifier>,
}

impl ModerationPipeline {
    pub fn new(
        intake: Arc<dyn ObjectStore>,
        thumbnails: Arc<dyn ObjectStore>,
        watermarks: Arc<dyn ObjectStore>,
        quarantine: Arc<dyn ObjectStore>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            intake,
            thumbnails,
            watermarks,
            quarantine,
            classifier,
        }
    }

    /// Process every record in a batch independently. One record's failure
    /// never prevents processing of the others; each slot in the returned
    /// vector corresponds to the record at the same index (`None` = not our
    /// object).
    pub async fn process_batch(
        &self,
        event: &ObjectCreatedEvent,
    ) -> Vec<Option<PipelineOutcome>> {
        let mut outcomes = Vec::with_capacity(event.records.len());
        for record in &event.records {
            outcomes.push(self.process_record(record).await);
        }
        outcomes
    }

    /// Process one object-created record to its terminal outcome.
    ///
    /// Returns `None` when the key carries no action prefix: such objects
    /// are not produced by the upload gateway and are ignored without side
    /// effects.
    pub async fn process_record(&self, record: &EventRecord) -> Option<PipelineOutcome> {
        let key = record.decoded_key();

        let Some((action_prefix, object_name)) = split_intake_key(&key) else {
            tracing::debug!(bucket = %record.bucket(), key = %key, "Key has no action prefix, ignoring");
            return None;
        };

        let outcome = match self.process_object(&key, action_prefix, object_name).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(
                    key = %key,
                    error = %error,
                    "Processing failed, intake object left for redelivery"
                );
                PipelineOutcome::Failed { error }
            }
        };

        match &outcome {
            PipelineOutcome::Quarantined { output_key } => {
                tracing::warn!(key = %key, output_key = %output_key, "Object quarantined");
            }
            PipelineOutcome::Transformed { output_key } => {
                tracing::info!(key = %key, output_key = %output_key, "Object transformed");
            }
            PipelineOutcome::Failed { .. } => {}
        }

        Some(outcome)
    }

    async fn process_object(
        &self,
        key: &str,
        action_prefix: &str,
        object_name: &str,
    ) -> Result<PipelineOutcome, ProcessError> {
        let object = self.intake.get(key).await.map_err(ProcessError::Fetch)?;

        let action = UploadAction::parse(action_prefix)
            .ok_or_else(|| ProcessError::UnknownAction(action_prefix.to_string()))?;
        let intent = UploadIntent {
            object_name: object_name.to_string(),
            request: TransformRequest::resolve(action, &object.metadata),
        };

        tracing::info!(
            key = %key,
            action = %action,
            content_type = %object.content_type,
            size_bytes = object.data.len(),
            "Processing intake object"
        );

        // Mandatory gate: every object is classified before any transform,
        // and a classification error is never treated as a safe verdict.
        let labels = self
            .classifier
            .detect_labels(&object.data, MIN_CONFIDENCE)
            .await
            .map_err(ProcessError::Classify)?;
        let verdict = ModerationVerdict::from_labels(labels, MIN_CONFIDENCE);

        if verdict.is_unsafe() {
            tracing::warn!(
                key = %key,
                labels = %verdict.label_names(),
                "Unsafe content detected"
            );
            // The bytes are already in memory; quarantine them without a
            // second fetch
            self.quarantine
                .put(object_name, object.data, &object.content_type)
                .await
                .map_err(ProcessError::QuarantineWrite)?;
            self.intake
                .delete(key)
                .await
                .map_err(ProcessError::Cleanup)?;
            return Ok(PipelineOutcome::Quarantined {
                output_key: intent.object_name,
            });
        }

        let (destination, derived) = match &intent.request {
            TransformRequest::Watermark { text } => (
                &self.watermarks,
                Watermark::apply(&object.data, &object.content_type, text)
                    .map_err(ProcessError::Transform)?,
            ),
            TransformRequest::Thumbnail { size } => (
                &self.thumbnails,
                Thumbnail::create(&object.data, *size).map_err(ProcessError::Transform)?,
            ),
        };

        destination
            .put(object_name, derived, &object.content_type)
            .await
            .map_err(ProcessError::OutputWrite)?;
        self.intake
            .delete(key)
            .await
            .map_err(ProcessError::Cleanup)?;

        Ok(PipelineOutcome::Transformed {
            output_key: intent.object_name,
        })
    }
}
