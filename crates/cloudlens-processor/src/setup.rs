//! Startup wiring: telemetry, storage handles, classifier, pipeline.

use anyhow::Context;
use std::sync::Arc;

use cloudlens_core::Config;
use cloudlens_moderation::RekognitionClassifier;
use cloudlens_pipeline::ModerationPipeline;
use cloudlens_storage::create_store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env-driven filter.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cloudlens=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the pipeline from configuration: one store handle per logical
/// bucket plus the Rekognition classifier.
pub async fn build_pipeline(config: &Config) -> Result<ModerationPipeline, anyhow::Error> {
    let intake = create_store(config, &config.uploads_bucket)
        .await
        .context("Failed to create intake store")?;
    let thumbnails = create_store(config, &config.thumbnails_bucket)
        .await
        .context("Failed to create thumbnail store")?;
    let watermarks = create_store(config, &config.watermarks_bucket)
        .await
        .context("Failed to create watermark store")?;
    let quarantine = create_store(config, &config.quarantine_bucket)
        .await
        .context("Failed to create quarantine store")?;

    let classifier = RekognitionClassifier::new(config.aws_region.clone())
        .await
        .context("Failed to create Rekognition classifier")?;

    tracing::info!(
        backend = %config.storage_backend,
        uploads = %config.uploads_bucket,
        thumbnails = %config.thumbnails_bucket,
        watermarks = %config.watermarks_bucket,
        quarantine = %config.quarantine_bucket,
        "Pipeline initialized"
    );

    Ok(ModerationPipeline::new(
        intake,
        thumbnails,
        watermarks,
        quarantine,
        Arc::new(classifier),
    ))
}
