//! Configuration module
//!
//! Environment-driven configuration for the processor: storage backend
//! selection, the four logical buckets, and event-queue settings.

use std::env;

use crate::storage_types::StorageBackend;

const QUEUE_WAIT_TIME_SECS: i32 = 20;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    // Logical buckets
    pub uploads_bucket: String,
    pub thumbnails_bucket: String,
    pub watermarks_bucket: String,
    pub quarantine_bucket: String,
    // Event intake
    pub queue_url: Option<String>,
    pub queue_wait_time_secs: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let config = Config {
            environment,
            storage_backend,
            aws_region: env::var("AWS_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            uploads_bucket: required_var("UPLOADS_BUCKET")?,
            thumbnails_bucket: required_var("THUMBNAILS_BUCKET")?,
            watermarks_bucket: required_var("WATERMARKS_BUCKET")?,
            quarantine_bucket: required_var("QUARANTINE_BUCKET")?,
            queue_url: env::var("QUEUE_URL").ok(),
            queue_wait_time_secs: env::var("QUEUE_WAIT_TIME_SECS")
                .unwrap_or_else(|_| QUEUE_WAIT_TIME_SECS.to_string())
                .parse()
                .unwrap_or(QUEUE_WAIT_TIME_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.aws_region.is_none() && self.s3_endpoint.is_none() {
                    return Err(anyhow::anyhow!(
                        "AWS_REGION or S3_ENDPOINT must be set for the s3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set for the local storage backend"
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn required_var(name: &str) -> Result<String, anyhow::Error> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} must be set", name))
}
