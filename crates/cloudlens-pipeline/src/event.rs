//! Object-created event model.
//!
//! Mirrors the S3 event notification shape (`Records[].s3.bucket.name`,
//! `Records[].s3.object.key`). Batches may contain unrelated or malformed
//! records; those are dropped at parse time so one bad record never aborts
//! its siblings.

use percent_encoding::percent_decode_str;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ObjectCreatedEvent {
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "Records", default)]
    records: Vec<serde_json::Value>,
}

impl ObjectCreatedEvent {
    /// Parse a notification body, keeping only records with the expected
    /// shape.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let raw: RawEvent = serde_json::from_str(body)?;
        let total = raw.records.len();

        let records: Vec<EventRecord> = raw
            .records
            .into_iter()
            .filter_map(|value| serde_json::from_value::<EventRecord>(value).ok())
            .collect();

        if records.len() < total {
            tracing::debug!(
                dropped = total - records.len(),
                kept = records.len(),
                "Dropped malformed records from event batch"
            );
        }

        Ok(Self { records })
    }
}

impl EventRecord {
    /// Construct a record directly; used by tests and local tooling.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            s3: S3Entity {
                bucket: BucketEntity {
                    name: bucket.into(),
                },
                object: ObjectEntity { key: key.into() },
            },
        }
    }

    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    /// Object key with the notification's URL encoding undone (`+` for
    /// spaces, percent escapes for the rest).
    pub fn decoded_key(&self) -> String {
        let plus_decoded = self.s3.object.key.replace('+', " ");
        percent_decode_str(&plus_decoded)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.s3.object.key.clone())
    }
}
