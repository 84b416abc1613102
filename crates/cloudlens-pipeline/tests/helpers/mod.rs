//! In-memory test doubles for the pipeline's collaborators.

use async_trait::async_trait;
use cloudlens_core::ModerationLabel;
use cloudlens_moderation::{Classifier, ClassifierError, ClassifierResult};
use cloudlens_storage::{ObjectStore, StorageError, StorageResult, StoredObject};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared, ordered log of storage and classifier operations, for asserting
/// that the gate runs strictly before any destination write.
pub type OpLog = Arc<Mutex<Vec<String>>>;

pub fn new_op_log() -> OpLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// In-memory object store standing in for one bucket.
pub struct MemoryStore {
    name: &'static str,
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    ops: OpLog,
}

impl MemoryStore {
    pub fn new(name: &'static str, ops: OpLog) -> Arc<Self> {
        Arc::new(Self {
            name,
            objects: Mutex::new(HashMap::new()),
            fail_gets: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            ops,
        })
    }

    pub fn set_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &[(&str, &str)],
    ) {
        let metadata = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata,
            },
        );
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    fn log(&self, op: &str, key: &str) {
        self.ops
            .lock()
            .unwrap()
            .push(format!("{}:{}:{}", op, self.name, key));
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<StoredObject> {
        self.log("get", key);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StorageError::DownloadFailed("injected get failure".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.log("put", key);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected put failure".to_string()));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.log("delete", key);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected delete failure".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Classifier stub returning a fixed label list.
pub struct StubClassifier {
    labels: Vec<ModerationLabel>,
    fail: bool,
    calls: AtomicUsize,
    ops: OpLog,
}

impl StubClassifier {
    pub fn safe(ops: OpLog) -> Arc<Self> {
        Self::with_labels(Vec::new(), ops)
    }

    pub fn with_labels(labels: Vec<ModerationLabel>, ops: OpLog) -> Arc<Self> {
        Arc::new(Self {
            labels,
            fail: false,
            calls: AtomicUsize::new(0),
            ops,
        })
    }

    pub fn failing(ops: OpLog) -> Arc<Self> {
        Arc::new(Self {
            labels: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            ops,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn label(name: &str, confidence: f32) -> ModerationLabel {
    ModerationLabel {
        name: name.to_string(),
        confidence,
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn detect_labels(
        &self,
        _image: &[u8],
        _min_confidence: f32,
    ) -> ClassifierResult<Vec<ModerationLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ops.lock().unwrap().push("classify".to_string());
        if self.fail {
            return Err(ClassifierError::RequestFailed(
                "injected classifier failure".to_string(),
            ));
        }
        Ok(self.labels.clone())
    }
}

/// Encoded PNG fixture.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([90, 140, 60, 255]),
    ));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}
