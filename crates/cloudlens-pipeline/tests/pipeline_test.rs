mod helpers;

use std::sync::Arc;

use cloudlens_pipeline::{
    EventRecord, ModerationPipeline, ObjectCreatedEvent, PipelineOutcome, ProcessError,
};

use helpers::{label, new_op_log, png_bytes, MemoryStore, OpLog, StubClassifier};

struct Fixture {
    intake: Arc<MemoryStore>,
    thumbnails: Arc<MemoryStore>,
    watermarks: Arc<MemoryStore>,
    quarantine: Arc<MemoryStore>,
    classifier: Arc<StubClassifier>,
    pipeline: ModerationPipeline,
    ops: OpLog,
}

fn fixture_with_classifier(
    make_classifier: impl FnOnce(OpLog) -> Arc<StubClassifier>,
) -> Fixture {
    let ops = new_op_log();
    let intake = MemoryStore::new("intake", ops.clone());
    let thumbnails = MemoryStore::new("thumbnails", ops.clone());
    let watermarks = MemoryStore::new("watermarks", ops.clone());
    let quarantine = MemoryStore::new("quarantine", ops.clone());
    let classifier = make_classifier(ops.clone());

    let pipeline = ModerationPipeline::new(
        intake.clone(),
        thumbnails.clone(),
        watermarks.clone(),
        quarantine.clone(),
        classifier.clone(),
    );

    Fixture {
        intake,
        thumbnails,
        watermarks,
        quarantine,
        classifier,
        pipeline,
        ops,
    }
}

fn safe_fixture() -> Fixture {
    fixture_with_classifier(StubClassifier::safe)
}

fn record(key: &str) -> EventRecord {
    EventRecord::new("cloudlens-uploads", key)
}

#[tokio::test]
async fn thumbnail_routes_output_and_deletes_intake() {
    let fx = safe_fixture();
    fx.intake.set_object(
        "thumbnail/abc123_photo.jpg",
        png_bytes(400, 200),
        "image/png",
        &[("custom-size", "150")],
    );

    let outcome = fx
        .pipeline
        .process_record(&record("thumbnail/abc123_photo.jpg"))
        .await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Transformed { ref output_key }) if output_key == "abc123_photo.jpg"
    ));
    assert!(fx.thumbnails.has_object("abc123_photo.jpg"));
    assert!(!fx.intake.has_object("thumbnail/abc123_photo.jpg"));

    // The derived image honors the requested bounding size
    let stored = fx.thumbnails.get_object("abc123_photo.jpg").unwrap();
    let img = image::load_from_memory(&stored.data).unwrap();
    assert!(img.width().max(img.height()) <= 150);
}

#[tokio::test]
async fn watermark_routes_output_and_preserves_content_type() {
    let fx = safe_fixture();
    fx.intake.set_object(
        "watermark/def456_beach.png",
        png_bytes(300, 300),
        "image/png",
        &[("custom-text", "Jane's Photos")],
    );

    let outcome = fx
        .pipeline
        .process_record(&record("watermark/def456_beach.png"))
        .await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Transformed { ref output_key }) if output_key == "def456_beach.png"
    ));

    let stored = fx.watermarks.get_object("def456_beach.png").unwrap();
    assert_eq!(stored.content_type, "image/png");
    assert!(!fx.intake.has_object("watermark/def456_beach.png"));
    assert_eq!(fx.quarantine.object_count(), 0);
}

#[tokio::test]
async fn label_at_threshold_quarantines_without_transforming() {
    let fx = fixture_with_classifier(|ops| {
        StubClassifier::with_labels(vec![label("Explicit Nudity", 80.0)], ops)
    });
    let original = png_bytes(200, 200);
    fx.intake.set_object(
        "thumbnail/bad_photo.jpg",
        original.clone(),
        "image/png",
        &[],
    );

    let outcome = fx
        .pipeline
        .process_record(&record("thumbnail/bad_photo.jpg"))
        .await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Quarantined { ref output_key }) if output_key == "bad_photo.jpg"
    ));
    // Quarantine holds the untouched original; no transform ever ran
    assert_eq!(fx.quarantine.get_object("bad_photo.jpg").unwrap().data, original);
    assert_eq!(fx.thumbnails.object_count(), 0);
    assert_eq!(fx.watermarks.object_count(), 0);
    assert!(!fx.intake.has_object("thumbnail/bad_photo.jpg"));
}

#[tokio::test]
async fn label_below_threshold_proceeds() {
    let fx = fixture_with_classifier(|ops| {
        StubClassifier::with_labels(vec![label("Suggestive", 79.9)], ops)
    });
    fx.intake
        .set_object("thumbnail/ok_photo.jpg", png_bytes(200, 200), "image/png", &[]);

    let outcome = fx
        .pipeline
        .process_record(&record("thumbnail/ok_photo.jpg"))
        .await;

    assert!(matches!(outcome, Some(PipelineOutcome::Transformed { .. })));
    assert!(fx.thumbnails.has_object("ok_photo.jpg"));
    assert_eq!(fx.quarantine.object_count(), 0);
}

#[tokio::test]
async fn gate_runs_exactly_once_and_before_any_write() {
    let fx = safe_fixture();
    fx.intake.set_object(
        "watermark/gate_check.png",
        png_bytes(120, 120),
        "image/png",
        &[],
    );

    fx.pipeline
        .process_record(&record("watermark/gate_check.png"))
        .await;

    assert_eq!(fx.classifier.call_count(), 1);

    let ops = fx.ops.lock().unwrap().clone();
    let classify_at = ops.iter().position(|op| op == "classify").unwrap();
    let first_put = ops.iter().position(|op| op.starts_with("put:")).unwrap();
    assert!(
        classify_at < first_put,
        "classification must precede any destination write, got {:?}",
        ops
    );
}

#[tokio::test]
async fn classification_failure_never_falls_through_to_transform() {
    let fx = fixture_with_classifier(StubClassifier::failing);
    fx.intake
        .set_object("thumbnail/x_y.jpg", png_bytes(100, 100), "image/png", &[]);

    let outcome = fx.pipeline.process_record(&record("thumbnail/x_y.jpg")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::Classify(_)
        })
    ));
    // Intake intact, nothing written anywhere
    assert!(fx.intake.has_object("thumbnail/x_y.jpg"));
    assert_eq!(fx.thumbnails.object_count(), 0);
    assert_eq!(fx.watermarks.object_count(), 0);
    assert_eq!(fx.quarantine.object_count(), 0);
}

#[tokio::test]
async fn fetch_failure_is_retryable_and_touches_nothing() {
    let fx = safe_fixture();
    fx.intake
        .set_object("thumbnail/u_v.jpg", png_bytes(100, 100), "image/png", &[]);
    fx.intake.fail_gets();

    let outcome = fx.pipeline.process_record(&record("thumbnail/u_v.jpg")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::Fetch(_)
        })
    ));
    assert!(fx.intake.has_object("thumbnail/u_v.jpg"));
    assert_eq!(fx.classifier.call_count(), 0);
    assert_eq!(fx.thumbnails.object_count(), 0);
}

#[tokio::test]
async fn output_write_failure_leaves_intake_intact() {
    let fx = safe_fixture();
    fx.intake
        .set_object("thumbnail/w_z.jpg", png_bytes(100, 100), "image/png", &[]);
    fx.thumbnails.fail_puts();

    let outcome = fx.pipeline.process_record(&record("thumbnail/w_z.jpg")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::OutputWrite(_)
        })
    ));
    assert!(fx.intake.has_object("thumbnail/w_z.jpg"));
}

#[tokio::test]
async fn quarantine_write_failure_leaves_intake_intact() {
    let fx = fixture_with_classifier(|ops| {
        StubClassifier::with_labels(vec![label("Violence", 95.0)], ops)
    });
    fx.intake
        .set_object("watermark/v_w.png", png_bytes(100, 100), "image/png", &[]);
    fx.quarantine.fail_puts();

    let outcome = fx.pipeline.process_record(&record("watermark/v_w.png")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::QuarantineWrite(_)
        })
    ));
    assert!(fx.intake.has_object("watermark/v_w.png"));
}

#[tokio::test]
async fn cleanup_failure_is_distinct_and_output_exists() {
    let fx = safe_fixture();
    fx.intake
        .set_object("thumbnail/c_d.jpg", png_bytes(100, 100), "image/png", &[]);
    fx.intake.fail_deletes();

    let outcome = fx.pipeline.process_record(&record("thumbnail/c_d.jpg")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::Cleanup(_)
        })
    ));
    // The destination write had already succeeded
    assert!(fx.thumbnails.has_object("c_d.jpg"));
}

#[tokio::test]
async fn unknown_action_fails_without_side_effects() {
    let fx = safe_fixture();
    fx.intake
        .set_object("rotate/e_f.jpg", png_bytes(100, 100), "image/png", &[]);

    let outcome = fx.pipeline.process_record(&record("rotate/e_f.jpg")).await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::UnknownAction(ref action)
        }) if action == "rotate"
    ));
    assert!(fx.intake.has_object("rotate/e_f.jpg"));
    assert_eq!(fx.thumbnails.object_count(), 0);
    assert_eq!(fx.quarantine.object_count(), 0);
}

#[tokio::test]
async fn key_without_separator_is_ignored() {
    let fx = safe_fixture();
    fx.intake
        .set_object("orphan.jpg", png_bytes(100, 100), "image/png", &[]);

    let outcome = fx.pipeline.process_record(&record("orphan.jpg")).await;

    assert!(outcome.is_none());
    assert_eq!(fx.classifier.call_count(), 0);
    assert!(fx.intake.has_object("orphan.jpg"));
}

#[tokio::test]
async fn junk_custom_size_falls_back_to_default() {
    let fx = safe_fixture();
    fx.intake.set_object(
        "thumbnail/g_h.jpg",
        png_bytes(800, 400),
        "image/png",
        &[("custom-size", "not-a-number")],
    );

    let outcome = fx.pipeline.process_record(&record("thumbnail/g_h.jpg")).await;

    assert!(matches!(outcome, Some(PipelineOutcome::Transformed { .. })));
    let stored = fx.thumbnails.get_object("g_h.jpg").unwrap();
    let img = image::load_from_memory(&stored.data).unwrap();
    // Default bounding size of 300, not an error
    assert_eq!((img.width(), img.height()), (300, 150));
}

#[tokio::test]
async fn failed_record_does_not_abort_batch_siblings() {
    let fx = safe_fixture();
    fx.intake
        .set_object("thumbnail/one.jpg", png_bytes(100, 100), "image/png", &[]);
    // "thumbnail/two.jpg" intentionally absent, so its fetch fails
    fx.intake
        .set_object("watermark/three.png", png_bytes(100, 100), "image/png", &[]);

    let event = ObjectCreatedEvent {
        records: vec![
            record("thumbnail/one.jpg"),
            record("thumbnail/two.jpg"),
            record("watermark/three.png"),
        ],
    };

    let outcomes = fx.pipeline.process_batch(&event).await;
    assert_eq!(outcomes.len(), 3);

    assert!(matches!(
        outcomes[0],
        Some(PipelineOutcome::Transformed { .. })
    ));
    assert!(matches!(
        outcomes[1],
        Some(PipelineOutcome::Failed {
            error: ProcessError::Fetch(_)
        })
    ));
    assert!(matches!(
        outcomes[2],
        Some(PipelineOutcome::Transformed { .. })
    ));

    assert!(fx.thumbnails.has_object("one.jpg"));
    assert!(fx.watermarks.has_object("three.png"));
}

#[tokio::test]
async fn corrupt_image_fails_transform_and_keeps_intake() {
    let fx = safe_fixture();
    fx.intake.set_object(
        "thumbnail/broken.jpg",
        b"these are not image bytes".to_vec(),
        "image/jpeg",
        &[],
    );

    let outcome = fx
        .pipeline
        .process_record(&record("thumbnail/broken.jpg"))
        .await;

    assert!(matches!(
        outcome,
        Some(PipelineOutcome::Failed {
            error: ProcessError::Transform(_)
        })
    ));
    assert!(fx.intake.has_object("thumbnail/broken.jpg"));
}
