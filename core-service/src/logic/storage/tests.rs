use std::path::Path;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::{FileModelStore, MemoryModelStore, ModelStore, StorageError};
use crate::logic::config::ScorerConfig;
use crate::logic::features::layout::FEATURE_VERSION;
use crate::logic::features::Session;
use crate::logic::model::{AnomalyScorer, DetectionMethod, TrainedModel};

fn small_model() -> TrainedModel {
    let config = ScorerConfig {
        n_estimators: 10,
        ..Default::default()
    };
    let pool: Vec<Session> = (0..6)
        .map(|i| {
            Session::new()
                .with("avg_interval", 100.0 + i as f64 * 3.0)
                .with("typing_speed", 5.0 - i as f64 * 0.1)
                .with("mouse_speed", 200.0 + i as f64 * 10.0)
        })
        .collect();
    TrainedModel::fit(&pool, &config).unwrap()
}

/// Edit the saved payload and write it back with a matching checksum
fn rewrite_payload(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut envelope: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    let mut payload: Value = serde_json::from_str(envelope["payload"].as_str().unwrap()).unwrap();
    edit(&mut payload);

    let payload = serde_json::to_string(&payload).unwrap();
    envelope["checksum"] = Value::String(hex::encode(Sha256::digest(payload.as_bytes())));
    envelope["payload"] = Value::String(payload);
    std::fs::write(path, serde_json::to_vec(&envelope).unwrap()).unwrap();
}

#[test]
fn test_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("model.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("nested").join("model.json"));
    let model = small_model();

    store.save(&model).unwrap();
    let loaded = store.load().unwrap().expect("model saved");

    assert_eq!(loaded.model_id, model.model_id);
    assert_eq!(loaded.sample_count, 6);
    assert!(loaded.same_parameters(&model));
}

#[test]
fn test_save_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("model.json"));

    let first = small_model();
    let second = small_model();
    store.save(&first).unwrap();
    store.save(&second).unwrap();

    assert_eq!(store.load().unwrap().unwrap().model_id, second.model_id);
}

#[test]
fn test_corrupt_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"not json at all").unwrap();

    let result = FileModelStore::new(&path).load();
    assert!(matches!(result, Err(StorageError::Serialization(_))));
}

#[test]
fn test_tampered_payload_fails_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let store = FileModelStore::new(&path);
    store.save(&small_model()).unwrap();

    let mut envelope: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let payload = envelope["payload"].as_str().unwrap().replace("\"sample_count\":6", "\"sample_count\":7");
    envelope["payload"] = serde_json::Value::String(payload);
    std::fs::write(&path, serde_json::to_vec(&envelope).unwrap()).unwrap();

    assert!(matches!(store.load(), Err(StorageError::ChecksumMismatch { .. })));
}

#[test]
fn test_unknown_format_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        serde_json::to_vec(&serde_json::json!({
            "format_version": 99,
            "checksum": "",
            "payload": "",
        }))
        .unwrap(),
    )
    .unwrap();

    assert!(matches!(
        FileModelStore::new(&path).load(),
        Err(StorageError::UnsupportedFormat(99))
    ));
}

#[test]
fn test_layout_mismatch_rejected() {
    let mut model = small_model();
    model.feature_version = FEATURE_VERSION + 1;
    let store = MemoryModelStore::with_model(model);

    assert!(matches!(store.load(), Err(StorageError::LayoutMismatch(_))));
}

#[test]
fn test_memory_store_counts_saves() {
    let store = MemoryModelStore::new();
    assert!(store.load().unwrap().is_none());

    store.save(&small_model()).unwrap();
    store.save(&small_model()).unwrap();
    assert_eq!(store.save_count(), 2);
    assert!(store.stored().is_some());
}

#[test]
fn test_signed_model_without_trees_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let store = FileModelStore::new(&path);
    store.save(&small_model()).unwrap();

    rewrite_payload(&path, |payload| payload["forest"]["trees"] = json!([]));

    assert!(matches!(store.load(), Err(StorageError::InvalidModel(_))));
}

#[test]
fn test_signed_model_with_bad_split_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let store = FileModelStore::new(&path);
    store.save(&small_model()).unwrap();

    rewrite_payload(&path, |payload| {
        payload["forest"]["trees"][0]["nodes"][0] =
            json!({"Split": {"feature": 9, "threshold": 0.0, "left": 1, "right": 2}});
    });

    assert!(matches!(store.load(), Err(StorageError::InvalidModel(_))));
}

#[test]
fn test_invalid_saved_model_falls_back_to_zscore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    FileModelStore::new(&path).save(&small_model()).unwrap();
    rewrite_payload(&path, |payload| payload["forest"]["trees"] = json!([]));

    let scorer = AnomalyScorer::new(ScorerConfig::default(), FileModelStore::new(&path));
    assert!(!scorer.is_trained());
    assert_eq!(scorer.status().load_failures, 1);

    let session = Session::new().with("avg_interval", 100.0);
    let p = scorer.predict(&session, &[session.clone(), session.clone()]);
    assert_eq!(p.method, DetectionMethod::Zscore);
    assert!(p.score.is_finite());
}

#[test]
fn test_memory_store_rejects_non_finite_scaler() {
    let mut model = small_model();
    model.scaler.scale[0] = f64::NAN;
    let store = MemoryModelStore::with_model(model);

    assert!(matches!(store.load(), Err(StorageError::InvalidModel(_))));
}
