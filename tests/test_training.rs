//! Integration test: training pipeline end-to-end

use delivery_eta::artifact::ModelArtifacts;
use delivery_eta::training::{Trainer, TrainerConfig};

fn small_config() -> TrainerConfig {
    TrainerConfig::default()
        .with_samples(800)
        .with_estimators(20)
        .with_max_depth(10)
        .with_seed(42)
}

#[test]
fn test_training_produces_complete_bundle() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    assert_eq!(artifacts.model.n_trees(), 20);
    assert_eq!(artifacts.feature_columns.len(), 10);
    assert_eq!(artifacts.training_samples, 640);
    assert_eq!(artifacts.test_samples, 160);
    assert!(!artifacts.training_date.is_empty());
    assert!(artifacts.scaler.is_fitted());
    assert!(artifacts.encoder.label_encoder().is_fitted());
}

#[test]
fn test_model_learns_the_formula() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    // the target is mostly deterministic given the features, so even a
    // small forest should explain well over half the variance
    assert!(
        artifacts.metrics.r2 > 0.5,
        "r2 too low: {}",
        artifacts.metrics.r2
    );
    assert!(
        artifacts.metrics.mae < 10.0,
        "mae too high: {}",
        artifacts.metrics.mae
    );
    assert!(artifacts.metrics.rmse >= artifacts.metrics.mae);
}

#[test]
fn test_feature_importances_ranked() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    assert_eq!(artifacts.feature_importance.len(), 10);
    for pair in artifacts.feature_importance.windows(2) {
        assert!(pair[0].importance >= pair[1].importance);
    }
    let total: f64 = artifacts
        .feature_importance
        .iter()
        .map(|fi| fi.importance)
        .sum();
    assert!((total - 1.0).abs() < 1e-6, "importances sum to {}", total);
}

#[test]
fn test_training_deterministic_under_seed() {
    let a = Trainer::new(small_config()).run().unwrap();
    let b = Trainer::new(small_config()).run().unwrap();

    assert_eq!(a.metrics.mae, b.metrics.mae);
    assert_eq!(a.metrics.r2, b.metrics.r2);
}

#[test]
fn test_artifact_roundtrip() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    artifacts.save(&path).unwrap();

    let restored = ModelArtifacts::load(&path).unwrap();
    assert_eq!(restored.feature_columns, artifacts.feature_columns);
    assert_eq!(restored.training_samples, artifacts.training_samples);
    assert_eq!(restored.metrics.mae, artifacts.metrics.mae);
    assert_eq!(restored.model.n_trees(), artifacts.model.n_trees());

    // no stray temp file left behind
    assert!(!dir.path().join("model.tmp").exists());
}

#[test]
fn test_corrupted_artifact_rejected() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    artifacts.save(&path).unwrap();

    // flip a byte in the middle of the payload
    let mut bytes = std::fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(ModelArtifacts::load(&path).is_err());
}

#[test]
fn test_metadata_mirror() {
    let artifacts = Trainer::new(small_config()).run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_metadata.json");
    artifacts.write_metadata(&path).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["training_samples"], 640);
    assert_eq!(value["test_samples"], 160);
    assert_eq!(value["target"], "delivery_time_minutes");
    assert_eq!(value["features"].as_array().unwrap().len(), 10);
    assert!(value["metrics"]["mae"].as_f64().unwrap() > 0.0);
    assert!(value["metrics"]["rmse"].as_f64().is_some());
    assert!(value["metrics"]["r2"].as_f64().is_some());
}
