//! Model artifact bundle
//!
//! Everything required to reproduce predictions travels together: the
//! trained forest, the fitted feature encoder and scaler, the feature
//! column order, and training metadata. The bundle is written once by
//! training and treated as read-only afterwards.
//!
//! On disk the bundle is an opaque bincode blob wrapped in a small
//! envelope with magic bytes, a format version and a checksum, so a
//! truncated or corrupted file is rejected at load time instead of
//! producing silently wrong predictions. A human-readable JSON metadata
//! file mirrors the headline numbers for inspection without
//! deserializing the full bundle.

use crate::error::{DeliveryEtaError, Result};
use crate::preprocessing::{FeatureEncoder, StandardScaler};
use crate::training::{FeatureImportance, RandomForest, RegressionMetrics};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic bytes of a delivery ETA model file
const MAGIC: [u8; 4] = *b"DETA";
/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

/// Regression target name, recorded in metadata
pub const TARGET_NAME: &str = "delivery_time_minutes";

/// Immutable snapshot of a trained model plus its preprocessing state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub model: RandomForest,
    pub scaler: StandardScaler,
    pub encoder: FeatureEncoder,
    pub feature_columns: Vec<String>,
    pub metrics: RegressionMetrics,
    pub feature_importance: Vec<FeatureImportance>,
    /// ISO 8601 timestamp of the training run
    pub training_date: String,
    pub training_samples: usize,
    pub test_samples: usize,
}

/// On-disk envelope around the serialized bundle
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    magic: [u8; 4],
    format_version: u32,
    checksum: u64,
    payload: Vec<u8>,
}

/// FNV-1a over the payload bytes
fn compute_checksum(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl ModelArtifacts {
    /// Save the bundle to `path`.
    ///
    /// Writes to a temporary sibling file and renames it into place so a
    /// failed run never leaves a partial bundle behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let payload = bincode::serialize(self).map_err(|e| {
            DeliveryEtaError::SerializationError(format!("failed to serialize bundle: {}", e))
        })?;

        let envelope = ArtifactEnvelope {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            checksum: compute_checksum(&payload),
            payload,
        };

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let bytes = bincode::serialize(&envelope).map_err(|e| {
                DeliveryEtaError::SerializationError(format!("failed to serialize envelope: {}", e))
            })?;
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Load and verify a bundle from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            DeliveryEtaError::ArtifactError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let envelope: ArtifactEnvelope = bincode::deserialize(&bytes).map_err(|e| {
            DeliveryEtaError::ArtifactError(format!("failed to decode envelope: {}", e))
        })?;

        if envelope.magic != MAGIC {
            return Err(DeliveryEtaError::ArtifactError(
                "not a delivery ETA model file".to_string(),
            ));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(DeliveryEtaError::ArtifactError(format!(
                "unsupported format version {}",
                envelope.format_version
            )));
        }
        if compute_checksum(&envelope.payload) != envelope.checksum {
            return Err(DeliveryEtaError::ArtifactError(
                "checksum verification failed, file may be corrupted".to_string(),
            ));
        }

        bincode::deserialize(&envelope.payload).map_err(|e| {
            DeliveryEtaError::ArtifactError(format!("failed to decode bundle: {}", e))
        })
    }

    /// Metadata mirror of this bundle
    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model_version: env!("CARGO_PKG_VERSION").to_string(),
            training_date: self.training_date.clone(),
            training_samples: self.training_samples,
            test_samples: self.test_samples,
            metrics: self.metrics.clone(),
            features: self.feature_columns.clone(),
            target: TARGET_NAME.to_string(),
        }
    }

    /// Write the JSON metadata mirror next to the bundle
    pub fn write_metadata(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.metadata())?;
        Ok(())
    }
}

/// Human-readable subset of the bundle, stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_version: String,
    pub training_date: String,
    pub training_samples: usize,
    pub test_samples: usize,
    pub metrics: RegressionMetrics,
    pub features: Vec<String>,
    pub target: String,
}
