//! Error types for the delivery ETA engine

use thiserror::Error;

/// Result type alias for delivery ETA operations
pub type Result<T> = std::result::Result<T, DeliveryEtaError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum DeliveryEtaError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for DeliveryEtaError {
    fn from(err: polars::error::PolarsError) -> Self {
        DeliveryEtaError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for DeliveryEtaError {
    fn from(err: serde_json::Error) -> Self {
        DeliveryEtaError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeliveryEtaError::DataError("bad column".to_string());
        assert_eq!(err.to_string(), "Data error: bad column");
    }

    #[test]
    fn test_prediction_failed_carries_cause() {
        let err = DeliveryEtaError::PredictionFailed("Feature not found: distance_km".to_string());
        assert!(err.to_string().contains("distance_km"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DeliveryEtaError = io_err.into();
        assert!(matches!(err, DeliveryEtaError::IoError(_)));
    }
}
