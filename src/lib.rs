//! Delivery ETA - food-delivery duration estimation
//!
//! Estimates delivery duration from order features with a regression
//! forest trained on synthetic orders labeled by a known time formula,
//! and decomposes predictions into interpretable components.
//!
//! # Modules
//!
//! - [`data`] - Order records, synthetic generation, ground-truth formula
//! - [`preprocessing`] - Label encoding, feature engineering, scaling
//! - [`training`] - Regression forest training and evaluation
//! - [`artifact`] - Model artifact bundle persistence
//! - [`inference`] - Prediction with confidence and time breakdown
//! - [`cli`] - Command-line interface

pub mod error;

pub mod artifact;
pub mod data;
pub mod inference;
pub mod preprocessing;
pub mod training;

pub mod cli;

pub use error::{DeliveryEtaError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DeliveryEtaError, Result};

    pub use crate::data::{OrderGenerator, OrderRecord, OrderRequest};
    pub use crate::preprocessing::{FeatureEncoder, LabelEncoder, StandardScaler};
    pub use crate::training::{RandomForest, RegressionMetrics, Trainer, TrainerConfig};
    pub use crate::artifact::{ModelArtifacts, ModelMetadata};
    pub use crate::inference::{BreakdownPrediction, ModelInfo, Prediction, Predictor};
}
