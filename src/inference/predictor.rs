//! Delivery time predictor
//!
//! Loads a model artifact bundle and scores raw order tables with the
//! exact preprocessing the model was trained with. Also exposes an
//! explanatory breakdown that splits a prediction into preparation,
//! travel, weather and residual components using the same constants the
//! training labels were generated from.

use crate::artifact::ModelArtifacts;
use crate::data::ground_truth;
use crate::data::{VehicleType, WeatherCondition};
use crate::error::{DeliveryEtaError, Result};
use crate::preprocessing::to_feature_matrix;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Point prediction with an ensemble-agreement confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Estimated delivery time in minutes
    pub estimated_time: f64,
    /// Agreement score in [0.6, 1.0]; tighter tree consensus scores higher
    pub confidence: f64,
    /// Standard deviation across the forest's trees, minutes
    pub prediction_std: f64,
}

/// Explanatory split of a prediction, integer minutes.
///
/// Preparation, travel and weather come from the label formula applied to
/// the inputs; the residual absorbs traffic, order handling and model
/// error. The components are illustrative and only sum to the estimate
/// through the residual term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub preparation_time: u32,
    pub travel_time: u32,
    pub weather_delay: u32,
    pub traffic_and_other: u32,
}

/// Inputs echoed back with a breakdown prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFactors {
    pub delivery_person_rating: f64,
    pub vehicle_type: String,
    pub distance_km: f64,
    pub weather_condition: String,
}

/// Prediction plus its explanatory breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownPrediction {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub breakdown: TimeBreakdown,
    pub factors: OrderFactors,
}

/// Metadata snapshot of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub training_date: String,
    pub training_samples: usize,
    pub metrics: crate::training::RegressionMetrics,
    pub features: Vec<String>,
    /// Top five features by importance
    pub feature_importance: Vec<crate::training::FeatureImportance>,
}

/// Stateful predictor holding an immutable artifact bundle.
///
/// A predictor is either fully loaded or unusable: every scoring call on
/// an unloaded predictor fails fast with [`DeliveryEtaError::ModelNotLoaded`]
/// instead of failing somewhere inside the pipeline.
#[derive(Debug, Default)]
pub struct Predictor {
    artifacts: Option<ModelArtifacts>,
}

impl Predictor {
    /// Create an unloaded predictor
    pub fn new() -> Self {
        Self { artifacts: None }
    }

    /// Wrap an in-memory bundle, guaranteeing a fully initialized predictor
    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
        }
    }

    /// Load a bundle from disk. On failure the predictor stays unloaded.
    pub fn load_model(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.artifacts = Some(ModelArtifacts::load(path)?);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Predict delivery time for a single-row order table
    pub fn predict(&self, df: &DataFrame) -> Result<Prediction> {
        let batch = self.predict_batch(df)?;
        batch.into_iter().next().ok_or_else(|| {
            DeliveryEtaError::PredictionFailed("input has no rows".to_string())
        })
    }

    /// Predict delivery times for every row of an order table
    pub fn predict_batch(&self, df: &DataFrame) -> Result<Vec<Prediction>> {
        let artifacts = self.artifacts.as_ref().ok_or(DeliveryEtaError::ModelNotLoaded)?;

        self.run_inference(artifacts, df).map_err(|e| match e {
            DeliveryEtaError::ModelNotLoaded => e,
            other => DeliveryEtaError::PredictionFailed(other.to_string()),
        })
    }

    /// Predict and decompose into explanatory components
    pub fn predict_with_breakdown(&self, df: &DataFrame) -> Result<BreakdownPrediction> {
        let prediction = self.predict(df)?;

        // input parameters with serving defaults for absent fields
        let prep_time = first_f64(df, "preparation_time").unwrap_or(15.0);
        let distance = first_f64(df, "distance_km").unwrap_or(3.0);
        let rating = first_f64(df, "delivery_person_rating").unwrap_or(4.0);
        let vehicle_str = first_str(df, "vehicle_type").unwrap_or_else(|| "bike".to_string());
        let weather_str = first_str(df, "weather_condition").unwrap_or_else(|| "clear".to_string());

        let vehicle = VehicleType::parse(&vehicle_str).unwrap_or(VehicleType::Bicycle);
        let travel_time = ground_truth::travel_time_minutes(distance, vehicle, rating);

        let weather_delay = WeatherCondition::parse(&weather_str)
            .map(ground_truth::weather_delay_minutes)
            .unwrap_or(0.0);

        // residual soaks up whatever the simple formula does not explain
        let remaining =
            (prediction.estimated_time - prep_time - travel_time - weather_delay).max(0.0);

        Ok(BreakdownPrediction {
            prediction,
            breakdown: TimeBreakdown {
                preparation_time: prep_time.round() as u32,
                travel_time: travel_time.round() as u32,
                weather_delay: weather_delay.round() as u32,
                traffic_and_other: remaining.round() as u32,
            },
            factors: OrderFactors {
                delivery_person_rating: rating,
                vehicle_type: vehicle_str,
                distance_km: distance,
                weather_condition: weather_str,
            },
        })
    }

    /// Metadata of the loaded model, or [`DeliveryEtaError::ModelNotLoaded`]
    pub fn model_info(&self) -> Result<ModelInfo> {
        let artifacts = self.artifacts.as_ref().ok_or(DeliveryEtaError::ModelNotLoaded)?;

        Ok(ModelInfo {
            training_date: artifacts.training_date.clone(),
            training_samples: artifacts.training_samples,
            metrics: artifacts.metrics.clone(),
            features: artifacts.feature_columns.clone(),
            feature_importance: artifacts
                .feature_importance
                .iter()
                .take(5)
                .cloned()
                .collect(),
        })
    }

    fn run_inference(
        &self,
        artifacts: &ModelArtifacts,
        df: &DataFrame,
    ) -> Result<Vec<Prediction>> {
        let encoded = artifacts.encoder.transform(df)?;
        let scaled = artifacts.scaler.transform(&encoded)?;
        let x = to_feature_matrix(&scaled, &artifacts.feature_columns)?;

        let (estimates, stds) = artifacts.model.predict_with_std(&x)?;

        Ok(estimates
            .iter()
            .zip(stds.iter())
            .map(|(&estimate, &std)| Prediction {
                estimated_time: estimate,
                confidence: confidence_score(estimate, std),
                prediction_std: std,
            })
            .collect())
    }
}

/// Map ensemble spread to a score in [0.6, 1.0]
fn confidence_score(estimate: f64, std: f64) -> f64 {
    if estimate <= f64::EPSILON {
        return 0.6;
    }
    (1.0 - std / estimate).clamp(0.6, 1.0)
}

fn first_f64(df: &DataFrame, column: &str) -> Option<f64> {
    df.column(column)
        .ok()
        .and_then(|c| c.as_materialized_series().cast(&DataType::Float64).ok())
        .and_then(|s| s.f64().ok().and_then(|ca| ca.get(0)))
}

fn first_str(df: &DataFrame, column: &str) -> Option<String> {
    df.column(column)
        .ok()
        .and_then(|c| {
            c.as_materialized_series()
                .str()
                .ok()
                .and_then(|ca| ca.get(0).map(|s| s.to_string()))
        })
}
