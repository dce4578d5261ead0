//! Feature engineering pipeline
//!
//! Turns a raw order table into the fixed-order numeric feature matrix the
//! model was trained on: label-encoded categoricals, two engineered
//! interaction terms, and a stable column order that must match between
//! training and prediction.

use crate::data::CATEGORICAL_COLUMNS;
use crate::error::{DeliveryEtaError, Result};
use crate::preprocessing::LabelEncoder;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Model feature columns, in training order
pub const FEATURE_COLUMNS: [&str; 10] = [
    "delivery_person_rating",
    "distance_km",
    "preparation_time",
    "vehicle_type_encoded",
    "order_type_encoded",
    "weather_condition_encoded",
    "time_of_day_encoded",
    "day_of_week_encoded",
    "distance_squared",
    "rating_distance_interaction",
];

/// Encoder from raw order tables to the model's feature layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    label_encoder: LabelEncoder,
    feature_columns: Vec<String>,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self {
            label_encoder: LabelEncoder::new(),
            feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fit the categorical vocabularies from a raw training table
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.label_encoder.fit(df, &CATEGORICAL_COLUMNS)?;
        Ok(self)
    }

    /// Produce the feature table: encoded categoricals, engineered terms,
    /// columns selected in training order.
    ///
    /// Feature columns missing from the input are zero-filled with a
    /// warning; this mirrors the serving behavior of the original system
    /// and keeps partial inputs scoreable.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.label_encoder.is_fitted() {
            return Err(DeliveryEtaError::ModelNotFitted);
        }

        let mut result = self.label_encoder.transform(df)?;
        result = Self::add_engineered_terms(&result)?;

        let n_rows = result.height();
        for col in &self.feature_columns {
            if result.column(col).is_err() {
                warn!(column = %col, "feature column missing from input, filling with 0");
                let zeros = Series::new(col.as_str().into(), vec![0.0f64; n_rows]);
                result = result
                    .with_column(zeros)
                    .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
                    .clone();
            }
        }

        result
            .select(self.feature_columns.iter().map(|s| s.as_str()))
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Feature columns in training order
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    fn add_engineered_terms(df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        // Both terms derive from distance and rating; skip them when the
        // sources are absent and let the zero-fill step cover the gap.
        let distance = match df.column("distance_km") {
            Ok(col) => col
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?,
            Err(_) => return Ok(result),
        };
        let distance_ca = distance
            .f64()
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

        let squared: Float64Chunked = distance_ca
            .into_iter()
            .map(|opt| opt.map(|v| v * v))
            .collect();
        result = result
            .with_column(squared.with_name("distance_squared".into()).into_series())
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
            .clone();

        if let Ok(rating) = df.column("delivery_person_rating") {
            let rating = rating
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;
            let rating_ca = rating
                .f64()
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

            let interaction: Float64Chunked = rating_ca
                .into_iter()
                .zip(distance_ca.into_iter())
                .map(|(r, d)| match (r, d) {
                    (Some(r), Some(d)) => Some(r * d),
                    _ => None,
                })
                .collect();
            result = result
                .with_column(
                    interaction
                        .with_name("rating_distance_interaction".into())
                        .into_series(),
                )
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract named columns into a row-major `Array2<f64>` for the model
pub fn to_feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = columns.len();

    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| DeliveryEtaError::FeatureNotFound(col_name.clone()))?;
            let series = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;
            let values: Vec<f64> = series
                .f64()
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}
