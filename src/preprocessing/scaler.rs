//! Feature standardization

use crate::error::{DeliveryEtaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-feature statistics captured at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Standard scaler: `(x - mean) / std` per column.
///
/// Statistics are computed once from the training matrix and reused
/// verbatim at prediction time; re-fitting on inference inputs would
/// silently shift every prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit per-column mean and standard deviation
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| DeliveryEtaError::FeatureNotFound(col_name.to_string()))?;
            let series = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;
            let ca = series
                .f64()
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    // constant columns scale by 1 instead of dividing by zero
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Standardize every fitted column present in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(DeliveryEtaError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name)
                    .ok()
                    .map(|column| self.scale_series(column.as_materialized_series(), params))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let casted = series
            .cast(&DataType::Float64)
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;
        let ca = casted
            .f64()
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.std))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_to_zero_mean() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        let mean: f64 = col.mean().unwrap();
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_same_statistics_reused_on_new_data() {
        let train = df!("a" => &[0.0, 10.0]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train, &["a"]).unwrap();

        let input = df!("a" => &[5.0]).unwrap();
        let result = scaler.transform(&input).unwrap();
        let v = result.column("a").unwrap().f64().unwrap().get(0).unwrap();
        assert!(v.abs() < 1e-10, "train-time mean must be applied, got {}", v);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let df = df!("a" => &[2.0, 2.0, 2.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        for v in col.into_no_null_iter() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("a" => &[1.0]).unwrap();
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&df),
            Err(DeliveryEtaError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_integer_columns_are_cast() {
        let df = df!("code" => &[0i64, 1, 2, 3]).unwrap();
        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&df, &["code"]).unwrap();
        assert!(result.column("code").unwrap().f64().is_ok());
    }
}
