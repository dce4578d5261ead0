//! Categorical label encoding

use crate::error::{DeliveryEtaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Code substituted for categories never seen during fit
pub const UNSEEN_CATEGORY_CODE: i64 = 0;

/// Label encoder over string columns.
///
/// Maps each category to a stable integer id. Categories are assigned ids
/// in lexicographic order so the mapping does not depend on row order.
/// Values outside the fitted vocabulary fall back to
/// [`UNSEEN_CATEGORY_CODE`] with a warning rather than failing the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    // column name -> (category -> code)
    mappings: HashMap<String, HashMap<String, i64>>,
    is_fitted: bool,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder on the observed categories of the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| DeliveryEtaError::FeatureNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();

            let mapping = Self::build_mapping(series)?;
            self.mappings.insert(col_name.to_string(), mapping);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode each fitted column of `df` into a sibling `<name>_encoded`
    /// column. Columns absent from the input are skipped.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(DeliveryEtaError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, mapping) in &self.mappings {
            if let Ok(column) = df.column(col_name) {
                let ca = column
                    .as_materialized_series()
                    .str()
                    .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

                let values: Vec<i64> = ca
                    .into_iter()
                    .map(|v| match v {
                        Some(s) => match mapping.get(s) {
                            Some(&code) => code,
                            None => {
                                warn!(column = %col_name, value = %s,
                                      "unseen category, using default encoding");
                                UNSEEN_CATEGORY_CODE
                            }
                        },
                        None => UNSEEN_CATEGORY_CODE,
                    })
                    .collect();

                let new_series = Series::new(format!("{}_encoded", col_name).into(), values);
                result = result
                    .with_column(new_series)
                    .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted vocabulary of one column, in code order
    pub fn categories(&self, column: &str) -> Option<Vec<&str>> {
        self.mappings.get(column).map(|mapping| {
            let mut cats: Vec<(&str, i64)> =
                mapping.iter().map(|(c, &i)| (c.as_str(), i)).collect();
            cats.sort_by_key(|(_, code)| *code);
            cats.into_iter().map(|(c, _)| c).collect()
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn build_mapping(series: &Series) -> Result<HashMap<String, i64>> {
        let ca = series
            .str()
            .map_err(|e| DeliveryEtaError::DataError(e.to_string()))?;

        let mut categories: Vec<String> = Vec::new();
        for val in ca.into_iter().flatten() {
            if !categories.iter().any(|c| c == val) {
                categories.push(val.to_string());
            }
        }
        categories.sort();

        Ok(categories
            .into_iter()
            .enumerate()
            .map(|(idx, cat)| (cat, idx as i64))
            .collect())
    }
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new()
    }
}
