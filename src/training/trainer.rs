//! End-to-end training pipeline
//!
//! Generates labeled synthetic orders, fits the preprocessing components
//! and the regression forest, evaluates on a held-out split, and bundles
//! the result into [`ModelArtifacts`].

use crate::artifact::ModelArtifacts;
use crate::data::{ground_truth, records_to_dataframe, OrderGenerator};
use crate::error::{DeliveryEtaError, Result};
use crate::preprocessing::{to_feature_matrix, FeatureEncoder, StandardScaler};
use crate::training::{rank_feature_importances, RandomForest, RegressionMetrics};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Training hyperparameters
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Number of synthetic orders to generate
    pub n_samples: usize,
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Held-out fraction for evaluation
    pub test_split: f64,
    /// Seed for generation, labeling, splitting and tree bagging
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_samples: 50_000,
            n_estimators: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            test_split: 0.2,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    pub fn with_samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn with_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_test_split(mut self, fraction: f64) -> Self {
        self.test_split = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_samples < 50 {
            return Err(DeliveryEtaError::InvalidParameter {
                name: "n_samples".to_string(),
                value: self.n_samples.to_string(),
                reason: "need at least 50 samples to train".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.test_split) || self.test_split == 0.0 {
            return Err(DeliveryEtaError::InvalidParameter {
                name: "test_split".to_string(),
                value: self.test_split.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        if self.n_estimators == 0 {
            return Err(DeliveryEtaError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "forest needs at least one tree".to_string(),
            });
        }
        Ok(())
    }
}

/// One-shot model trainer
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline and return the artifact bundle.
    ///
    /// The bundle is only assembled after every step has succeeded;
    /// callers persist it with [`ModelArtifacts::save`], which is itself
    /// atomic.
    pub fn run(&self) -> Result<ModelArtifacts> {
        self.config.validate()?;
        let cfg = &self.config;

        info!(n_samples = cfg.n_samples, "generating synthetic orders");
        let records = OrderGenerator::new(cfg.seed).generate(cfg.n_samples);

        // label with the ground-truth formula, separate noise stream
        let mut label_rng = ChaCha8Rng::seed_from_u64(cfg.seed.wrapping_add(1));
        let labels: Vec<f64> = records
            .iter()
            .map(|r| ground_truth::delivery_time(r, &mut label_rng))
            .collect();

        let df_raw = records_to_dataframe(&records)?;

        info!("encoding features");
        let mut encoder = FeatureEncoder::new();
        let df_features = encoder.fit_transform(&df_raw)?;
        let feature_columns = encoder.feature_columns().to_vec();

        let (train_df, test_df, y_train, y_test) =
            train_test_split(&df_features, &labels, cfg.test_split, cfg.seed)?;
        info!(
            train = y_train.len(),
            test = y_test.len(),
            "split train/test"
        );

        // scaler statistics come from the training split only
        let col_refs: Vec<&str> = feature_columns.iter().map(|s| s.as_str()).collect();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train_df, &col_refs)?;
        let train_scaled = scaler.transform(&train_df)?;
        let test_scaled = scaler.transform(&test_df)?;

        let x_train = to_feature_matrix(&train_scaled, &feature_columns)?;
        let x_test = to_feature_matrix(&test_scaled, &feature_columns)?;

        info!(
            n_estimators = cfg.n_estimators,
            max_depth = cfg.max_depth,
            "fitting regression forest"
        );
        let mut model = RandomForest::new(cfg.n_estimators)
            .with_max_depth(cfg.max_depth)
            .with_min_samples_split(cfg.min_samples_split)
            .with_min_samples_leaf(cfg.min_samples_leaf)
            .with_random_state(cfg.seed);
        model.fit(&x_train, &y_train)?;

        let y_pred = model.predict(&x_test)?;
        let metrics = RegressionMetrics::compute(&y_test, &y_pred);
        info!(
            mae = metrics.mae,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            "evaluated on held-out split"
        );

        let feature_importance = model
            .feature_importances()
            .map(|imp| rank_feature_importances(&feature_columns, imp))
            .unwrap_or_default();

        Ok(ModelArtifacts {
            model,
            scaler,
            encoder,
            feature_columns,
            metrics,
            feature_importance,
            training_date: chrono::Utc::now().to_rfc3339(),
            training_samples: y_train.len(),
            test_samples: y_test.len(),
        })
    }
}

/// Seeded shuffled split of a feature table and its labels
fn train_test_split(
    df: &DataFrame,
    labels: &[f64],
    test_split: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame, Array1<f64>, Array1<f64>)> {
    let n = df.height();
    if n != labels.len() {
        return Err(DeliveryEtaError::ShapeError {
            expected: format!("{} labels", n),
            actual: format!("{} labels", labels.len()),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((n as f64) * test_split) as usize;
    let (test_idx, train_idx) = indices.split_at(test_size);

    let take = |idx: &[usize]| -> Result<DataFrame> {
        let ca = IdxCa::from_vec("idx".into(), idx.iter().map(|&i| i as IdxSize).collect());
        df.take(&ca).map_err(|e| DeliveryEtaError::DataError(e.to_string()))
    };

    let train_df = take(train_idx)?;
    let test_df = take(test_idx)?;
    let y_train = Array1::from_vec(train_idx.iter().map(|&i| labels[i]).collect());
    let y_test = Array1::from_vec(test_idx.iter().map(|&i| labels[i]).collect());

    Ok((train_df, test_df, y_train, y_test))
}
