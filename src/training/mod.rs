//! Model training
//!
//! Regression trees, the bagged forest, evaluation metrics, and the
//! end-to-end trainer that produces the model artifact bundle.

mod decision_tree;
mod metrics;
mod random_forest;
mod trainer;

pub use decision_tree::{RegressionTree, TreeNode};
pub use metrics::{rank_feature_importances, FeatureImportance, RegressionMetrics};
pub use random_forest::RandomForest;
pub use trainer::{Trainer, TrainerConfig};
