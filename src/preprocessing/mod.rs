//! Data preprocessing
//!
//! Categorical encoding, feature engineering and standardization. All
//! components are fit once on training data, serialized into the model
//! artifact bundle, and re-applied unchanged at prediction time.

mod encoder;
mod features;
mod scaler;

pub use encoder::{LabelEncoder, UNSEEN_CATEGORY_CODE};
pub use features::{to_feature_matrix, FeatureEncoder, FEATURE_COLUMNS};
pub use scaler::StandardScaler;
