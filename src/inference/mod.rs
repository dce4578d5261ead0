//! Model inference
//!
//! Scores raw order tables against a loaded artifact bundle and exposes
//! the explanatory time breakdown.

mod predictor;

pub use predictor::{
    BreakdownPrediction, ModelInfo, OrderFactors, Prediction, Predictor, TimeBreakdown,
};
