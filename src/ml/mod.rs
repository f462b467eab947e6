//! Machine learning support for battery health and range prediction.
//!
//! Models are random forests fitted at process start on synthetic training
//! data, then kept in memory for point predictions. There is no model
//! persistence; a restart retrains.

pub mod service;
pub mod training;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use service::{
    HealthInput, HealthPrediction, MlService, RangeInput, RangePrediction,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelType {
    LinearRegression,
    RandomForest,
    GradientBoosting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub training_samples: usize,
    pub validation_metrics: ValidationMetrics,
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// R-squared
    pub r2: f64,
}

impl ValidationMetrics {
    pub fn new(mae: f64, rmse: f64, mape: f64, r2: f64) -> Self {
        Self { mae, rmse, mape, r2 }
    }

    /// Check if metrics meet quality thresholds
    pub fn meets_quality_threshold(&self, max_mape: f64, min_r2: f64) -> bool {
        self.mape <= max_mape && self.r2 >= min_r2
    }
}

/// Named feature vector fed to a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.len() != feature_names.len() {
            anyhow::bail!(
                "Feature count mismatch: {} features, {} names",
                features.len(),
                feature_names.len()
            );
        }
        Ok(Self {
            features,
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
