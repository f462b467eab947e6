//! Prediction service backed by two random forests.

use anyhow::Result;
use chrono::Utc;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{info, warn};

use super::training::{
    calculate_metrics, synthesize_health_dataset, synthesize_range_dataset, SyntheticDataset,
};
use super::{FeatureVector, ModelMetadata, ModelType};
use crate::config::MlConfig;
use crate::domain::{DegradationPoint, SwapRecommendation};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

pub struct MlService {
    health_model: Forest,
    range_model: Forest,
    pub health_metadata: ModelMetadata,
    pub range_metadata: ModelMetadata,
}

#[derive(Debug, Clone)]
pub struct HealthInput {
    pub soc: f64,
    pub cycle_count: f64,
    pub temperature: f64,
    pub age_days: f64,
    pub voltage: f64,
}

#[derive(Debug, Clone)]
pub struct HealthPrediction {
    pub current_soh: f64,
    pub confidence: f64,
    pub swap_recommendation: SwapRecommendation,
    pub degradation_forecast: Vec<DegradationPoint>,
    pub cycle_impact: f64,
    pub temperature_impact: f64,
    pub age_impact: f64,
}

#[derive(Debug, Clone)]
pub struct RangeInput {
    pub battery_soc: f64,
    pub battery_soh: f64,
    pub distance_km: f64,
    pub elevation_change: f64,
    pub weather_temp: f64,
    pub wind_speed: f64,
    pub battery_capacity_kwh: f64,
}

#[derive(Debug, Clone)]
pub struct RangePrediction {
    pub predicted_range: f64,
    pub energy_consumption: f64,
    pub energy_per_km: f64,
    pub confidence: f64,
    /// SOH carried through as the battery-state factor
    pub battery_state: f64,
    pub temperature_impact: f64,
    pub elevation_impact: f64,
    pub wind_impact: f64,
    pub recommendations: Vec<String>,
}

impl MlService {
    /// Fit both models on synthetic data. Called once at startup.
    pub fn train(cfg: &MlConfig) -> Result<Self> {
        let health_dataset = synthesize_health_dataset(cfg);
        let (health_model, health_metadata) = Self::fit_forest(
            &health_dataset,
            forest_params(cfg.n_trees, cfg.health_max_depth, cfg.seed),
            "battery_health",
        )?;

        let range_dataset = synthesize_range_dataset(cfg);
        let (range_model, range_metadata) = Self::fit_forest(
            &range_dataset,
            forest_params(cfg.n_trees, cfg.range_max_depth, cfg.seed),
            "range_prediction",
        )?;

        info!(
            health_r2 = health_metadata.validation_metrics.r2,
            range_r2 = range_metadata.validation_metrics.r2,
            "ML models trained"
        );

        Ok(Self {
            health_model,
            range_model,
            health_metadata,
            range_metadata,
        })
    }

    fn fit_forest(
        dataset: &SyntheticDataset,
        params: RandomForestRegressorParameters,
        name: &str,
    ) -> Result<(Forest, ModelMetadata)> {
        if dataset.is_empty() {
            anyhow::bail!("Cannot train on empty dataset");
        }

        let n_samples = dataset.features.len();
        let n_features = dataset.features[0].len();

        let mut flat_data = Vec::with_capacity(n_samples * n_features);
        for row in &dataset.features {
            if row.len() != n_features {
                anyhow::bail!("All feature vectors must have the same length");
            }
            flat_data.extend_from_slice(row);
        }

        let x = DenseMatrix::new(n_samples, n_features, flat_data, false);
        let y = dataset.targets.clone();

        let model = RandomForestRegressor::fit(&x, &y, params)
            .map_err(|e| anyhow::anyhow!("RandomForest training failed: {:?}", e))?;

        let predictions = model
            .predict(&x)
            .map_err(|e| anyhow::anyhow!("Prediction failed during validation: {:?}", e))?;
        let metrics = calculate_metrics(&predictions, &dataset.targets)?;

        let metadata = ModelMetadata {
            model_id: format!("{name}_{}", uuid::Uuid::new_v4()),
            model_type: ModelType::RandomForest,
            version: "1.0.0".to_string(),
            trained_at: Utc::now(),
            training_samples: n_samples,
            validation_metrics: metrics,
            feature_names: dataset.feature_names.clone(),
        };

        Ok((model, metadata))
    }

    fn predict_point(model: &Forest, metadata: &ModelMetadata, features: &[f64]) -> Result<f64> {
        let fv = FeatureVector::new(features.to_vec(), metadata.feature_names.clone())?;
        let x = DenseMatrix::new(1, fv.len(), fv.features, false);
        let predictions = model
            .predict(&x)
            .map_err(|e| anyhow::anyhow!("Prediction failed: {:?}", e))?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Model returned empty predictions"))
    }

    /// Point SOH plus a 7-day degradation forecast.
    ///
    /// On model failure the caller still gets a usable answer: fixed
    /// mid-fleet values and an empty forecast.
    pub fn predict_health(&self, input: &HealthInput) -> HealthPrediction {
        let confidence = (100.0 - (input.cycle_count - 1000.0).abs() / 50.0).min(95.0);

        let cycle_impact = round1(input.cycle_count / 3000.0 * 100.0);
        let temperature_impact = round1((input.temperature - 25.0).abs() * 2.0);
        let age_impact = round1(input.age_days / 1000.0 * 100.0);

        let features = [
            input.soc,
            input.cycle_count,
            input.temperature,
            input.age_days,
            input.voltage,
        ];

        let current_soh = match Self::predict_point(&self.health_model, &self.health_metadata, &features) {
            Ok(soh) => soh,
            Err(e) => {
                warn!(error = %e, "battery health prediction failed, using fallback");
                return HealthPrediction {
                    current_soh: 85.0,
                    confidence: 75.0,
                    swap_recommendation: SwapRecommendation::Recommended,
                    degradation_forecast: Vec::new(),
                    cycle_impact,
                    temperature_impact,
                    age_impact,
                };
            }
        };

        let mut degradation_forecast = Vec::with_capacity(7);
        for i in 0..7u16 {
            let mut future = features;
            future[3] += i as f64;
            let future_soh = Self::predict_point(&self.health_model, &self.health_metadata, &future)
                .unwrap_or(current_soh)
                .max(20.0);
            degradation_forecast.push(DegradationPoint {
                day: i + 1,
                predicted_soh: round2(future_soh),
                confidence: round2(confidence - i as f64),
            });
        }

        HealthPrediction {
            current_soh: round2(current_soh),
            confidence: round2(confidence),
            swap_recommendation: swap_recommendation_for(current_soh),
            degradation_forecast,
            cycle_impact,
            temperature_impact,
            age_impact,
        }
    }

    /// Range estimate with energy breakdown and driving recommendations.
    pub fn predict_range(&self, input: &RangeInput) -> RangePrediction {
        let features = [
            input.battery_soc,
            input.battery_soh,
            input.distance_km,
            input.elevation_change,
            input.weather_temp,
            input.wind_speed,
        ];

        let (predicted_range, mut confidence) =
            match Self::predict_point(&self.range_model, &self.range_metadata, &features) {
                Ok(range) => (range, 95.0),
                Err(e) => {
                    warn!(error = %e, "range prediction failed, using fallback");
                    (150.0, 75.0)
                }
            };

        if (input.weather_temp - 20.0).abs() > 15.0 {
            confidence -= 10.0;
        }
        if input.elevation_change.abs() > 500.0 {
            confidence -= 10.0;
        }
        if input.wind_speed > 20.0 {
            confidence -= 5.0;
        }

        let energy_consumption = input.battery_capacity_kwh * (100.0 - input.battery_soc) / 100.0;
        let energy_per_km = energy_consumption / predicted_range.max(1.0);

        let temperature_impact = ((input.weather_temp - 20.0).abs() * 0.02).max(0.0);
        let elevation_impact = input.elevation_change.abs() / 1000.0 * 0.1;
        let wind_impact = input.wind_speed / 100.0 * 0.15;

        RangePrediction {
            predicted_range: round2(predicted_range),
            energy_consumption: round2(energy_consumption),
            energy_per_km: round3(energy_per_km),
            confidence: round2(confidence),
            battery_state: round1(input.battery_soh),
            temperature_impact: round1(temperature_impact * 100.0),
            elevation_impact: round1(elevation_impact * 100.0),
            wind_impact: round1(wind_impact * 100.0),
            recommendations: range_recommendations(input, predicted_range),
        }
    }
}

/// Thresholds used both for live predictions and fleet summaries.
pub fn swap_recommendation_for(soh: f64) -> SwapRecommendation {
    if soh >= 80.0 {
        SwapRecommendation::Recommended
    } else if soh >= 60.0 {
        SwapRecommendation::Caution
    } else {
        SwapRecommendation::NotRecommended
    }
}

fn range_recommendations(input: &RangeInput, predicted_range: f64) -> Vec<String> {
    let mut recommendations = Vec::new();

    if input.battery_soc < 30.0 {
        recommendations.push("Consider charging before long trips".to_string());
    }
    if input.weather_temp < 0.0 || input.weather_temp > 35.0 {
        recommendations.push("Extreme temperature may reduce range by up to 20%".to_string());
    }
    if input.elevation_change > 200.0 {
        recommendations.push(
            "Significant uphill driving detected - reduce speed to conserve energy".to_string(),
        );
    }
    if input.wind_speed > 20.0 {
        recommendations
            .push("High wind conditions - consider alternative route if available".to_string());
    }
    if input.battery_soh < 80.0 {
        recommendations
            .push("Battery health below optimal - consider replacement soon".to_string());
    }
    if predicted_range < input.distance_km {
        recommendations
            .push("Insufficient range for destination - charging stop required".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Route optimized for maximum efficiency".to_string());
    }

    recommendations
}

fn forest_params(n_trees: u16, max_depth: u16, seed: u64) -> RandomForestRegressorParameters {
    RandomForestRegressorParameters {
        max_depth: Some(max_depth),
        min_samples_leaf: 2,
        min_samples_split: 5,
        n_trees: n_trees.into(),
        m: None,
        keep_samples: false,
        seed,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
