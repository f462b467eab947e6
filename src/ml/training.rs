//! Synthetic training data and model evaluation.
//!
//! The demo deployment has no telemetry archive to train against, so both
//! models are fitted on generated samples whose targets follow simple
//! physical relationships plus Gaussian noise. The seeded RNG keeps training
//! reproducible across restarts.

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::ValidationMetrics;
use crate::config::MlConfig;

pub struct SyntheticDataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub feature_names: Vec<String>,
}

impl SyntheticDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Battery degradation samples: SOH falls with cycle count and calendar age.
pub fn synthesize_health_dataset(cfg: &MlConfig) -> SyntheticDataset {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let noise = Normal::new(0.0, 5.0).expect("valid normal distribution");

    let mut features = Vec::with_capacity(cfg.training_samples);
    let mut targets = Vec::with_capacity(cfg.training_samples);

    for _ in 0..cfg.training_samples {
        let soc = rng.gen::<f64>() * 100.0;
        let cycles = rng.gen::<f64>() * 3000.0;
        let temperature = rng.gen::<f64>() * 60.0 + 10.0;
        let age_days = rng.gen::<f64>() * 1000.0;
        let voltage = rng.gen::<f64>() * 1.5 + 3.0;

        let soh = (100.0 - (cycles / 30.0 + age_days / 20.0) + noise.sample(&mut rng))
            .clamp(20.0, 100.0);

        features.push(vec![soc, cycles, temperature, age_days, voltage]);
        targets.push(soh);
    }

    SyntheticDataset {
        features,
        targets,
        feature_names: ["soc", "cycle_count", "temperature", "age_days", "voltage"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

/// Range samples: battery state sets the base range, then temperature,
/// elevation and wind shave it down.
pub fn synthesize_range_dataset(cfg: &MlConfig) -> SyntheticDataset {
    let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(1));
    let noise = Normal::new(0.0, 10.0).expect("valid normal distribution");

    let mut features = Vec::with_capacity(cfg.training_samples);
    let mut targets = Vec::with_capacity(cfg.training_samples);

    for _ in 0..cfg.training_samples {
        let soc = rng.gen::<f64>() * 100.0;
        let soh = rng.gen::<f64>() * 100.0;
        let distance = rng.gen::<f64>() * 500.0;
        let elevation = (rng.gen::<f64>() - 0.5) * 1000.0;
        let temperature = rng.gen::<f64>() * 40.0 - 10.0;
        let wind = rng.gen::<f64>() * 30.0;

        let base_range = soc * soh / 100.0 * 3.0;
        let temp_factor = 1.0 - (temperature - 20.0).abs() / 100.0;
        let elevation_factor = 1.0 - elevation.abs() / 2000.0;
        let wind_factor = 1.0 - wind / 100.0;

        let range = (base_range * temp_factor * elevation_factor * wind_factor
            + noise.sample(&mut rng))
        .clamp(10.0, 400.0);

        features.push(vec![soc, soh, distance, elevation, temperature, wind]);
        targets.push(range);
    }

    SyntheticDataset {
        features,
        targets,
        feature_names: [
            "battery_soc",
            "battery_soh",
            "distance_km",
            "elevation_change",
            "weather_temp",
            "wind_speed",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    }
}

pub fn calculate_metrics(predictions: &[f64], targets: &[f64]) -> Result<ValidationMetrics> {
    if predictions.len() != targets.len() {
        anyhow::bail!("Prediction and target count mismatch");
    }

    if predictions.is_empty() {
        anyhow::bail!("No predictions to evaluate");
    }

    let n = predictions.len() as f64;

    let mae: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / n;

    let mse: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n;
    let rmse = mse.sqrt();

    let mape: f64 = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(_, t)| t.abs() > 1e-10)
        .map(|(p, t)| ((p - t) / t).abs() * 100.0)
        .sum::<f64>()
        / n;

    let mean_target: f64 = targets.iter().sum::<f64>() / n;
    let ss_tot: f64 = targets.iter().map(|t| (t - mean_target).powi(2)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (t - p).powi(2))
        .sum();

    let r2 = if ss_tot.abs() < 1e-10 {
        0.0
    } else {
        1.0 - (ss_res / ss_tot)
    };

    Ok(ValidationMetrics::new(mae, rmse, mape, r2))
}
