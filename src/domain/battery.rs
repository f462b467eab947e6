//! Battery fleet domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatteryStatus {
    Healthy,
    Degraded,
    Maintenance,
    Retired,
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Maintenance => "maintenance",
            Self::Retired => "retired",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for BatteryStatus {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            "maintenance" => Ok(Self::Maintenance),
            "retired" => Ok(Self::Retired),
            _ => Err("invalid status; expected healthy|degraded|maintenance|retired"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwapRecommendation {
    Recommended,
    Caution,
    NotRecommended,
}

/// Instantaneous electrical and degradation readings for one pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryHealth {
    /// State of charge, 0-100 %
    pub soc: f64,
    /// State of health, 0-100 %
    pub soh: f64,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub cycle_count: u32,
    pub capacity_remaining: f64,
    pub internal_resistance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryMetrics {
    pub health: BatteryHealth,
    pub status: BatteryStatus,
    pub swap_recommendation: SwapRecommendation,
    pub confidence_score: f64,
    pub predicted_range_km: f64,
    pub estimated_life_remaining_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battery {
    pub battery_id: String,
    pub station_id: String,
    pub manufacturer: String,
    pub model: String,
    pub chemistry: String,
    pub capacity_kwh: f64,
    pub manufacturing_date: DateTime<Utc>,
    pub first_use_date: Option<DateTime<Utc>>,
    pub current_location: Option<String>,
    pub metrics: BatteryMetrics,
    #[serde(default)]
    pub maintenance_history: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Battery {
    /// Days since the pack left the factory.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.manufacturing_date).num_days()
    }

    /// Build a new record from a create request with pristine metrics.
    pub fn pristine(req: BatteryCreate, now: DateTime<Utc>) -> Self {
        let capacity_kwh = req.capacity_kwh;
        Self {
            battery_id: req.battery_id,
            station_id: req.station_id,
            manufacturer: req.manufacturer,
            model: req.model,
            chemistry: req.chemistry,
            capacity_kwh,
            manufacturing_date: req.manufacturing_date,
            first_use_date: None,
            current_location: None,
            metrics: BatteryMetrics {
                health: BatteryHealth {
                    soc: 100.0,
                    soh: 100.0,
                    voltage: 3.7,
                    current: 0.0,
                    temperature: 25.0,
                    cycle_count: 0,
                    capacity_remaining: capacity_kwh,
                    internal_resistance: 0.1,
                },
                status: BatteryStatus::Healthy,
                swap_recommendation: SwapRecommendation::Recommended,
                confidence_score: 95.0,
                predicted_range_km: 200.0,
                estimated_life_remaining_days: 2000,
            },
            maintenance_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_chemistry() -> String {
    "LiFePO4".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatteryCreate {
    #[validate(length(min = 1, max = 64))]
    pub battery_id: String,
    #[validate(length(min = 1, max = 64))]
    pub station_id: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(default = "default_chemistry")]
    pub chemistry: String,
    #[validate(range(min = 0.1, max = 1000.0))]
    pub capacity_kwh: f64,
    pub manufacturing_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BatteryUpdate {
    pub station_id: Option<String>,
    pub current_location: Option<String>,
    pub metrics: Option<BatteryMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthPredictionRequest {
    #[serde(default = "default_prediction_days")]
    pub prediction_days: u16,
}

fn default_prediction_days() -> u16 {
    7
}

#[derive(Debug, Clone, Serialize)]
pub struct DegradationPoint {
    pub day: u16,
    pub predicted_soh: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthPredictionResponse {
    pub battery_id: String,
    pub current_health: BatteryHealth,
    pub predictions: Vec<DegradationPoint>,
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapRequest {
    pub old_battery_id: String,
    pub new_battery_id: String,
    pub station_id: String,
    pub user_id: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapResponse {
    pub swap_id: String,
    pub recommendation: SwapRecommendation,
    pub old_battery_health: f64,
    pub new_battery_health: f64,
    pub estimated_range_improvement: f64,
    pub confidence_score: f64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircularEconomyMetrics {
    pub total_batteries: usize,
    pub active_batteries: usize,
    pub batteries_in_second_life: usize,
    pub batteries_recycled: usize,
    /// Material name -> recoverable kilograms
    pub material_recovery_rate: BTreeMap<String, f64>,
    pub carbon_footprint_saved_kg: f64,
    pub energy_recovery_efficiency: f64,
}
