//! Route optimization domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
}

impl WeatherCondition {
    /// Map an OpenWeatherMap `main` group onto our coarse conditions.
    pub fn from_owm_main(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clouds" | "mist" | "fog" | "haze" => Self::Cloudy,
            "rain" | "drizzle" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" | "squall" | "tornado" => Self::Storm,
            _ => Self::Clear,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Flat,
    Hilly,
    Mountainous,
    Urban,
    Highway,
}

fn default_soh() -> f64 {
    90.0
}

fn default_efficiency() -> f64 {
    0.2
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RouteOptimizationRequest {
    #[validate(length(min = 1))]
    pub origin: String,
    #[validate(length(min = 1))]
    pub destination: String,
    /// Current state of charge, 0-100 %
    #[validate(range(min = 0.0, max = 100.0))]
    pub battery_soc: f64,
    #[serde(default = "default_soh")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub battery_soh: f64,
    /// kWh per km
    #[serde(default = "default_efficiency")]
    pub vehicle_efficiency: f64,
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherData {
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub condition: WeatherCondition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElevationPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub distance_from_start: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSegment {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub distance_km: f64,
    pub terrain_type: TerrainType,
    pub elevation_change: f64,
    pub estimated_energy_consumption: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteOptimizationResponse {
    pub route_id: String,
    pub origin: String,
    pub destination: String,
    pub total_distance_km: f64,
    pub estimated_duration_minutes: f64,
    pub estimated_energy_consumption_kwh: f64,
    pub estimated_range_remaining_km: f64,
    pub confidence_score: f64,
    /// Encoded polyline
    pub route_polyline: String,
    pub segments: Vec<RouteSegment>,
    pub elevation_profile: Vec<ElevationPoint>,
    pub weather_conditions: Vec<WeatherData>,
    pub recommended_charging_stops: Vec<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RangeAnalysisRequest {
    #[validate(range(min = 0.0, max = 100.0))]
    pub battery_soc: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub battery_soh: f64,
    #[validate(range(min = 0.0))]
    pub route_distance_km: f64,
    #[serde(default)]
    pub terrain_data: Vec<serde_json::Value>,
    pub weather_data: Option<serde_json::Value>,
    #[serde(default = "default_efficiency")]
    pub vehicle_efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeAnalysisResponse {
    pub predicted_range_km: f64,
    /// (min, max) range
    pub confidence_interval: (f64, f64),
    pub energy_consumption_breakdown: BTreeMap<String, f64>,
    /// Factor name -> impact on range
    pub range_factors: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TerrainAnalysisRequest {
    /// (lat, lon) pairs along the route
    #[validate(length(min = 2))]
    pub route_points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TerrainAnalysisResponse {
    pub elevation_profile: Vec<ElevationPoint>,
    pub total_elevation_gain: f64,
    pub total_elevation_loss: f64,
    pub max_grade: f64,
    pub avg_grade: f64,
    /// 0-10
    pub terrain_difficulty_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationMetrics {
    pub standard_prediction_accuracy: f64,
    pub ml_enhanced_accuracy: f64,
    pub energy_saving_percentage: f64,
    pub route_optimization_improvement: f64,
    pub user_satisfaction_score: f64,
}

/// Persisted summary of an optimized route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    pub from_location: String,
    pub to_location: String,
    pub distance: f64,
    pub elevation_gain: f64,
    pub predicted_range: f64,
    pub confidence: f64,
    pub weather_impact: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owm_condition_mapping() {
        assert_eq!(WeatherCondition::from_owm_main("Clear"), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_owm_main("Clouds"), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_owm_main("Drizzle"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_owm_main("Thunderstorm"), WeatherCondition::Storm);
        assert_eq!(WeatherCondition::from_owm_main("unknown"), WeatherCondition::Clear);
    }

    #[test]
    fn test_request_defaults() {
        let req: RouteOptimizationRequest = serde_json::from_str(
            r#"{"origin": "Mumbai", "destination": "Pune", "battery_soc": 80.0}"#,
        )
        .unwrap();
        assert_eq!(req.battery_soh, 90.0);
        assert_eq!(req.vehicle_efficiency, 0.2);
    }

    #[test]
    fn test_terrain_request_validation() {
        let req = TerrainAnalysisRequest {
            route_points: vec![(19.0, 72.8)],
        };
        assert!(req.validate().is_err());
    }
}
