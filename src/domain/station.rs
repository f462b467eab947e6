//! Swap station domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Active,
    Maintenance,
    Offline,
    Planned,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
            Self::Planned => "planned",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    Urban,
    Highway,
    Rural,
    Commercial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationCapacity {
    pub total_slots: u32,
    pub available_slots: u32,
    pub charging_slots: u32,
    pub maintenance_slots: u32,
    pub battery_inventory: u32,
    pub healthy_batteries: u32,
    pub degraded_batteries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalMetrics {
    pub daily_swaps: u32,
    pub monthly_swaps: u32,
    pub average_swap_time_seconds: f64,
    /// 0-1
    pub utilization_rate: f64,
    /// 0-5
    pub customer_satisfaction: f64,
    pub uptime_percentage: f64,
    pub energy_consumption_kwh: f64,
    pub carbon_footprint_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub location: Location,
    pub station_type: StationType,
    pub status: StationStatus,
    pub capacity: StationCapacity,
    pub metrics: OperationalMetrics,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub operating_hours: BTreeMap<String, String>,
    #[serde(default)]
    pub contact_info: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Station {
    /// Build a newly planned station from a create request.
    ///
    /// Roughly 30 % of slots start wired for charging, two slots are held
    /// back for maintenance, and the full inventory counts as healthy.
    pub fn planned(req: StationCreate, now: DateTime<Utc>) -> Self {
        let total = req.total_slots;
        Self {
            station_id: req.station_id,
            name: req.name,
            location: req.location,
            station_type: req.station_type,
            status: StationStatus::Planned,
            capacity: StationCapacity {
                total_slots: total,
                available_slots: total,
                charging_slots: (total as f64 * 0.3) as u32,
                maintenance_slots: 2,
                battery_inventory: total,
                healthy_batteries: total,
                degraded_batteries: 0,
            },
            metrics: OperationalMetrics {
                daily_swaps: 0,
                monthly_swaps: 0,
                average_swap_time_seconds: 120.0,
                utilization_rate: 0.0,
                customer_satisfaction: 5.0,
                uptime_percentage: 100.0,
                energy_consumption_kwh: 0.0,
                carbon_footprint_kg: 0.0,
            },
            amenities: Vec::new(),
            operating_hours: BTreeMap::new(),
            contact_info: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StationCreate {
    #[validate(length(min = 1, max = 64))]
    pub station_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub location: Location,
    pub station_type: StationType,
    #[validate(range(min = 1, max = 500))]
    pub total_slots: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StationUpdate {
    pub name: Option<String>,
    pub status: Option<StationStatus>,
    pub capacity: Option<StationCapacity>,
    pub amenities: Option<Vec<String>>,
    pub operating_hours: Option<BTreeMap<String, String>>,
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_min_slots() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StationSearch {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    #[validate(range(min = 0.1, max = 1000.0))]
    pub radius_km: f64,
    pub station_type: Option<StationType>,
    #[serde(default = "default_min_slots")]
    pub min_available_slots: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationSearchResult {
    pub station: Station,
    pub distance_km: f64,
    pub estimated_travel_time_minutes: f64,
    /// 0-1
    pub availability_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_wait_time_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationAnalytics {
    pub station_id: String,
    pub performance_metrics: OperationalMetrics,
    /// Hour of day (as string key) -> predicted demand 0-1
    pub demand_forecast: BTreeMap<String, f64>,
    pub optimization_recommendations: Vec<String>,
    pub roi_metrics: BTreeMap<String, f64>,
}

fn default_target_coverage() -> f64 {
    50.0
}

fn default_min_stations() -> u32 {
    1
}

fn default_max_stations() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationPlacementRequest {
    /// Region polygon as (lat, lon) pairs
    pub region_bounds: Vec<(f64, f64)>,
    #[serde(default = "default_target_coverage")]
    pub target_coverage_km: f64,
    #[serde(default = "default_min_stations")]
    pub min_stations: u32,
    #[serde(default = "default_max_stations")]
    pub max_stations: u32,
    pub population_data: Option<serde_json::Value>,
    pub traffic_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationPlacementResponse {
    pub recommended_locations: Vec<Location>,
    pub coverage_analysis: BTreeMap<String, f64>,
    pub demand_predictions: Vec<f64>,
    pub investment_requirements: Vec<f64>,
    pub roi_projections: Vec<f64>,
    pub optimization_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridIntegration {
    pub renewable_energy_percentage: f64,
    /// 0-10
    pub grid_stability_score: f64,
    pub peak_load_management: bool,
    pub v2g_capability: bool,
    /// kg CO2 per kWh
    pub carbon_intensity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_station_capacity_split() {
        let now = Utc::now();
        let station = Station::planned(
            StationCreate {
                station_id: "STN010".to_string(),
                name: "Test Hub".to_string(),
                location: Location {
                    lat: 19.0,
                    lon: 72.8,
                    address: "Test Rd".to_string(),
                    city: "Mumbai".to_string(),
                    state: "Maharashtra".to_string(),
                    country: "India".to_string(),
                    postal_code: None,
                },
                station_type: StationType::Urban,
                total_slots: 20,
            },
            now,
        );

        assert_eq!(station.status, StationStatus::Planned);
        assert_eq!(station.capacity.charging_slots, 6);
        assert_eq!(station.capacity.maintenance_slots, 2);
        assert_eq!(station.capacity.healthy_batteries, 20);
        assert_eq!(station.metrics.utilization_rate, 0.0);
        assert_eq!(station.metrics.uptime_percentage, 100.0);
    }

    #[test]
    fn test_search_defaults() {
        let search: StationSearch =
            serde_json::from_str(r#"{"lat": 19.0, "lon": 72.8}"#).unwrap();
        assert_eq!(search.radius_km, 10.0);
        assert_eq!(search.min_available_slots, 1);
        assert!(search.station_type.is_none());
    }
}
