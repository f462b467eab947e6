//! Station management endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use super::response::ApiResponse;
use crate::analysis::{optimize_placement, polygon_area_km2, RegionProfile};
use crate::auth::{AdminUser, CurrentUser, OperatorUser};
use crate::domain::{
    GridIntegration, Location, Station, StationAnalytics, StationCreate, StationPlacementRequest,
    StationPlacementResponse, StationSearch, StationSearchResult, StationStatus, StationType,
    StationUpdate,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stations).post(create_station))
        .route("/search", post(search_stations))
        .route("/placement/optimize", post(optimize_station_placement))
        .route("/:station_id", get(get_station).put(update_station))
        .route("/:station_id/analytics", get(station_analytics))
        .route("/:station_id/grid-integration", get(grid_integration))
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct StationListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub station_type: Option<StationType>,
    pub status: Option<StationStatus>,
    pub city: Option<String>,
}

async fn list_stations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<StationListQuery>,
) -> Result<Json<Vec<Station>>, ApiError> {
    if query.limit == 0 || query.limit > 1000 {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }

    let stations = state
        .cached_stations()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let filtered: Vec<Station> = stations
        .into_iter()
        .filter(|s| {
            query
                .station_type
                .map(|t| s.station_type == t)
                .unwrap_or(true)
        })
        .filter(|s| query.status.map(|st| s.status == st).unwrap_or(true))
        .filter(|s| {
            query
                .city
                .as_ref()
                .map(|c| s.location.city.eq_ignore_ascii_case(c))
                .unwrap_or(true)
        })
        .skip(query.skip)
        .take(query.limit)
        .collect();

    info!(count = filtered.len(), user = %user.username, "stations retrieved");
    Ok(Json(filtered))
}

async fn get_station(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(station_id): Path<String>,
) -> Result<Json<Station>, ApiError> {
    state
        .store
        .get_station(&station_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Station {station_id}")))
}

async fn create_station(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Json(req): Json<StationCreate>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    req.validate()?;

    if state
        .store
        .get_station(&req.station_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::Conflict("Station already exists".to_string()));
    }

    let station = Station::planned(req, Utc::now());
    let station_id = station.station_id.clone();

    state
        .store
        .insert_station(station)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    state.station_cache.invalidate().await;

    info!(station_id = %station_id, user = %user.username, "station created");

    Ok(ApiResponse::success(
        "Station created successfully",
        json!({ "station_id": station_id }),
    ))
}

async fn update_station(
    State(state): State<AppState>,
    OperatorUser(user): OperatorUser,
    Path(station_id): Path<String>,
    Json(req): Json<StationUpdate>,
) -> Result<ApiResponse<()>, ApiError> {
    let mut station = state
        .store
        .get_station(&station_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Station {station_id}")))?;

    if let Some(name) = req.name {
        station.name = name;
    }
    if let Some(status) = req.status {
        station.status = status;
    }
    if let Some(capacity) = req.capacity {
        station.capacity = capacity;
    }
    if let Some(amenities) = req.amenities {
        station.amenities = amenities;
    }
    if let Some(operating_hours) = req.operating_hours {
        station.operating_hours = operating_hours;
    }
    station.updated_at = Utc::now();

    state
        .store
        .update_station(station)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    state.station_cache.invalidate().await;

    info!(station_id = %station_id, user = %user.username, "station updated");
    Ok(ApiResponse::message("Station updated successfully"))
}

/// Equirectangular distance is accurate enough at city scale.
fn approx_distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let lat_diff = (lat_a - lat_b).abs();
    let lon_diff = (lon_a - lon_b).abs();
    (lat_diff.powi(2) + lon_diff.powi(2)).sqrt() * 111.0
}

async fn search_stations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(search): Json<StationSearch>,
) -> Result<Json<Vec<StationSearchResult>>, ApiError> {
    search.validate()?;

    let stations = state
        .cached_stations()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut results: Vec<StationSearchResult> = stations
        .into_iter()
        .filter_map(|station| {
            let distance =
                approx_distance_km(station.location.lat, station.location.lon, search.lat, search.lon);

            if distance > search.radius_km {
                return None;
            }
            if let Some(wanted) = search.station_type {
                if station.station_type != wanted {
                    return None;
                }
            }
            if station.capacity.available_slots < search.min_available_slots {
                return None;
            }

            let availability_score =
                station.capacity.available_slots as f64 / station.capacity.total_slots.max(1) as f64;
            // Rough 50 km/h average for travel time
            let travel_time = distance / 50.0 * 60.0;

            Some(StationSearchResult {
                station,
                distance_km: round2(distance),
                estimated_travel_time_minutes: round1(travel_time),
                availability_score: round2(availability_score),
                current_wait_time_minutes: Some(if availability_score < 0.3 { 5.0 } else { 0.0 }),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(
        count = results.len(),
        radius_km = search.radius_km,
        user = %user.username,
        "station search completed"
    );
    Ok(Json(results))
}

async fn station_analytics(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(station_id): Path<String>,
) -> Result<Json<StationAnalytics>, ApiError> {
    let station = state
        .store
        .get_station(&station_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Station {station_id}")))?;

    // Morning and evening commute peaks
    let mut demand_forecast = BTreeMap::new();
    for hour in 0..24u32 {
        let demand = if (6..=10).contains(&hour) || (17..=20).contains(&hour) {
            0.8 + (hour % 3) as f64 * 0.1
        } else {
            0.3 + (hour % 4) as f64 * 0.05
        };
        demand_forecast.insert(hour.to_string(), round2(demand));
    }

    let recommendations = vec![
        "Consider adding 2 more charging slots during peak hours".to_string(),
        "Battery inventory is optimal for current demand".to_string(),
        "Upgrade to faster charging equipment could reduce wait times".to_string(),
        "Install solar panels to reduce grid dependency".to_string(),
    ];

    let roi_metrics = BTreeMap::from([
        ("monthly_revenue".to_string(), 45_000.0),
        ("operating_costs".to_string(), 32_000.0),
        ("profit_margin".to_string(), 0.29),
        ("payback_period_months".to_string(), 18.5),
        ("roi_percentage".to_string(), 156.3),
    ]);

    let analytics = StationAnalytics {
        station_id,
        performance_metrics: station.metrics,
        demand_forecast,
        optimization_recommendations: recommendations,
        roi_metrics,
    };

    Ok(Json(analytics))
}

async fn optimize_station_placement(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(req): Json<StationPlacementRequest>,
) -> Result<Json<StationPlacementResponse>, ApiError> {
    let area_km2 = polygon_area_km2(&req.region_bounds);

    let population_density = req
        .population_data
        .as_ref()
        .and_then(|v| v.get("density"))
        .and_then(|v| v.as_f64())
        .unwrap_or(100.0);
    let traffic_volume = req
        .traffic_data
        .as_ref()
        .and_then(|v| v.get("daily_volume"))
        .and_then(|v| v.as_f64())
        .unwrap_or(5000.0);

    let existing_stations = state
        .cached_stations()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .len() as u32;

    let plan = optimize_placement(&RegionProfile {
        area_km2,
        population_density,
        traffic_volume,
        existing_stations,
    });

    let origin = req
        .region_bounds
        .first()
        .copied()
        .ok_or_else(|| ApiError::BadRequest("region_bounds must not be empty".to_string()))?;

    let count = req.max_stations.min(plan.analysis.recommended_new) as usize;
    let recommended_locations: Vec<Location> = (0..count)
        .map(|i| Location {
            lat: origin.0 + (i as f64) * 0.01,
            lon: origin.1 + (i as f64) * 0.01,
            address: format!("Optimal Location {}", i + 1),
            city: "Region City".to_string(),
            state: "Region State".to_string(),
            country: "India".to_string(),
            postal_code: None,
        })
        .collect();

    let coverage_analysis = BTreeMap::from([
        ("current_coverage_percent".to_string(), 45.2),
        (
            "projected_coverage_percent".to_string(),
            plan.projections.coverage_improvement_percent,
        ),
        ("population_served".to_string(), 125_000.0),
        ("underserved_areas".to_string(), 3.0),
    ]);

    let demand_predictions: Vec<f64> = [150.5, 89.3, 203.7, 156.8, 178.2]
        .into_iter()
        .take(count)
        .collect();
    let investment_requirements = vec![250_000.0; count];
    let roi_projections = vec![plan.projections.roi_payback_years; count];

    let response = StationPlacementResponse {
        recommended_locations,
        coverage_analysis,
        demand_predictions,
        investment_requirements,
        roi_projections,
        optimization_score: 85.7,
    };

    info!(locations = count, "station placement optimization completed");
    Ok(Json(response))
}

async fn grid_integration(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(station_id): Path<String>,
) -> Result<Json<GridIntegration>, ApiError> {
    state
        .store
        .get_station(&station_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Station {station_id}")))?;

    Ok(Json(GridIntegration {
        renewable_energy_percentage: 65.3,
        grid_stability_score: 8.7,
        peak_load_management: true,
        v2g_capability: true,
        carbon_intensity: 0.45,
    }))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
