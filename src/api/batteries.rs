//! Battery management endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use super::response::ApiResponse;
use crate::analysis::{analyze_fleet, FleetBattery};
use crate::auth::{CurrentUser, OperatorUser};
use crate::domain::{
    Battery, BatteryCreate, BatteryStatus, BatteryUpdate, CircularEconomyMetrics,
    HealthPredictionRequest, HealthPredictionResponse, SwapRecommendation, SwapRequest,
    SwapResponse,
};
use crate::ml::HealthInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_batteries).post(create_battery))
        .route("/:battery_id", get(get_battery).put(update_battery))
        .route("/:battery_id/health-prediction", post(predict_health))
        .route("/swap/analyze", post(analyze_swap))
        .route("/analytics/circular-economy", get(circular_economy))
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct BatteryListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub station_id: Option<String>,
    pub status: Option<BatteryStatus>,
}

async fn list_batteries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BatteryListQuery>,
) -> Result<Json<Vec<Battery>>, ApiError> {
    if query.limit == 0 || query.limit > 1000 {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }

    let batteries = state
        .cached_batteries()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let filtered: Vec<Battery> = batteries
        .into_iter()
        .filter(|b| {
            query
                .station_id
                .as_ref()
                .map(|id| &b.station_id == id)
                .unwrap_or(true)
        })
        .filter(|b| query.status.map(|s| b.metrics.status == s).unwrap_or(true))
        .skip(query.skip)
        .take(query.limit)
        .collect();

    info!(count = filtered.len(), user = %user.username, "batteries retrieved");
    Ok(Json(filtered))
}

async fn get_battery(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(battery_id): Path<String>,
) -> Result<Json<Battery>, ApiError> {
    state
        .store
        .get_battery(&battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Battery {battery_id}")))
}

async fn create_battery(
    State(state): State<AppState>,
    OperatorUser(user): OperatorUser,
    Json(req): Json<BatteryCreate>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    req.validate()?;

    if state
        .store
        .get_battery(&req.battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::Conflict("Battery already exists".to_string()));
    }

    let battery = Battery::pristine(req, Utc::now());
    let battery_id = battery.battery_id.clone();

    state
        .store
        .insert_battery(battery)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    state.battery_cache.invalidate().await;

    info!(battery_id = %battery_id, user = %user.username, "battery created");

    Ok(ApiResponse::success(
        "Battery created successfully",
        json!({ "battery_id": battery_id }),
    ))
}

async fn update_battery(
    State(state): State<AppState>,
    OperatorUser(user): OperatorUser,
    Path(battery_id): Path<String>,
    Json(req): Json<BatteryUpdate>,
) -> Result<ApiResponse<()>, ApiError> {
    let mut battery = state
        .store
        .get_battery(&battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Battery {battery_id}")))?;

    if let Some(station_id) = req.station_id {
        battery.station_id = station_id;
    }
    if let Some(location) = req.current_location {
        battery.current_location = Some(location);
    }
    if let Some(metrics) = req.metrics {
        battery.metrics = metrics;
    }
    battery.updated_at = Utc::now();

    state
        .store
        .update_battery(battery)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    state.battery_cache.invalidate().await;

    info!(battery_id = %battery_id, user = %user.username, "battery updated");
    Ok(ApiResponse::message("Battery updated successfully"))
}

async fn predict_health(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(battery_id): Path<String>,
    Json(req): Json<HealthPredictionRequest>,
) -> Result<Json<HealthPredictionResponse>, ApiError> {
    let _ = req.prediction_days;

    let battery = state
        .store
        .get_battery(&battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Battery {battery_id}")))?;

    let health = &battery.metrics.health;
    let prediction = state.ml.predict_health(&HealthInput {
        soc: health.soc,
        cycle_count: health.cycle_count as f64,
        temperature: health.temperature,
        age_days: battery.age_days(Utc::now()) as f64,
        voltage: health.voltage,
    });

    let recommendation_label = match prediction.swap_recommendation {
        SwapRecommendation::Recommended => "recommended",
        SwapRecommendation::Caution => "caution",
        SwapRecommendation::NotRecommended => "not_recommended",
    };

    let response = HealthPredictionResponse {
        battery_id: battery.battery_id.clone(),
        current_health: battery.metrics.health.clone(),
        predictions: prediction.degradation_forecast,
        confidence: prediction.confidence,
        recommendations: vec![
            format!("Current SOH: {}%", prediction.current_soh),
            format!("Swap recommendation: {recommendation_label}"),
            "Monitor temperature and charging patterns".to_string(),
        ],
    };

    info!(battery_id = %battery_id, "health prediction generated");
    Ok(Json(response))
}

async fn analyze_swap(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, ApiError> {
    let old_battery = state
        .store
        .get_battery(&req.old_battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let new_battery = state
        .store
        .get_battery(&req.new_battery_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let (old_battery, new_battery) = match (old_battery, new_battery) {
        (Some(old), Some(new)) => (old, new),
        _ => {
            return Err(ApiError::NotFound(
                "One or both batteries not found".to_string(),
            ))
        }
    };

    let old_health = old_battery.metrics.health.soh;
    let new_health = new_battery.metrics.health.soh;
    let health_improvement = new_health - old_health;

    // Rough estimate: 2 km of range per 1% SOH
    let range_improvement = health_improvement * 2.0;

    let (recommendation, confidence, warnings) = if health_improvement >= 20.0 {
        (SwapRecommendation::Recommended, 95.0, vec![])
    } else if health_improvement >= 10.0 {
        (
            SwapRecommendation::Caution,
            75.0,
            vec!["Moderate improvement expected".to_string()],
        )
    } else {
        (
            SwapRecommendation::NotRecommended,
            60.0,
            vec![
                "Minimal improvement expected".to_string(),
                "Consider keeping current battery".to_string(),
            ],
        )
    };

    let response = SwapResponse {
        swap_id: format!("swap_{}", Utc::now().timestamp()),
        recommendation,
        old_battery_health: old_health,
        new_battery_health: new_health,
        estimated_range_improvement: range_improvement,
        confidence_score: confidence,
        warnings,
    };

    info!(user = %user.username, "swap analysis completed");
    Ok(Json(response))
}

async fn circular_economy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CircularEconomyMetrics>, ApiError> {
    let now = Utc::now();
    let fleet: Vec<FleetBattery> = state
        .cached_batteries()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .iter()
        .map(|b| FleetBattery {
            soh: b.metrics.health.soh,
            capacity_kwh: b.capacity_kwh,
            age_days: b.age_days(now),
        })
        .collect();

    let analysis = analyze_fleet(&fleet)
        .ok_or_else(|| ApiError::BadRequest("No battery data available".to_string()))?;

    let metrics = CircularEconomyMetrics {
        total_batteries: analysis.total_batteries,
        active_batteries: analysis.health_distribution.healthy,
        batteries_in_second_life: analysis.health_distribution.degraded,
        batteries_recycled: analysis.health_distribution.end_of_life,
        material_recovery_rate: analysis.recovery_potential,
        carbon_footprint_saved_kg: analysis.carbon_impact.total_savings_tons * 1000.0,
        energy_recovery_efficiency: 0.85,
    };

    info!(user = %user.username, "circular economy metrics retrieved");
    Ok(Json(metrics))
}
