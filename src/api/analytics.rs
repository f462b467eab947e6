//! Analytics and reporting endpoints.
//!
//! Aggregates here are demo dashboards: KPI blocks and trend series with
//! fixed baselines plus deterministic ramps, matching what the frontend
//! charts expect.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

use super::error::ApiError;
use crate::auth::{CurrentUser, OperatorUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/battery-health-summary", get(battery_health_summary))
        .route("/range-prediction-analytics", get(range_prediction_analytics))
        .route("/circular-economy-metrics", get(circular_economy_metrics))
        .route("/station-performance", get(station_performance))
        .route("/system-status", get(system_status))
        .route("/generate-report", post(generate_report))
}

#[derive(Debug, Serialize)]
struct AnalyticsResponse {
    total_batteries: u32,
    active_stations: u32,
    daily_swaps: u32,
    average_health_score: f64,
    energy_saved_kwh: f64,
    carbon_reduced_kg: f64,
    health_distribution: BTreeMap<String, u32>,
    station_utilization: BTreeMap<String, f64>,
    performance_metrics: BTreeMap<String, f64>,
    trends: BTreeMap<String, Vec<f64>>,
}

async fn dashboard(
    CurrentUser(user): CurrentUser,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let analytics = AnalyticsResponse {
        total_batteries: 1247,
        active_stations: 156,
        daily_swaps: 2834,
        average_health_score: 89.3,
        energy_saved_kwh: 12450.5,
        carbon_reduced_kg: 2340.8,
        health_distribution: BTreeMap::from([
            // Buckets by SOH: >90, 70-90, 50-70, <50
            ("excellent".to_string(), 45),
            ("good".to_string(), 30),
            ("fair".to_string(), 20),
            ("poor".to_string(), 5),
        ]),
        station_utilization: BTreeMap::from([
            ("STN001".to_string(), 0.85),
            ("STN002".to_string(), 0.72),
            ("STN003".to_string(), 0.68),
            ("STN004".to_string(), 0.91),
            ("STN005".to_string(), 0.56),
        ]),
        performance_metrics: BTreeMap::from([
            ("battery_life_extension_percent".to_string(), 15.3),
            ("range_prediction_accuracy".to_string(), 92.5),
            ("swap_success_rate".to_string(), 98.7),
            ("customer_satisfaction".to_string(), 4.6),
            ("cost_reduction_percent".to_string(), 23.8),
            ("energy_efficiency_improvement".to_string(), 18.2),
        ]),
        trends: BTreeMap::from([
            (
                "daily_swaps".to_string(),
                vec![2650.0, 2720.0, 2834.0, 2690.0, 2890.0, 2834.0, 2945.0],
            ),
            (
                "battery_health".to_string(),
                vec![89.8, 89.6, 89.4, 89.3, 89.3, 89.3, 89.3],
            ),
            (
                "energy_consumption".to_string(),
                vec![11200.0, 11450.0, 11890.0, 12100.0, 12340.0, 12450.0, 12650.0],
            ),
            (
                "customer_satisfaction".to_string(),
                vec![4.5, 4.6, 4.5, 4.6, 4.7, 4.6, 4.6],
            ),
        ]),
    };

    info!(user = %user.username, "dashboard analytics retrieved");
    Ok(Json(analytics))
}

async fn battery_health_summary(
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = json!({
        "total_batteries": 1247,
        "health_categories": {
            "excellent": {"count": 561, "percentage": 45.0, "avg_soh": 95.2},
            "good": {"count": 374, "percentage": 30.0, "avg_soh": 82.1},
            "fair": {"count": 249, "percentage": 20.0, "avg_soh": 63.5},
            "poor": {"count": 63, "percentage": 5.0, "avg_soh": 42.3},
        },
        "aging_analysis": {
            "avg_age_months": 18.5,
            "avg_cycle_count": 1234,
            "degradation_rate_per_month": 0.8,
            "projected_replacement_timeline": {
                "next_30_days": 12,
                "next_90_days": 45,
                "next_180_days": 89,
                "next_365_days": 178,
            },
        },
        "performance_metrics": {
            "prediction_accuracy": 94.7,
            "health_improvement_actions": 23,
            "preventive_maintenance_alerts": 8,
            "optimization_opportunities": 15,
        },
    });

    info!(user = %user.username, "battery health summary retrieved");
    Ok(Json(json!({ "success": true, "data": summary })))
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
struct RangeAnalyticsQuery {
    #[serde(default = "default_days")]
    days: u32,
}

async fn range_prediction_analytics(
    CurrentUser(_user): CurrentUser,
    Query(query): Query<RangeAnalyticsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !(1..=30).contains(&query.days) {
        return Err(ApiError::BadRequest(
            "days must be between 1 and 30".to_string(),
        ));
    }

    let days = query.days as i64;
    let daily_breakdown: Vec<serde_json::Value> = (0..days)
        .map(|i| {
            let date = Utc::now() - Duration::days(days - i - 1);
            let idx = i as f64;
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "total_predictions": 450 + i * 23,
                "accuracy_percent": 91.5 + idx * 0.2,
                "avg_error_km": 8.2 - idx * 0.1,
                "weather_integration_accuracy": 94.2 + idx * 0.1,
                "terrain_analysis_accuracy": 89.7 + idx * 0.3,
                "user_satisfaction": 4.5 + idx * 0.02,
            })
        })
        .collect();

    let accuracies: Vec<f64> = daily_breakdown
        .iter()
        .filter_map(|d| d["accuracy_percent"].as_f64())
        .collect();
    let total_predictions: i64 = daily_breakdown
        .iter()
        .filter_map(|d| d["total_predictions"].as_i64())
        .sum();

    let analytics = json!({
        "period_summary": {
            "total_predictions": total_predictions,
            "average_accuracy": accuracies.iter().sum::<f64>() / accuracies.len() as f64,
            "best_day_accuracy": accuracies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "worst_day_accuracy": accuracies.iter().copied().fold(f64::INFINITY, f64::min),
            "improvement_trend": "positive",
        },
        "daily_breakdown": daily_breakdown,
        "factors_analysis": {
            "weather_impact": {"positive": 23, "negative": 12, "neutral": 65},
            "terrain_impact": {"positive": 18, "negative": 15, "neutral": 67},
            "battery_health_correlation": 0.78,
            "user_behavior_correlation": 0.65,
        },
        "ml_model_performance": {
            "model_version": "v2.3.1",
            "training_data_points": 125_000,
            "last_updated": "2024-01-15T10:30:00Z",
            "confidence_score": 92.5,
            "feature_importance": {
                "battery_soh": 0.35,
                "weather_conditions": 0.28,
                "terrain_difficulty": 0.22,
                "vehicle_efficiency": 0.15,
            },
        },
    });

    info!(days = query.days, "range prediction analytics retrieved");
    Ok(Json(json!({ "success": true, "data": analytics })))
}

async fn circular_economy_metrics(
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let metrics = json!({
        "battery_lifecycle": {
            "active_batteries": 1088,
            "second_life_applications": 134,
            "recycling_queue": 25,
            "total_processed": 1247,
        },
        "material_recovery": {
            "lithium": {"recovered_kg": 1245.6, "recovery_rate": 78.2, "market_value_usd": 18673.5},
            "cobalt": {"recovered_kg": 892.3, "recovery_rate": 85.1, "market_value_usd": 71384.4},
            "nickel": {"recovered_kg": 2156.7, "recovery_rate": 91.8, "market_value_usd": 34509.2},
            "aluminum": {"recovered_kg": 3421.9, "recovery_rate": 94.6, "market_value_usd": 6155.4},
            "copper": {"recovered_kg": 1876.2, "recovery_rate": 97.3, "market_value_usd": 16885.8},
        },
        "environmental_impact": {
            "co2_saved_tons": 156.7,
            "energy_recovered_mwh": 234.8,
            "waste_diverted_tons": 89.3,
            "water_saved_liters": 45670,
            "carbon_footprint_reduction_percent": 23.4,
        },
        "economic_benefits": {
            "material_value_recovered_usd": 147608.3,
            "disposal_costs_avoided_usd": 23456.7,
            "second_life_revenue_usd": 67890.1,
            "total_economic_benefit_usd": 238955.1,
        },
        "second_life_applications": {
            "stationary_energy_storage": 78,
            "residential_solar_storage": 34,
            "grid_stabilization": 12,
            "backup_power_systems": 10,
        },
        "sustainability_goals": {
            "recycling_target_percent": 85,
            "current_recycling_rate": 78.2,
            "material_recovery_target": 90,
            "current_recovery_rate": 85.1,
            "carbon_neutral_target_year": 2030,
            "progress_percent": 67.3,
        },
    });

    info!(user = %user.username, "circular economy metrics retrieved");
    Ok(Json(json!({ "success": true, "data": metrics })))
}

#[derive(Debug, Deserialize)]
struct StationPerformanceQuery {
    station_id: Option<String>,
}

async fn station_performance(
    CurrentUser(_user): CurrentUser,
    Query(query): Query<StationPerformanceQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let performance = match &query.station_id {
        Some(station_id) => json!({
            "station_id": station_id,
            "name": format!("Station {station_id}"),
            "performance_metrics": {
                "daily_swaps": 287,
                "utilization_rate": 0.834,
                "average_swap_time": 92.3,
                "customer_satisfaction": 4.7,
                "uptime_percent": 98.9,
                "energy_efficiency": 0.892,
            },
            "operational_data": {
                "total_batteries": 20,
                "healthy_batteries": 18,
                "batteries_charging": 6,
                "maintenance_queue": 2,
                "peak_hours": ["07:00-09:00", "18:00-20:00"],
                "off_peak_hours": ["23:00-06:00"],
            },
            "financial_metrics": {
                "daily_revenue": 4305.50,
                "monthly_target": 125_000,
                "monthly_progress": 0.72,
                "cost_per_swap": 15.2,
                "profit_margin": 0.34,
            },
        }),
        None => json!({
            "network_summary": {
                "total_stations": 156,
                "active_stations": 152,
                "maintenance_stations": 3,
                "offline_stations": 1,
            },
            "performance_distribution": {
                "high_performers": 89,
                "average_performers": 52,
                "underperformers": 15,
            },
            "top_performing_stations": [
                {"station_id": "STN045", "utilization": 0.94, "daily_swaps": 342},
                {"station_id": "STN012", "utilization": 0.91, "daily_swaps": 328},
                {"station_id": "STN078", "utilization": 0.89, "daily_swaps": 315},
            ],
            "improvement_opportunities": [
                {"station_id": "STN134", "issue": "Low utilization", "recommendation": "Marketing campaign"},
                {"station_id": "STN089", "issue": "Slow swap times", "recommendation": "Equipment upgrade"},
                {"station_id": "STN156", "issue": "Battery shortage", "recommendation": "Inventory increase"},
            ],
            "network_metrics": {
                "total_daily_swaps": 28340,
                "average_utilization": 0.756,
                "network_uptime": 0.987,
                "customer_satisfaction": 4.6,
            },
        }),
    };

    info!(
        station_id = query.station_id.as_deref().unwrap_or("all"),
        "station performance analytics retrieved"
    );
    Ok(Json(json!({ "success": true, "data": performance })))
}

#[derive(Debug, Serialize)]
struct SystemStatusResponse {
    status: String,
    uptime_seconds: u64,
    database_status: String,
    cache_status: String,
    api_status: BTreeMap<String, String>,
    last_updated: DateTime<Utc>,
    active_users: u32,
    requests_per_minute: f64,
}

async fn system_status(
    State(state): State<AppState>,
    OperatorUser(_user): OperatorUser,
) -> Result<Json<SystemStatusResponse>, ApiError> {
    let database_status = match state.store.list_batteries().await {
        Ok(_) => "connected".to_string(),
        Err(_) => "unavailable".to_string(),
    };

    let api_state = |configured: bool| {
        if configured {
            "connected".to_string()
        } else {
            "mock".to_string()
        }
    };

    let status = SystemStatusResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database_status,
        cache_status: "connected".to_string(),
        api_status: BTreeMap::from([
            ("weather_api".to_string(), api_state(state.cfg.apis.weather_configured())),
            ("maps_api".to_string(), api_state(state.cfg.apis.maps_configured())),
            ("elevation_api".to_string(), "connected".to_string()),
        ]),
        last_updated: Utc::now(),
        active_users: 1247,
        requests_per_minute: 145.7,
    };

    Ok(Json(status))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReportType {
    Battery,
    Station,
    Circular,
    Performance,
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    report_type: ReportType,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    report_id: String,
    title: String,
    generated_at: DateTime<Utc>,
    data: serde_json::Value,
    charts: Vec<serde_json::Value>,
    summary: serde_json::Value,
    recommendations: Vec<String>,
}

async fn generate_report(
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
        if from > to {
            return Err(ApiError::BadRequest(
                "date_from must not be after date_to".to_string(),
            ));
        }
    }

    let generated_at = Utc::now();
    let report_id = format!("report_{}", generated_at.timestamp());

    let (title, data) = match query.report_type {
        ReportType::Battery => (
            "Battery Health Analysis Report",
            json!({
                "total_batteries_analyzed": 1247,
                "health_trends": "Improving",
                "degradation_analysis": "Within expected parameters",
                "replacement_schedule": "23 batteries due for replacement in Q2",
            }),
        ),
        ReportType::Station => (
            "Station Performance Report",
            json!({
                "stations_analyzed": 156,
                "performance_summary": "Above target",
                "utilization_trends": "Increasing",
                "expansion_recommendations": "5 new locations identified",
            }),
        ),
        ReportType::Circular => (
            "Circular Economy Impact Report",
            json!({
                "materials_recovered": "2.3 tons",
                "environmental_impact": "156.7 tons CO2 saved",
                "economic_value": "$238,955",
                "sustainability_progress": "67% towards 2030 goals",
            }),
        ),
        ReportType::Performance => (
            "System Performance Report",
            json!({
                "overall_efficiency": "92.5%",
                "customer_satisfaction": "4.6/5.0",
                "cost_optimization": "23.8% reduction achieved",
                "innovation_impact": "15.3% battery life extension",
            }),
        ),
    };

    let report = ReportResponse {
        report_id: report_id.clone(),
        title: title.to_string(),
        generated_at,
        data,
        charts: vec![
            json!({"type": "line", "title": "Trend Analysis", "data": []}),
            json!({"type": "bar", "title": "Performance Metrics", "data": []}),
        ],
        summary: json!({
            "key_findings": 3,
            "recommendations": 5,
            "data_points_analyzed": 125_000,
            "confidence_score": 94.7,
        }),
        recommendations: vec![
            "Continue current optimization strategies".to_string(),
            "Invest in predictive maintenance capabilities".to_string(),
            "Expand circular economy programs".to_string(),
            "Focus on rural station deployment".to_string(),
        ],
    };

    info!(report_id = %report_id, user = %user.username, "report generated");
    Ok(Json(report))
}
