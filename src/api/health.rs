//! Service endpoints: banner, health probes and build info.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .route("/info", get(info))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "SmartSwapML API running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
struct HealthChecks {
    store: ComponentHealth,
    ml_models: ComponentHealth,
    weather_api: ComponentHealth,
    maps_api: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            latency_ms: None,
            error: Some(error),
        }
    }

    /// For optional integrations running in mock mode.
    fn mock_mode() -> Self {
        Self {
            status: "mock".to_string(),
            latency_ms: None,
            error: None,
        }
    }
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    match state.store.list_batteries().await {
        Ok(_) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
        Err(e) => ComponentHealth::unhealthy(e.to_string()),
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_health = check_store(&state).await;

    // Models are trained during startup; reaching this handler means they
    // are loaded.
    let ml_health = ComponentHealth::healthy(0);

    let weather_health = if state.cfg.apis.weather_configured() {
        ComponentHealth::healthy(0)
    } else {
        ComponentHealth::mock_mode()
    };
    let maps_health = if state.cfg.apis.maps_configured() {
        ComponentHealth::healthy(0)
    } else {
        ComponentHealth::mock_mode()
    };

    let all_healthy = store_health.status == "healthy";

    let response = HealthResponse {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: chrono::Utc::now(),
        checks: HealthChecks {
            store: store_health,
            ml_models: ml_health,
            weather_api: weather_health,
            maps_api: maps_health,
        },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// Readiness probe: ready once the store answers.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_batteries().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe.
async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "app_name": "SmartSwapML",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Battery Health Prediction",
            "Terrain-Aware Route Optimization",
            "Circular Economy Tracking",
            "Smart Station Placement",
        ],
        "api_integrations": {
            "weather": state.cfg.apis.weather_configured(),
            "maps": state.cfg.apis.maps_configured(),
            "elevation": true,
        },
    }))
}
