//! Router-level integration tests against the seeded in-memory store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use smartswapml_backend::api;
use smartswapml_backend::config::{
    ApisConfig, AuthConfig, CacheConfig, Config, DbConfig, Environment, MlConfig, ServerConfig,
};
use smartswapml_backend::state::AppState;
use smartswapml_backend::store::MemoryStore;

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            enable_cors: false,
        },
        auth: AuthConfig {
            secret_key: "integration-test-secret-key-0123456789".to_string(),
            access_token_ttl_minutes: 30,
            refresh_token_ttl_days: 7,
        },
        cache: CacheConfig {
            batteries_ttl_seconds: 30,
            stations_ttl_seconds: 60,
        },
        apis: ApisConfig {
            openweather_api_key: String::new(),
            openweather_base_url: "http://127.0.0.1:9".to_string(),
            google_maps_api_key: String::new(),
            google_maps_base_url: "http://127.0.0.1:9".to_string(),
            elevation_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout_seconds: 1,
        },
        ml: MlConfig {
            training_samples: 150,
            seed: 42,
            n_trees: 10,
            health_max_depth: 8,
            range_max_depth: 8,
        },
        db: DbConfig {
            url: String::new(),
        },
        environment: Environment::Development,
    }
}

async fn test_app() -> (Router, AppState) {
    let cfg = test_config();
    let state = AppState::with_store(cfg.clone(), Arc::new(MemoryStore::new()))
        .await
        .expect("state builds");
    (api::router(state.clone(), &cfg), state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    request_json(Method::POST, uri, token, body)
}

fn request_json(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            &json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let body = body_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_and_info_are_public() {
    let (app, _state) = test_app().await;

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "SmartSwapML API running");

    let response = app.clone().oneshot(get("/info", None)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["app_name"], "SmartSwapML");
    assert_eq!(body["api_integrations"]["weather"], false);
}

#[tokio::test]
async fn health_reports_healthy_with_memory_store() {
    let (app, _state) = test_app().await;

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"]["status"], "healthy");
    assert_eq!(body["checks"]["weather_api"]["status"], "mock");

    let response = app.clone().oneshot(get("/health/live", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_valid_credentials_returns_token_pair() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            &json!({"username": "demo", "password": "demo123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().unwrap().len() > 20);
    assert!(body["refresh_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            &json!({"username": "demo", "password": "nope"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn me_returns_current_user() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "demo");
    assert_eq!(body["role"], "user");
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn register_then_login_roundtrip() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            &json!({
                "username": "newdriver",
                "email": "driver@example.com",
                "password": "longenough",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token = login(&app, "newdriver", "longenough").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn register_duplicate_username_is_rejected() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            &json!({
                "username": "demo",
                "email": "other@example.com",
                "password": "longenough",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_short_password_is_rejected() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            &json!({
                "username": "shorty",
                "email": "shorty@example.com",
                "password": "short",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batteries_require_authentication() {
    let (app, _state) = test_app().await;

    let response = app.clone().oneshot(get("/api/batteries", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batteries_list_returns_seeded_fleet() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let batteries = body.as_array().unwrap();
    assert_eq!(batteries.len(), 5);
    assert_eq!(batteries[0]["battery_id"], "BAT001");
}

#[tokio::test]
async fn batteries_list_respects_filters_and_pagination() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/batteries?station_id=STN001", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    for battery in body.as_array().unwrap() {
        assert_eq!(battery["station_id"], "STN001");
    }

    let response = app
        .clone()
        .oneshot(get("/api/batteries?skip=2&limit=2", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/api/batteries?status=degraded", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    for battery in body.as_array().unwrap() {
        assert_eq!(battery["metrics"]["status"], "degraded");
    }
}

#[tokio::test]
async fn unknown_battery_is_not_found() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/batteries/BAT999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn battery_create_requires_operator_role() {
    let (app, _state) = test_app().await;
    let user_token = login(&app, "demo", "demo123").await;
    let operator_token = login(&app, "operator", "operator123").await;

    let payload = json!({
        "battery_id": "BAT100",
        "station_id": "STN001",
        "manufacturer": "CATL",
        "model": "LFP-50-X",
        "capacity_kwh": 50.0,
        "manufacturing_date": "2025-01-01T00:00:00Z",
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/batteries", Some(&user_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json("/api/batteries", Some(&operator_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Creation invalidates the list cache, so the new pack is visible.
    let response = app
        .clone()
        .oneshot(get("/api/batteries/BAT100", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["metrics"]["health"]["soc"], 100.0);
    assert_eq!(body["chemistry"], "LiFePO4");

    // Same id again conflicts.
    let response = app
        .clone()
        .oneshot(post_json("/api/batteries", Some(&operator_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn battery_update_bumps_fields() {
    let (app, _state) = test_app().await;
    let operator_token = login(&app, "operator", "operator123").await;

    let response = app
        .clone()
        .oneshot(request_json(
            Method::PUT,
            "/api/batteries/BAT001",
            Some(&operator_token),
            &json!({"current_location": "Depot 7"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/batteries/BAT001", Some(&operator_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["current_location"], "Depot 7");
}

#[tokio::test]
async fn battery_list_serves_cached_snapshot() {
    let (app, state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    // Prime the 30s cache.
    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);

    // Write behind the handlers' backs: the stale snapshot keeps serving.
    let mut extra = smartswapml_backend::store::seed::sample_batteries();
    let mut battery = extra.remove(0);
    battery.battery_id = "BAT777".to_string();
    state.store.insert_battery(battery).await.unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);

    // Dropping the snapshot forces a read-through.
    state.battery_cache.invalidate().await;
    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn health_prediction_returns_forecast() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/batteries/BAT001/health-prediction",
            Some(&token),
            &json!({"prediction_days": 7}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["battery_id"], "BAT001");
    assert_eq!(body["predictions"].as_array().unwrap().len(), 7);
    assert!(body["confidence"].as_f64().unwrap() <= 95.0);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn swap_analysis_recommends_big_improvements() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    // BAT005 (soh 78) -> BAT001 (soh 90): +12 improvement, caution band
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/batteries/swap/analyze",
            Some(&token),
            &json!({
                "old_battery_id": "BAT005",
                "new_battery_id": "BAT001",
                "station_id": "STN001",
                "user_id": "user_demo",
                "requested_at": "2025-06-01T10:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["recommendation"], "caution");
    assert_eq!(body["estimated_range_improvement"], 24.0);
    assert_eq!(body["confidence_score"], 75.0);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/batteries/swap/analyze",
            Some(&token),
            &json!({
                "old_battery_id": "BAT005",
                "new_battery_id": "BAT404",
                "station_id": "STN001",
                "user_id": "user_demo",
                "requested_at": "2025-06-01T10:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn circular_economy_buckets_seeded_fleet() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/batteries/analytics/circular-economy", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_batteries"], 5);
    // Seed SOHs: 90, 87, 84, 81, 78 -> four healthy, one degraded
    assert_eq!(body["active_batteries"], 4);
    assert_eq!(body["batteries_in_second_life"], 1);
    assert_eq!(body["batteries_recycled"], 0);
    assert!(body["material_recovery_rate"]["lithium"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn stations_list_and_filters() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get("/api/stations", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get("/api/stations?city=pune", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let stations = body.as_array().unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0]["station_id"], "STN002");
}

#[tokio::test]
async fn station_create_requires_admin() {
    let (app, _state) = test_app().await;
    let operator_token = login(&app, "operator", "operator123").await;
    let admin_token = login(&app, "admin", "admin123").await;

    let payload = json!({
        "station_id": "STN010",
        "name": "Nashik Hub",
        "location": {
            "lat": 19.9975, "lon": 73.7898,
            "address": "Nashik Rd", "city": "Nashik",
            "state": "Maharashtra", "country": "India",
        },
        "station_type": "urban",
        "total_slots": 10,
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/stations", Some(&operator_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json("/api/stations", Some(&admin_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/stations/STN010", Some(&operator_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "planned");
    assert_eq!(body["capacity"]["charging_slots"], 3);
}

#[tokio::test]
async fn station_search_finds_nearby_sorted_by_distance() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    // From Mumbai, a 60 km radius only reaches STN001 and STN003.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/stations/search",
            Some(&token),
            &json!({"lat": 19.0760, "lon": 72.8777, "radius_km": 60.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["station"]["station_id"], "STN001");
    assert_eq!(results[0]["distance_km"], 0.0);
    assert!(results[1]["distance_km"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn station_placement_needs_admin_and_region() {
    let (app, _state) = test_app().await;
    let admin_token = login(&app, "admin", "admin123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/stations/placement/optimize",
            Some(&admin_token),
            &json!({
                "region_bounds": [[19.0, 72.8], [19.5, 72.8], [19.5, 73.4], [19.0, 73.4]],
                "max_stations": 5,
                "population_data": {"density": 2000.0},
                "traffic_data": {"daily_volume": 40000.0},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let locations = body["recommended_locations"].as_array().unwrap();
    assert!(locations.len() <= 5);
    assert_eq!(
        body["investment_requirements"].as_array().unwrap().len(),
        locations.len()
    );
}

#[tokio::test]
async fn route_optimize_round_trip_with_mock_clients() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/routes/optimize",
            Some(&token),
            &json!({
                "origin": "Mumbai",
                "destination": "Pune",
                "battery_soc": 85.0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Mock directions serve the 148.5 km demo route.
    assert_eq!(body["total_distance_km"], 148.5);
    assert_eq!(body["segments"].as_array().unwrap().len(), 7);
    assert_eq!(body["elevation_profile"].as_array().unwrap().len(), 20);
    assert_eq!(body["weather_conditions"][0]["temperature"], 25.0);

    // The optimization persisted a route record.
    let response = app
        .clone()
        .oneshot(get("/api/routes", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let routes = body.as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["from_location"], "Mumbai");
}

#[tokio::test]
async fn range_analysis_returns_breakdown() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/routes/range-analysis",
            Some(&token),
            &json!({
                "battery_soc": 80.0,
                "battery_soh": 90.0,
                "route_distance_km": 100.0,
                "terrain_data": [{"elevation_change": 120.0}],
                "weather_data": {"temperature": 30.0, "wind_speed": 12.0},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let predicted = body["predicted_range_km"].as_f64().unwrap();
    let interval = body["confidence_interval"].as_array().unwrap();
    assert!(interval[0].as_f64().unwrap() < predicted);
    assert!(interval[1].as_f64().unwrap() > predicted);
    assert_eq!(
        body["energy_consumption_breakdown"]["base_driving"],
        20.0
    );
    assert!(!body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn terrain_analysis_builds_profile_from_fallback_samples() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/routes/terrain-analysis",
            Some(&token),
            &json!({"route_points": [[19.0, 72.8], [18.9, 73.0], [18.8, 73.2]]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let profile = body["elevation_profile"].as_array().unwrap();
    assert_eq!(profile.len(), 3);
    assert_eq!(profile[0]["distance_from_start"], 0.0);
    // Unreachable upstream means the 300 + 5i mock ramp: 10 m over two legs.
    assert_eq!(body["total_elevation_gain"], 10.0);
    assert_eq!(body["total_elevation_loss"], 0.0);
    assert!(body["terrain_difficulty_score"].as_f64().unwrap() <= 10.0);
}

#[tokio::test]
async fn demo_weather_probe_reports_mock_mode() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/routes/demo/weather", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["api_configured"], false);
    assert_eq!(body["data"]["weather"]["mock_data"], true);
}

#[tokio::test]
async fn analytics_dashboard_and_role_guards() {
    let (app, _state) = test_app().await;
    let user_token = login(&app, "demo", "demo123").await;
    let operator_token = login(&app, "operator", "operator123").await;

    let response = app
        .clone()
        .oneshot(get("/api/analytics/dashboard", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_batteries"], 1247);
    assert_eq!(body["trends"]["daily_swaps"].as_array().unwrap().len(), 7);

    // system-status is operator-only
    let response = app
        .clone()
        .oneshot(get("/api/analytics/system-status", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/analytics/system-status", Some(&operator_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["database_status"], "connected");
    assert_eq!(body["api_status"]["weather_api"], "mock");
}

#[tokio::test]
async fn range_prediction_analytics_validates_days() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(get(
            "/api/analytics/range-prediction-analytics?days=3",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["daily_breakdown"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get(
            "/api/analytics/range-prediction-analytics?days=45",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_generation_by_type() {
    let (app, _state) = test_app().await;
    let token = login(&app, "demo", "demo123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/analytics/generate-report?report_type=circular",
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Circular Economy Impact Report");
    assert!(body["report_id"].as_str().unwrap().starts_with("report_"));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/analytics/generate-report?report_type=bogus",
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_token_cannot_hit_protected_endpoints() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            &json!({"username": "demo", "password": "demo123"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get("/api/batteries", Some(&refresh_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
