pub mod analytics;
pub mod auth;
pub mod batteries;
pub mod error;
pub mod health;
pub mod response;
pub mod routes;
pub mod stations;

use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, state::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/batteries", batteries::router())
        .nest("/api/stations", stations::router())
        .nest("/api/routes", routes::router())
        .nest("/api/analytics", analytics::router())
        .with_state(state);

    if cfg.server.enable_cors {
        use axum::http::Method;
        use tower_http::cors::{Any, CorsLayer};
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs,
                ))),
        )
        .layer(TraceLayer::new_for_http())
}
