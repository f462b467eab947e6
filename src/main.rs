use anyhow::Result;
use axum::Router;
use smartswapml_backend::{api, config::Config, state::AppState, telemetry};
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.auth.secret_key.is_empty()
        || cfg.auth.secret_key.starts_with("__SET_VIA_ENV")
        || cfg.auth.secret_key.len() < 32
    {
        anyhow::bail!(
            "SECURITY ERROR: SMARTSWAP__AUTH__SECRET_KEY must be set to a secure random secret (min 32 chars). \
            Generate one with: openssl rand -base64 32"
        );
    }

    let app_state = AppState::new(cfg.clone()).await?;

    let app: Router = api::router(app_state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "WARNING: Server binding to 0.0.0.0 - service will be accessible from network! \
            For production, bind to 127.0.0.1 unless behind a firewall/reverse proxy."
        );
    }

    info!(%addr, "starting SmartSwapML backend");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
