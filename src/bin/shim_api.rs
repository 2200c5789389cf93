//! ElectroSpot Shim API Server
//!
//! Serves the wrapper page over HTTP.
//!
//! Usage:
//!   cargo run --bin shim_api
//!
//! Environment:
//!   SHIM_TARGET_URL - Target app (default: https://electrospot.lovable.app)
//!   SHIM_STRATEGY   - frame_embed | auto_redirect (default: frame_embed)
//!   PORT/SHIM_PORT  - Server port (default: 8080)
//!   SHIM_HOST       - Server host (default: 0.0.0.0)
//!   SHIM_RATE_LIMIT - JSON route requests per minute per client (default: 100)
//!   SHIM_TRUST_PROXY - Key clients by X-Forwarded-For (default: false)
//!   RUST_LOG        - Log level (default: info)

use electrospot_shim::api::{create_router, handlers::AppState, start_cleanup_task};
use electrospot_shim::utils::constants::{APP_NAME, APP_VERSION};
use electrospot_shim::{init_logging, ShimConfig, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_logging();

    let config = ShimConfig::from_env()?;
    config.log_summary();

    let addr = config.server.socket_addr()?;
    let telemetry_dir = config.server.telemetry_dir.clone();

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(config, telemetry));

    start_cleanup_task(state.rate_limiter.clone());

    let app = create_router(state);

    info!("{} v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  GET /          - Wrapper page (query: strategy, height, width)");
    info!("  GET /embed     - Framed page");
    info!("  GET /redirect  - Redirect page");
    info!("  GET /v1/page   - Page descriptor (JSON)");
    info!("  GET /v1/stats  - Serving statistics");
    info!("  GET /v1/health - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Shutdown signal received, exporting stats...");
    let stats = telemetry_for_shutdown.get_stats();
    info!(
        frame_pages = stats.frame_pages,
        redirect_pages = stats.redirect_pages,
        rejected = stats.rejected_requests,
        "Final statistics"
    );

    match telemetry_for_shutdown.export_stats_json(&telemetry_dir) {
        Ok(path) => info!("Stats exported to: {}", path.display()),
        Err(e) => warn!("Failed to export stats: {}", e),
    }

    Ok(())
}
