//! API Request Handlers

use axum::{
    extract::{rejection::QueryRejection, Json, Query, State},
    http::{StatusCode, Uri},
    response::Html,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::middleware::{RateLimitConfig, RateLimiter};
use super::types::*;
use crate::core::render::render_page;
use crate::models::{AppError, AppResult, Dimensions, RenderedPage, ShimConfig, Strategy};
use crate::utils::telemetry::TelemetryCollector;

/// Error half of every handler result
pub type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub config: ShimConfig,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    /// State with a rate limiter sized from `config.server`
    pub fn new(config: ShimConfig, telemetry: Arc<TelemetryCollector>) -> Self {
        let limiter = RateLimiter::new(RateLimitConfig::per_window(
            config.server.rate_limit_requests,
        ));
        Self::with_rate_limiter(config, telemetry, Arc::new(limiter))
    }

    pub fn with_rate_limiter(
        config: ShimConfig,
        telemetry: Arc<TelemetryCollector>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            config,
            telemetry,
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Apply query overrides on top of the configured defaults
    fn resolve(&self, query: &PageQuery, forced: Option<Strategy>) -> AppResult<(Strategy, Dimensions)> {
        let strategy = match (forced, query.strategy.as_deref()) {
            (Some(strategy), _) => strategy,
            (None, Some(raw)) => raw.parse::<Strategy>()?,
            (None, None) => self.config.strategy,
        };
        let dimensions = self
            .config
            .dimensions
            .with_overrides(query.height, query.width)?;
        Ok((strategy, dimensions))
    }

    fn render(&self, strategy: Strategy, dimensions: Dimensions) -> RenderedPage {
        render_page(&self.config.target, strategy, dimensions, &self.config.chrome)
    }
}

fn latency_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// JSON error envelope with the status mapped from the error code
pub fn error_response(err: AppError, latency_ms: f64) -> HandlerError {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(err.into(), latency_ms)))
}

fn rejected(state: &AppState, err: AppError, start: Instant) -> HandlerError {
    state.telemetry.record_rejected();
    warn!(code = err.code_str(), reason = %err.message, "Rejected page request");
    error_response(err, latency_ms(start))
}

/// Unwrap query extraction and resolve overrides, or build the 400
fn resolve_request(
    state: &AppState,
    query: Result<Query<PageQuery>, QueryRejection>,
    forced: Option<Strategy>,
    start: Instant,
) -> Result<(Strategy, Dimensions), HandlerError> {
    let Query(query) = query
        .map_err(|rejection| rejected(state, AppError::bad_request(rejection.body_text()), start))?;
    state
        .resolve(&query, forced)
        .map_err(|err| rejected(state, err, start))
}

async fn page_response(
    state: Arc<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    forced: Option<Strategy>,
) -> Result<Html<String>, HandlerError> {
    let start = Instant::now();
    let (strategy, dimensions) = resolve_request(&state, query, forced, start)?;

    let page = state.render(strategy, dimensions);
    state
        .telemetry
        .record_page(strategy, start.elapsed().as_micros() as u64);
    debug!(strategy = %strategy, height = dimensions.height, "Serving wrapper page");

    Ok(Html(page.html))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        target_url: state.config.target.to_string(),
        target_navigable: state.config.target.is_navigable(),
    };

    Json(ApiResponse::success(data, latency_ms(start)))
}

// ============================================
// Wrapper Pages
// ============================================

/// `GET /`: configured strategy, overridable by query
pub async fn serve_page(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Html<String>, HandlerError> {
    page_response(state, query, None).await
}

/// `GET /embed`: always frames the target
pub async fn serve_embed(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Html<String>, HandlerError> {
    page_response(state, query, Some(Strategy::FrameEmbed)).await
}

/// `GET /redirect`: always navigates to the target
pub async fn serve_redirect(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Html<String>, HandlerError> {
    page_response(state, query, Some(Strategy::AutoRedirect)).await
}

// ============================================
// Page Descriptor
// ============================================

/// `GET /v1/page`: what `/` would render, as JSON
pub async fn describe_page(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<PageDescriptorData>>, HandlerError> {
    let start = Instant::now();
    let (strategy, dimensions) = resolve_request(&state, query, None, start)?;

    let page = state.render(strategy, dimensions);
    state.telemetry.record_descriptor();

    let data = PageDescriptorData {
        html_bytes: page.html.len(),
        dimensions,
        page,
    };

    Ok(Json(ApiResponse::success(data, latency_ms(start))))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        total_pages: stats.total_pages(),
        uptime_seconds: state.uptime_seconds(),
        stats,
    };

    Json(ApiResponse::success(data, latency_ms(start)))
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> HandlerError {
    error_response(AppError::not_found(uri.path()), 0.0)
}
