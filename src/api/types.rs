//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::{AppError, Dimensions, ErrorCode, RenderedPage};
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let code = match err.code {
            ErrorCode::ApiBadRequest | ErrorCode::ConfigInvalidValue => "BAD_REQUEST",
            ErrorCode::ApiNotFound => "NOT_FOUND",
            ErrorCode::ApiRateLimited => "RATE_LIMITED",
            ErrorCode::ApiInternalError | ErrorCode::IoError => "INTERNAL_ERROR",
        };
        let mut api = ApiError::new(code, err.message);
        api.details = Some(err.code.as_str().to_string());
        api
    }
}

// ============================================
// Page overrides
// ============================================

/// Query overrides accepted by the page routes
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub strategy: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

// ============================================
// Health
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub target_url: String,
    pub target_navigable: bool,
}

// ============================================
// Page descriptor
// ============================================

#[derive(Debug, Serialize)]
pub struct PageDescriptorData {
    #[serde(flatten)]
    pub page: RenderedPage,
    pub dimensions: Dimensions,
    pub html_bytes: usize,
}

// ============================================
// Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: TelemetryStats,
    pub total_pages: u64,
    pub uptime_seconds: u64,
}
