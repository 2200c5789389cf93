//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code, so log lines and API
//! responses can be grepped by code.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors
//! - IO_xxx:  Filesystem / socket errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // API Errors
    // ============================================
    /// Invalid request (bad query override)
    ApiBadRequest,
    /// Unknown route
    ApiNotFound,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // IO Errors
    // ============================================
    /// Filesystem or socket failure
    IoError,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::IoError => "IO_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ConfigInvalidValue => 400,
            Self::ApiNotFound => 404,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Invalid configuration value for `key`
    pub fn invalid_config(key: &str, value: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("{}={:?} is invalid, expected {}", key, value, expected),
        )
    }

    /// Unknown route
    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorCode::ApiNotFound, format!("No such route: {}", path))
    }

    /// Client spent its request budget
    pub fn rate_limited(retry_after: u64) -> Self {
        Self::new(
            ErrorCode::ApiRateLimited,
            format!("Rate limit exceeded. Retry after {} seconds", retry_after),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::IoError, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ApiInternalError, "JSON encode error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::bad_request("height must be positive");
        assert_eq!(err.code, ErrorCode::ApiBadRequest);
        assert_eq!(err.code_str(), "API_BAD_REQUEST");
        assert_eq!(err.to_string(), "[API_BAD_REQUEST] height must be positive");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = AppError::invalid_config("SHIM_FRAME_HEIGHT", "tall", "a positive integer");
        assert_eq!(err.code_str(), "CFG_INVALID_VALUE");
        assert!(err.message.contains("SHIM_FRAME_HEIGHT"));
        assert!(err.message.contains("\"tall\""));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::IoError.http_status(), 500);
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert_eq!(err.code, ErrorCode::IoError);
        assert!(err.source().is_some());
    }
}
