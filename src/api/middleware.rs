//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::handlers::{error_response, AppState};
use crate::models::AppError;
use crate::utils::constants::{RATE_LIMIT_CLEANUP_SECS, RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW_SECS};

/// Rate limiter configuration
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl RateLimitConfig {
    /// `requests` per default window
    pub fn per_window(requests: u32) -> Self {
        Self {
            requests_per_window: requests,
            window_duration: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_window(RATE_LIMIT_REQUESTS)
    }
}

/// Fixed-window in-memory rate limiter, keyed per client
pub struct RateLimiter {
    /// Request count and window start per client key
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if request is allowed, returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let remaining = self.config.requests_per_window.saturating_sub(entry.0);
        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        (true, remaining - 1, reset_secs)
    }

    /// Drop entries whose window ended long ago, returns how many were removed
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.requests.len();
        self.requests.retain(|_, (_, timestamp)| {
            now.duration_since(*timestamp) < self.config.window_duration * 2
        });
        before.saturating_sub(self.requests.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Prune a rate limiter periodically
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                debug!(removed, "Rate limiter cleanup");
            }
        }
    });
}

/// Paths that are never rate limited: health probes and the wrapper pages,
/// whose fallback link must always reach the visitor
fn is_exempt_path(path: &str) -> bool {
    matches!(path, "/health" | "/v1/health" | "/" | "/embed" | "/redirect")
}

/// Client key: the peer address, or the proxy-reported address when the
/// proxy is trusted
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = if trust_proxy {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
    } else {
        None
    };

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_exempt_path(request.uri().path()) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let rate_key = client_key(request.headers(), peer, state.config.server.trust_proxy);
    let (allowed, remaining, reset) = state.rate_limiter.check(&rate_key);

    if !allowed {
        warn!(key = %rate_key, "Rate limit exceeded");
        let mut response = error_response(AppError::rate_limited(reset), 0.0).into_response();
        response.headers_mut().insert("Retry-After", reset.into());
        return response;
    }

    let mut response = next.run(request).await;

    // Add rate limit headers
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    response
}

/// Request logging middleware, tags every response with a request id
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig::per_window(requests))
    }

    #[test]
    fn test_rate_limit_window() {
        let limiter = limiter(2);
        assert!(limiter.check("a").0);
        let (allowed, remaining, _) = limiter.check("a");
        assert!(allowed);
        assert_eq!(remaining, 0);
        assert!(!limiter.check("a").0);
        // Separate client has its own budget
        assert!(limiter.check("b").0);
    }

    #[test]
    fn test_cleanup_keeps_fresh_entries() {
        let limiter = limiter(5);
        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let peer: SocketAddr = "198.51.100.4:52100".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, None, false), "unknown");
        assert_eq!(client_key(&headers, Some(peer), false), "198.51.100.4");

        // Proxy headers are ignored unless the proxy is trusted
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        assert_eq!(client_key(&headers, Some(peer), false), "198.51.100.4");
    }

    #[test]
    fn test_client_key_behind_trusted_proxy() {
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.1");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.2");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.7");
    }

    #[test]
    fn test_exempt_paths() {
        for path in ["/", "/embed", "/redirect", "/health", "/v1/health"] {
            assert!(is_exempt_path(path), "{}", path);
        }
        for path in ["/v1/page", "/v1/stats", "/nope"] {
            assert!(!is_exempt_path(path), "{}", path);
        }
    }
}
