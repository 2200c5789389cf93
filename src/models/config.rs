//! Configuration module for the embedding shim
//!
//! All settings come from environment variables (see `utils::constants`
//! for the names). Everything has a default, so an empty environment
//! serves the ElectroSpot page on port 8080.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

use super::errors::{AppError, AppResult};
use super::types::{Dimensions, PageChrome, Strategy, TargetReference};
use crate::utils::constants::*;

/// Server bind settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub telemetry_dir: PathBuf,
    /// Trust proxy headers for the client address; otherwise the peer address is used
    pub trust_proxy: bool,
    /// JSON requests allowed per client per window
    pub rate_limit_requests: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            telemetry_dir: PathBuf::from(DEFAULT_TELEMETRY_DIR),
            trust_proxy: false,
            rate_limit_requests: RATE_LIMIT_REQUESTS,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|_| AppError::invalid_config(ENV_HOST, &self.host, "an IP address"))
    }
}

/// Complete shim configuration
#[derive(Debug, Clone, Default)]
pub struct ShimConfig {
    pub target: TargetReference,
    pub strategy: Strategy,
    pub dimensions: Dimensions,
    pub chrome: PageChrome,
    pub server: ServerConfig,
    /// Export destination for the one-shot renderer; stdout when `None`
    pub output: Option<PathBuf>,
}

impl ShimConfig {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup (tests pass a map instead of the real env)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_TARGET_URL) {
            config.target = TargetReference::new(url.trim());
        }
        if !config.target.is_navigable() {
            // Rendering goes ahead anyway; only the fallback link will be usable.
            warn!(target_url = %config.target, "Target is not an absolute http(s) URL");
        }

        if let Some(raw) = lookup(ENV_STRATEGY) {
            config.strategy = raw
                .parse::<Strategy>()
                .map_err(|_| AppError::invalid_config(ENV_STRATEGY, &raw, "frame_embed or auto_redirect"))?;
        }

        let height = parse_positive(&lookup, ENV_FRAME_HEIGHT)?;
        let width = parse_positive(&lookup, ENV_FRAME_WIDTH)?;
        config.dimensions = config.dimensions.with_overrides(height, width)?;

        if let Some(title) = lookup(ENV_PAGE_TITLE) {
            config.chrome.title = title;
        }
        if let Some(label) = lookup(ENV_BUTTON_LABEL) {
            config.chrome.button_label = label;
        }
        if let Some(label) = lookup(ENV_REDIRECT_LABEL) {
            config.chrome.redirect_label = label;
        }
        if let Some(caption) = lookup(ENV_CAPTION) {
            config.chrome.caption = if caption.trim().is_empty() {
                None
            } else {
                Some(caption)
            };
        }

        if let Some(host) = lookup(ENV_HOST) {
            config.server.host = host;
        }
        // Hosting platforms inject PORT; SHIM_PORT is for local runs
        let port_key = if lookup(ENV_PLATFORM_PORT).is_some() {
            ENV_PLATFORM_PORT
        } else {
            ENV_PORT
        };
        if let Some(raw) = lookup(port_key) {
            config.server.port = raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::invalid_config(port_key, &raw, "a port number"))?;
        }
        if let Some(dir) = lookup(ENV_TELEMETRY_DIR) {
            config.server.telemetry_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_TRUST_PROXY) {
            config.server.trust_proxy = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(AppError::invalid_config(ENV_TRUST_PROXY, &raw, "true or false")),
            };
        }
        if let Some(limit) = parse_positive(&lookup, ENV_RATE_LIMIT)? {
            config.server.rate_limit_requests = limit;
        }

        config.output = lookup(ENV_OUTPUT)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        info!(
            target_url = %self.target,
            strategy = %self.strategy,
            height = self.dimensions.height,
            width = %self.dimensions.width_attr(),
            "Shim configuration loaded"
        );
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> AppResult<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(Some(v)),
            _ => Err(AppError::invalid_config(key, &raw, "a positive integer")),
        },
    }
}
