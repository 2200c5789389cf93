//! Constants Module - Single Source of Truth
//!
//! Default target, page text and environment variable names.
//! Other modules read their defaults from here.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ElectroSpot Shim";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// TARGET
// ============================================

/// The externally hosted application this shim points at
pub const DEFAULT_TARGET_URL: &str = "https://electrospot.lovable.app";

// ============================================
// EMBED REGION
// ============================================

/// Default embed height (px)
pub const DEFAULT_FRAME_HEIGHT: u32 = 800;

/// Below this viewport width (px) the container drops its padding
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

// ============================================
// PAGE CHROME (pt-BR, as served to end users)
// ============================================

pub const DEFAULT_PAGE_TITLE: &str = "ElectroSpot";
pub const DEFAULT_PAGE_ICON: &str = "⚡";
pub const DEFAULT_PAGE_LANG: &str = "pt-BR";

/// Fallback label when the page embeds the target (opens a new tab)
pub const DEFAULT_BUTTON_LABEL: &str = "Abrir ElectroSpot em nova aba";

/// Fallback label when the page redirects (navigates the whole window)
pub const DEFAULT_REDIRECT_LABEL: &str = "Abrir ElectroSpot";

pub const DEFAULT_CAPTION: &str =
    "Se a visualização incorporada estiver em branco, use o botão acima para abrir em uma nova aba.";

// ============================================
// SERVER
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TELEMETRY_DIR: &str = "./telemetry";

/// Rate limit: requests per window per client (JSON routes only)
pub const RATE_LIMIT_REQUESTS: u32 = 100;
/// Rate limit window (seconds)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;
/// How often stale rate limit entries are pruned (seconds)
pub const RATE_LIMIT_CLEANUP_SECS: u64 = 60;

// ============================================
// ENVIRONMENT VARIABLES
// ============================================

pub const ENV_TARGET_URL: &str = "SHIM_TARGET_URL";
pub const ENV_STRATEGY: &str = "SHIM_STRATEGY";
pub const ENV_FRAME_HEIGHT: &str = "SHIM_FRAME_HEIGHT";
pub const ENV_FRAME_WIDTH: &str = "SHIM_FRAME_WIDTH";
pub const ENV_PAGE_TITLE: &str = "SHIM_PAGE_TITLE";
pub const ENV_BUTTON_LABEL: &str = "SHIM_BUTTON_LABEL";
pub const ENV_REDIRECT_LABEL: &str = "SHIM_REDIRECT_LABEL";
pub const ENV_CAPTION: &str = "SHIM_CAPTION";
pub const ENV_HOST: &str = "SHIM_HOST";
/// Platform-provided port (Railway, Koyeb, ...); wins over `SHIM_PORT`
pub const ENV_PLATFORM_PORT: &str = "PORT";
pub const ENV_PORT: &str = "SHIM_PORT";
pub const ENV_OUTPUT: &str = "SHIM_OUTPUT";
pub const ENV_TELEMETRY_DIR: &str = "SHIM_TELEMETRY_DIR";
/// Key clients by `X-Forwarded-For` / `X-Real-IP` (only behind a trusted proxy)
pub const ENV_TRUST_PROXY: &str = "SHIM_TRUST_PROXY";
pub const ENV_RATE_LIMIT: &str = "SHIM_RATE_LIMIT";
