//! ElectroSpot Shim Library
//!
//! Serves a wrapper page around an externally hosted web app. The page
//! either frames the app or redirects to it, and always shows a link to
//! open the app directly in case the app refuses to be framed.

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{render_page, PageBuilder};
pub use models::{
    AppError, AppResult, Dimensions, ErrorCode, PageChrome, RenderedPage, ShimConfig, Strategy,
    TargetReference,
};
pub use utils::{init_logging, TelemetryCollector, TelemetryStats};
