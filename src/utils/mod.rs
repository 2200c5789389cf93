//! Utils Module - constants, logging and telemetry shared by both binaries

pub mod constants;
pub mod logging;
pub mod telemetry;

pub use constants::*;
pub use logging::*;
pub use telemetry::*;
