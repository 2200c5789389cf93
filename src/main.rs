//! ElectroSpot Shim - static export
//!
//! Renders the configured wrapper page once and writes it to `SHIM_OUTPUT`,
//! or to stdout when unset. Same environment as the API server.
//!
//! Usage:
//!   SHIM_OUTPUT=public/index.html cargo run --bin electrospot_shim

use electrospot_shim::{init_logging, render_page, ShimConfig};

use eyre::Result;
use std::io::Write;
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    let config = ShimConfig::from_env()?;
    config.log_summary();

    let page = render_page(
        &config.target,
        config.strategy,
        config.dimensions,
        &config.chrome,
    );

    match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &page.html)?;
            info!(path = %path.display(), bytes = page.html.len(), "Page exported");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(page.html.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
