use tracing_subscriber::EnvFilter;

/// Initialize compact console logging.
///
/// `RUST_LOG` overrides the default `info` filter. Output goes to stderr so
/// the export binary can write the page to stdout.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
