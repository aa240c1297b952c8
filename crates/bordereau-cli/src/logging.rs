use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging to stderr.
///
/// `RUST_LOG` wins when set (e.g. `RUST_LOG=bordereau_core=debug`);
/// otherwise the level follows the `-v` count: warn, info, then debug.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
