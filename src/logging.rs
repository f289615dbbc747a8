use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. The level comes from `RUST_LOG` (`info` when
/// unset, `RUST_LOG=debug` shows every skipped line). Logs go to stderr, stdout
/// is kept for the final status line.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
