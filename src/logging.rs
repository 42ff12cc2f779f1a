//! Logging setup.
//!
//! The library itself only emits `tracing` events. Binaries and tests that
//! embed it call [`init_logging`] once to get them on stderr.

use tracing_subscriber::EnvFilter;

/// Level used when the configured one does not parse.
const FALLBACK_LEVEL: &str = "info";

/// Install a stderr `fmt` subscriber filtered at `level`.
///
/// `level` accepts anything [`EnvFilter`] does (`info`,
/// `bodymeasure_store=debug,sqlx=warn`, ...); an unparsable value falls back
/// to `info`. Returns `false` if a global subscriber was already installed.
pub fn init_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

fn build_filter(level: &str) -> EnvFilter {
    level
        .parse::<EnvFilter>()
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}
