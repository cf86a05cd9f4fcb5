//! Tracing subscriber setup

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so reports on stdout stay parseable.
pub fn init(verbose: u8) {
    let default_directive = match verbose {
        0 => "berth=warn",
        1 => "berth=info",
        _ => "berth=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = installed {
        debug!(error = %e, "tracing subscriber already installed, keeping it");
    }
}
