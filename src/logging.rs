//! Tracing setup shared by the binary and by test suites.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV_VAR;

/// Install a stderr fmt subscriber filtered by `LSP_TESTSPEC_LOG` (default `warn`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    init_with_default("warn");
}

pub fn init_with_default(default_directive: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
