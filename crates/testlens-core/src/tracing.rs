//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV_VAR;

const DEFAULT_FILTER: &str = "testlens_analysis=info,testlens_core=info,warn";

/// Install the global fmt subscriber. Safe to call more than once; later calls are no-ops.
///
/// The filter is read from `TESTLENS_LOG` and falls back to info-level output
/// for the testlens crates.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Like [`init`] but with a caller-provided fallback filter directive.
pub fn init_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
