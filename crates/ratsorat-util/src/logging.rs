//! `tracing` subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a fmt subscriber filtered by `RUST_LOG` (default [`DEFAULT_FILTER`]).
///
/// Returns `false` if a global subscriber was already installed, which makes
/// it safe to call from every test.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .try_init()
        .is_ok()
}
