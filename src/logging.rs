//! Tracing setup
//!
//! `RUST_LOG` takes precedence; otherwise the filter from the config
//! file is used (default: info).
//!
//!   RUST_LOG=picsum_feed=debug picsum-feed

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` first, then `fallback`, then "info"
pub fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber with console output
///
/// Fails if a global subscriber was already installed.
pub fn init_tracing(fallback: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(fallback))
        .with(fmt::layer().with_target(false).compact())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("info");
        let err = init_tracing("info").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
