//! Tracing subscriber setup
//!
//! The pipeline crates emit `tracing` events; the embedding host process
//! calls this once at startup. Separate from metrics so a host can opt
//! into either independently.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber with an env-filter.
///
/// `RUST_LOG` wins over the supplied default. Safe to call once; a second
/// call is ignored so tests that race on initialization do not panic.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_init_does_not_panic() {
        init_tracing("info");
        init_tracing("debug");
    }
}
