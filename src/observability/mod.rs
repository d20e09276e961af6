//! Structured logging for console apps.
//!
//! Logs go to stderr so they never mix with command output on stdout.
//!
//! # Example
//!
//! ```no_run
//! // Honors RUST_LOG, falls back to the given directive
//! cmdbind::observability::init_logging("cmdbind=debug");
//! ```

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a global
/// subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter_from_env(default_filter))
        .try_init()
        .is_ok()
}

/// Filter from `RUST_LOG`, or `default_filter` when unset or invalid
pub fn filter_from_env(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_false() {
        let _ = init_logging("off");
        assert!(!init_logging("off"));
    }
}
