//! Host-level settings from environment variables.
//!
//! Recognised variables:
//! - `CMDBIND_LOG`: default tracing filter when `RUST_LOG` is unset
//! - `CMDBIND_CTRL_C`: `0`/`false` disables Ctrl-C triggered host shutdown

use std::env;
use std::path::Path;

const LOG_VAR: &str = "CMDBIND_LOG";
const CTRL_C_VAR: &str = "CMDBIND_CTRL_C";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings the host reads before running the console app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Default log filter directive
    pub log_filter: String,
    /// Whether Ctrl-C requests host shutdown
    pub handle_ctrl_c: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            handle_ctrl_c: true,
        }
    }
}

impl HostSettings {
    /// Read settings from the process environment.
    ///
    /// # Arguments
    /// * `env_file` - `.env` file to load first. Only an explicit path is
    ///   loaded, so tests are not affected by stray files.
    pub fn from_env(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
                }
            }
        }

        let mut settings = Self::default();
        if let Ok(filter) = env::var(LOG_VAR) {
            if !filter.trim().is_empty() {
                settings.log_filter = filter;
            }
        }
        if let Ok(flag) = env::var(CTRL_C_VAR) {
            settings.handle_ctrl_c = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        settings
    }

    /// Install the stderr log subscriber with [`HostSettings::log_filter`] as
    /// the default filter. Returns `false` if one was already installed.
    pub fn init_logging(&self) -> bool {
        crate::observability::init_logging(&self.log_filter)
    }
}
