//! Error types for the console host

use crate::binding::BindError;
use thiserror::Error;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

#[derive(Error, Debug)]
pub enum HostError {
    /// Building the command tree or running it failed
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("Hosted service '{name}' failed: {source}")]
    Service {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The host stopped before the console app finished
    #[error("Console app did not complete before the host stopped")]
    NotCompleted,

    #[error("Service not registered: {0}")]
    MissingService(&'static str),

    #[error("Host configuration error: {0}")]
    Configuration(String),
}

impl HostError {
    /// Wrap a hosted service failure
    pub fn service(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Service {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Whether the host stopped before the console app finished
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::NotCompleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_keeps_source() {
        let err = HostError::service("console", anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "Hosted service 'console' failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bind_error_is_transparent() {
        let err: HostError = BindError::UnknownCommand("nope".into()).into();
        assert_eq!(
            err.to_string(),
            BindError::UnknownCommand("nope".into()).to_string()
        );
        assert!(!err.is_incomplete());
        assert!(HostError::NotCompleted.is_incomplete());
    }
}
