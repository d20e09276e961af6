//! Error types for the binding engine

use thiserror::Error;

/// Result type for binding operations
pub type BindResult<T> = Result<T, BindError>;

/// Errors that can occur while wiring or invoking bound commands
#[derive(Debug, Error)]
pub enum BindError {
    /// A field that becomes an option or argument has no description
    #[error("Field '{field}' on command '{command}' needs a description")]
    MissingDescription { command: String, field: String },

    /// A field carries both a positional marker and aliases
    #[error("Field '{field}' on command '{command}' is both positional and aliased")]
    AmbiguousField { command: String, field: String },

    /// An alias token the parser cannot express
    #[error("Invalid alias '{alias}' for field '{field}': {reason}")]
    InvalidAlias {
        field: String,
        alias: String,
        reason: String,
    },

    /// The same field identifier was declared twice on one command
    #[error("Field '{field}' is declared more than once on command '{command}'")]
    DuplicateField { command: String, field: String },

    /// Positional arguments declared in an order the parser cannot fill
    #[error("Positional '{field}' on command '{command}' is out of order: {reason}")]
    InvalidPositional {
        command: String,
        field: String,
        reason: String,
    },

    /// Metadata could not be loaded or is incomplete
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Two children of one command share a name
    #[error("Command '{parent}' already has a sub-command named '{name}'")]
    DuplicateCommand { parent: String, name: String },

    /// The parser matched a sub-command that has no registered node
    #[error("No command registered as '{0}'")]
    UnknownCommand(String),

    /// A lookup named a field that is not bound on the invoked command
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The parsed value type differs from the requested type
    #[error("Type mismatch for '{field}': {reason}")]
    TypeMismatch { field: String, reason: String },

    /// The argument vector was rejected by the parser
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// The user handler failed; the error is passed through untouched
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// Writing to the console failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    /// Create a metadata error with context
    pub fn metadata<S: Into<String>>(msg: S) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create a missing-description error
    pub fn missing_description(command: &str, field: &str) -> Self {
        Self::MissingDescription {
            command: command.to_string(),
            field: field.to_string(),
        }
    }

    /// Create a type mismatch error from a clap lookup failure
    pub fn type_mismatch(field: &str, err: clap::parser::MatchesError) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether this error was raised while wiring, before any argument was parsed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingDescription { .. }
                | Self::AmbiguousField { .. }
                | Self::InvalidAlias { .. }
                | Self::DuplicateField { .. }
                | Self::InvalidPositional { .. }
                | Self::DuplicateCommand { .. }
                | Self::Metadata(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_flagged() {
        assert!(BindError::missing_description("greet", "name").is_configuration());
        assert!(BindError::metadata("bad toml").is_configuration());
        assert!(!BindError::UnknownField("name".into()).is_configuration());
    }

    #[test]
    fn test_handler_error_keeps_message() {
        let err: BindError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
