//! Parse result handed to the invocation adapter and handlers

use super::error::{BindError, BindResult};
use super::primitive::TypedPrimitive;
use super::value::BindValue;
use clap::ArgMatches;

/// Resolved output of matching one command node against the argument vector
#[derive(Debug, Clone)]
pub struct ParsedContext {
    path: Vec<String>,
    matches: ArgMatches,
    known: Vec<String>,
}

impl ParsedContext {
    /// Wrap the matches of the invoked node.
    ///
    /// `known` lists the parser ids declared on that node.
    pub fn new(path: Vec<String>, matches: ArgMatches, known: Vec<String>) -> Self {
        Self {
            path,
            matches,
            known,
        }
    }

    /// Command names from the root down to the invoked node
    pub fn command_path(&self) -> &[String] {
        &self.path
    }

    /// Name of the invoked node
    pub fn command_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Raw clap matches for the invoked node
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// Whether the user supplied a value for `id` on the command line
    pub fn is_present(&self, id: &str) -> bool {
        self.known.iter().any(|k| k == id)
            && matches!(
                self.matches.value_source(id),
                Some(clap::parser::ValueSource::CommandLine)
            )
    }

    /// Typed value for a parser id declared on the invoked node
    pub fn get<T: BindValue>(&self, id: &str) -> BindResult<Option<T>> {
        if !self.known.iter().any(|k| k == id) {
            return Err(BindError::UnknownField(id.to_string()));
        }
        T::resolve(&self.matches, id)
    }

    /// Typed value of a primitive, typically one that was built up front
    pub fn value<P: TypedPrimitive>(&self, primitive: &P) -> BindResult<Option<P::Value>> {
        primitive.resolve(self)
    }
}
