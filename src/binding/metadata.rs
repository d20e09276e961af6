//! Field metadata: aliases, description, required and positional markers
//!
//! A [`FieldMeta`] is the explicit configuration attached to one field of a
//! command struct. It never fails to construct; the binder decides what a
//! given combination of markers means (see [`FieldMeta::classify`]).

use super::error::{BindError, BindResult};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// How the binder treats a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The field is backed by a primitive that was constructed elsewhere
    PrimitiveInstance,
    /// An option is built from the alias list
    OptionFromAlias,
    /// A positional argument is built from the marker
    ArgumentMarker,
    /// Nothing to bind
    Ignored,
}

/// Metadata for one field of a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct FieldMeta {
    /// Field identifier (key in the primitive registry)
    #[cfg_attr(feature = "config", serde(skip))]
    pub id: String,

    /// Alias tokens, first one is the primary name
    #[cfg_attr(feature = "config", serde(default))]
    pub aliases: Vec<String>,

    /// Help text
    #[cfg_attr(feature = "config", serde(default))]
    pub description: Option<String>,

    /// Whether the parser must see a value for this field
    #[cfg_attr(feature = "config", serde(default))]
    pub required: bool,

    /// Whether this field is a positional argument
    #[cfg_attr(feature = "config", serde(default))]
    pub positional: bool,
}

impl FieldMeta {
    /// Create empty metadata for a field
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Append an alias token such as `--name` or `-n`
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Append several alias tokens in order
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Set the help text
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as a positional argument
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// The primary alias, if any
    pub fn primary_alias(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }

    /// Classify a field that is not backed by a pre-built primitive.
    ///
    /// The positional marker wins over aliases; the binder rejects fields
    /// that carry both.
    pub fn classify(&self) -> FieldKind {
        if self.positional {
            FieldKind::ArgumentMarker
        } else if !self.aliases.is_empty() {
            FieldKind::OptionFromAlias
        } else {
            FieldKind::Ignored
        }
    }

    /// The description, or a configuration error naming the command
    pub(crate) fn require_description(&self, command: &str) -> BindResult<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| BindError::missing_description(command, &self.id))
    }
}

/// A parsed alias token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasToken {
    /// `--name` or a bare `name`
    Long(String),
    /// `-n`
    Short(char),
}

impl AliasToken {
    /// Parse an alias token for `field`
    pub fn parse(field: &str, alias: &str) -> BindResult<Self> {
        let invalid = |reason: &str| BindError::InvalidAlias {
            field: field.to_string(),
            alias: alias.to_string(),
            reason: reason.to_string(),
        };

        if let Some(long) = alias.strip_prefix("--") {
            if long.is_empty() || long.starts_with('-') {
                return Err(invalid("empty long name"));
            }
            if long.chars().any(char::is_whitespace) {
                return Err(invalid("contains whitespace"));
            }
            return Ok(Self::Long(long.to_string()));
        }

        if let Some(short) = alias.strip_prefix('-') {
            let mut chars = short.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c != '-' && !c.is_whitespace() => Ok(Self::Short(c)),
                (None, _) => Err(invalid("empty short name")),
                _ => Err(invalid("single-dash aliases must be one character")),
            };
        }

        if alias.is_empty() || alias.chars().any(char::is_whitespace) {
            return Err(invalid("not a flag name"));
        }
        Ok(Self::Long(alias.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(FieldMeta::new("x").classify(), FieldKind::Ignored);
        assert_eq!(
            FieldMeta::new("x").alias("--x").classify(),
            FieldKind::OptionFromAlias
        );
        assert_eq!(
            FieldMeta::new("x").positional().classify(),
            FieldKind::ArgumentMarker
        );
    }

    #[test]
    fn test_alias_order_is_kept() {
        let meta = FieldMeta::new("name").alias("--name").aliases(["-n", "who"]);
        assert_eq!(meta.primary_alias(), Some("--name"));
        assert_eq!(meta.aliases, vec!["--name", "-n", "who"]);
    }

    #[test]
    fn test_parse_alias_tokens() {
        assert_eq!(
            AliasToken::parse("f", "--name").unwrap(),
            AliasToken::Long("name".into())
        );
        assert_eq!(AliasToken::parse("f", "-n").unwrap(), AliasToken::Short('n'));
        assert_eq!(
            AliasToken::parse("f", "name").unwrap(),
            AliasToken::Long("name".into())
        );
    }

    #[test]
    fn test_parse_invalid_alias_tokens() {
        for bad in ["-name", "--", "-", "", "two words", "---x"] {
            let err = AliasToken::parse("f", bad).unwrap_err();
            assert!(matches!(err, BindError::InvalidAlias { .. }), "{bad}");
        }
    }

    #[test]
    fn test_blank_description_is_missing() {
        let meta = FieldMeta::new("name").alias("-n").description("  ");
        assert!(meta.require_description("greet").is_err());
    }
}
