//! Command metadata files
//!
//! Describes a command's about text and per-field [`FieldMeta`] in TOML, so
//! aliases and help text can live outside the code:
//!
//! ```toml
//! name = "greet"
//! about = "Say hello"
//!
//! [fields.name]
//! aliases = ["--name", "-n"]
//! description = "Who to greet"
//! required = true
//!
//! [fields.count]
//! positional = true
//! description = "How many times"
//! ```

use crate::binding::{BindError, BindResult, FieldMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata for one command, keyed by field identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Command name
    #[serde(default)]
    pub name: Option<String>,

    /// About text / description
    #[serde(default)]
    pub about: Option<String>,

    /// Field metadata by field identifier
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMeta>,
}

impl CommandMetadata {
    /// Parse metadata from a TOML string
    pub fn from_toml_str(content: &str) -> BindResult<Self> {
        toml::from_str(content)
            .map_err(|e| BindError::metadata(format!("Failed to parse TOML: {}", e)))
    }

    /// Load metadata from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> BindResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BindError::metadata(format!(
                "Failed to read metadata file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Metadata for `id`, with the identifier filled in
    pub fn field(&self, id: &str) -> BindResult<FieldMeta> {
        let mut meta = self
            .fields
            .get(id)
            .cloned()
            .ok_or_else(|| BindError::metadata(format!("No metadata for field '{}'", id)))?;
        meta.id = id.to_string();
        Ok(meta)
    }
}
