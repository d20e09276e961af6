//! Primitive registry - field identifier to bound primitive

use super::context::ParsedContext;
use super::error::{BindError, BindResult};
use super::primitive::PrimitiveInfo;

pub(crate) type WriteBack<C> =
    Box<dyn Fn(&mut C, &ParsedContext) -> BindResult<bool> + Send + Sync>;

struct Binding<C> {
    info: PrimitiveInfo,
    write_back: WriteBack<C>,
}

/// Primitives bound to the fields of one command, in declaration order
pub struct PrimitiveRegistry<C> {
    command: String,
    entries: Vec<Binding<C>>,
}

impl<C> PrimitiveRegistry<C> {
    /// Create an empty registry for `command`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            entries: Vec::new(),
        }
    }

    /// Record a field binding. Each field may be bound once.
    pub(crate) fn insert(
        &mut self,
        info: PrimitiveInfo,
        write_back: WriteBack<C>,
    ) -> BindResult<()> {
        if self.contains(&info.id) {
            return Err(BindError::DuplicateField {
                command: self.command.clone(),
                field: info.id,
            });
        }
        self.entries.push(Binding { info, write_back });
        Ok(())
    }

    /// Primitive bound to `field`
    pub fn get(&self, field: &str) -> Option<&PrimitiveInfo> {
        self.entries
            .iter()
            .find(|b| b.info.id == field)
            .map(|b| &b.info)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Bound field identifiers in registration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|b| b.info.id.as_str())
    }

    /// Bound primitives in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PrimitiveInfo> {
        self.entries.iter().map(|b| &b.info)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every resolved value into `command`.
    ///
    /// Returns the number of fields that were written. Fields whose value is
    /// absent keep their current value (see [`crate::binding::BindValue::resolve`]).
    pub fn apply(&self, command: &mut C, parsed: &ParsedContext) -> BindResult<usize> {
        let mut written = 0;
        for binding in &self.entries {
            if (binding.write_back)(command, parsed)? {
                written += 1;
            }
        }
        tracing::trace!(
            command = %self.command,
            written,
            bound = self.entries.len(),
            "applied parsed values"
        );
        Ok(written)
    }
}

impl<C> std::fmt::Debug for PrimitiveRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveRegistry")
            .field("command", &self.command)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}
