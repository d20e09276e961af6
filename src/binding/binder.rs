//! Binder - turns declared fields into primitives on a parser node
//!
//! Fields are visited in declaration order and classified:
//!
//! 1. a pre-built primitive is attached as-is, with the field's required and
//!    description metadata applied to it; it is not written back
//! 2. a positional marker builds an argument primitive
//! 3. one or more aliases build an option primitive
//! 4. anything else is inert and skipped
//!
//! Cases 2 and 3 are recorded in the returned [`PrimitiveRegistry`] together
//! with a write-back into the field. Every configuration problem is reported
//! here, before any argument vector is parsed.

use super::context::ParsedContext;
use super::error::{BindError, BindResult};
use super::metadata::{AliasToken, FieldKind, FieldMeta};
use super::primitive::{create_argument, create_option, Primitive, PrimitiveInfo, PrimitiveKind};
use super::registry::{PrimitiveRegistry, WriteBack};
use super::value::BindValue;
use clap::Command;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Typed access to one field of `C`, erased over the field type
trait FieldSlot<C>: Send + Sync {
    fn create_option(
        &self,
        meta: &FieldMeta,
        description: &str,
    ) -> BindResult<Box<dyn Primitive>>;
    fn create_argument(&self, meta: &FieldMeta, description: &str) -> Box<dyn Primitive>;
    fn into_write_back(self: Box<Self>, id: String) -> WriteBack<C>;
}

struct Accessor<C, T, F> {
    access: F,
    _marker: PhantomData<fn(&mut C) -> T>,
}

impl<C, T, F> FieldSlot<C> for Accessor<C, T, F>
where
    C: 'static,
    T: BindValue,
    F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
{
    fn create_option(
        &self,
        meta: &FieldMeta,
        description: &str,
    ) -> BindResult<Box<dyn Primitive>> {
        let option = create_option::<T, _>(&meta.aliases, description)?.with_id(meta.id.clone());
        Ok(Box::new(option))
    }

    fn create_argument(&self, meta: &FieldMeta, description: &str) -> Box<dyn Primitive> {
        Box::new(create_argument::<T>(&meta.id, description))
    }

    fn into_write_back(self: Box<Self>, id: String) -> WriteBack<C> {
        let access = self.access;
        Box::new(move |command: &mut C, parsed: &ParsedContext| {
            match parsed.get::<T>(&id)? {
                Some(value) => {
                    *access(command) = value;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }
}

/// One declared field of a command
pub struct FieldDecl<C> {
    meta: FieldMeta,
    source: FieldSource<C>,
}

enum FieldSource<C> {
    Slot(Box<dyn FieldSlot<C>>),
    Prebuilt(Box<dyn Primitive>),
}

impl<C: 'static> FieldDecl<C> {
    /// A field reached through `access`, bound according to `meta`
    pub fn field<T, F>(access: F, meta: FieldMeta) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        Self {
            meta,
            source: FieldSource::Slot(Box::new(Accessor {
                access,
                _marker: PhantomData,
            })),
        }
    }

    /// A field that already holds a constructed primitive
    pub fn primitive<P: Primitive + 'static>(primitive: P, meta: FieldMeta) -> Self {
        Self {
            meta,
            source: FieldSource::Prebuilt(Box::new(primitive)),
        }
    }
}

impl<C> FieldDecl<C> {
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Classification of this field
    pub fn kind(&self) -> FieldKind {
        match self.source {
            FieldSource::Prebuilt(_) => FieldKind::PrimitiveInstance,
            FieldSource::Slot(_) => self.meta.classify(),
        }
    }
}

/// Parser node with its bound primitives
pub struct Bound<C> {
    pub node: Command,
    pub registry: PrimitiveRegistry<C>,
}

impl<C> std::fmt::Debug for Bound<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bound")
            .field("node", &self.node)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Flag names, ids and positional slots already taken on one node
#[derive(Default)]
struct NameTable {
    ids: HashSet<String>,
    longs: HashMap<String, String>,
    shorts: HashMap<char, String>,
    /// Last positional so far, and whether it takes several values
    last_positional: Option<(String, bool)>,
    /// First positional that is not required
    first_optional: Option<String>,
}

impl NameTable {
    fn for_node(node: &Command) -> Self {
        let mut table = Self::default();
        table.ids.insert("help".into());
        table.longs.insert("help".into(), "help".into());
        table.shorts.insert('h', "help".into());
        if node.get_version().is_some() {
            table.ids.insert("version".into());
            table.longs.insert("version".into(), "version".into());
            table.shorts.insert('V', "version".into());
        }
        table
    }

    fn claim(&mut self, command: &str, info: &PrimitiveInfo) -> BindResult<()> {
        if !self.ids.insert(info.id.clone()) {
            return Err(BindError::DuplicateField {
                command: command.to_string(),
                field: info.id.clone(),
            });
        }

        if info.kind == PrimitiveKind::Argument {
            self.claim_position(command, info)?;
        }

        for alias in &info.aliases {
            let owner = match AliasToken::parse(&info.id, alias)? {
                AliasToken::Long(long) => self.longs.insert(long, info.id.clone()),
                AliasToken::Short(c) => self.shorts.insert(c, info.id.clone()),
            };
            if let Some(owner) = owner {
                return Err(BindError::InvalidAlias {
                    field: info.id.clone(),
                    alias: alias.clone(),
                    reason: format!("already used by '{}'", owner),
                });
            }
        }
        Ok(())
    }

    /// Positionals fill left to right: a multi-valued one must be last and
    /// no required one may follow an optional one.
    fn claim_position(&mut self, command: &str, info: &PrimitiveInfo) -> BindResult<()> {
        let invalid = |reason: String| BindError::InvalidPositional {
            command: command.to_string(),
            field: info.id.clone(),
            reason,
        };

        if let Some((previous, true)) = &self.last_positional {
            return Err(invalid(format!(
                "'{}' takes several values and must be the last positional",
                previous
            )));
        }
        if info.required {
            if let Some(optional) = &self.first_optional {
                return Err(invalid(format!(
                    "required positional follows optional '{}'",
                    optional
                )));
            }
        } else if self.first_optional.is_none() {
            self.first_optional = Some(info.id.clone());
        }

        self.last_positional = Some((info.id.clone(), info.multiple));
        Ok(())
    }
}

/// Bind `fields` onto `node`
pub fn bind<C>(mut node: Command, fields: Vec<FieldDecl<C>>) -> BindResult<Bound<C>> {
    let command = node.get_name().to_string();
    let mut registry = PrimitiveRegistry::new(command.clone());
    let mut names = NameTable::for_node(&node);

    for decl in fields {
        let kind = decl.kind();
        let FieldDecl { meta, source } = decl;

        match (kind, source) {
            (FieldKind::PrimitiveInstance, FieldSource::Prebuilt(mut primitive)) => {
                if meta.required {
                    primitive.mark_required();
                }
                if let Some(description) = meta.description.as_deref() {
                    primitive.describe(description);
                }
                if primitive.info().description.is_none() {
                    return Err(BindError::missing_description(&command, &primitive.info().id));
                }
                names.claim(&command, primitive.info())?;
                debug!(
                    command = %command,
                    field = %primitive.info().id,
                    "attached pre-built primitive"
                );
                node = primitive.attach(node);
            }
            (FieldKind::ArgumentMarker, FieldSource::Slot(slot)) => {
                if !meta.aliases.is_empty() {
                    return Err(BindError::AmbiguousField {
                        command,
                        field: meta.id,
                    });
                }
                let description = meta.require_description(&command)?;
                let mut primitive = slot.create_argument(&meta, description);
                node = attach_bound(node, &command, &meta, &mut primitive, &mut names)?;
                registry.insert(primitive.info().clone(), slot.into_write_back(meta.id))?;
            }
            (FieldKind::OptionFromAlias, FieldSource::Slot(slot)) => {
                let description = meta.require_description(&command)?;
                let mut primitive = slot.create_option(&meta, description)?;
                node = attach_bound(node, &command, &meta, &mut primitive, &mut names)?;
                registry.insert(primitive.info().clone(), slot.into_write_back(meta.id))?;
            }
            _ => {
                trace!(
                    command = %command,
                    field = %meta.id,
                    "field has no binding metadata, skipped"
                );
            }
        }
    }

    Ok(Bound { node, registry })
}

fn attach_bound(
    node: Command,
    command: &str,
    meta: &FieldMeta,
    primitive: &mut Box<dyn Primitive>,
    names: &mut NameTable,
) -> BindResult<Command> {
    if meta.required {
        primitive.mark_required();
    }
    names.claim(command, primitive.info())?;
    debug!(
        command = %command,
        field = %meta.id,
        kind = ?primitive.info().kind,
        required = meta.required,
        multiple = primitive.info().multiple,
        "bound field"
    );
    Ok(primitive.attach(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Greet {
        name: String,
        tags: Vec<String>,
        count: u32,
        note: String,
    }

    fn fields() -> Vec<FieldDecl<Greet>> {
        vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.name,
                FieldMeta::new("name").aliases(["--name", "-n"]).description("Who").required(),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.tags,
                FieldMeta::new("tags").alias("--tag").description("Tags"),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.count,
                FieldMeta::new("count").positional().description("Count"),
            ),
            FieldDecl::field(|g: &mut Greet| &mut g.note, FieldMeta::new("note")),
        ]
    }

    #[test]
    fn test_bind_registers_in_declaration_order() {
        let bound = bind(Command::new("greet"), fields()).unwrap();
        let keys: Vec<&str> = bound.registry.fields().collect();
        assert_eq!(keys, ["name", "tags", "count"]);

        let name = bound.registry.get("name").unwrap();
        assert_eq!(name.kind, PrimitiveKind::Option);
        assert!(name.required);
        assert_eq!(name.aliases, ["--name", "-n"]);

        assert!(bound.registry.get("tags").unwrap().multiple);
        assert_eq!(bound.registry.get("count").unwrap().kind, PrimitiveKind::Argument);
        assert!(!bound.registry.contains("note"));
    }

    #[test]
    fn test_bind_attaches_to_node() {
        let bound = bind(Command::new("greet"), fields()).unwrap();
        let ids: Vec<&str> = bound.node.get_arguments().map(|a| a.get_id().as_str()).collect();
        assert_eq!(ids, ["name", "tags", "count"]);
    }

    #[test]
    fn test_missing_description_fails_fast() {
        let decl = FieldDecl::field(
            |g: &mut Greet| &mut g.name,
            FieldMeta::new("name").alias("-n"),
        );
        let err = bind(Command::new("greet"), vec![decl]).unwrap_err();
        assert!(matches!(err, BindError::MissingDescription { .. }));
    }

    #[test]
    fn test_positional_with_aliases_is_ambiguous() {
        let decl = FieldDecl::field(
            |g: &mut Greet| &mut g.count,
            FieldMeta::new("count").positional().alias("-c").description("Count"),
        );
        let err = bind(Command::new("greet"), vec![decl]).unwrap_err();
        assert!(matches!(err, BindError::AmbiguousField { .. }));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let decls = vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.name,
                FieldMeta::new("name").alias("--a").description("A"),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.note,
                FieldMeta::new("name").alias("--b").description("B"),
            ),
        ];
        let err = bind(Command::new("greet"), decls).unwrap_err();
        assert!(matches!(err, BindError::DuplicateField { .. }));
    }

    #[test]
    fn test_alias_collision_is_rejected() {
        let decls = vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.name,
                FieldMeta::new("name").alias("-n").description("A"),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.note,
                FieldMeta::new("note").alias("-n").description("B"),
            ),
        ];
        let err = bind(Command::new("greet"), decls).unwrap_err();
        assert!(matches!(err, BindError::InvalidAlias { .. }));
    }

    #[test]
    fn test_help_alias_is_reserved() {
        let decl = FieldDecl::field(
            |g: &mut Greet| &mut g.name,
            FieldMeta::new("name").alias("-h").description("A"),
        );
        assert!(bind(Command::new("greet"), vec![decl]).is_err());
    }

    #[test]
    fn test_help_and_version_ids_are_reserved() {
        let decl = FieldDecl::field(
            |g: &mut Greet| &mut g.name,
            FieldMeta::new("help").alias("--assist").description("A"),
        );
        let err = bind(Command::new("greet"), vec![decl]).unwrap_err();
        assert!(matches!(err, BindError::DuplicateField { ref field, .. } if field == "help"));

        let version = || {
            FieldDecl::field(
                |g: &mut Greet| &mut g.note,
                FieldMeta::new("version").alias("--release").description("B"),
            )
        };
        let versioned = Command::new("greet").version("1.0");
        assert!(bind(versioned, vec![version()]).is_err());
        assert!(bind(Command::new("greet"), vec![version()]).is_ok());
    }

    #[test]
    fn test_required_positional_after_optional_is_rejected() {
        let decls = vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.tags,
                FieldMeta::new("files").positional().description("Files"),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.name,
                FieldMeta::new("dest").positional().description("Dest").required(),
            ),
        ];
        let err = bind(Command::new("copy"), decls).unwrap_err();
        assert!(matches!(err, BindError::InvalidPositional { ref field, .. } if field == "dest"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_multi_valued_positional_must_be_last() {
        let decls = vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.tags,
                FieldMeta::new("files").positional().description("Files").required(),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.note,
                FieldMeta::new("dest").positional().description("Dest"),
            ),
        ];
        let err = bind(Command::new("copy"), decls).unwrap_err();
        assert!(matches!(err, BindError::InvalidPositional { ref field, .. } if field == "dest"));
    }

    #[test]
    fn test_positionals_in_valid_order_parse() {
        let decls = vec![
            FieldDecl::field(
                |g: &mut Greet| &mut g.name,
                FieldMeta::new("dest").positional().description("Dest").required(),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.count,
                FieldMeta::new("count").positional().description("Count"),
            ),
            FieldDecl::field(
                |g: &mut Greet| &mut g.tags,
                FieldMeta::new("files").positional().description("Files"),
            ),
        ];
        let bound = bind(Command::new("copy"), decls).unwrap();
        let matches = bound
            .node
            .try_get_matches_from(["copy", "out", "2", "a", "b"])
            .unwrap();
        let files: Vec<&String> = matches.get_many::<String>("files").unwrap().collect();
        assert_eq!(files, ["a", "b"]);
    }

    #[test]
    fn test_prebuilt_primitive_gets_required_marker() {
        let option = create_option::<String, _>(&["--level"], "Level").unwrap();
        let decl = FieldDecl::<Greet>::primitive(option, FieldMeta::new("level").required());
        let bound = bind(Command::new("greet"), vec![decl]).unwrap();

        assert!(bound.registry.is_empty());
        let arg = bound.node.get_arguments().find(|a| a.get_id() == "level").unwrap();
        assert!(arg.is_required_set());
    }

    #[test]
    fn test_inert_required_field_is_skipped() {
        let decl = FieldDecl::field(|g: &mut Greet| &mut g.note, FieldMeta::new("note").required());
        assert_eq!(decl.kind(), FieldKind::Ignored);
        let bound = bind(Command::new("greet"), vec![decl]).unwrap();
        assert_eq!(bound.node.get_arguments().count(), 0);
    }
}
