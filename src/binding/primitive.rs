//! Primitive factory - typed option and argument primitives
//!
//! A primitive is one parser unit with a declared value type. It owns its own
//! `clap::Arg`, so it can be attached to any command node and resolved from
//! the parse result of that node.

use super::context::ParsedContext;
use super::error::{BindError, BindResult};
use super::metadata::AliasToken;
use super::value::BindValue;
use clap::{Arg, ArgAction, Command};
use std::marker::PhantomData;

/// Option (named flag) or argument (positional)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Option,
    Argument,
}

/// Type-independent description of a constructed primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveInfo {
    /// Parser id, also the key the value is stored under
    pub id: String,
    pub kind: PrimitiveKind,
    /// Declared aliases, primary first (empty for arguments)
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub required: bool,
    pub multiple: bool,
}

/// Object-safe view of a primitive, used for pre-built primitives
pub trait Primitive: Send + Sync {
    /// Description of the primitive
    fn info(&self) -> &PrimitiveInfo;

    /// The clap argument to attach
    fn to_arg(&self) -> Arg;

    /// Mark the primitive required
    fn mark_required(&mut self);

    /// Replace the help text
    fn describe(&mut self, description: &str);

    /// Attach to a parser node
    fn attach(&self, node: Command) -> Command {
        node.arg(self.to_arg())
    }
}

/// A primitive whose value type is known
pub trait TypedPrimitive: Primitive {
    type Value: BindValue;

    /// Resolve this primitive's value from a parse result
    fn resolve(&self, parsed: &ParsedContext) -> BindResult<Option<Self::Value>> {
        parsed.get::<Self::Value>(&self.info().id)
    }
}

/// A named option with value type `T`
pub struct OptionPrimitive<T> {
    arg: Arg,
    info: PrimitiveInfo,
    _marker: PhantomData<fn() -> T>,
}

/// A positional argument with value type `T`
pub struct ArgumentPrimitive<T> {
    arg: Arg,
    info: PrimitiveInfo,
    _marker: PhantomData<fn() -> T>,
}

/// Build an option for value type `T`.
///
/// The first alias is the primary name; the rest become visible aliases.
/// The parser id defaults to the primary alias without dashes.
pub fn create_option<T, S>(aliases: &[S], description: &str) -> BindResult<OptionPrimitive<T>>
where
    T: BindValue,
    S: AsRef<str>,
{
    let aliases: Vec<String> = aliases.iter().map(|a| a.as_ref().to_string()).collect();
    let primary = aliases
        .first()
        .ok_or_else(|| BindError::metadata("an option needs at least one alias"))?;
    let id = primary.trim_start_matches('-').to_string();

    let tokens = aliases
        .iter()
        .map(|a| AliasToken::parse(&id, a))
        .collect::<BindResult<Vec<_>>>()?;

    let mut arg = Arg::new(id.clone()).help(description.to_string());
    let (mut has_long, mut has_short) = (false, false);
    for token in tokens {
        arg = match token {
            AliasToken::Long(long) if !has_long => {
                has_long = true;
                arg.long(long)
            }
            AliasToken::Long(long) => arg.visible_alias(long),
            AliasToken::Short(c) if !has_short => {
                has_short = true;
                arg.short(c)
            }
            AliasToken::Short(c) => arg.visible_short_alias(c),
        };
    }

    arg = if T::FLAG {
        arg.action(ArgAction::SetTrue)
    } else if T::MULTIPLE {
        arg.action(ArgAction::Append)
            .num_args(1..)
            .value_parser(T::value_parser())
            .value_name(id.to_uppercase())
    } else {
        arg.action(ArgAction::Set)
            .value_parser(T::value_parser())
            .value_name(id.to_uppercase())
    };

    Ok(OptionPrimitive {
        arg,
        info: PrimitiveInfo {
            id,
            kind: PrimitiveKind::Option,
            aliases,
            description: Some(description.to_string()),
            required: false,
            multiple: T::MULTIPLE,
        },
        _marker: PhantomData,
    })
}

/// Build a positional argument for value type `T`
pub fn create_argument<T: BindValue>(id: &str, description: &str) -> ArgumentPrimitive<T> {
    let mut arg = Arg::new(id.to_string())
        .help(description.to_string())
        .value_parser(T::value_parser())
        .value_name(id.to_uppercase());

    arg = if T::MULTIPLE {
        arg.action(ArgAction::Append).num_args(1..)
    } else {
        arg.action(ArgAction::Set)
    };

    ArgumentPrimitive {
        arg,
        info: PrimitiveInfo {
            id: id.to_string(),
            kind: PrimitiveKind::Argument,
            aliases: Vec::new(),
            description: Some(description.to_string()),
            required: false,
            multiple: T::MULTIPLE,
        },
        _marker: PhantomData,
    }
}

macro_rules! typed_primitive {
    ($name:ident) => {
        impl<T: BindValue> $name<T> {
            /// Parser id
            pub fn id(&self) -> &str {
                &self.info.id
            }

            /// Re-key the primitive under a different parser id
            pub fn with_id(mut self, id: impl Into<String>) -> Self {
                let id = id.into();
                self.arg = self.arg.id(id.clone());
                self.info.id = id;
                self
            }

            /// Set the required flag
            pub fn required(mut self, required: bool) -> Self {
                self.arg = self.arg.required(required);
                self.info.required = required;
                self
            }

            pub fn is_required(&self) -> bool {
                self.info.required
            }

            pub fn is_multiple(&self) -> bool {
                self.info.multiple
            }

            /// The underlying clap argument
            pub fn arg(&self) -> &Arg {
                &self.arg
            }
        }

        impl<T: BindValue> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self {
                    arg: self.arg.clone(),
                    info: self.info.clone(),
                    _marker: PhantomData,
                }
            }
        }

        impl<T: BindValue> std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("info", &self.info)
                    .field("value_type", &std::any::type_name::<T>())
                    .finish()
            }
        }

        impl<T: BindValue> Primitive for $name<T> {
            fn info(&self) -> &PrimitiveInfo {
                &self.info
            }

            fn to_arg(&self) -> Arg {
                self.arg.clone()
            }

            fn mark_required(&mut self) {
                self.arg = self.arg.clone().required(true);
                self.info.required = true;
            }

            fn describe(&mut self, description: &str) {
                self.arg = self.arg.clone().help(description.to_string());
                self.info.description = Some(description.to_string());
            }
        }

        impl<T: BindValue> TypedPrimitive for $name<T> {
            type Value = T;
        }
    };
}

typed_primitive!(OptionPrimitive);
typed_primitive!(ArgumentPrimitive);

impl<T: BindValue> OptionPrimitive<T> {
    /// The primary alias as declared
    pub fn primary_alias(&self) -> &str {
        self.info
            .aliases
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// All declared aliases, primary first
    pub fn aliases(&self) -> &[String] {
        &self.info.aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(p: &dyn Primitive, args: &[&str]) -> Result<clap::ArgMatches, clap::Error> {
        p.attach(Command::new("t"))
            .try_get_matches_from(std::iter::once("t").chain(args.iter().copied()))
    }

    #[test]
    fn test_option_aliases_map_to_clap_names() {
        let opt = create_option::<String, _>(&["--name", "-n", "--who", "-w"], "Who").unwrap();
        assert_eq!(opt.id(), "name");
        assert_eq!(opt.primary_alias(), "--name");
        assert_eq!(opt.arg().get_long(), Some("name"));
        assert_eq!(opt.arg().get_short(), Some('n'));
        assert_eq!(opt.arg().get_visible_aliases(), Some(vec!["who"]));
        assert_eq!(opt.arg().get_visible_short_aliases(), Some(vec!['w']));
    }

    #[test]
    fn test_short_primary_alias() {
        let opt = create_option::<String, _>(&["-n", "--name"], "Who").unwrap();
        assert_eq!(opt.primary_alias(), "-n");
        assert_eq!(opt.id(), "n");
        assert_eq!(opt.arg().get_long(), Some("name"));
    }

    #[test]
    fn test_option_without_alias_fails() {
        let err = create_option::<String, &str>(&[], "Who").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_collection_option_is_multiple() {
        let opt = create_option::<Vec<String>, _>(&["--tag"], "Tags").unwrap();
        assert!(opt.is_multiple());
        let m = parse(&opt, &["--tag", "a", "b", "--tag", "c"]).unwrap();
        let tags: Vec<&String> = m.get_many::<String>("tag").unwrap().collect();
        assert_eq!(tags, ["a", "b", "c"]);
    }

    #[test]
    fn test_required_option_rejects_missing_value() {
        let opt = create_option::<String, _>(&["--name"], "Who")
            .unwrap()
            .required(true);
        let err = parse(&opt, &[]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_mark_required_on_prebuilt() {
        let mut arg = create_argument::<u32>("count", "How many");
        assert!(!arg.is_required());
        arg.mark_required();
        assert!(arg.is_required());
        assert!(arg.arg().is_required_set());
    }

    #[test]
    fn test_argument_parses_typed_value() {
        let arg = create_argument::<i64>("n", "A number");
        let m = parse(&arg, &["42"]).unwrap();
        assert_eq!(m.get_one::<i64>("n"), Some(&42));
    }

    #[test]
    fn test_with_id_rekeys() {
        let opt = create_option::<bool, _>(&["-v"], "Verbose")
            .unwrap()
            .with_id("verbose");
        assert_eq!(opt.arg().get_id(), "verbose");
        let m = parse(&opt, &["-v"]).unwrap();
        assert!(m.get_flag("verbose"));
    }

    #[test]
    fn test_clones_are_independent() {
        let a = create_option::<String, _>(&["--name"], "Who").unwrap();
        let b = a.clone().required(true);
        assert!(!a.is_required());
        assert!(b.is_required());
    }
}
