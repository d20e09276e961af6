//! Value types that can be bound to a field
//!
//! [`BindValue`] is what the primitive factory dispatches on: it tells the
//! factory which clap value parser and action to use, and how to read the
//! typed value back out of the parse result.

use super::error::{BindError, BindResult};
use clap::builder::ValueParser;
use clap::ArgMatches;
use std::path::PathBuf;

/// A single-token value type
pub trait ScalarValue: Clone + Send + Sync + 'static {
    /// Parser that turns one token into `Self`
    fn value_parser() -> ValueParser;
}

/// A field type the binder can construct a primitive for
pub trait BindValue: Sized + Send + Sync + 'static {
    /// Collection types accept several tokens and repeated occurrences
    const MULTIPLE: bool = false;

    /// Flag types take no value token
    const FLAG: bool = false;

    /// Parser for a single token
    fn value_parser() -> ValueParser;

    /// Read the typed value for `id`.
    ///
    /// `Ok(None)` means "nothing to write back".
    fn resolve(matches: &ArgMatches, id: &str) -> BindResult<Option<Self>>;
}

macro_rules! scalar_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarValue for $ty {
                fn value_parser() -> ValueParser {
                    clap::value_parser!($ty).into()
                }
            }

            impl BindValue for $ty {
                fn value_parser() -> ValueParser {
                    <$ty as ScalarValue>::value_parser()
                }

                fn resolve(matches: &ArgMatches, id: &str) -> BindResult<Option<Self>> {
                    matches
                        .try_get_one::<$ty>(id)
                        .map(|v| v.cloned())
                        .map_err(|e| BindError::type_mismatch(id, e))
                }
            }
        )*
    };
}

scalar_values!(
    String, PathBuf, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64,
);

impl BindValue for bool {
    const FLAG: bool = true;

    fn value_parser() -> ValueParser {
        ValueParser::bool()
    }

    fn resolve(matches: &ArgMatches, id: &str) -> BindResult<Option<Self>> {
        matches
            .try_get_one::<bool>(id)
            .map(|v| Some(v.copied().unwrap_or(false)))
            .map_err(|e| BindError::type_mismatch(id, e))
    }
}

impl<T: ScalarValue> BindValue for Vec<T> {
    const MULTIPLE: bool = true;

    fn value_parser() -> ValueParser {
        T::value_parser()
    }

    fn resolve(matches: &ArgMatches, id: &str) -> BindResult<Option<Self>> {
        let values = matches
            .try_get_many::<T>(id)
            .map_err(|e| BindError::type_mismatch(id, e))?;
        Ok(Some(values.map(|v| v.cloned().collect()).unwrap_or_default()))
    }
}

impl<T: ScalarValue> BindValue for Option<T> {
    fn value_parser() -> ValueParser {
        T::value_parser()
    }

    fn resolve(matches: &ArgMatches, id: &str) -> BindResult<Option<Self>> {
        matches
            .try_get_one::<T>(id)
            .map(|v| Some(v.cloned()))
            .map_err(|e| BindError::type_mismatch(id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn parse(arg: Arg, args: &[&str]) -> ArgMatches {
        Command::new("t")
            .arg(arg)
            .try_get_matches_from(std::iter::once("t").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_scalar_absent_is_none() {
        let m = parse(
            Arg::new("n").long("n").value_parser(<i32 as BindValue>::value_parser()),
            &[],
        );
        assert_eq!(i32::resolve(&m, "n").unwrap(), None);
    }

    #[test]
    fn test_optional_absent_writes_none() {
        let m = parse(
            Arg::new("n").long("n").value_parser(<Option<String>>::value_parser()),
            &[],
        );
        assert_eq!(<Option<String>>::resolve(&m, "n").unwrap(), Some(None));
    }

    #[test]
    fn test_vec_collects_in_order() {
        let m = parse(
            Arg::new("t")
                .long("t")
                .action(ArgAction::Append)
                .value_parser(<Vec<u8>>::value_parser()),
            &["--t", "3", "--t", "1"],
        );
        assert_eq!(<Vec<u8>>::resolve(&m, "t").unwrap(), Some(vec![3, 1]));
    }

    #[test]
    fn test_flag_defaults_to_false() {
        let m = parse(Arg::new("v").long("v").action(ArgAction::SetTrue), &[]);
        assert_eq!(bool::resolve(&m, "v").unwrap(), Some(false));
    }

    #[test]
    fn test_wrong_type_is_mismatch() {
        let m = parse(
            Arg::new("n").long("n").value_parser(<i64 as BindValue>::value_parser()),
            &["--n", "5"],
        );
        let err = String::resolve(&m, "n").unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }
}
