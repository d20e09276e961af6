//! Declarative binding of command structs to clap parsers
//!
//! This module turns a plain command struct plus explicit per-field metadata
//! into a wired clap command. The pieces, leaf first:
//!
//! - **metadata**: [`FieldMeta`] aliases, description, required and positional markers
//! - **primitive**: [`create_option`] / [`create_argument`], typed by [`BindValue`]
//! - **binder**: [`bind`] classifies fields and fills a [`PrimitiveRegistry`]
//! - **invoke**: [`invoke`] writes parsed values back, then calls the handler
//! - **command**: [`CommandSpec`] / [`CommandBuilder`] and the [`CommandNode`] tree
//!
//! Write-back is two-way binding on purpose: after a run, the command value
//! holds what was parsed.

pub mod binder;
pub mod command;
pub mod console;
pub mod context;
pub mod error;
pub mod handler;
pub mod invoke;
pub mod metadata;
pub mod primitive;
pub mod registry;
pub mod value;

// Re-export main types
pub use binder::{bind, Bound, FieldDecl};
pub use command::{CommandBuilder, CommandNode, CommandSpec, NO_HANDLER_EXIT_CODE};
pub use console::{BufferConsole, Console, StdConsole};
pub use context::ParsedContext;
pub use error::{BindError, BindResult};
pub use handler::{AsyncFnHandler, CommandHandler, ExitCode, FnHandler};
pub use invoke::invoke;
pub use metadata::{AliasToken, FieldKind, FieldMeta};
pub use primitive::{
    create_argument, create_option, ArgumentPrimitive, OptionPrimitive, Primitive, PrimitiveInfo,
    PrimitiveKind, TypedPrimitive,
};
pub use registry::PrimitiveRegistry;
pub use value::{BindValue, ScalarValue};
