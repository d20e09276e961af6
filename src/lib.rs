//! cmdbind - declarative command-line binding with a console host
//!
//! Describe a command as a plain struct plus per-field metadata, and cmdbind
//! builds the clap parser, writes parsed values back into the struct and
//! calls your handler:
//!
//! - **`binding`** - field metadata, typed primitives, the binder and the command tree
//! - **`config`** - TOML field metadata and environment settings
//! - **`host`** - runs the root command as a hosted service and returns its exit code
//! - **`observability`** - tracing subscriber setup
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! cmdbind = { version = "0.1", default-features = false }
//! # Or pick what you need:
//! cmdbind = { version = "0.1", features = ["config", "host"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cmdbind::prelude::*;
//! use std::io::Write;
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//!     times: u8,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let greet = CommandSpec::builder("greet", Greet { times: 1, ..Default::default() })
//!         .required_option(|g: &mut Greet| &mut g.name, "name", &["--name", "-n"], "Who to greet")
//!         .option(|g: &mut Greet| &mut g.times, "times", &["--times", "-t"], "Repeat count")
//!         .handler_fn(|g: &Greet, _, console| {
//!             for _ in 0..g.times {
//!                 writeln!(console.out(), "Hello, {}!", g.name)?;
//!             }
//!             Ok(0)
//!         })
//!         .build()?;
//!
//!     let code = cmdbind::host::run_console_app(greet).await?;
//!     std::process::exit(code);
//! }
//! ```

/// Declarative binding of command structs to parsers
pub mod binding;

/// Configuration loading (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Console host (enabled with the `host` feature)
#[cfg(feature = "host")]
pub mod host;

/// Logging setup
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binding::{
        create_argument, create_option, BindError, BindResult, CommandBuilder, CommandHandler,
        CommandNode, CommandSpec, Console, ExitCode, FieldMeta, ParsedContext, TypedPrimitive,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{CommandMetadata, HostSettings};

    #[cfg(feature = "host")]
    pub use crate::host::{Host, HostBuilder, HostError, HostResult};
}
