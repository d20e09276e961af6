//! Console host: runs the root command as a hosted service.
//!
//! The host starts its services, waits until one of them (or Ctrl-C) asks it
//! to stop, then stops them in reverse order. [`ConsoleHostedService`] runs
//! the root command once and requests the stop when it is done, so the
//! host's lifetime is the command's lifetime.
//!
//! ```rust,no_run
//! use cmdbind::binding::CommandSpec;
//! use cmdbind::host::Host;
//!
//! # async fn example() -> cmdbind::host::HostResult<()> {
//! let status = CommandSpec::builder("status", ())
//!     .handler_fn(|_: &(), _, _| Ok(0))
//!     .build()?;
//!
//! let code = Host::builder()
//!     .add_command(status)
//!     .add_console_app(|commands| {
//!         CommandSpec::builder("app", ()).subcommands(commands).build()
//!     })
//!     .build()?
//!     .run_console_app()
//!     .await?;
//! println!("exit code {code}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod hosted;
pub mod lifetime;
pub mod services;

pub use builder::{Host, HostBuilder};
pub use error::{HostError, HostResult};
pub use hosted::{ConsoleHostedService, HostedService, LifecycleState};
pub use lifetime::ApplicationLifetime;
pub use services::Services;

use crate::binding::{CommandNode, ExitCode};

/// Run `root` under a default host with the process arguments.
///
/// With the `config` feature, settings are read from the environment first
/// and logging is installed with their log filter.
pub async fn run_console_app<N: CommandNode + 'static>(root: N) -> HostResult<ExitCode> {
    let builder = Host::builder();

    #[cfg(feature = "config")]
    let builder = {
        let settings = crate::config::HostSettings::from_env(None);
        settings.init_logging();
        builder.settings(&settings)
    };

    builder
        .add_console_app(move |_| Ok(root))
        .build()?
        .run_console_app()
        .await
}
