//! Host construction and the run loop

use super::error::{HostError, HostResult};
use super::hosted::{ConsoleHostedService, HostedService};
use super::lifetime::ApplicationLifetime;
use super::services::Services;
use crate::binding::{BindResult, CommandNode, Console, ExitCode, StdConsole};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::{debug, info, warn};

type RootFactory =
    Box<dyn FnOnce(Vec<Box<dyn CommandNode>>) -> BindResult<Box<dyn CommandNode>> + Send>;

/// Collects commands, services and settings, then builds a [`Host`]
pub struct HostBuilder {
    services: Services,
    hosted: Vec<Arc<dyn HostedService>>,
    commands: Vec<Box<dyn CommandNode>>,
    root: Option<RootFactory>,
    args: Option<Vec<OsString>>,
    console: Option<Box<dyn Console>>,
    handle_ctrl_c: bool,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBuilder {
    pub fn new() -> Self {
        Self {
            services: Services::new(),
            hosted: Vec::new(),
            commands: Vec::new(),
            root: None,
            args: None,
            console: None,
            handle_ctrl_c: true,
        }
    }

    /// Register a command node. Registered commands are handed to the
    /// [`HostBuilder::add_console_app`] factory, in registration order.
    pub fn add_command<N: CommandNode + 'static>(mut self, command: N) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// Set the root command.
    ///
    /// `factory` receives the commands registered with
    /// [`HostBuilder::add_command`], typically to attach them as children.
    pub fn add_console_app<N, F>(mut self, factory: F) -> Self
    where
        N: CommandNode + 'static,
        F: FnOnce(Vec<Box<dyn CommandNode>>) -> BindResult<N> + Send + 'static,
    {
        self.root = Some(Box::new(move |commands| {
            factory(commands).map(|root| Box::new(root) as Box<dyn CommandNode>)
        }));
        self
    }

    /// Register a shared value reachable through [`Host::services`]
    pub fn add_singleton<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.services.add_singleton(value);
        self
    }

    /// Run an extra service alongside the console app
    pub fn add_hosted_service<S: HostedService + 'static>(mut self, service: S) -> Self {
        let service = Arc::new(service);
        self.services.insert_arc(Arc::clone(&service));
        self.hosted.push(service);
        self
    }

    /// Arguments for the root command, program name excluded.
    ///
    /// Defaults to the process arguments minus the program name.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Console the root command writes to. Defaults to [`StdConsole`].
    pub fn console<C: Console + 'static>(mut self, console: C) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Whether Ctrl-C stops the host. On by default.
    pub fn handle_ctrl_c(mut self, enabled: bool) -> Self {
        self.handle_ctrl_c = enabled;
        self
    }

    /// Apply settings read from the environment
    #[cfg(feature = "config")]
    pub fn settings(self, settings: &crate::config::HostSettings) -> Self {
        self.handle_ctrl_c(settings.handle_ctrl_c)
    }

    pub fn build(mut self) -> HostResult<Host> {
        match self.root.take() {
            Some(factory) => {
                let root = factory(std::mem::take(&mut self.commands))?;
                let args = self
                    .args
                    .take()
                    .unwrap_or_else(|| std::env::args_os().skip(1).collect());
                let console = self
                    .console
                    .take()
                    .unwrap_or_else(|| Box::new(StdConsole::new()));
                debug!(command = root.name(), "console app registered");

                let app = Arc::new(ConsoleHostedService::new(root, args, console));
                self.services.insert_arc(Arc::clone(&app));
                self.hosted.insert(0, app);
            }
            None if !self.commands.is_empty() => {
                return Err(HostError::Configuration(
                    "commands were registered without a console app".to_string(),
                ));
            }
            None => {}
        }

        Ok(Host {
            services: self.services,
            hosted: self.hosted,
            lifetime: ApplicationLifetime::new(),
            handle_ctrl_c: self.handle_ctrl_c,
        })
    }
}

/// Owns the hosted services and runs them until shutdown is requested
pub struct Host {
    services: Services,
    hosted: Vec<Arc<dyn HostedService>>,
    lifetime: ApplicationLifetime,
    handle_ctrl_c: bool,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Handle that stops this host
    pub fn lifetime(&self) -> ApplicationLifetime {
        self.lifetime.clone()
    }

    /// Start every service, wait for a stop request, then stop them in
    /// reverse order.
    ///
    /// With no services and Ctrl-C handling off this only returns once
    /// [`ApplicationLifetime::stop_application`] is called.
    pub async fn run(&self) -> HostResult<()> {
        info!(services = self.hosted.len(), "host starting");
        for service in &self.hosted {
            debug!(service = service.name(), "starting service");
            if let Err(e) = service.start(self.lifetime.clone()).await {
                self.lifetime.stop_application();
                return Err(HostError::service(service.name(), e));
            }
        }

        if self.handle_ctrl_c {
            let lifetime = self.lifetime.clone();
            tokio::spawn(async move {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => match result {
                        Ok(()) => {
                            info!("ctrl-c received; stopping host");
                            lifetime.stop_application();
                        }
                        Err(e) => warn!("ctrl-c handler unavailable: {}", e),
                    },
                    _ = lifetime.stopping() => {}
                }
            });
        }

        self.lifetime.stopping().await;
        info!("host stopping");

        for service in self.hosted.iter().rev() {
            service
                .stop()
                .await
                .map_err(|e| HostError::service(service.name(), e))?;
        }
        Ok(())
    }

    /// Run the host and return the root command's exit code.
    ///
    /// A handler error comes back as [`HostError::Bind`]. If the host stops
    /// before the command finishes the result is [`HostError::NotCompleted`].
    pub async fn run_console_app(self) -> HostResult<ExitCode> {
        let app = self.services.get_required::<ConsoleHostedService>()?;
        self.run().await?;
        app.take_result()
    }
}
