//! Hosted services and the adapter that runs the root command

use super::error::{HostError, HostResult};
use super::lifetime::ApplicationLifetime;
use crate::binding::{BindResult, CommandNode, Console, ExitCode};
use async_trait::async_trait;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// A unit of work started and stopped by the host
#[async_trait]
pub trait HostedService: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when the host starts. Must not block until the work is done.
    async fn start(&self, lifetime: ApplicationLifetime) -> anyhow::Result<()>;

    /// Called once when the host stops
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Where the console app is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    Completed,
}

/// Runs the root command once when the host starts.
///
/// On completion the exit code (or error) is stored and the host is asked to
/// stop. Stopping the host does not interrupt a run in progress.
pub struct ConsoleHostedService {
    inner: Arc<Inner>,
}

struct Inner {
    root: tokio::sync::Mutex<Box<dyn CommandNode>>,
    console: tokio::sync::Mutex<Box<dyn Console>>,
    args: Vec<OsString>,
    state: Mutex<LifecycleState>,
    result: Mutex<Option<BindResult<ExitCode>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConsoleHostedService {
    /// `args` excludes the program name
    pub fn new(root: Box<dyn CommandNode>, args: Vec<OsString>, console: Box<dyn Console>) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: tokio::sync::Mutex::new(root),
                console: tokio::sync::Mutex::new(console),
                args,
                state: Mutex::new(LifecycleState::Idle),
                result: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *lock(&self.inner.state)
    }

    /// Arguments handed to the root command
    pub fn args(&self) -> &[OsString] {
        &self.inner.args
    }

    /// Exit code of a completed successful run
    pub fn exit_code(&self) -> Option<ExitCode> {
        match lock(&self.inner.result).as_ref() {
            Some(Ok(code)) => Some(*code),
            _ => None,
        }
    }

    /// Take the outcome of the run.
    ///
    /// Returns [`HostError::NotCompleted`] if the run has not finished or the
    /// outcome was already taken.
    pub fn take_result(&self) -> HostResult<ExitCode> {
        match lock(&self.inner.result).take() {
            Some(result) => Ok(result?),
            None => Err(HostError::NotCompleted),
        }
    }

    /// Wait for the spawned run, if one was started
    pub async fn join(&self) {
        let task = lock(&self.inner.task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("console app task failed: {}", e);
            }
        }
    }
}

#[async_trait]
impl HostedService for ConsoleHostedService {
    fn name(&self) -> &str {
        "console-app"
    }

    async fn start(&self, lifetime: ApplicationLifetime) -> anyhow::Result<()> {
        {
            let mut state = lock(&self.inner.state);
            if *state != LifecycleState::Idle {
                anyhow::bail!("console app already started ({:?})", *state);
            }
            *state = LifecycleState::Running;
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = {
                let mut root = inner.root.lock().await;
                let mut console = inner.console.lock().await;
                debug!(command = root.name(), args = ?inner.args, "running console app");
                root.run(inner.args.clone(), &mut **console).await
            };

            match &result {
                Ok(code) => info!(code, "console app completed"),
                Err(e) => error!("console app failed: {}", e),
            }

            *lock(&inner.result) = Some(result);
            *lock(&inner.state) = LifecycleState::Completed;
            lifetime.stop_application();
        });

        *lock(&self.inner.task) = Some(task);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        debug!(state = ?self.state(), "console app stop requested");
        Ok(())
    }
}
