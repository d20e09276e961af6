//! Handler protocol for bound commands
//!
//! A handler runs after every bound field has been written back, so it sees
//! a fully populated command value rather than raw parse results.

use super::console::Console;
use super::context::ParsedContext;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Process exit code produced by a handler; 0 means success
pub type ExitCode = i32;

/// User logic attached to a command node
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    /// Run the command. Errors propagate to the caller untouched.
    async fn handle(
        &self,
        command: &C,
        parsed: &ParsedContext,
        console: &mut dyn Console,
    ) -> anyhow::Result<ExitCode>;
}

/// Handler backed by a synchronous closure
pub struct FnHandler<C, F> {
    f: F,
    _phantom: PhantomData<fn(&C)>,
}

impl<C, F> FnHandler<C, F>
where
    F: Fn(&C, &ParsedContext, &mut dyn Console) -> anyhow::Result<ExitCode> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<C, F> CommandHandler<C> for FnHandler<C, F>
where
    C: Sync,
    F: Fn(&C, &ParsedContext, &mut dyn Console) -> anyhow::Result<ExitCode> + Send + Sync,
{
    async fn handle(
        &self,
        command: &C,
        parsed: &ParsedContext,
        console: &mut dyn Console,
    ) -> anyhow::Result<ExitCode> {
        (self.f)(command, parsed, console)
    }
}

/// Handler backed by an async closure.
///
/// The closure receives an owned clone of the populated command value.
pub struct AsyncFnHandler<C, F> {
    f: F,
    _phantom: PhantomData<fn(C)>,
}

impl<C, F, Fut> AsyncFnHandler<C, F>
where
    F: Fn(C, ParsedContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ExitCode>> + Send,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<C, F, Fut> CommandHandler<C> for AsyncFnHandler<C, F>
where
    C: Clone + Send + Sync + 'static,
    F: Fn(C, ParsedContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ExitCode>> + Send + 'static,
{
    async fn handle(
        &self,
        command: &C,
        parsed: &ParsedContext,
        _console: &mut dyn Console,
    ) -> anyhow::Result<ExitCode> {
        (self.f)(command.clone(), parsed.clone()).await
    }
}
