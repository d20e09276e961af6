//! Command tree - bound command values, their handlers and sub-commands
//!
//! A [`CommandSpec`] owns one command value, the clap node built for it, the
//! registry of bound fields and its children. Children of any value type are
//! held as [`CommandNode`] trait objects so a tree can mix command structs.
//!
//! ```rust,no_run
//! use cmdbind::binding::{CommandSpec, BufferConsole, FieldMeta};
//! use std::io::Write;
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//! }
//!
//! # async fn example() -> cmdbind::binding::BindResult<()> {
//! let mut greet = CommandSpec::builder("greet", Greet::default())
//!     .field(
//!         |g: &mut Greet| &mut g.name,
//!         FieldMeta::new("name").aliases(["--name", "-n"]).description("Who").required(),
//!     )
//!     .handler_fn(|g: &Greet, _, console| {
//!         writeln!(console.out(), "hello {}", g.name)?;
//!         Ok(0)
//!     })
//!     .build()?;
//!
//! let code = greet.run_from(["-n", "Alice"], &mut BufferConsole::new()).await?;
//! assert_eq!(code, 0);
//! # Ok(())
//! # }
//! ```

use super::binder::{bind, FieldDecl};
use super::console::Console;
use super::context::ParsedContext;
use super::error::{BindError, BindResult};
use super::handler::{AsyncFnHandler, CommandHandler, ExitCode, FnHandler};
use super::invoke::invoke;
use super::metadata::FieldMeta;
use super::primitive::Primitive;
use super::registry::PrimitiveRegistry;
use super::value::BindValue;
use async_trait::async_trait;
use clap::{ArgMatches, Command};
use std::ffi::OsString;
use std::future::Future;
use tracing::debug;

/// Exit code used when an invoked command has nothing to run
pub const NO_HANDLER_EXIT_CODE: ExitCode = 1;

/// A node of the command tree, independent of its value type
#[async_trait]
pub trait CommandNode: Send + Sync {
    /// Command name as typed on the command line
    fn name(&self) -> &str;

    /// Parser node for this command, children included
    fn parser(&self) -> Command;

    /// Dispatch matches produced by [`CommandNode::parser`].
    ///
    /// `path` holds the command names from the root down to this node.
    async fn dispatch(
        &mut self,
        path: Vec<String>,
        matches: ArgMatches,
        console: &mut dyn Console,
    ) -> BindResult<ExitCode>;

    /// Parse `args` (program name excluded) and dispatch.
    ///
    /// Parse failures are rendered to the console and turned into clap's exit
    /// code; no handler runs in that case.
    async fn run(
        &mut self,
        args: Vec<OsString>,
        console: &mut dyn Console,
    ) -> BindResult<ExitCode> {
        let name = self.name().to_string();
        let argv = std::iter::once(OsString::from(&name)).chain(args);

        let parsed = self.parser().try_get_matches_from(argv);
        match parsed {
            Ok(matches) => self.dispatch(vec![name], matches, console).await,
            Err(err) => {
                let code = err.exit_code();
                let rendered = err.render().to_string();
                if err.use_stderr() {
                    write!(console.err(), "{}", rendered)?;
                } else {
                    write!(console.out(), "{}", rendered)?;
                }
                debug!(command = %name, kind = ?err.kind(), code, "argument parsing stopped");
                Ok(code)
            }
        }
    }
}

/// A bound command value with its handler and sub-commands
pub struct CommandSpec<C> {
    name: String,
    command: C,
    node: Command,
    registry: PrimitiveRegistry<C>,
    handler: Option<Box<dyn CommandHandler<C>>>,
    children: Vec<Box<dyn CommandNode>>,
}

impl<C: Send + Sync + 'static> CommandSpec<C> {
    /// Start declaring a command named `name` around `command`
    pub fn builder(name: impl Into<String>, command: C) -> CommandBuilder<C> {
        CommandBuilder::new(name, command)
    }

    /// Current command value
    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn command_mut(&mut self) -> &mut C {
        &mut self.command
    }

    /// Give back the command value
    pub fn into_inner(self) -> C {
        self.command
    }

    /// Bound fields of this node
    pub fn registry(&self) -> &PrimitiveRegistry<C> {
        &self.registry
    }

    /// Sub-commands, in registration order
    pub fn children(&self) -> impl Iterator<Item = &dyn CommandNode> {
        self.children.iter().map(|c| c.as_ref())
    }

    /// Parse `args` against this node only, without dispatching
    pub fn parse_from<I, T>(&self, args: I) -> BindResult<ParsedContext>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv = std::iter::once(OsString::from(&self.name))
            .chain(args.into_iter().map(Into::into));
        let matches = self.node.clone().try_get_matches_from(argv)?;
        Ok(self.context(vec![self.name.clone()], matches))
    }

    /// Write parsed values into the command value in place
    pub fn apply(&mut self, parsed: &ParsedContext) -> BindResult<usize> {
        self.registry.apply(&mut self.command, parsed)
    }

    /// A copy of the command value with parsed values applied
    pub fn populated(&self, parsed: &ParsedContext) -> BindResult<C>
    where
        C: Clone,
    {
        let mut command = self.command.clone();
        self.registry.apply(&mut command, parsed)?;
        Ok(command)
    }

    /// Parse `args` (program name excluded) and run the matching handler
    pub async fn run_from<I, T>(
        &mut self,
        args: I,
        console: &mut dyn Console,
    ) -> BindResult<ExitCode>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = args.into_iter().map(Into::into).collect();
        CommandNode::run(self, args, console).await
    }

    fn context(&self, path: Vec<String>, matches: ArgMatches) -> ParsedContext {
        let known = self
            .node
            .get_arguments()
            .map(|a| a.get_id().to_string())
            .collect();
        ParsedContext::new(path, matches, known)
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> CommandNode for CommandSpec<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parser(&self) -> Command {
        self.node.clone()
    }

    async fn dispatch(
        &mut self,
        mut path: Vec<String>,
        matches: ArgMatches,
        console: &mut dyn Console,
    ) -> BindResult<ExitCode> {
        if let Some((name, sub_matches)) = matches.subcommand() {
            let child = self
                .children
                .iter_mut()
                .find(|c| c.name() == name)
                .ok_or_else(|| BindError::UnknownCommand(name.to_string()))?;
            path.push(name.to_string());
            let sub_matches = sub_matches.clone();
            return child.dispatch(path, sub_matches, console).await;
        }

        debug!(command = %path.join(" "), "dispatching");
        let parsed = self.context(path, matches);
        match &self.handler {
            Some(handler) => {
                invoke(
                    &mut self.command,
                    &self.registry,
                    &parsed,
                    handler.as_ref(),
                    console,
                )
                .await
            }
            None => {
                write!(console.err(), "{}", self.node.clone().render_help())?;
                Ok(NO_HANDLER_EXIT_CODE)
            }
        }
    }
}

/// Declares the fields, handler and children of a [`CommandSpec`]
pub struct CommandBuilder<C> {
    name: String,
    node: Command,
    command: C,
    fields: Vec<FieldDecl<C>>,
    children: Vec<Box<dyn CommandNode>>,
    handler: Option<Box<dyn CommandHandler<C>>>,
    pending: Option<BindError>,
}

impl<C: Send + Sync + 'static> CommandBuilder<C> {
    pub fn new(name: impl Into<String>, command: C) -> Self {
        let name = name.into();
        Self {
            node: Command::new(name.clone()),
            name,
            command,
            fields: Vec::new(),
            children: Vec::new(),
            handler: None,
            pending: None,
        }
    }

    /// About text shown in help
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.node = self.node.about(about.into());
        self
    }

    /// Version reported by `--version`
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.node = self.node.version(version.into());
        self
    }

    /// Alternative name for this command when used as a sub-command
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.node = self.node.visible_alias(alias.into());
        self
    }

    /// Declare a field bound according to `meta`
    pub fn field<T, F>(mut self, access: F, meta: FieldMeta) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        self.fields.push(FieldDecl::field(access, meta));
        self
    }

    /// Declare an option field
    pub fn option<T, F>(self, access: F, id: &str, aliases: &[&str], description: &str) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        let meta = FieldMeta::new(id)
            .aliases(aliases.iter().copied())
            .description(description);
        self.field(access, meta)
    }

    /// Declare a required option field
    pub fn required_option<T, F>(
        self,
        access: F,
        id: &str,
        aliases: &[&str],
        description: &str,
    ) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        let meta = FieldMeta::new(id)
            .aliases(aliases.iter().copied())
            .description(description)
            .required();
        self.field(access, meta)
    }

    /// Declare a positional argument field
    pub fn argument<T, F>(self, access: F, id: &str, description: &str, required: bool) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        let mut meta = FieldMeta::new(id).positional().description(description);
        meta.required = required;
        self.field(access, meta)
    }

    /// Apply the about text of a metadata file
    #[cfg(feature = "config")]
    pub fn metadata(self, metadata: &crate::config::CommandMetadata) -> Self {
        match &metadata.about {
            Some(about) => self.about(about.clone()),
            None => self,
        }
    }

    /// Declare a field whose metadata comes from a metadata file
    #[cfg(feature = "config")]
    pub fn field_from<T, F>(
        mut self,
        access: F,
        metadata: &crate::config::CommandMetadata,
        id: &str,
    ) -> Self
    where
        T: BindValue,
        F: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        match metadata.field(id) {
            Ok(meta) => self.field(access, meta),
            Err(err) => {
                self.pending.get_or_insert(err);
                self
            }
        }
    }

    /// Attach a primitive that was constructed elsewhere.
    ///
    /// `meta.required` and `meta.description` are applied to it. Its value
    /// is read through [`ParsedContext::value`], not written back.
    pub fn primitive<P: Primitive + 'static>(mut self, primitive: P, meta: FieldMeta) -> Self {
        self.fields.push(FieldDecl::primitive(primitive, meta));
        self
    }

    /// Add a sub-command
    pub fn subcommand<N: CommandNode + 'static>(mut self, child: N) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Add several sub-commands
    pub fn subcommands<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn CommandNode>>,
    {
        self.children.extend(children);
        self
    }

    /// Set the handler
    pub fn handler<H: CommandHandler<C> + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Set a synchronous closure as handler
    pub fn handler_fn<F>(self, f: F) -> Self
    where
        F: Fn(&C, &ParsedContext, &mut dyn Console) -> anyhow::Result<ExitCode>
            + Send
            + Sync
            + 'static,
    {
        self.handler(FnHandler::new(f))
    }

    /// Set an async closure as handler; it receives a populated clone
    pub fn handler_async<F, Fut>(self, f: F) -> Self
    where
        C: Clone,
        F: Fn(C, ParsedContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ExitCode>> + Send + 'static,
    {
        self.handler(AsyncFnHandler::new(f))
    }

    /// Bind every declared field and attach the sub-commands
    pub fn build(self) -> BindResult<CommandSpec<C>> {
        if let Some(err) = self.pending {
            return Err(err);
        }

        let bound = bind(self.node, self.fields)?;
        let mut node = bound.node;

        let mut seen: Vec<&str> = Vec::new();
        for child in &self.children {
            if seen.contains(&child.name()) {
                return Err(BindError::DuplicateCommand {
                    parent: self.name.clone(),
                    name: child.name().to_string(),
                });
            }
            seen.push(child.name());
            node = node.subcommand(child.parser());
        }

        if self.handler.is_none() && !self.children.is_empty() {
            node = node.subcommand_required(true).arg_required_else_help(true);
        }

        debug!(
            command = %self.name,
            fields = bound.registry.len(),
            children = self.children.len(),
            "command built"
        );

        Ok(CommandSpec {
            name: self.name,
            command: self.command,
            node,
            registry: bound.registry,
            handler: self.handler,
            children: self.children,
        })
    }
}
