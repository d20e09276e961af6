//! Invocation adapter - write-back then handler call

use super::console::Console;
use super::context::ParsedContext;
use super::error::BindResult;
use super::handler::{CommandHandler, ExitCode};
use super::registry::PrimitiveRegistry;

/// Apply `parsed` to `command` through `registry`, then run `handler`.
///
/// `command` is mutated in place: every bound field holds its parsed value
/// before the handler is called. Handler errors are returned unchanged.
pub async fn invoke<C>(
    command: &mut C,
    registry: &PrimitiveRegistry<C>,
    parsed: &ParsedContext,
    handler: &dyn CommandHandler<C>,
    console: &mut dyn Console,
) -> BindResult<ExitCode> {
    registry.apply(command, parsed)?;
    let code = handler.handle(command, parsed, console).await?;
    tracing::debug!(command = %parsed.command_name(), code, "handler finished");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::binder::{bind, FieldDecl};
    use crate::binding::console::BufferConsole;
    use crate::binding::handler::FnHandler;
    use crate::binding::metadata::FieldMeta;
    use clap::Command;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone, Debug, PartialEq)]
    struct CopyCmd {
        source: String,
        force: bool,
        retries: u8,
    }

    fn parse(node: &Command, args: &[&str]) -> ParsedContext {
        let matches = node
            .clone()
            .try_get_matches_from(std::iter::once("copy").chain(args.iter().copied()))
            .unwrap();
        let known = node.get_arguments().map(|a| a.get_id().to_string()).collect();
        ParsedContext::new(vec!["copy".into()], matches, known)
    }

    fn bound() -> crate::binding::binder::Bound<CopyCmd> {
        bind(
            Command::new("copy"),
            vec![
                FieldDecl::field(
                    |c: &mut CopyCmd| &mut c.source,
                    FieldMeta::new("source").positional().description("Source path"),
                ),
                FieldDecl::field(
                    |c: &mut CopyCmd| &mut c.force,
                    FieldMeta::new("force").aliases(["--force", "-f"]).description("Overwrite"),
                ),
                FieldDecl::field(
                    |c: &mut CopyCmd| &mut c.retries,
                    FieldMeta::new("retries").alias("--retries").description("Retry count"),
                ),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fields_are_written_before_handler_runs() {
        let bound = bound();
        let parsed = parse(&bound.node, &["a.txt", "-f", "--retries", "3"]);
        let seen = Arc::new(Mutex::new(None));
        let seen_in_handler = seen.clone();
        let handler = FnHandler::new(move |c: &CopyCmd, _: &ParsedContext, _: &mut dyn Console| {
            *seen_in_handler.lock().unwrap() = Some(c.clone());
            Ok(7)
        });

        let mut command = CopyCmd::default();
        let mut console = BufferConsole::new();
        let code = invoke(&mut command, &bound.registry, &parsed, &handler, &mut console)
            .await
            .unwrap();

        let expected = CopyCmd {
            source: "a.txt".into(),
            force: true,
            retries: 3,
        };
        assert_eq!(code, 7);
        assert_eq!(command, expected);
        assert_eq!(seen.lock().unwrap().clone(), Some(expected));
    }

    #[tokio::test]
    async fn test_absent_scalar_keeps_initial_value() {
        let bound = bound();
        let parsed = parse(&bound.node, &["b.txt"]);
        let handler = FnHandler::new(|_: &CopyCmd, _: &ParsedContext, _: &mut dyn Console| Ok(0));

        let mut command = CopyCmd {
            retries: 5,
            force: true,
            ..CopyCmd::default()
        };
        invoke(&mut command, &bound.registry, &parsed, &handler, &mut BufferConsole::new())
            .await
            .unwrap();

        assert_eq!(command.retries, 5);
        assert!(!command.force);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let bound = bound();
        let parsed = parse(&bound.node, &["c.txt"]);
        let handler = FnHandler::new(|_: &CopyCmd, _: &ParsedContext, _: &mut dyn Console| {
            Err(anyhow::anyhow!("target is read-only"))
        });

        let mut command = CopyCmd::default();
        let mut console = BufferConsole::new();
        let err = invoke(&mut command, &bound.registry, &parsed, &handler, &mut console)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "target is read-only");
        assert_eq!(command.source, "c.txt");
    }
}
