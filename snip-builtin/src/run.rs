use super::{SnipProxy, fail, report};
use clap::Args;
use snip_types::{Context, ExitStatus, SnipError};
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Name of the snippet
    pub name: String,

    /// Arguments passed to the snippet
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Built-in run command implementation
/// Executes a snippet with its language's interpreter and forwards the exit code
///
/// Without arguments the body is passed inline (`python3 -c <code>`). With
/// arguments it is written to a temporary script first so they reach it as
/// positional parameters.
pub fn command(ctx: &Context, args: RunArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let snippet = match proxy.store().read(&args.name) {
        Ok(snippet) => snippet,
        Err(err) => return report(ctx, &err),
    };

    let Some(runner) = proxy.store().registry().runner_for(&snippet.language) else {
        return report(ctx, &SnipError::UnsupportedLanguage(snippet.language));
    };

    // Held until the child exits
    let mut script = None;
    let invocation = if args.args.is_empty() {
        runner.inline(&snippet.content)
    } else {
        let extension = proxy
            .store()
            .registry()
            .extension_for(&snippet.language)
            .to_string();
        let file = tempfile::Builder::new()
            .prefix("snip_run_")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .and_then(|mut file| {
                file.write_all(snippet.content.as_bytes())?;
                file.flush()?;
                Ok(file)
            });
        let file = match file {
            Ok(file) => file,
            Err(e) => return fail(ctx, &format!("failed to write temporary script: {e}")),
        };
        let invocation = runner.script(file.path(), &args.args);
        script = Some(file);
        invocation
    };

    debug!(
        "running {} via {} ({} args)",
        snippet.name,
        invocation.program,
        invocation.args.len()
    );
    let status = proxy.spawn(&invocation);
    drop(script);

    match status {
        Ok(code) => ExitStatus::Child(code),
        Err(e) => fail(ctx, &format!("failed to run {}: {e}", invocation.program)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::MockProxy;

    fn args(name: &str, extra: &[&str]) -> RunArgs {
        RunArgs {
            name: name.to_string(),
            args: extra.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_run_inline() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "print('hi')", &[]);
        let (ctx, _out, _err) = Context::captured(false);

        let result = command(&ctx, args("hello", &[]), &mut proxy);
        assert_eq!(result, ExitStatus::Child(0));
        assert_eq!(proxy.spawned.len(), 1);
        assert_eq!(proxy.spawned[0].program, "python3");
        assert_eq!(proxy.spawned[0].args, vec!["-c", "print('hi')"]);
    }

    #[test]
    fn test_run_node_uses_eval_flag() {
        let mut proxy = MockProxy::new();
        proxy.add("js", "javascript", "console.log(1)", &[]);
        let (ctx, _out, _err) = Context::captured(false);

        command(&ctx, args("js", &[]), &mut proxy);
        assert_eq!(proxy.spawned[0].program, "node");
        assert_eq!(proxy.spawned[0].args[0], "-e");
    }

    #[test]
    fn test_run_with_args_uses_script_file() {
        let mut proxy = MockProxy::new();
        proxy.add("greet", "bash", "echo \"$1\"", &[]);
        let (ctx, _out, _err) = Context::captured(false);

        command(&ctx, args("greet", &["world", "--loud"]), &mut proxy);
        let invocation = &proxy.spawned[0];
        assert_eq!(invocation.program, "bash");
        assert!(invocation.args[0].ends_with(".sh"));
        assert_eq!(&invocation.args[1..], ["world", "--loud"]);
        assert_eq!(proxy.spawned_scripts, vec!["echo \"$1\"".to_string()]);
        // Temporary script is gone afterwards
        assert!(!std::path::Path::new(&invocation.args[0]).exists());
    }

    #[test]
    fn test_run_forwards_exit_code() {
        let mut proxy = MockProxy::new();
        proxy.add("fails", "sh", "exit 3", &[]);
        proxy.spawn_exit = 3;
        let (ctx, _out, _err) = Context::captured(false);

        let result = command(&ctx, args("fails", &[]), &mut proxy);
        assert_eq!(result, ExitStatus::Child(3));
        assert_eq!(result.code(), 3);
    }

    #[test]
    fn test_run_unsupported_language() {
        let mut proxy = MockProxy::new();
        proxy.add("query", "sql", "SELECT 1", &[]);
        let (ctx, _out, err) = Context::captured(false);

        let result = command(&ctx, args("query", &[]), &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(6));
        assert!(err.contents().contains("sql"));
        assert!(proxy.spawned.is_empty());
    }

    #[test]
    fn test_run_missing_snippet() {
        let mut proxy = MockProxy::new();
        let (ctx, _out, _err) = Context::captured(false);

        let result = command(&ctx, args("ghost", &[]), &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(2));
    }
}
