use super::{SnipProxy, fail, report};
use clap::Args;
use snip_store::sanitize;
use snip_types::{Context, ExitStatus};

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Name of the snippet
    pub name: String,

    /// Programming language (selects the file extension and how `run` executes it)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Tag for the snippet (can be used multiple times)
    #[arg(short = 't', long = "tag", alias = "tags")]
    pub tags: Vec<String>,
}

/// Built-in add command implementation
/// Reads the snippet body from standard input and stores it
///
/// Usage:
///   snip add <name> [-l LANG] [-t TAG ...] < file
pub fn command(ctx: &Context, args: AddArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    // Validate before asking for the body
    if let Err(err) = sanitize(&args.name) {
        return report(ctx, &err);
    }

    if ctx.interactive {
        ctx.write_stderr("Enter your code snippet (Ctrl+D when done):")
            .ok();
    }

    let content = match proxy.read_stdin() {
        Ok(content) => content,
        Err(e) => return fail(ctx, &format!("failed to read standard input: {e}")),
    };

    if content.trim().is_empty() {
        return fail(ctx, "empty snippet");
    }

    let language = args
        .language
        .unwrap_or_else(|| proxy.default_language());

    match proxy
        .store()
        .create(&args.name, &language, &content, &args.tags)
    {
        Ok(snippet) => {
            ctx.write_stdout(&format!("✓ Saved snippet: {}", snippet.name))
                .ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}
