use super::{SnipProxy, highlight, report};
use clap::Args;
use snip_types::{Context, ExitStatus};

#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    /// Name of the snippet
    pub name: String,

    /// Copy the snippet body to the clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// Print only the snippet body
    #[arg(short, long)]
    pub raw: bool,
}

/// Show a snippet with a header and a numbered, highlighted body
pub fn command(ctx: &Context, args: GetArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let snippet = match proxy.store().read(&args.name) {
        Ok(snippet) => snippet,
        Err(err) => return report(ctx, &err),
    };

    if args.raw {
        ctx.write_raw(&snippet.content).ok();
    } else {
        ctx.write_stdout(&format!("{} ({})", snippet.name, snippet.language))
            .ok();
        if !snippet.tags.is_empty() {
            ctx.write_stdout(&format!("Tags: {}", snippet.tags.join(", ")))
                .ok();
        }
        ctx.write_stdout("").ok();
        let extension = proxy.store().registry().extension_for(&snippet.language);
        let body = highlight::render(&snippet.content, &snippet.language, extension, ctx.color);
        ctx.write_raw(&body).ok();
    }

    if args.copy {
        match proxy.copy_to_clipboard(&snippet.content) {
            Ok(()) => {
                if !args.raw {
                    ctx.write_stdout("Copied to clipboard!").ok();
                }
            }
            Err(e) => {
                ctx.write_stderr(&format!("snip: warning: could not copy to clipboard: {e}"))
                    .ok();
            }
        }
    }

    ExitStatus::ExitedWith(0)
}
