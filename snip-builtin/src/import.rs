use super::{SnipProxy, report};
use clap::Args;
use snip_types::{Context, ExitStatus};
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// File to import
    pub path: PathBuf,

    /// Snippet name (defaults to the file name without extension)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Language (detected from the extension when omitted)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Tag for the snippet (can be used multiple times)
    #[arg(short = 't', long = "tag", alias = "tags")]
    pub tags: Vec<String>,
}

pub fn command(ctx: &Context, args: ImportArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let imported = proxy.store().import(
        &args.path,
        args.name.as_deref(),
        args.language.as_deref(),
        &args.tags,
    );

    match imported {
        Ok(snippet) => {
            ctx.write_stdout(&format!(
                "✓ Imported '{}' as snippet '{}' ({})",
                args.path.display(),
                snippet.name,
                snippet.language
            ))
            .ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}
