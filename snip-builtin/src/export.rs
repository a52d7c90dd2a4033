use super::{SnipProxy, fail, report};
use clap::Args;
use snip_types::{Context, ExitStatus, SnipError};
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Name of the snippet
    pub name: String,

    /// Target file or directory (defaults to ./<name>.<ext>)
    pub destination: Option<PathBuf>,

    /// Overwrite an existing file without asking
    #[arg(short, long)]
    pub force: bool,
}

pub fn command(ctx: &Context, args: ExportArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let target = match proxy
        .store()
        .export_target(&args.name, args.destination.as_deref())
    {
        Ok(target) => target,
        Err(err) => return report(ctx, &err),
    };

    let mut overwrite = args.force;
    if target.exists() && !overwrite {
        if !ctx.interactive {
            let err = SnipError::path(&target, "destination already exists (use --force)");
            return report(ctx, &err);
        }
        match proxy.confirm(&format!("Overwrite {}?", target.display())) {
            Ok(true) => overwrite = true,
            Ok(false) => {
                ctx.write_stdout("Cancelled").ok();
                return ExitStatus::ExitedWith(0);
            }
            Err(e) => return fail(ctx, &format!("failed to read answer: {e}")),
        }
    }

    match proxy.store().export(&args.name, Some(&target), overwrite) {
        Ok(written) => {
            ctx.write_stdout(&format!(
                "✓ Exported '{}' to {}",
                args.name,
                written.display()
            ))
            .ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}
