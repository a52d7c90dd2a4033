use super::{SnipProxy, fail, report};
use clap::Args;
use snip_types::{Context, ExitStatus, SnipError};

#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Name of the snippet
    pub name: String,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Delete a snippet, asking first unless `--force` is given
pub fn command(ctx: &Context, args: DeleteArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    // Only the metadata has to exist; half-written or corrupt pairs can still be removed
    match proxy.store().exists(&args.name) {
        Ok(true) => {}
        Ok(false) => return report(ctx, &SnipError::NotFound(args.name)),
        Err(err) => return report(ctx, &err),
    }

    if !args.force {
        match proxy.confirm(&format!("Delete snippet '{}'?", args.name)) {
            Ok(true) => {}
            Ok(false) => {
                ctx.write_stdout("Cancelled").ok();
                return ExitStatus::ExitedWith(0);
            }
            Err(e) => return fail(ctx, &format!("failed to read answer: {e}")),
        }
    }

    match proxy.store().delete(&args.name) {
        Ok(()) => {
            ctx.write_stdout(&format!("✓ Deleted snippet: {}", args.name))
                .ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}
