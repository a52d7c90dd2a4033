use super::SnipProxy;
use snip_types::{Context, ExitStatus};

/// Print the storage directory
pub fn command(ctx: &Context, proxy: &mut dyn SnipProxy) -> ExitStatus {
    ctx.write_stdout(&proxy.store().root().display().to_string())
        .ok();
    ExitStatus::ExitedWith(0)
}
