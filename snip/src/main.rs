use crate::config::{Config, DIR_ENV};
use crate::proxy::Snip;
use anyhow::{Context as _, Result};
use clap::Parser;
use snip_builtin::{SnipCommand, dispatch};
use snip_store::SnippetStore;
use snip_types::{Context, EXIT_FAILURE, SnipError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod editor;
mod proxy;

const LOG_ENV: &str = "SNIP_LOG";

/// A small snippet manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snippet storage directory (overrides $SNIP_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: SnipCommand,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    let code = run(cli);
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::Term::stderr().features().colors_supported())
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

fn run(cli: Cli) -> i32 {
    let ctx = Context::new();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            ctx.write_stderr(&format!("snip: {err:#}")).ok();
            return EXIT_FAILURE;
        }
    };

    let env_dir = std::env::var(DIR_ENV).ok();
    let root = match config.storage_root(cli.dir.as_deref(), env_dir.as_deref()) {
        Ok(root) => root,
        Err(err) => {
            ctx.write_stderr(&format!("snip: {err:#}")).ok();
            return EXIT_FAILURE;
        }
    };
    debug!("storage root {}", root.display());

    let store = match SnippetStore::open(&root, config.registry()) {
        Ok(store) => store,
        Err(err) => return report_open_error(&ctx, &err),
    };

    let mut snip = Snip::new(store, config);
    let status = dispatch(&ctx, cli.command, &mut snip);
    debug!("exit status {:?}", status);
    status.code()
}

fn report_open_error(ctx: &Context, err: &SnipError) -> i32 {
    ctx.write_stderr(&format!("snip: {err}")).ok();
    err.exit_code()
}
