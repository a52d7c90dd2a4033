use anyhow::Result;
use clap::Subcommand;
use snip_store::{Invocation, SnippetStore};
use snip_types::{Context, EXIT_FAILURE, ExitStatus, SnipError};
use tracing::debug;

// Builtin command modules
pub mod add;
pub mod delete;
pub mod edit;
pub mod export;
pub mod get;
pub mod highlight;
pub mod import;
pub mod list;
pub mod path;
pub mod run;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

/// Trait that provides an interface for builtin commands to reach storage and the outside world
/// This keeps commands free of direct terminal, clipboard and process handling
pub trait SnipProxy {
    /// Storage every command operates on
    fn store(&self) -> &SnippetStore;

    /// Language recorded by `add` when none is given
    fn default_language(&self) -> String;

    /// Reads standard input to the end
    fn read_stdin(&mut self) -> Result<String>;

    /// Asks a yes/no question, answering no unless the user agrees
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Opens content in the external editor and returns the edited text.
    /// Fails when the editor cannot be started or exits unsuccessfully.
    fn open_editor(&mut self, content: &str, extension: &str) -> Result<String>;

    /// Places text on the system clipboard
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;

    /// Spawns a child process with inherited stdio, waits for it and returns its exit code
    fn spawn(&mut self, invocation: &Invocation) -> Result<i32>;
}

/// User commands and their arguments
#[derive(Debug, Clone, Subcommand)]
pub enum SnipCommand {
    /// Add a new snippet, reading the code from standard input
    Add(add::AddArgs),
    /// List saved snippets
    #[command(alias = "ls")]
    List(list::ListArgs),
    /// Show a snippet
    #[command(alias = "show")]
    Get(get::GetArgs),
    /// Search snippets by name, language or tag
    Search(search::SearchArgs),
    /// Edit a snippet in $EDITOR, or change its language and tags
    Edit(edit::EditArgs),
    /// Execute a snippet (python, bash, sh, zsh, node/javascript/js, ruby, perl)
    Run(run::RunArgs),
    /// Write a snippet to a file
    Export(export::ExportArgs),
    /// Import a file as a snippet
    Import(import::ImportArgs),
    /// Delete a snippet
    #[command(alias = "rm")]
    Delete(delete::DeleteArgs),
    /// Print the snippet storage directory
    Path,
}

impl SnipCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SnipCommand::Add(_) => "add",
            SnipCommand::List(_) => "list",
            SnipCommand::Get(_) => "get",
            SnipCommand::Search(_) => "search",
            SnipCommand::Edit(_) => "edit",
            SnipCommand::Run(_) => "run",
            SnipCommand::Export(_) => "export",
            SnipCommand::Import(_) => "import",
            SnipCommand::Delete(_) => "delete",
            SnipCommand::Path => "path",
        }
    }
}

/// Runs one command against the proxy
pub fn dispatch(ctx: &Context, command: SnipCommand, proxy: &mut dyn SnipProxy) -> ExitStatus {
    debug!("dispatch {}", command.name());
    match command {
        SnipCommand::Add(args) => add::command(ctx, args, proxy),
        SnipCommand::List(args) => list::command(ctx, args, proxy),
        SnipCommand::Get(args) => get::command(ctx, args, proxy),
        SnipCommand::Search(args) => search::command(ctx, args, proxy),
        SnipCommand::Edit(args) => edit::command(ctx, args, proxy),
        SnipCommand::Run(args) => run::command(ctx, args, proxy),
        SnipCommand::Export(args) => export::command(ctx, args, proxy),
        SnipCommand::Import(args) => import::command(ctx, args, proxy),
        SnipCommand::Delete(args) => delete::command(ctx, args, proxy),
        SnipCommand::Path => path::command(ctx, proxy),
    }
}

/// Prints a storage error and maps it to its exit code
pub(crate) fn report(ctx: &Context, err: &SnipError) -> ExitStatus {
    ctx.write_stderr(&format!("snip: {err}")).ok();
    ExitStatus::from(err)
}

/// Prints a failure that has no storage error kind
pub(crate) fn fail(ctx: &Context, msg: &str) -> ExitStatus {
    ctx.write_stderr(&format!("snip: {msg}")).ok();
    ExitStatus::ExitedWith(EXIT_FAILURE)
}

pub(crate) fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}
