use crate::config::Config;
use crate::editor;
use anyhow::{Context as _, Result, anyhow};
use arboard::Clipboard;
use snip_builtin::SnipProxy;
use snip_store::{Invocation, SnippetStore};
use std::io::{Read, Write, stdin};
use std::os::unix::process::ExitStatusExt;
use std::process::Command;
use tracing::debug;

/// Exit code reported for a child killed by a signal, as shells do.
const SIGNAL_EXIT_BASE: i32 = 128;

/// Terminal-facing side of the commands: real stdin, editor, clipboard and processes
pub struct Snip {
    store: SnippetStore,
    config: Config,
}

impl Snip {
    pub fn new(store: SnippetStore, config: Config) -> Self {
        Snip { store, config }
    }
}

impl SnipProxy for Snip {
    fn store(&self) -> &SnippetStore {
        &self.store
    }

    fn default_language(&self) -> String {
        self.config.default_language()
    }

    fn read_stdin(&mut self) -> Result<String> {
        let mut input = String::new();
        stdin()
            .read_to_string(&mut input)
            .context("failed to read standard input")?;
        Ok(input)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        // Prompt on stderr so piped stdout stays clean
        eprint!("{prompt} [y/N]: ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        stdin().read_line(&mut input)?;

        let answer = input.trim().to_lowercase();
        let confirmed = answer == "y" || answer == "yes";
        debug!("confirmation {:?} -> {}", prompt, confirmed);
        Ok(confirmed)
    }

    fn open_editor(&mut self, content: &str, extension: &str) -> Result<String> {
        let editor_cmd = editor::resolve_editor(self.config.editor.as_deref())
            .ok_or_else(|| anyhow!("No editor found (set $EDITOR)"))?;
        editor::open_editor(&editor_cmd, content, extension)
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("clipboard unavailable")?;
        clipboard
            .set_text(text.to_string())
            .context("failed to set clipboard text")?;
        Ok(())
    }

    fn spawn(&mut self, invocation: &Invocation) -> Result<i32> {
        debug!("spawn {} {:?}", invocation.program, invocation.args);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .with_context(|| format!("failed to start {}", invocation.program))?;

        match (status.code(), status.signal()) {
            (Some(code), _) => Ok(code),
            (None, Some(signal)) => Ok(SIGNAL_EXIT_BASE + signal),
            (None, None) => Err(anyhow!("{} terminated abnormally", invocation.program)),
        }
    }
}
