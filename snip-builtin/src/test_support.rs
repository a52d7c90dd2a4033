use crate::SnipProxy;
use anyhow::{Result, anyhow};
use snip_store::{Invocation, LanguageRegistry, SnippetStore};
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// Proxy over a real store in a temp dir, with scripted terminal, editor,
/// clipboard and process behavior.
pub(crate) struct MockProxy {
    pub store: SnippetStore,
    pub stdin: String,
    pub confirm_answer: bool,
    pub prompts: Vec<String>,
    /// `None` makes the editor fail
    pub editor_result: Option<String>,
    pub editor_calls: Vec<(String, String)>,
    pub clipboard: Option<String>,
    pub clipboard_fails: bool,
    pub spawned: Vec<Invocation>,
    /// Content of the script file passed as first argument, captured at spawn time
    pub spawned_scripts: Vec<String>,
    pub spawn_exit: i32,
    dir: TempDir,
}

impl MockProxy {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let store =
            SnippetStore::open(dir.path().join("snippets"), LanguageRegistry::builtin()).unwrap();
        MockProxy {
            store,
            stdin: String::new(),
            confirm_answer: false,
            prompts: Vec::new(),
            editor_result: None,
            editor_calls: Vec::new(),
            clipboard: None,
            clipboard_fails: false,
            spawned: Vec::new(),
            spawned_scripts: Vec::new(),
            spawn_exit: 0,
            dir,
        }
    }

    /// Scratch directory outside the storage root
    pub fn scratch(&self) -> &Path {
        self.dir.path()
    }

    pub fn add(&self, name: &str, language: &str, content: &str, tags: &[&str]) {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        self.store.create(name, language, content, &tags).unwrap();
    }
}

impl SnipProxy for MockProxy {
    fn store(&self) -> &SnippetStore {
        &self.store
    }

    fn default_language(&self) -> String {
        "text".to_string()
    }

    fn read_stdin(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.stdin))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.confirm_answer)
    }

    fn open_editor(&mut self, content: &str, extension: &str) -> Result<String> {
        self.editor_calls
            .push((content.to_string(), extension.to_string()));
        self.editor_result
            .clone()
            .ok_or_else(|| anyhow!("Editor exited with non-zero status"))
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        if self.clipboard_fails {
            return Err(anyhow!("clipboard unavailable"));
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn spawn(&mut self, invocation: &Invocation) -> Result<i32> {
        if let Some(first) = invocation.args.first()
            && let Ok(script) = std::fs::read_to_string(first)
        {
            self.spawned_scripts.push(script);
        }
        self.spawned.push(invocation.clone());
        Ok(self.spawn_exit)
    }
}
