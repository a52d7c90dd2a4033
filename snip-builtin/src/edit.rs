use super::{SnipProxy, fail, report};
use clap::Args;
use snip_types::{Context, ExitStatus, Snippet, SnippetPatch};

#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    /// Name of the snippet
    pub name: String,

    /// Change the language (renames the content file)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Replace all tags (can be used multiple times)
    #[arg(short = 't', long = "tag", alias = "tags")]
    pub tags: Vec<String>,

    /// Add a tag
    #[arg(long = "add-tag")]
    pub add_tags: Vec<String>,

    /// Remove a tag
    #[arg(long = "remove-tag")]
    pub remove_tags: Vec<String>,
}

impl EditArgs {
    fn touches_metadata(&self) -> bool {
        self.language.is_some()
            || !self.tags.is_empty()
            || !self.add_tags.is_empty()
            || !self.remove_tags.is_empty()
    }
}

/// Edit a snippet
/// With metadata flags only language and tags change; otherwise the body is
/// opened in the editor and saved when it was modified.
pub fn command(ctx: &Context, args: EditArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let current = match proxy.store().read(&args.name) {
        Ok(snippet) => snippet,
        Err(err) => return report(ctx, &err),
    };

    if args.touches_metadata() {
        edit_metadata(ctx, &current, args, proxy)
    } else {
        edit_content(ctx, &current, proxy)
    }
}

fn resolve_tags(current: &[String], args: &EditArgs) -> Vec<String> {
    if !args.tags.is_empty() {
        return args.tags.clone();
    }
    let mut tags = current.to_vec();
    for tag in &args.add_tags {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.clone());
        }
    }
    tags.retain(|t| !args.remove_tags.iter().any(|r| r.eq_ignore_ascii_case(t)));
    tags
}

fn edit_metadata(
    ctx: &Context,
    current: &Snippet,
    args: EditArgs,
    proxy: &mut dyn SnipProxy,
) -> ExitStatus {
    let tags = resolve_tags(&current.tags, &args);

    let patch = SnippetPatch {
        content: None,
        language: args
            .language
            .filter(|lang| !lang.eq_ignore_ascii_case(&current.language)),
        tags: (tags != current.tags).then_some(tags),
    };

    if patch.is_empty() {
        ctx.write_stdout(&format!("No changes made to '{}'", current.name))
            .ok();
        return ExitStatus::ExitedWith(0);
    }

    let language_changed = patch.language.is_some();
    match proxy.store().update(&current.name, patch) {
        Ok(updated) => {
            let msg = if language_changed {
                format!("✓ Updated '{}' (language: {})", updated.name, updated.language)
            } else {
                format!("✓ Updated '{}' metadata", updated.name)
            };
            ctx.write_stdout(&msg).ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}

fn edit_content(ctx: &Context, current: &Snippet, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let extension = proxy
        .store()
        .registry()
        .extension_for(&current.language)
        .to_string();

    let edited = match proxy.open_editor(&current.content, &extension) {
        Ok(text) => text,
        Err(e) => return fail(ctx, &format!("editor failed: {e}")),
    };

    // Editors commonly append a final newline
    if edited.trim_end_matches('\n') == current.content.trim_end_matches('\n') {
        ctx.write_stdout("No changes made").ok();
        return ExitStatus::ExitedWith(0);
    }

    let patch = SnippetPatch {
        content: Some(edited),
        ..Default::default()
    };
    match proxy.store().update(&current.name, patch) {
        Ok(updated) => {
            ctx.write_stdout(&format!("✓ Updated snippet: {}", updated.name))
                .ok();
            ExitStatus::ExitedWith(0)
        }
        Err(err) => report(ctx, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockProxy;

    fn named(name: &str) -> EditArgs {
        EditArgs {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_edit_replaces_tags() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "pass", &["a", "b"]);
        let (ctx, out, _err) = Context::captured(false);

        let mut args = named("hello");
        args.tags = strings(&["x"]);
        let result = command(&ctx, args, &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(0));
        assert!(out.contents().contains("✓ Updated 'hello' metadata"));
        let snippet = proxy.store.read("hello").unwrap();
        assert_eq!(snippet.tags, strings(&["x"]));
        assert_eq!(snippet.content, "pass");
        assert!(proxy.editor_calls.is_empty());
    }

    #[test]
    fn test_edit_add_and_remove_tags() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "pass", &["a", "b"]);
        let (ctx, _out, _err) = Context::captured(false);

        let mut args = named("hello");
        args.add_tags = strings(&["c", "A"]);
        args.remove_tags = strings(&["b"]);
        command(&ctx, args, &mut proxy);
        assert_eq!(proxy.store.read("hello").unwrap().tags, strings(&["a", "c"]));
    }

    #[test]
    fn test_edit_language_moves_file() {
        let mut proxy = MockProxy::new();
        proxy.add("script", "bash", "echo hi", &[]);
        let (ctx, out, _err) = Context::captured(false);

        let mut args = named("script");
        args.language = Some("python".to_string());
        command(&ctx, args, &mut proxy);
        assert!(out.contents().contains("(language: python)"));
        assert!(!proxy.store.root().join("script.sh").exists());
        assert!(proxy.store.root().join("script.py").exists());
        assert_eq!(proxy.store.read("script").unwrap().content, "echo hi");
    }

    #[test]
    fn test_edit_same_metadata_is_no_change() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "pass", &["a"]);
        let (ctx, out, _err) = Context::captured(false);

        let mut args = named("hello");
        args.language = Some("Python".to_string());
        args.add_tags = strings(&["a"]);
        command(&ctx, args, &mut proxy);
        assert!(out.contents().contains("No changes made to 'hello'"));
    }

    #[test]
    fn test_edit_content_in_editor() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "print(1)\n", &["keep"]);
        proxy.editor_result = Some("print(2)\n".to_string());
        let (ctx, out, _err) = Context::captured(false);

        let result = command(&ctx, named("hello"), &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(0));
        assert_eq!(
            proxy.editor_calls,
            vec![("print(1)\n".to_string(), "py".to_string())]
        );
        assert!(out.contents().contains("✓ Updated snippet: hello"));
        let snippet = proxy.store.read("hello").unwrap();
        assert_eq!(snippet.content, "print(2)\n");
        assert_eq!(snippet.tags, strings(&["keep"]));
    }

    #[test]
    fn test_edit_unchanged_content() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "print(1)", &[]);
        proxy.editor_result = Some("print(1)\n".to_string());
        let (ctx, out, _err) = Context::captured(false);

        command(&ctx, named("hello"), &mut proxy);
        assert!(out.contents().contains("No changes made"));
        assert_eq!(proxy.store.read("hello").unwrap().content, "print(1)");
    }

    #[test]
    fn test_edit_editor_failure_keeps_snippet() {
        let mut proxy = MockProxy::new();
        proxy.add("hello", "python", "print(1)", &[]);
        proxy.editor_result = None;
        let (ctx, _out, err) = Context::captured(false);

        let result = command(&ctx, named("hello"), &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(1));
        assert!(err.contents().contains("editor failed"));
        assert_eq!(proxy.store.read("hello").unwrap().content, "print(1)");
    }

    #[test]
    fn test_edit_missing_snippet() {
        let mut proxy = MockProxy::new();
        let (ctx, _out, _err) = Context::captured(false);

        let result = command(&ctx, named("ghost"), &mut proxy);
        assert_eq!(result, ExitStatus::ExitedWith(2));
        assert!(proxy.editor_calls.is_empty());
    }
}
