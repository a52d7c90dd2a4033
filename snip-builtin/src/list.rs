use super::{SnipProxy, format_tags, report};
use clap::Args;
use snip_store::ListFilter;
use snip_types::{Context, ExitStatus, Snippet};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SnippetEntry {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<Snippet> for SnippetEntry {
    fn from(snippet: Snippet) -> Self {
        SnippetEntry {
            tags: format_tags(&snippet.tags),
            created: snippet.created.format("%Y-%m-%d").to_string(),
            name: snippet.name,
            language: snippet.language,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Only show snippets in this language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Only show snippets with this tag
    #[arg(short, long)]
    pub tag: Option<String>,
}

/// List snippets in a formatted table, ordered by name
pub fn command(ctx: &Context, args: ListArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let filtered = args.language.is_some() || args.tag.is_some();
    let filter = ListFilter {
        language: args.language,
        tag: args.tag,
    };

    let snippets = match proxy.store().list(filter) {
        Ok(snippets) => snippets,
        Err(err) => return report(ctx, &err),
    };
    let entries: Vec<SnippetEntry> = snippets.map(SnippetEntry::from).collect();

    if entries.is_empty() {
        let msg = if filtered {
            "No snippets match the filters."
        } else {
            "No snippets saved yet. Use 'snip add <name>' to create one."
        };
        ctx.write_stdout(msg).ok();
        return ExitStatus::ExitedWith(0);
    }

    let table = Table::new(entries).to_string();
    ctx.write_stdout(&table).ok();
    ExitStatus::ExitedWith(0)
}
