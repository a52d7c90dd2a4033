use super::{SnipProxy, format_tags, report};
use clap::Args;
use snip_types::{Context, ExitStatus, Snippet};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SearchHit {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<Snippet> for SearchHit {
    fn from(snippet: Snippet) -> Self {
        SearchHit {
            tags: format_tags(&snippet.tags),
            name: snippet.name,
            language: snippet.language,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to look for in names, languages and tags
    pub query: String,
}

pub fn command(ctx: &Context, args: SearchArgs, proxy: &mut dyn SnipProxy) -> ExitStatus {
    let hits = match proxy.store().search(&args.query) {
        Ok(hits) => hits,
        Err(err) => return report(ctx, &err),
    };

    if hits.is_empty() {
        ctx.write_stdout(&format!("No snippets matching '{}'", args.query))
            .ok();
        return ExitStatus::ExitedWith(0);
    }

    let rows: Vec<SearchHit> = hits.into_iter().map(SearchHit::from).collect();
    ctx.write_stdout(&Table::new(rows).to_string()).ok();
    ctx.write_stdout("\nUse 'snip get <name>' to view a snippet")
        .ok();
    ExitStatus::ExitedWith(0)
}
