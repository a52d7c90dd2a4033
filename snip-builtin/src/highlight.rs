//! Terminal rendering of snippet bodies.
//!
//! Lines get a line-number gutter. With color enabled the body is highlighted
//! by syntect using its bundled syntaxes and theme; the plain path never
//! touches syntect.

use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::as_24_bit_terminal_escaped;
use tracing::debug;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_DIM: &str = "\x1b[2m";

const THEME: &str = "base16-ocean.dark";

struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

fn highlighter() -> &'static Highlighter {
    static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
    HIGHLIGHTER.get_or_init(|| Highlighter {
        syntaxes: SyntaxSet::load_defaults_newlines(),
        themes: ThemeSet::load_defaults(),
    })
}

impl Highlighter {
    /// Syntax by language name, then by the file extension the snippet is stored under.
    fn syntax_for(&self, language: &str, extension: &str) -> &SyntaxReference {
        self.syntaxes
            .find_syntax_by_token(language)
            .or_else(|| self.syntaxes.find_syntax_by_extension(extension))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn theme(&self) -> Option<&Theme> {
        self.themes.themes.get(THEME)
    }
}

/// Render `content` with a line-number gutter, highlighting when `color` is set.
pub fn render(content: &str, language: &str, extension: &str, color: bool) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.len().max(1).to_string().len();
    let gutter = |idx: usize| format!("{:>width$} │ ", idx + 1);

    let mut out = String::with_capacity(content.len() * 2);
    if !color {
        for (idx, line) in lines.iter().enumerate() {
            out.push_str(&gutter(idx));
            out.push_str(line);
            out.push('\n');
        }
        return out;
    }

    let hl = highlighter();
    let syntax = hl.syntax_for(language, extension);
    let mut lines_hl = hl.theme().map(|theme| HighlightLines::new(syntax, theme));
    debug!("highlighting {} as {}", language, syntax.name);

    for (idx, line) in lines.iter().enumerate() {
        out.push_str(ANSI_DIM);
        out.push_str(&gutter(idx));
        out.push_str(ANSI_RESET);

        // The newline syntaxes expect each line to carry its terminator
        let with_newline = format!("{line}\n");
        let painted = lines_hl
            .as_mut()
            .and_then(|h| h.highlight_line(&with_newline, &hl.syntaxes).ok())
            .map(|ranges| as_24_bit_terminal_escaped(&ranges, false));
        match painted {
            Some(painted) => {
                out.push_str(painted.trim_end_matches('\n'));
                out.push_str(ANSI_RESET);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}
