use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;
use tempfile::Builder;
use tracing::debug;

/// Pick the editor command.
/// Order: configured -> $VISUAL -> $EDITOR -> vim -> nano -> vi
pub fn resolve_editor(configured: Option<&str>) -> Option<String> {
    choose_editor(
        configured,
        env::var("VISUAL").ok().as_deref(),
        env::var("EDITOR").ok().as_deref(),
    )
}

/// First non-blank of the configured, `$VISUAL` and `$EDITOR` commands, then
/// the first fallback editor on PATH.
fn choose_editor(
    configured: Option<&str>,
    visual: Option<&str>,
    editor: Option<&str>,
) -> Option<String> {
    [configured, visual, editor]
        .into_iter()
        .flatten()
        .find(|cmd| !cmd.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            ["vim", "nano", "vi"]
                .into_iter()
                .find(|candidate| which::which(candidate).is_ok())
                .map(str::to_string)
        })
}

/// Launch `editor_cmd` (which may carry its own arguments) on the given path.
pub fn launch_editor(editor_cmd: &str, path: &Path) -> Result<()> {
    let parts: Vec<&str> = editor_cmd.split_whitespace().collect();
    let Some((program, args)) = parts.split_first() else {
        return Err(anyhow::anyhow!("No editor found"));
    };

    debug!("launching editor {} on {}", editor_cmd, path.display());
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{program}'"))?;

    if !status.success() {
        return Err(anyhow::anyhow!("Editor exited with non-zero status"));
    }
    Ok(())
}

/// Open content in an external editor and return the modified content.
///
/// The content is written to a temporary `snip_edit_*.<extension>` file so the
/// editor can pick its syntax mode. The file is removed afterwards.
pub fn open_editor(editor_cmd: &str, content: &str, extension: &str) -> Result<String> {
    let mut temp_file = Builder::new()
        .prefix("snip_edit_")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .context("failed to create temporary file")?;

    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    let temp_path = temp_file.path().to_path_buf();

    launch_editor(editor_cmd, &temp_path)?;

    let mut modified_content = String::new();
    let mut file = File::open(&temp_path)?;
    file.read_to_string(&mut modified_content)?;
    Ok(modified_content)
}
