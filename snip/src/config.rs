use anyhow::{Context as _, Result};
use serde::Deserialize;
use snip_store::{DEFAULT_LANGUAGE, LanguageRegistry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "snip";
pub const CONFIG_FILE: &str = "config.toml";
pub const DIR_ENV: &str = "SNIP_DIR";

/// User settings from `$XDG_CONFIG_HOME/snip/config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage_dir: Option<String>,
    pub default_language: Option<String>,
    pub editor: Option<String>,
    /// Extra language name -> extension mappings
    pub languages: BTreeMap<String, String>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let xdg_dir =
            xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
        Ok(xdg_dir.get_config_file(CONFIG_FILE))
    }

    /// Load the user config. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Config::config_path()?;
        Config::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&toml_str)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Storage root: `--dir` > `$SNIP_DIR` > `storage_dir` > `~/.snip/snippets`
    pub fn storage_root(&self, dir_flag: Option<&Path>, env_dir: Option<&str>) -> Result<PathBuf> {
        if let Some(dir) = dir_flag {
            return Ok(expand(&dir.to_string_lossy()));
        }
        if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
            return Ok(expand(dir));
        }
        if let Some(dir) = self.storage_dir.as_deref() {
            return Ok(expand(dir));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".snip").join("snippets"))
    }

    pub fn default_language(&self) -> String {
        self.default_language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_lowercase()
    }

    /// Built-in languages plus the `[languages]` table
    pub fn registry(&self) -> LanguageRegistry {
        LanguageRegistry::builtin().with_overrides(self.languages.clone())
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
