use crate::sanitize::META_SUFFIX;
use std::path::Path;
use tracing::warn;

/// Extension used for languages the registry does not know.
pub const FALLBACK_EXTENSION: &str = "txt";

/// Language recorded when none is given and none can be detected.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Built-in language table. Order matters: when several languages share an
/// extension, the first one listed is what `detect_language` returns.
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("python", "py"),
    ("javascript", "js"),
    ("typescript", "ts"),
    ("rust", "rs"),
    ("go", "go"),
    ("bash", "sh"),
    ("shell", "sh"),
    ("sh", "sh"),
    ("zsh", "zsh"),
    ("ruby", "rb"),
    ("java", "java"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("csharp", "cs"),
    ("php", "php"),
    ("swift", "swift"),
    ("kotlin", "kt"),
    ("scala", "scala"),
    ("html", "html"),
    ("css", "css"),
    ("sql", "sql"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("toml", "toml"),
    ("markdown", "md"),
    ("lua", "lua"),
    ("perl", "pl"),
    ("r", "r"),
    ("dockerfile", "dockerfile"),
    ("makefile", "mk"),
    ("node", "js"),
    ("js", "js"),
    ("text", "txt"),
];

/// Interpreters `run` knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runner {
    Python,
    Bash,
    Sh,
    Zsh,
    Node,
    Ruby,
    Perl,
}

/// A program plus its arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Runner {
    pub fn from_language(language: &str) -> Option<Self> {
        let runner = match language.to_ascii_lowercase().as_str() {
            "python" => Runner::Python,
            "bash" => Runner::Bash,
            "shell" | "sh" => Runner::Sh,
            "zsh" => Runner::Zsh,
            "node" | "javascript" | "js" => Runner::Node,
            "ruby" => Runner::Ruby,
            "perl" => Runner::Perl,
            _ => return None,
        };
        Some(runner)
    }

    pub fn interpreter(&self) -> &'static str {
        match self {
            Runner::Python => "python3",
            Runner::Bash => "bash",
            Runner::Sh => "sh",
            Runner::Zsh => "zsh",
            Runner::Node => "node",
            Runner::Ruby => "ruby",
            Runner::Perl => "perl",
        }
    }

    /// Flag that makes the interpreter evaluate its next argument as code.
    pub fn inline_flag(&self) -> &'static str {
        match self {
            Runner::Python | Runner::Bash | Runner::Sh | Runner::Zsh => "-c",
            Runner::Node | Runner::Ruby | Runner::Perl => "-e",
        }
    }

    /// Evaluate `code` directly, e.g. `python3 -c <code>`.
    pub fn inline(&self, code: &str) -> Invocation {
        Invocation {
            program: self.interpreter().to_string(),
            args: vec![self.inline_flag().to_string(), code.to_string()],
        }
    }

    /// Run a script file with trailing arguments, e.g. `bash script.sh a b`.
    pub fn script(&self, path: &Path, args: &[String]) -> Invocation {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(path.display().to_string());
        argv.extend(args.iter().cloned());
        Invocation {
            program: self.interpreter().to_string(),
            args: argv,
        }
    }
}

/// Immutable language name <-> extension table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    entries: Vec<(String, String)>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageRegistry {
    pub fn builtin() -> Self {
        LanguageRegistry {
            entries: BUILTIN_LANGUAGES
                .iter()
                .map(|(lang, ext)| (lang.to_string(), ext.to_string()))
                .collect(),
        }
    }

    /// Add or replace mappings. Existing names keep their position; new names
    /// are appended in the order given, so they never win an extension tie
    /// against a built-in language.
    pub fn with_overrides<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (language, extension) in extra {
            let language = language.trim().to_ascii_lowercase();
            let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
            if language.is_empty() || extension.is_empty() {
                continue;
            }
            if let Some(reason) = unusable_extension(&extension) {
                warn!("ignoring extension '{}' for {}: {}", extension, language, reason);
                continue;
            }
            match self.entries.iter_mut().find(|(lang, _)| *lang == language) {
                Some(entry) => entry.1 = extension,
                None => self.entries.push((language, extension)),
            }
        }
        self
    }

    /// Extension (without dot) for a language, case-insensitive.
    pub fn extension_for(&self, language: &str) -> &str {
        self.entries
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
            .map(|(_, ext)| ext.as_str())
            .unwrap_or(FALLBACK_EXTENSION)
    }

    /// Inverse lookup by file extension. Returns the first registered
    /// language owning the extension.
    pub fn detect_language(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.entries
            .iter()
            .find(|(_, e)| e.eq_ignore_ascii_case(ext))
            .map(|(lang, _)| lang.as_str())
    }

    pub fn is_executable(&self, language: &str) -> bool {
        self.runner_for(language).is_some()
    }

    pub fn runner_for(&self, language: &str) -> Option<Runner> {
        Runner::from_language(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(lang, _)| lang.as_str())
    }

    /// Every distinct extension in table order, the fallback included.
    pub fn extensions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for ext in self
            .entries
            .iter()
            .map(|(_, ext)| ext.as_str())
            .chain([FALLBACK_EXTENSION])
        {
            if !out.contains(&ext) {
                out.push(ext);
            }
        }
        out
    }
}

/// Why an extension cannot name a content file, if it cannot.
fn unusable_extension(extension: &str) -> Option<&'static str> {
    if extension.contains(['/', '\\']) || extension.chars().any(char::is_control) {
        return Some("contains a path separator");
    }
    if extension.contains("..") {
        return Some("contains '..'");
    }
    let meta_ext = META_SUFFIX.trim_start_matches('.');
    if extension == "meta" || extension.ends_with(".meta") || extension.ends_with(meta_ext) {
        return Some("clashes with the metadata file");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_known_languages() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.extension_for("python"), "py");
        assert_eq!(registry.extension_for("javascript"), "js");
        assert_eq!(registry.extension_for("rust"), "rs");
        assert_eq!(registry.extension_for("go"), "go");
        assert_eq!(registry.extension_for("bash"), "sh");
    }

    #[test]
    fn test_case_insensitive() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.extension_for("Python"), "py");
        assert_eq!(registry.extension_for("PYTHON"), "py");
        assert_eq!(registry.extension_for("JavaScript"), "js");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.extension_for("unknown"), FALLBACK_EXTENSION);
        assert_eq!(registry.extension_for(""), FALLBACK_EXTENSION);
    }

    #[test]
    fn test_detect_language_first_entry_wins() {
        let registry = LanguageRegistry::builtin();
        // sh is shared by bash, shell and sh; js by javascript, node and js
        assert_eq!(registry.detect_language(&PathBuf::from("/tmp/script.sh")), Some("bash"));
        assert_eq!(registry.detect_language(&PathBuf::from("app.js")), Some("javascript"));
        assert_eq!(registry.detect_language(&PathBuf::from("main.RS")), Some("rust"));
        assert_eq!(registry.detect_language(&PathBuf::from("notes.xyz")), None);
        assert_eq!(registry.detect_language(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn test_overrides_append_and_replace() {
        let registry = LanguageRegistry::builtin().with_overrides(vec![
            ("Nim".to_string(), ".nim".to_string()),
            ("python".to_string(), "py3".to_string()),
            ("zshell".to_string(), "sh".to_string()),
        ]);
        assert_eq!(registry.extension_for("nim"), "nim");
        assert_eq!(registry.extension_for("python"), "py3");
        assert_eq!(registry.detect_language(&PathBuf::from("a.nim")), Some("nim"));
        // appended entries never win a tie
        assert_eq!(registry.detect_language(&PathBuf::from("a.sh")), Some("bash"));
    }

    #[test]
    fn test_extensions_are_distinct() {
        let registry = LanguageRegistry::builtin()
            .with_overrides(vec![("nim".to_string(), "nim".to_string())]);
        let extensions = registry.extensions();
        assert_eq!(extensions.iter().filter(|e| **e == "sh").count(), 1);
        assert_eq!(extensions.iter().filter(|e| **e == "txt").count(), 1);
        assert!(extensions.contains(&"nim"));
    }

    #[test]
    fn test_overrides_skip_unusable_extensions() {
        let registry = LanguageRegistry::builtin().with_overrides(vec![
            ("evil".to_string(), "meta.json".to_string()),
            ("meta".to_string(), "META".to_string()),
            ("nested".to_string(), "x.meta".to_string()),
            ("escape".to_string(), "../../etc".to_string()),
            ("dotted".to_string(), "a..b".to_string()),
            ("slash".to_string(), "d/e".to_string()),
            ("backslash".to_string(), "d\\e".to_string()),
            ("python".to_string(), "../py".to_string()),
            ("archive".to_string(), "tar.gz".to_string()),
        ]);
        for lang in ["evil", "meta", "nested", "escape", "dotted", "slash", "backslash"] {
            assert_eq!(registry.extension_for(lang), FALLBACK_EXTENSION, "{lang}");
        }
        // a rejected override keeps the built-in mapping
        assert_eq!(registry.extension_for("python"), "py");
        assert_eq!(registry.extension_for("archive"), "tar.gz");
    }

    #[test]
    fn test_executable_languages() {
        let registry = LanguageRegistry::builtin();
        for lang in ["python", "bash", "shell", "sh", "zsh", "node", "javascript", "js", "ruby", "perl"] {
            assert!(registry.is_executable(lang), "{lang} should be executable");
        }
        assert!(registry.is_executable("Python"));
        assert!(!registry.is_executable("rust"));
        assert!(!registry.is_executable("text"));
    }

    #[test]
    fn test_runner_invocations() {
        let inline = Runner::Python.inline("print(1)");
        assert_eq!(inline.program, "python3");
        assert_eq!(inline.args, vec!["-c".to_string(), "print(1)".to_string()]);

        let script = Runner::Ruby.script(&PathBuf::from("/tmp/x.rb"), &["a".to_string()]);
        assert_eq!(script.program, "ruby");
        assert_eq!(script.args, vec!["/tmp/x.rb".to_string(), "a".to_string()]);
        assert_eq!(Runner::Node.inline_flag(), "-e");
    }
}
