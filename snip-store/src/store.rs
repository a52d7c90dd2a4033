use crate::language::{DEFAULT_LANGUAGE, LanguageRegistry};
use crate::ops::{DiskOps, FileOps};
use crate::sanitize::{META_SUFFIX, sanitize};
use chrono::Local;
use snip_types::{SnipError, SnipResult, Snippet, SnippetMeta, SnippetPatch};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Narrows `list` to one language and/or one tag. Both compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub language: Option<String>,
    pub tag: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, snippet: &Snippet) -> bool {
        self.language
            .as_deref()
            .is_none_or(|lang| snippet.language.eq_ignore_ascii_case(lang))
            && self.tag.as_deref().is_none_or(|tag| snippet.has_tag(tag))
    }
}

/// Snippets stored as `<name>.<ext>` + `<name>.meta.json` pairs in one directory
pub struct SnippetStore {
    root: PathBuf,
    registry: LanguageRegistry,
    ops: Box<dyn FileOps>,
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("SnippetStore")
            .field("root", &self.root)
            .finish()
    }
}

impl SnippetStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, registry: LanguageRegistry) -> SnipResult<Self> {
        Self::with_ops(root, registry, Box::new(DiskOps))
    }

    pub fn with_ops(
        root: impl Into<PathBuf>,
        registry: LanguageRegistry,
        ops: Box<dyn FileOps>,
    ) -> SnipResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| SnipError::io("create storage directory", &root, e))?;
        if !root.is_dir() {
            return Err(SnipError::path(&root, "storage root is not a directory"));
        }
        Ok(SnippetStore {
            root,
            registry,
            ops,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Content and metadata paths a snippet with this name and language uses.
    pub fn paths_for(&self, name: &str, language: &str) -> SnipResult<(PathBuf, PathBuf)> {
        let stem = sanitize(name)?;
        Ok((self.content_path(&stem, language), self.meta_path(&stem)))
    }

    fn content_path(&self, stem: &str, language: &str) -> PathBuf {
        self.root
            .join(format!("{stem}.{}", self.registry.extension_for(language)))
    }

    fn meta_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}{META_SUFFIX}"))
    }

    /// Content files `<stem>.<ext>` on disk, for every known extension.
    fn existing_content_files(&self, stem: &str) -> Vec<PathBuf> {
        self.registry
            .extensions()
            .into_iter()
            .map(|ext| self.root.join(format!("{stem}.{ext}")))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Create a new snippet. Never overwrites an existing one: the metadata
    /// file or a content file with any known extension blocks the name.
    pub fn create(
        &self,
        name: &str,
        language: &str,
        content: &str,
        tags: &[String],
    ) -> SnipResult<Snippet> {
        let stem = sanitize(name)?;
        let language = normalize_language(language);
        let content_path = self.content_path(&stem, &language);
        let meta_path = self.meta_path(&stem);

        if meta_path.exists() || content_path.exists() {
            return Err(SnipError::AlreadyExists(stem));
        }
        if let Some(stray) = self.existing_content_files(&stem).first() {
            debug!("'{}' is taken by {}", stem, stray.display());
            return Err(SnipError::AlreadyExists(stem));
        }

        let snippet = Snippet {
            name: stem,
            language,
            content: content.to_string(),
            tags: normalize_tags(tags),
            created: Local::now(),
        };

        self.ops
            .write(&content_path, &snippet.content)
            .map_err(|e| SnipError::io("write content", &content_path, e))?;

        if let Err(err) = self.write_meta(&snippet.meta()) {
            // Roll back so no content file is left without metadata
            self.ops.remove(&content_path).map_err(|e| {
                SnipError::io("remove content after metadata write failed", &content_path, e)
            })?;
            return Err(err);
        }

        debug!(
            "created snippet '{}' ({}) at {}",
            snippet.name,
            snippet.language,
            content_path.display()
        );
        Ok(snippet)
    }

    /// Read a snippet, content included.
    pub fn read(&self, name: &str) -> SnipResult<Snippet> {
        let stem = sanitize(name)?;
        self.load(&stem)
    }

    pub fn exists(&self, name: &str) -> SnipResult<bool> {
        let stem = sanitize(name)?;
        Ok(self.meta_path(&stem).exists())
    }

    fn load(&self, stem: &str) -> SnipResult<Snippet> {
        let meta = self.read_meta(stem)?;
        let path = self.content_path(stem, &meta.language);
        let content = match self.ops.read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("metadata for '{}' has no content file {}", stem, path.display());
                return Err(SnipError::NotFound(stem.to_string()));
            }
            Err(e) => return Err(SnipError::io("read content", &path, e)),
        };
        Ok(Snippet::from_meta(meta, content))
    }

    fn read_meta(&self, stem: &str) -> SnipResult<SnippetMeta> {
        let path = self.meta_path(stem);
        let raw = match self.ops.read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SnipError::NotFound(stem.to_string()));
            }
            Err(e) => return Err(SnipError::io("read metadata", &path, e)),
        };
        let meta: SnippetMeta = serde_json::from_str(&raw).map_err(|e| SnipError::Corrupt {
            name: stem.to_string(),
            reason: e.to_string(),
        })?;
        if meta.name != stem {
            return Err(SnipError::Corrupt {
                name: stem.to_string(),
                reason: format!("metadata belongs to '{}'", meta.name),
            });
        }
        Ok(meta)
    }

    fn write_meta(&self, meta: &SnippetMeta) -> SnipResult<()> {
        let path = self.meta_path(&meta.name);
        let json = serde_json::to_string_pretty(meta)
            .map_err(|e| SnipError::io("serialize metadata", &path, io::Error::other(e)))?;
        self.ops
            .write(&path, &json)
            .map_err(|e| SnipError::io("write metadata", &path, e))
    }

    /// Apply a patch. A language change that alters the extension moves the
    /// content file: the new file is written and verified before the
    /// metadata is switched and the old file removed.
    pub fn update(&self, name: &str, patch: SnippetPatch) -> SnipResult<Snippet> {
        let current = self.read(name)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut updated = current.clone();
        if let Some(content) = patch.content {
            updated.content = content;
        }
        if let Some(language) = patch.language {
            updated.language = normalize_language(&language);
        }
        if let Some(tags) = patch.tags {
            updated.tags = normalize_tags(&tags);
        }

        let old_path = self.content_path(&current.name, &current.language);
        let new_path = self.content_path(&updated.name, &updated.language);
        if old_path == new_path {
            self.rewrite_in_place(&current, &updated, &old_path)?;
        } else {
            self.move_content(&updated, &old_path, &new_path)?;
        }

        debug!("updated snippet '{}'", updated.name);
        Ok(updated)
    }

    fn rewrite_in_place(&self, current: &Snippet, updated: &Snippet, path: &Path) -> SnipResult<()> {
        let content_changed = current.content != updated.content;
        if content_changed {
            self.ops
                .write(path, &updated.content)
                .map_err(|e| SnipError::io("write content", path, e))?;
        }

        if current.meta() != updated.meta()
            && let Err(err) = self.write_meta(&updated.meta())
        {
            if content_changed {
                self.ops.write(path, &current.content).map_err(|e| {
                    SnipError::io("restore content after metadata write failed", path, e)
                })?;
            }
            return Err(err);
        }
        Ok(())
    }

    fn move_content(&self, updated: &Snippet, old_path: &Path, new_path: &Path) -> SnipResult<()> {
        if new_path.exists() {
            return Err(SnipError::path(
                new_path,
                "a file with the new extension already exists",
            ));
        }

        self.ops
            .write(new_path, &updated.content)
            .map_err(|e| SnipError::io("write content", new_path, e))?;

        let verified = match self.ops.read_to_string(new_path) {
            Ok(written) if written == updated.content => Ok(()),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "content read back does not match",
            )),
            Err(e) => Err(e),
        };
        if let Err(e) = verified {
            self.discard(new_path);
            return Err(SnipError::io("verify content", new_path, e));
        }

        if let Err(err) = self.write_meta(&updated.meta()) {
            self.ops.remove(new_path).map_err(|e| {
                SnipError::io("remove new content after metadata write failed", new_path, e)
            })?;
            return Err(err);
        }

        // Metadata now points at the new file; a failure here leaves a stray old file
        self.ops.remove(old_path).map_err(|e| {
            SnipError::io("remove old content file (snippet already moved)", old_path, e)
        })
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = self.ops.remove(path) {
            warn!("failed to remove {}: {}", path.display(), e);
        }
    }

    /// Remove both files of a snippet, content first.
    ///
    /// A missing content file only warns. When the metadata cannot be parsed
    /// the language is unknown, so every `<name>.<ext>` with a known
    /// extension is removed together with the metadata.
    pub fn delete(&self, name: &str) -> SnipResult<()> {
        let stem = sanitize(name)?;
        let meta_path = self.meta_path(&stem);
        let content_paths = match self.read_meta(&stem) {
            Ok(meta) => vec![self.content_path(&stem, &meta.language)],
            Err(SnipError::Corrupt { reason, .. }) => {
                warn!("removing '{}' with unreadable metadata: {}", stem, reason);
                self.existing_content_files(&stem)
            }
            Err(err) => return Err(err),
        };

        for content_path in &content_paths {
            match self.ops.remove(content_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("content file {} was already missing", content_path.display());
                }
                Err(e) => return Err(SnipError::io("remove content", content_path, e)),
            }
        }

        self.ops.remove(&meta_path).map_err(|e| {
            SnipError::io("remove metadata (content already removed)", &meta_path, e)
        })?;

        debug!("deleted snippet '{}'", stem);
        Ok(())
    }

    /// Scan the storage root once and return the matching snippets ordered by
    /// name. Each pair is loaded when the iterator reaches it; incomplete or
    /// corrupt pairs are skipped.
    pub fn list(&self, filter: ListFilter) -> SnipResult<SnippetIter<'_>> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| SnipError::io("read directory", &self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnipError::io("read directory", &self.root, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(META_SUFFIX)
                && !stem.is_empty()
            {
                names.push(stem.to_string());
            }
        }
        names.sort();

        Ok(SnippetIter {
            store: self,
            names: names.into_iter(),
            filter,
        })
    }

    /// Case-insensitive substring search over name, language and tags.
    pub fn search(&self, query: &str) -> SnipResult<Vec<Snippet>> {
        let needle = query.to_lowercase();
        Ok(self
            .list(ListFilter::default())?
            .filter(|snippet| matches_query(snippet, &needle))
            .collect())
    }

    /// Write a snippet's content to `destination` (see [`Self::export_target`]).
    /// An existing file is only replaced when `overwrite` is set.
    pub fn export(
        &self,
        name: &str,
        destination: Option<&Path>,
        overwrite: bool,
    ) -> SnipResult<PathBuf> {
        let snippet = self.read(name)?;
        let target = self.resolve_target(&snippet, destination)?;

        if target.exists() && !overwrite {
            return Err(SnipError::path(&target, "destination already exists"));
        }

        self.ops
            .write(&target, &snippet.content)
            .map_err(|e| SnipError::io("export", &target, e))?;
        debug!("exported '{}' to {}", snippet.name, target.display());
        Ok(target)
    }

    /// File `export` would write to. `None` means the current directory. A
    /// directory destination receives `<name>.<ext>`; any other path is used
    /// as the file name.
    pub fn export_target(&self, name: &str, destination: Option<&Path>) -> SnipResult<PathBuf> {
        let snippet = self.read(name)?;
        self.resolve_target(&snippet, destination)
    }

    fn resolve_target(&self, snippet: &Snippet, destination: Option<&Path>) -> SnipResult<PathBuf> {
        let file_name = format!(
            "{}.{}",
            snippet.name,
            self.registry.extension_for(&snippet.language)
        );

        let target = match destination {
            None => std::env::current_dir()
                .map_err(|e| SnipError::io("resolve current directory", ".", e))?
                .join(&file_name),
            Some(dest) if dest.is_dir() => dest.join(&file_name),
            Some(dest) => {
                let raw = dest.to_string_lossy();
                if raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR) {
                    return Err(SnipError::path(dest, "destination directory does not exist"));
                }
                if let Some(parent) = dest.parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.is_dir()
                {
                    return Err(SnipError::path(parent, "destination directory does not exist"));
                }
                dest.to_path_buf()
            }
        };

        if target.is_dir() {
            return Err(SnipError::path(&target, "destination is a directory"));
        }
        Ok(target)
    }

    /// Create a snippet from a file anywhere on disk. The name defaults to the
    /// file stem and the language to the one registered for its extension.
    pub fn import(
        &self,
        path: &Path,
        name: Option<&str>,
        language: Option<&str>,
        tags: &[String],
    ) -> SnipResult<Snippet> {
        if !path.exists() {
            return Err(SnipError::path(path, "no such file"));
        }
        if !path.is_file() {
            return Err(SnipError::path(path, "not a regular file"));
        }

        let content = self
            .ops
            .read_to_string(path)
            .map_err(|e| SnipError::io("read", path, e))?;

        let language = match language {
            Some(language) => language.to_string(),
            None => self
                .registry
                .detect_language(path)
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
        };

        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .ok_or_else(|| SnipError::path(path, "cannot derive a snippet name"))?,
        };

        self.create(&name, &language, &content, tags)
    }
}

/// Lazy iterator returned by [`SnippetStore::list`].
pub struct SnippetIter<'a> {
    store: &'a SnippetStore,
    names: std::vec::IntoIter<String>,
    filter: ListFilter,
}

impl Iterator for SnippetIter<'_> {
    type Item = Snippet;

    fn next(&mut self) -> Option<Snippet> {
        for name in self.names.by_ref() {
            match self.store.load(&name) {
                Ok(snippet) if self.filter.matches(&snippet) => return Some(snippet),
                Ok(_) => {}
                Err(err) => warn!("skipping snippet '{}': {}", name, err),
            }
        }
        None
    }
}

fn matches_query(snippet: &Snippet, needle: &str) -> bool {
    snippet.name.to_lowercase().contains(needle)
        || snippet.language.to_lowercase().contains(needle)
        || snippet
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

fn normalize_language(language: &str) -> String {
    let language = language.trim();
    if language.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        language.to_string()
    }
}

/// Trim tags, drop empty ones and keep the first of any duplicates.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
