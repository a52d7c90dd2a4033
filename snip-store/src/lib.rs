//! File-backed snippet storage.
//!
//! Each snippet is a content file `<name>.<ext>` plus a `<name>.meta.json`
//! sidecar in a single directory. Writes to the two files are sequenced and
//! rolled back where possible; what cannot be rolled back is reported as an
//! error naming the leftover file.
//!
//! The store takes no locks. Two processes working on the same snippet at the
//! same time (for example an `add` racing a `delete`) can leave a partial pair
//! behind.

mod language;
mod ops;
mod sanitize;
mod store;


pub use crate::language::{
    DEFAULT_LANGUAGE, FALLBACK_EXTENSION, Invocation, LanguageRegistry, Runner,
};
pub use crate::ops::{DiskOps, FileOps};
pub use crate::sanitize::{META_SUFFIX, sanitize};
pub use crate::store::{ListFilter, SnippetIter, SnippetStore};
