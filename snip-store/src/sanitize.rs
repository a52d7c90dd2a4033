use snip_types::{SnipError, SnipResult};

/// Suffix of the metadata sidecar file.
pub const META_SUFFIX: &str = ".meta.json";

const MAX_NAME_LEN: usize = 200;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

// Device names that cannot be used as file stems on Windows.
const RESERVED_STEMS: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

fn invalid(raw: &str, reason: &str) -> SnipError {
    SnipError::InvalidName {
        name: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// Normalize a user supplied name into a file stem that stays inside the
/// storage root.
///
/// Separators and other characters that are unsafe in file names become `_`,
/// surrounding whitespace and dots are trimmed. A name that still contains
/// `..` is rejected rather than rewritten.
pub fn sanitize(raw: &str) -> SnipResult<String> {
    if raw
        .split(['/', '\\'])
        .any(|component| component.trim() == "..")
    {
        return Err(invalid(raw, "path traversal is not allowed"));
    }

    let replaced: String = raw
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let name = replaced
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();

    if name.is_empty() {
        return Err(invalid(
            raw,
            "name must contain at least one visible character",
        ));
    }
    if name.contains("..") {
        return Err(invalid(raw, "'..' is not allowed in names"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid(raw, "name is too long"));
    }

    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".meta") || lower.ends_with(META_SUFFIX) {
        return Err(invalid(raw, "names ending in '.meta' are reserved"));
    }
    let stem = lower.split('.').next().unwrap_or_default();
    if RESERVED_STEMS.contains(&stem) {
        return Err(invalid(raw, "reserved device name"));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(raw: &str) -> bool {
        matches!(sanitize(raw), Err(SnipError::InvalidName { .. }))
    }

    #[test]
    fn test_normal_names() {
        assert_eq!(sanitize("hello").unwrap(), "hello");
        assert_eq!(sanitize("my_snippet").unwrap(), "my_snippet");
        assert_eq!(sanitize("test-123").unwrap(), "test-123");
        assert_eq!(sanitize("docker.compose").unwrap(), "docker.compose");
    }

    #[test]
    fn test_replaces_problematic_characters() {
        assert_eq!(sanitize("test<>file").unwrap(), "test__file");
        assert_eq!(sanitize("path/to\\file").unwrap(), "path_to_file");
        assert_eq!(sanitize("file:name").unwrap(), "file_name");
        assert_eq!(sanitize("test?*file").unwrap(), "test__file");
        assert_eq!(sanitize("tab\there").unwrap(), "tab_here");
    }

    #[test]
    fn test_trims_dots_and_spaces() {
        assert_eq!(sanitize("...test").unwrap(), "test");
        assert_eq!(sanitize("test...").unwrap(), "test");
        assert_eq!(sanitize("  test  ").unwrap(), "test");
        assert_eq!(sanitize("..test..").unwrap(), "test");
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(is_invalid(""));
        assert!(is_invalid("..."));
        assert!(is_invalid("   "));
    }

    #[test]
    fn test_traversal_rejected() {
        assert!(is_invalid("../../etc/passwd"));
        assert!(is_invalid(".."));
        assert!(is_invalid("a/../b"));
        assert!(is_invalid("a\\..\\b"));
    }

    #[test]
    fn test_inner_double_dot_rejected() {
        assert!(is_invalid("a..b"));
        assert!(is_invalid("release..notes.md"));
        assert!(is_invalid("x/..y"));
        assert_eq!(sanitize("a.b").unwrap(), "a.b");
        assert_eq!(sanitize("..a.b..").unwrap(), "a.b");
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(is_invalid("foo.meta"));
        assert!(is_invalid("foo.META.json"));
        assert!(is_invalid("con"));
        assert!(is_invalid("NUL.txt"));
        assert!(!is_invalid("console"));
    }

    #[test]
    fn test_too_long_rejected() {
        assert!(is_invalid(&"a".repeat(MAX_NAME_LEN + 1)));
        assert!(!is_invalid(&"a".repeat(MAX_NAME_LEN)));
    }

    #[test]
    fn test_result_never_contains_separator() {
        for raw in ["/abs/path", "a/b/c", "\\\\server\\share", "./x"] {
            let name = sanitize(raw).unwrap();
            assert!(!name.contains('/') && !name.contains('\\'), "{name}");
            assert_ne!(name, ".");
        }
    }
}
