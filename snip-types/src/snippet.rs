use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Represents a stored code snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub name: String,
    pub language: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created: DateTime<Local>,
}

impl Snippet {
    pub fn from_meta(meta: SnippetMeta, content: String) -> Self {
        Snippet {
            name: meta.name,
            language: meta.language,
            content,
            tags: meta.tags,
            created: meta.created,
        }
    }

    pub fn meta(&self) -> SnippetMeta {
        SnippetMeta {
            name: self.name.clone(),
            language: self.language.clone(),
            tags: self.tags.clone(),
            created: self.created,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Contents of a `<name>.meta.json` sidecar file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetMeta {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_created")]
    pub created: DateTime<Local>,
}

/// Accepts RFC 3339 timestamps and offset-less ISO-8601 ones (read as local time).
fn deserialize_created<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(serde::de::Error::custom)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| serde::de::Error::custom(format!("nonexistent local time: {raw}")))
}

/// Requested changes for an update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetPatch {
    pub content: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SnippetPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.language.is_none() && self.tags.is_none()
    }
}
