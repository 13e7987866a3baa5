use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A trigger keyword and the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub category_id: String,
    pub keyword: String,
    pub replacement: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    pub fn new(keyword: String, replacement: String, category_id: String) -> Self {
        let now = Utc::now();
        Snippet {
            id: format!("snip-{}", now.timestamp_nanos_opt().unwrap_or_default()),
            category_id,
            keyword,
            replacement,
            enabled: true,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A group of snippets. Disabling a category disables every snippet in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Category {
            id,
            name,
            description: String::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emitted by the match engine once per recognized keyword; consumed by the
/// replayer to undo the typed trigger and inject the replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRequest {
    /// The matched keyword as typed (e.g. ";home").
    pub keyword: String,
    /// The text to inject in its place.
    pub replacement: String,
    /// The delimiter character that triggered the match.
    pub delimiter: char,
    /// Number of typed keyword characters. Authoritative for the backspace
    /// count: the replayer deletes `keyword_length + 1` to cover the
    /// trailing delimiter.
    pub keyword_length: usize,
}
