use crate::config::get_store_file_path;
use crate::error::{Result, SnapkeyError};
use crate::models::{Category, Snippet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

pub const DEFAULT_CATEGORY_ID: &str = "general";

/// Read side of the snippet store, queried by the match engine on every
/// delimiter. Must be cheap and must never block on I/O.
pub trait SnippetLookup: Send + Sync {
    /// Find an enabled snippet whose keyword equals `keyword` exactly
    /// (case-sensitive) and whose owning category is also enabled.
    fn find_active_by_keyword(&self, keyword: &str) -> Option<Snippet>;
}

/// In-memory snippet collection backed by a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnippetStore {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

impl SnippetStore {
    /// Load the store from `path`. An empty file yields an empty store;
    /// a missing file is an error, since the daemon is useless without one.
    pub fn load_from(path: &Path) -> Result<SnippetStore> {
        if !path.exists() {
            return Err(SnapkeyError::StoreNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(SnippetStore::default());
        }

        serde_json::from_str(&content).map_err(|e| e.into())
    }

    /// Load the store from the default location.
    pub fn load() -> Result<SnippetStore> {
        SnippetStore::load_from(&get_store_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_store_file_path())
    }

    fn category_enabled(&self, category_id: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.id == category_id && c.enabled)
    }

    /// Add a snippet under the default category, creating that category on
    /// first use.
    pub fn add(&mut self, keyword: String, replacement: String) -> Result<()> {
        if keyword.trim().is_empty() {
            return Err(SnapkeyError::InvalidConfig(
                "keyword must not be empty".to_string(),
            ));
        }
        if self.snippets.iter().any(|s| s.keyword == keyword) {
            return Err(SnapkeyError::Other(format!(
                "Keyword '{}' already exists",
                keyword
            )));
        }

        if !self.categories.iter().any(|c| c.id == DEFAULT_CATEGORY_ID) {
            self.categories.push(Category::new(
                DEFAULT_CATEGORY_ID.to_string(),
                "General".to_string(),
            ));
        }

        self.snippets.push(Snippet::new(
            keyword,
            replacement,
            DEFAULT_CATEGORY_ID.to_string(),
        ));
        Ok(())
    }

    /// Remove a snippet by keyword. Errors if no such keyword exists.
    pub fn remove(&mut self, keyword: &str) -> Result<()> {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.keyword != keyword);
        if self.snippets.len() == before {
            return Err(SnapkeyError::Other(format!(
                "Keyword '{}' not found",
                keyword
            )));
        }
        Ok(())
    }
}

impl SnippetLookup for SnippetStore {
    fn find_active_by_keyword(&self, keyword: &str) -> Option<Snippet> {
        self.snippets
            .iter()
            .find(|s| s.enabled && s.keyword == keyword && self.category_enabled(&s.category_id))
            .cloned()
    }
}

// The daemon shares one store between the pipeline worker and whatever
// reloads it. A poisoned lock degrades to "no match" rather than panicking
// on the interception path.
impl SnippetLookup for RwLock<SnippetStore> {
    fn find_active_by_keyword(&self, keyword: &str) -> Option<Snippet> {
        self.read()
            .ok()
            .and_then(|store| store.find_active_by_keyword(keyword))
    }
}
