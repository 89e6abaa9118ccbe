use crate::{
    error::{AppError, AppResult},
    models::Title,
};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Titles returned for an empty search query
const BROWSE_LIMIT: usize = 8;
const SEARCH_LIMIT: usize = 12;

/// The static, read-only title catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    titles: Vec<Title>,
}

impl Catalog {
    pub fn new(titles: Vec<Title>) -> Self {
        Self { titles }
    }

    /// Catalog shipped with the binary
    pub fn builtin() -> AppResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses a JSON array of titles, rejecting duplicate ids
    pub fn from_json(json: &str) -> AppResult<Self> {
        let titles: Vec<Title> = serde_json::from_str(json)
            .map_err(|e| AppError::InvalidInput(format!("Invalid catalog JSON: {}", e)))?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = titles.iter().find(|title| !seen.insert(title.id.as_str())) {
            return Err(AppError::InvalidInput(format!(
                "Duplicate title id in catalog: {}",
                duplicate.id
            )));
        }

        Ok(Self::new(titles))
    }

    /// Loads the catalog from `path`, or the built-in one when unset
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };

        let raw = std::fs::read_to_string(Path::new(path)).map_err(|e| {
            AppError::Internal(format!("Failed to read catalog file {}: {}", path, e))
        })?;
        let catalog = Self::from_json(&raw)?;

        tracing::info!(path = %path, titles = catalog.len(), "Loaded catalog from file");

        Ok(catalog)
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Title> {
        self.titles.iter().find(|title| title.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Titles whose ids appear in `ids`, in catalog order
    pub fn resolve(&self, ids: &[String]) -> Vec<&Title> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.titles
            .iter()
            .filter(|title| wanted.contains(title.id.as_str()))
            .collect()
    }

    /// Case-insensitive substring search on the title name
    ///
    /// A blank query browses the first few catalog entries.
    pub fn search(&self, query: &str) -> Vec<&Title> {
        let clean = query.trim().to_lowercase();
        if clean.is_empty() {
            return self.titles.iter().take(BROWSE_LIMIT).collect();
        }

        self.titles
            .iter()
            .filter(|title| title.title_name.to_lowercase().contains(&clean))
            .take(SEARCH_LIMIT)
            .collect()
    }
}
