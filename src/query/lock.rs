//! Persisted form of a privacy lock.
//!
//! A privacy lock is a search query saved with the database that hides
//! everything it does not match. Only the category texts, the label and the
//! description survive a round trip.

use super::{GenerationSource, SearchQuery};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

const LABEL_KEY: &str = "label";
const DESCRIPTION_KEY: &str = "description";
const CATEGORIES_KEY: &str = "categories";
const CATEGORY_PREFIX: &str = "category:";

// Category texts live under prefixed keys, so no category name can shadow
// one of the fixed keys above.
fn category_key(name: &str) -> String {
    format!("{CATEGORY_PREFIX}{name}")
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("category list is malformed: {0}")]
    MalformedCategories(#[from] serde_json::Error),

    #[error("category {0:?} is listed but has no match text")]
    MissingCategory(String),
}

impl SearchQuery {
    /// Flattens the query into string pairs. The `categories` entry holds a
    /// JSON list of category names; each name's text is stored under
    /// `category:<name>`.
    pub fn persisted_form(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(LABEL_KEY.to_string(), self.filters.label.clone());
        map.insert(DESCRIPTION_KEY.to_string(), self.filters.description.clone());

        let names: Vec<&String> = self.category_text.keys().collect();
        map.insert(
            CATEGORIES_KEY.to_string(),
            serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string()),
        );
        for (category, text) in &self.category_text {
            map.insert(category_key(category), text.clone());
        }
        map
    }

    pub fn from_persisted_form(
        generations: GenerationSource,
        map: &BTreeMap<String, String>,
    ) -> Result<Self, LockError> {
        let mut query = SearchQuery::new(generations);

        if let Some(label) = map.get(LABEL_KEY) {
            query.set_label(label);
        }
        if let Some(description) = map.get(DESCRIPTION_KEY) {
            query.set_description(description);
        }

        let Some(names) = map.get(CATEGORIES_KEY) else {
            warn!("privacy lock has no category list; restoring label and description only");
            return Ok(query);
        };

        let names: Vec<String> = serde_json::from_str(names)?;
        for name in names {
            let text = map
                .get(&category_key(&name))
                .ok_or_else(|| LockError::MissingCategory(name.clone()))?;
            query.set_category_text(&name, text);
        }

        Ok(query)
    }
}
