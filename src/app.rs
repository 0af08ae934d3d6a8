//! # Query Engine Facade
//!
//! High-level operations over a [`RecordStore`], as used by the command line
//! front end and by browser-style callers.
//!
//! ## Provided Structures
//!
//! - **SearchRequest**: serializable description of a search, built with
//!   `with_*` methods and turned into a [`SearchQuery`] minted by the store.
//! - **Overview**: image and video classification of one category.
//!
//! ## Core Functions
//!
//! - **search** and **count**: records matched by a query, in store order.
//! - **count_by_tag**: records carrying one value (or any of its members).
//! - **classify** and **overview**: per-value counts of a category.
//! - **date_index**: a [`DateRangeIndex`] over the matched records.
//! - **load_store** and **restore_lock**: reading fixtures and privacy locks.
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`AppError`], which wraps the query,
//! lock, match text, I/O and JSON errors of the lower layers.

use crate::{
    classify::{Classifier, CountMode, CountWithRange},
    date::DateRange,
    date_index::DateRangeIndex,
    parser::{MatchTextError, check_match_text},
    query::{GeoBox, LockError, QueryError, RatingMode, SearchQuery},
    record::{Image, MediaMask},
    store::RecordStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

/// A search as a plain value.
///
/// Unset fields leave the corresponding filter off, so the default request
/// is the null query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Match text per category.
    pub categories: BTreeMap<String, String>,
    pub label: String,
    pub description: String,
    pub date: DateRange,
    pub rating: Option<u8>,
    pub rating_mode: RatingMode,
    pub min_megapixel: u32,
    pub max_megapixel: u32,
    pub raw_only: bool,
    pub region: Option<GeoBox>,
    pub file_name_pattern: Option<String>,
    pub freeform: Option<String>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: &str, text: &str) -> Self {
        self.categories
            .insert(category.to_string(), text.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_date(mut self, date: DateRange) -> Self {
        self.date = date;
        self
    }

    pub fn with_rating(mut self, rating: u8, mode: RatingMode) -> Self {
        self.rating = Some(rating);
        self.rating_mode = mode;
        self
    }

    pub fn with_freeform(mut self, text: &str) -> Self {
        self.freeform = Some(text.to_string());
        self
    }

    pub fn with_file_name_pattern(mut self, pattern: &str) -> Self {
        self.file_name_pattern = Some(pattern.to_string());
        self
    }

    /// Runs the strict match text checker over every category.
    pub fn validate(&self) -> Result<(), AppError> {
        for (category, text) in &self.categories {
            check_match_text(text).map_err(|source| AppError::MatchText {
                category: category.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Builds a query minted by `store`.
    ///
    /// # Returns
    ///
    /// Returns the query or an `AppError` if a pattern does not compile.
    pub fn build(&self, store: &RecordStore) -> Result<SearchQuery, AppError> {
        let mut query = store.new_query();

        for (category, text) in &self.categories {
            query.set_category_text(category, text);
        }
        if !self.label.is_empty() {
            query.set_label(&self.label);
        }
        if !self.description.is_empty() {
            query.set_description(&self.description);
        }
        if !self.date.is_null() {
            query.set_date(self.date);
        }
        if self.rating.is_some() {
            query.set_rating(self.rating);
            query.set_rating_mode(self.rating_mode);
        }
        if self.min_megapixel > 0 {
            query.set_megapixel(self.min_megapixel);
        }
        if self.max_megapixel > 0 {
            query.set_max_megapixel(self.max_megapixel);
        }
        if self.raw_only {
            query.set_search_raw(true);
        }
        if self.region.is_some() {
            query.set_region_selection(self.region);
        }
        if let Some(pattern) = &self.file_name_pattern {
            query.set_file_name_pattern(pattern)?;
        }
        if let Some(text) = &self.freeform {
            query.set_freeform_text(text)?;
        }

        Ok(query)
    }
}

/// Image and video counts of one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub images: BTreeMap<String, CountWithRange>,
    pub videos: BTreeMap<String, CountWithRange>,
}

/// Reads a JSON store fixture from `path`.
pub fn load_store<P: AsRef<Path>>(path: P) -> Result<RecordStore, AppError> {
    let file = File::open(path)?;
    Ok(RecordStore::from_json(BufReader::new(file))?)
}

/// Records matched by `query`, in store order. Locked records are skipped.
///
/// # Arguments
///
/// * `store` - The record store to search.
/// * `query` - A query minted by `store`; it compiles lazily on first use.
pub fn search<'a>(store: &'a RecordStore, query: &mut SearchQuery) -> Vec<&'a Image> {
    store
        .images()
        .iter()
        .filter(|image| !image.locked && query.matches(*image, store))
        .collect()
}

/// Number of records matched by `query`.
pub fn count(store: &RecordStore, query: &mut SearchQuery) -> usize {
    search(store, query).len()
}

/// Number of records tagged with `value` in `category`, group members
/// included.
pub fn count_by_tag(store: &RecordStore, category: &str, value: &str) -> usize {
    let mut query = store.new_query();
    query.add_and(category, value);
    count(store, &mut query)
}

/// Per-value counts of `category` among the records matched by `query`.
pub fn classify(
    store: &RecordStore,
    query: &SearchQuery,
    category: &str,
    media: MediaMask,
    mode: CountMode,
) -> BTreeMap<String, CountWithRange> {
    Classifier::new(query, category)
        .media(media)
        .mode(mode)
        .run(store.images(), store)
}

/// Classification of `category`, split by media type.
pub fn overview(store: &RecordStore, query: &SearchQuery, category: &str) -> Overview {
    Overview {
        images: classify(store, query, category, MediaMask::IMAGE, CountMode::Exact),
        videos: classify(store, query, category, MediaMask::VIDEO, CountMode::Exact),
    }
}

/// Date index over the records matched by `query`.
pub fn date_index(
    store: &RecordStore,
    query: &mut SearchQuery,
    cache_capacity: NonZeroUsize,
) -> DateRangeIndex {
    let ranges: Vec<DateRange> = search(store, query)
        .into_iter()
        .map(|image| image.date)
        .collect();
    DateRangeIndex::build_with_capacity(ranges, cache_capacity)
}

/// Restores a privacy lock saved with [`SearchQuery::persisted_form`].
pub fn restore_lock(
    store: &RecordStore,
    persisted: &BTreeMap<String, String>,
) -> Result<SearchQuery, AppError> {
    Ok(SearchQuery::from_persisted_form(
        store.generations().clone(),
        persisted,
    )?)
}

/// Error types of the facade, wrapping the errors of the lower layers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("privacy lock error: {0}")]
    Lock(#[from] LockError),

    #[error("match text of {category:?}: {source}")]
    MatchText {
        category: String,
        #[source]
        source: MatchTextError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
