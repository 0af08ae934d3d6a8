//! # Search Query
//!
//! [`SearchQuery`] is the user-facing query object: per-category match text
//! plus a set of global [`Filters`]. It compiles itself lazily into a
//! [`CompiledQuery`] the first time a record is matched after a change to the
//! query or to the vocabulary, and memoizes per-record results against the
//! stamp of that compiled snapshot.
//!
//! ```rust
//! use tagsift::{record::Image, store::RecordStore};
//!
//! let mut store = RecordStore::new();
//! store.insert(Image::new("a.jpg").with_tags("People", ["Jesper", "Anne"]));
//! store.insert(Image::new("b.jpg").with_tags("People", ["Jesper", "Jim"]));
//!
//! let mut query = store.new_query();
//! query.set_category_text("People", "Jesper & !Jim");
//!
//! let hits: Vec<&str> = store
//!     .images()
//!     .iter()
//!     .filter(|image| query.matches(*image, &store))
//!     .map(|image| image.file_name.as_str())
//!     .collect();
//! assert_eq!(vec!["a.jpg"], hits);
//! ```

pub mod display;
pub mod filter;
pub mod lock;

pub use display::DisplayVocabulary;
pub use filter::{ExifPredicate, Filters, GeoBox, RatingMode, Resolution};
pub use lock::LockError;

use crate::{
    NONE,
    compiler::{compile, compile_wildcard},
    date::DateRange,
    matcher::{MatchContext, Matcher, WildcardMatcher},
    parser::{AND_SEPARATOR, escape_value, parse_match_text},
    record::{Record, next_stamp},
    store::Vocabulary,
};
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Mints match generations.
///
/// Clones share one counter, so every query minted from the same source
/// gets generations no other query of that source will ever use.
#[derive(Debug, Clone, Default)]
pub struct GenerationSource(Arc<AtomicU64>);

impl GenerationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused generation, starting at 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A query term in disjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTerm {
    pub category: String,
    pub value: String,
    pub negated: bool,
}

/// Immutable snapshot of a [`SearchQuery`] ready for evaluation.
///
/// Holds everything evaluation needs, so it can be shared read-only between
/// threads while the originating query is left alone. Each compilation gets
/// its own process-unique stamp, which keys the per-record match cache.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub generation: u64,
    /// [`Vocabulary::revision`] the snapshot was compiled against.
    pub revision: u64,
    stamp: u64,
    pub cacheable: bool,
    pub filters: Filters,
    /// One root per constrained category, implicitly ANDed.
    pub roots: Vec<Matcher>,
    /// Free-form text resolved against the tag catalog.
    pub wildcard: Option<WildcardMatcher>,
}

impl CompiledQuery {
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn is_null(&self) -> bool {
        self.roots.is_empty() && self.filters.is_empty()
    }

    /// Cache-aware match.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        if self.is_null() {
            return true;
        }
        if let Some(hit) = self.cached(record) {
            return hit;
        }
        let matched = self.evaluate(record);
        self.remember(record, matched);
        matched
    }

    /// Runs every filter and matcher, ignoring the cache.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> bool {
        if !self.filters.accepts_before_categories(record) {
            return false;
        }

        let mut ctx = MatchContext::new();
        if !self.roots.iter().all(|root| root.eval(record, &mut ctx)) {
            return false;
        }

        if !self.filters.accepts_after_categories(record) {
            return false;
        }

        if self.filters.freeform.is_some() {
            return self.filters.freeform_hits_text(record)
                || self.wildcard.as_ref().is_some_and(|w| w.eval(record));
        }

        true
    }

    fn cached<R: Record + ?Sized>(&self, record: &R) -> Option<bool> {
        if !self.cacheable {
            return None;
        }
        let hit = record.match_cache()?.get(self.stamp)?;
        trace!(
            file_name = record.file_name(),
            stamp = self.stamp,
            "match cache hit"
        );
        Some(hit)
    }

    fn remember<R: Record + ?Sized>(&self, record: &R, matched: bool) {
        if !self.cacheable {
            return;
        }
        if let Some(cache) = record.match_cache() {
            cache.set(self.stamp, matched);
        }
    }

    /// Category constraints as an OR of AND-lists of simple terms.
    ///
    /// Returns `None` when a category uses an exact group, the no-tag
    /// marker, or nesting deeper than OR-of-AND. Global filters and the
    /// free-form text are not part of the result. An unconstrained query
    /// yields a single empty conjunction.
    pub fn disjunctive_normal_form(&self) -> Option<Vec<Vec<SimpleTerm>>> {
        let mut product: Vec<Vec<SimpleTerm>> = vec![Vec::new()];

        for root in &self.roots {
            let alternatives = alternatives_of(root)?;
            product = product
                .iter()
                .flat_map(|prefix| {
                    alternatives.iter().map(move |alternative| {
                        let mut conjunction = prefix.clone();
                        conjunction.extend(alternative.iter().cloned());
                        conjunction
                    })
                })
                .collect();
        }

        Some(product)
    }
}

fn alternatives_of(root: &Matcher) -> Option<Vec<Vec<SimpleTerm>>> {
    match root {
        Matcher::Or(children) => children.iter().map(conjunction_of).collect(),
        other => Some(vec![conjunction_of(other)?]),
    }
}

fn conjunction_of(node: &Matcher) -> Option<Vec<SimpleTerm>> {
    match node {
        Matcher::And(children) => children.iter().map(simple_term).collect(),
        other => Some(vec![simple_term(other)?]),
    }
}

fn simple_term(node: &Matcher) -> Option<SimpleTerm> {
    let (value, negated) = match node {
        Matcher::Value(value) => (value, false),
        Matcher::Not(inner) => match inner.as_ref() {
            Matcher::Value(value) => (value, true),
            _ => return None,
        },
        _ => return None,
    };
    Some(SimpleTerm {
        category: value.category.clone(),
        value: value.value.clone(),
        negated,
    })
}

/// Per-category match text plus global filters.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    generations: GenerationSource,
    generation: u64,
    category_text: BTreeMap<String, String>,
    filters: Filters,
    cacheable: bool,
    compiled: Option<CompiledQuery>,
    evaluations: u64,
}

impl SearchQuery {
    /// A null query: matches everything until constrained.
    pub fn new(generations: GenerationSource) -> Self {
        let generation = generations.next();
        SearchQuery {
            generations,
            generation,
            category_text: BTreeMap::new(),
            filters: Filters::default(),
            cacheable: true,
            compiled: None,
            evaluations: 0,
        }
    }

    pub fn with_range(
        generations: GenerationSource,
        date: DateRange,
        label: &str,
        description: &str,
    ) -> Self {
        let mut query = Self::new(generations);
        query.filters.date = date;
        query.filters.label = label.to_string();
        query.filters.description = description.to_string();
        query
    }

    fn touch(&mut self) {
        self.generation = self.generations.next();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when nothing constrains the query.
    pub fn is_null(&self) -> bool {
        self.category_text.values().all(|t| t.trim().is_empty()) && self.filters.is_empty()
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn category_text(&self, category: &str) -> Option<&str> {
        self.category_text.get(category).map(String::as_str)
    }

    pub fn category_texts(&self) -> &BTreeMap<String, String> {
        &self.category_text
    }

    /// Number of tree evaluations performed by [`Self::matches`].
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    /// Replaces the match text of `category`; empty text removes it.
    pub fn set_category_text(&mut self, category: &str, text: &str) {
        if text.trim().is_empty() {
            self.category_text.remove(category);
        } else {
            self.category_text
                .insert(category.to_string(), text.to_string());
        }
        self.touch();
    }

    /// ANDs `value` onto the text of `category`, escaping `&` in it.
    pub fn add_and(&mut self, category: &str, value: &str) {
        let escaped = escape_value(value);
        let text = self.category_text.entry(category.to_string()).or_default();
        if text.trim().is_empty() {
            *text = escaped;
        } else {
            text.push_str(AND_SEPARATOR);
            text.push_str(&escaped);
        }
        self.touch();
    }

    pub fn set_rating(&mut self, rating: Option<u8>) {
        self.filters.rating = rating;
        self.touch();
    }

    pub fn set_rating_mode(&mut self, mode: RatingMode) {
        self.filters.rating_mode = mode;
        self.touch();
    }

    pub fn set_megapixel(&mut self, megapixel: u32) {
        self.filters.resolution.min_megapixel = megapixel;
        self.touch();
    }

    pub fn set_max_megapixel(&mut self, megapixel: u32) {
        self.filters.resolution.max_megapixel = megapixel;
        self.touch();
    }

    pub fn set_search_raw(&mut self, raw_only: bool) {
        self.filters.raw_only = raw_only;
        self.touch();
    }

    pub fn set_date(&mut self, date: DateRange) {
        self.filters.date = date;
        self.touch();
    }

    pub fn set_label(&mut self, label: &str) {
        self.filters.label = label.to_string();
        self.touch();
    }

    pub fn set_description(&mut self, description: &str) {
        self.filters.description = description.to_string();
        self.touch();
    }

    /// Regex the file name must match; empty clears it.
    pub fn set_file_name_pattern(&mut self, pattern: &str) -> Result<(), QueryError> {
        self.filters.file_name_pattern = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern).map_err(|source| QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?)
        };
        self.touch();
        Ok(())
    }

    pub fn set_region_selection(&mut self, region: Option<GeoBox>) {
        self.filters.region = region;
        self.touch();
    }

    pub fn set_exif_predicate(&mut self, exif: Option<Arc<dyn ExifPredicate>>) {
        self.filters.exif = exif;
        self.touch();
    }

    /// Case-insensitive pattern over label, file name, description and tag
    /// names. Typed text changes on every keystroke, so a non-empty pattern
    /// turns caching off.
    pub fn set_freeform_text(&mut self, text: &str) -> Result<(), QueryError> {
        if text.is_empty() {
            self.filters.freeform = None;
        } else {
            let regex = RegexBuilder::new(text)
                .case_insensitive(true)
                .build()
                .map_err(|source| QueryError::InvalidPattern {
                    pattern: text.to_string(),
                    source,
                })?;
            self.filters.freeform = Some(regex);
            self.cacheable = false;
        }
        self.touch();
        Ok(())
    }

    pub fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
        self.touch();
    }

    /// Moves the text of `old` to `new`.
    pub fn rename_category(&mut self, old: &str, new: &str) {
        if let Some(text) = self.category_text.remove(old) {
            self.category_text.insert(new.to_string(), text);
        }
        self.touch();
    }

    /// Values the text of `category` already requires: the non-negated
    /// terms of a single AND branch. Empty when the text has OR branches.
    pub fn find_already_matched(&self, category: &str) -> BTreeSet<String> {
        let Some(text) = self.category_text.get(category) else {
            return BTreeSet::new();
        };

        match parse_match_text(text).as_slice() {
            [terms] => terms
                .iter()
                .filter(|term| !term.negated && term.value != NONE)
                .map(|term| term.value.clone())
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Builds a fresh snapshot of the query without touching `self`.
    pub fn compile<V: Vocabulary + ?Sized>(&self, vocab: &V) -> CompiledQuery {
        let wildcard = self
            .filters
            .freeform
            .as_ref()
            .map(|pattern| compile_wildcard(pattern.clone(), vocab));

        CompiledQuery {
            generation: self.generation,
            revision: vocab.revision(),
            stamp: next_stamp(),
            cacheable: self.cacheable,
            filters: self.filters.clone(),
            roots: compile(&self.category_text, vocab),
            wildcard,
        }
    }

    /// The compiled snapshot for the current generation and `vocab`
    /// revision, rebuilt if either moved on.
    pub fn compiled<V: Vocabulary + ?Sized>(&mut self, vocab: &V) -> &CompiledQuery {
        let revision = vocab.revision();
        let fresh = match self.compiled.take() {
            Some(compiled)
                if compiled.generation == self.generation && compiled.revision == revision =>
            {
                compiled
            }
            _ => self.compile(vocab),
        };
        self.compiled.insert(fresh)
    }

    pub fn matches<R, V>(&mut self, record: &R, vocab: &V) -> bool
    where
        R: Record + ?Sized,
        V: Vocabulary + ?Sized,
    {
        if self.is_null() {
            return true;
        }

        let compiled = self.compiled(vocab);
        if let Some(hit) = compiled.cached(record) {
            return hit;
        }
        let matched = compiled.evaluate(record);
        compiled.remember(record, matched);
        self.evaluations += 1;
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationSource, QueryError, RatingMode, SearchQuery, SimpleTerm};
    use crate::{
        NONE,
        date::{DateRange, day},
        record::Image,
        store::RecordStore,
    };
    use std::collections::BTreeSet;

    fn store_with(images: Vec<Image>) -> RecordStore {
        let mut store = RecordStore::new();
        for image in images {
            store.insert(image);
        }
        store
    }

    #[test]
    fn test_and_not() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("People", ["Jesper", "Anne"]),
            Image::new("b.jpg").with_tags("People", ["Jesper", "Jim"]),
        ]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper & !Jim");

        assert!(query.matches(&store.images()[0], &store));
        assert!(!query.matches(&store.images()[1], &store));
    }

    #[test]
    fn test_no_tag_marker() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("Places", ["Paris"]),
            Image::new("b.jpg").with_tags("People", ["Jesper"]),
        ]);
        let mut query = store.new_query();
        query.set_category_text("People", NONE);

        assert!(query.matches(&store.images()[0], &store));
        assert!(!query.matches(&store.images()[1], &store));
    }

    #[test]
    fn test_null_query_matches_without_evaluating() {
        let store = store_with(vec![Image::new("a.jpg")]);
        let mut query = store.new_query();

        assert!(query.is_null());
        assert!(query.matches(&store.images()[0], &store));
        assert_eq!(0, query.evaluation_count());
    }

    #[test]
    fn test_second_match_hits_cache() {
        let store = store_with(vec![Image::new("a.jpg").with_tags("People", ["Jesper"])]);
        let image = &store.images()[0];
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper");

        assert!(query.matches(image, &store));
        assert_eq!(1, query.evaluation_count());
        assert!(query.matches(image, &store));
        assert_eq!(1, query.evaluation_count());

        query.set_rating(Some(3));
        assert!(!query.matches(image, &store));
        assert_eq!(2, query.evaluation_count());
    }

    #[test]
    fn test_uncacheable_query_always_evaluates() {
        let store = store_with(vec![Image::new("a.jpg").with_tags("People", ["Jesper"])]);
        let image = &store.images()[0];
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper");
        query.set_cacheable(false);

        query.matches(image, &store);
        query.matches(image, &store);

        assert_eq!(2, query.evaluation_count());
    }

    #[test]
    fn test_queries_do_not_share_cached_results() {
        let store = store_with(vec![Image::new("a.jpg").with_tags("People", ["Jesper"])]);
        let image = &store.images()[0];
        let mut jesper = store.new_query();
        jesper.set_category_text("People", "Jesper");
        let mut jim = store.new_query();
        jim.set_category_text("People", "Jim");

        assert!(jesper.matches(image, &store));
        assert!(!jim.matches(image, &store));
        assert!(jesper.matches(image, &store));
    }

    #[test]
    fn test_queries_from_separate_sources_do_not_share_cached_results() {
        let store = store_with(vec![Image::new("a.jpg").with_tags("People", ["Jesper"])]);
        let image = &store.images()[0];
        let mut jesper = SearchQuery::new(GenerationSource::new());
        jesper.set_category_text("People", "Jesper");
        let mut jim = SearchQuery::new(GenerationSource::new());
        jim.set_category_text("People", "Jim");

        assert_eq!(jesper.generation(), jim.generation());
        assert!(jesper.matches(image, &store));
        assert!(!jim.matches(image, &store));
        assert!(jesper.matches(image, &store));
    }

    #[test]
    fn test_membership_edit_recompiles() {
        let mut store = store_with(vec![Image::new("a.jpg").with_tags("Places", ["Chicago"])]);
        store.members_mut().set_members("Places", "USA", ["Chicago", "California"]);
        let mut query = store.new_query();
        query.set_category_text("Places", "USA");

        assert!(query.matches(&store.images()[0], &store));
        assert!(query.matches(&store.images()[0], &store));
        assert_eq!(1, query.evaluation_count());

        store.members_mut().remove_member_from_group("Places", "USA", "Chicago");
        assert!(!query.matches(&store.images()[0], &store));
        assert_eq!(2, query.evaluation_count());
    }

    #[test]
    fn test_other_vocabulary_recompiles() {
        let mut grouped = store_with(vec![Image::new("a.jpg").with_tags("Places", ["Chicago"])]);
        grouped.members_mut().set_members("Places", "USA", ["Chicago"]);
        let flat = store_with(vec![]);
        let image = &grouped.images()[0];
        let mut query = grouped.new_query();
        query.set_category_text("Places", "USA");

        assert!(query.matches(image, &grouped));
        assert!(!query.matches(image, &flat));
        assert!(query.matches(image, &grouped));
    }

    #[test]
    fn test_compile_is_pure() {
        let store = store_with(vec![]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper | Anne");

        let first = query.compile(&store);
        let second = query.compile(&store);

        assert_eq!(first.roots, second.roots);
        assert_eq!(query.generation(), first.generation);
        assert_eq!(first.revision, second.revision);
        assert_ne!(first.stamp(), second.stamp());
    }

    #[test]
    fn test_add_and_escapes_value() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("Music", ["Rock & Roll", "Jazz"]),
        ]);
        let mut query = store.new_query();
        query.add_and("Music", "Rock & Roll");
        query.add_and("Music", "Jazz");

        assert_eq!(Some("Rock && Roll & Jazz"), query.category_text("Music"));
        assert!(query.matches(&store.images()[0], &store));
    }

    #[test]
    fn test_empty_text_removes_category() {
        let store = store_with(vec![]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper");
        query.set_category_text("People", "  ");

        assert_eq!(None, query.category_text("People"));
        assert!(query.is_null());
    }

    #[test]
    fn test_group_members_match() {
        let mut store = store_with(vec![Image::new("a.jpg").with_tags("Places", ["Chicago"])]);
        store.members_mut().set_members("Places", "USA", ["Chicago"]);
        let mut query = store.new_query();
        query.set_category_text("Places", "USA");

        assert!(query.matches(&store.images()[0], &store));
    }

    #[test]
    fn test_global_filters() {
        let store = store_with(vec![
            Image::new("2020/a.CR2")
                .with_rating(4)
                .with_label("Beach day")
                .with_date(DateRange::instant(day(2020, 7, 1))),
            Image::new("2019/b.jpg")
                .with_rating(2)
                .with_label("Ski trip")
                .with_date(DateRange::instant(day(2019, 1, 1))),
        ]);
        let (a, b) = (&store.images()[0], &store.images()[1]);

        let mut query = store.new_query();
        query.set_rating(Some(3));
        query.set_rating_mode(RatingMode::AtLeast);
        assert!(query.matches(a, &store));
        assert!(!query.matches(b, &store));

        let mut query = store.new_query();
        query.set_search_raw(true);
        assert!(query.matches(a, &store));
        assert!(!query.matches(b, &store));

        let mut query = store.new_query();
        query.set_date(DateRange::between(day(2019, 1, 1), day(2019, 12, 31)));
        assert!(!query.matches(a, &store));
        assert!(query.matches(b, &store));

        let mut query = store.new_query();
        query.set_label("Ski");
        assert!(!query.matches(a, &store));
        assert!(query.matches(b, &store));

        let mut query = store.new_query();
        query.set_file_name_pattern(r"^2020/").unwrap();
        assert!(query.matches(a, &store));
        assert!(!query.matches(b, &store));
    }

    #[test]
    fn test_freeform_text() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("Places", ["Paris"]),
            Image::new("b.jpg").with_description("Trip to PARIS"),
            Image::new("c.jpg").with_tags("Places", ["London"]),
        ]);
        let mut query = store.new_query();
        query.set_freeform_text("paris").unwrap();

        assert!(!query.is_cacheable());
        assert!(query.matches(&store.images()[0], &store));
        assert!(query.matches(&store.images()[1], &store));
        assert!(!query.matches(&store.images()[2], &store));
    }

    #[test]
    fn test_invalid_pattern() {
        let store = store_with(vec![]);
        let mut query = store.new_query();

        let err = query.set_file_name_pattern("(").unwrap_err();
        assert!(matches!(err, QueryError::InvalidPattern { ref pattern, .. } if pattern == "("));
        assert!(query.set_freeform_text("[").is_err());
    }

    #[test]
    fn test_find_already_matched() {
        let store = store_with(vec![]);
        let mut query = store.new_query();
        query.set_category_text("People", &format!("Jesper & !Jim & Anne & {NONE}"));
        query.set_category_text("Places", "Paris | London");

        assert_eq!(
            BTreeSet::from(["Anne".to_string(), "Jesper".to_string()]),
            query.find_already_matched("People")
        );
        assert!(query.find_already_matched("Places").is_empty());
        assert!(query.find_already_matched("Keywords").is_empty());
    }

    #[test]
    fn test_rename_category() {
        let store = store_with(vec![Image::new("a.jpg").with_tags("Persons", ["Jesper"])]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper");
        let before = query.generation();

        query.rename_category("People", "Persons");

        assert_eq!(Some("Jesper"), query.category_text("Persons"));
        assert!(query.generation() > before);
        assert!(query.matches(&store.images()[0], &store));
    }

    #[test]
    fn test_with_range() {
        let store = store_with(vec![]);
        let query = super::SearchQuery::with_range(
            store.generations().clone(),
            DateRange::instant(day(2020, 1, 1)),
            "beach",
            "",
        );

        assert!(!query.is_null());
        assert_eq!("beach", query.filters().label);
    }

    #[test]
    fn test_disjunctive_normal_form() {
        let store = store_with(vec![]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper & !Jim | Anne");
        query.set_category_text("Places", "Paris");

        let term = |category: &str, value: &str, negated: bool| SimpleTerm {
            category: category.to_string(),
            value: value.to_string(),
            negated,
        };

        assert_eq!(
            Some(vec![
                vec![
                    term("People", "Jesper", false),
                    term("People", "Jim", true),
                    term("Places", "Paris", false),
                ],
                vec![term("People", "Anne", false), term("Places", "Paris", false)],
            ]),
            query.compile(&store).disjunctive_normal_form()
        );

        query.set_category_text("Places", NONE);
        assert_eq!(None, query.compile(&store).disjunctive_normal_form());

        assert_eq!(
            Some(vec![vec![]]),
            store.new_query().compile(&store).disjunctive_normal_form()
        );
    }
}
