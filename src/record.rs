//! Records as seen by the query engine.
//!
//! The engine never owns the photo database. It borrows records through the
//! [`Record`] trait, which exposes the tags per category, the date range and
//! the handful of attributes the global filters look at. [`Image`] is the
//! in-memory implementation used by [`crate::store::RecordStore`], the CLI
//! and the tests.

use crate::date::DateRange;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NO_TAGS: BTreeSet<String> = BTreeSet::new();

/// Kind of media a record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

bitflags! {
    /// Set of media types accepted by a classification pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MediaMask: u8 {
        const IMAGE = 0b01;
        const VIDEO = 0b10;
        const ANY = Self::IMAGE.bits() | Self::VIDEO.bits();
    }
}

impl MediaMask {
    /// True when `media` is part of the mask.
    pub fn accepts(&self, media: MediaType) -> bool {
        self.contains(MediaMask::from(media))
    }
}

impl From<MediaType> for MediaMask {
    fn from(value: MediaType) -> Self {
        match value {
            MediaType::Image => MediaMask::IMAGE,
            MediaType::Video => MediaMask::VIDEO,
        }
    }
}

/// GPS position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

static STAMPS: AtomicU64 = AtomicU64::new(1);

/// Next value of a process-wide counter. Never returns the same value twice.
pub fn next_stamp() -> u64 {
    STAMPS.fetch_add(1, Ordering::Relaxed)
}

/// Version of mutable state that compiled queries depend on.
///
/// Every change replaces the value with a fresh [`next_stamp`], so two
/// revisions are equal only when they describe the same, unchanged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    pub fn new() -> Self {
        Revision(next_stamp())
    }

    pub fn bump(&mut self) {
        self.0 = next_stamp();
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized result of the last query evaluated against a record.
///
/// Entries are keyed by the stamp of the compiled snapshot that produced
/// them. The stamp and the boolean are packed into a single atomic word so a
/// reader never observes a stamp paired with another snapshot's result.
#[derive(Debug)]
pub struct MatchCache(AtomicU64);

const EMPTY_SLOT: u64 = u64::MAX;

impl MatchCache {
    pub fn new() -> Self {
        MatchCache(AtomicU64::new(EMPTY_SLOT))
    }

    /// Cached result for `stamp`, if that is what was stored last.
    pub fn get(&self, stamp: u64) -> Option<bool> {
        let slot = self.0.load(Ordering::Relaxed);
        if slot == EMPTY_SLOT || slot >> 1 != stamp {
            return None;
        }
        Some(slot & 1 == 1)
    }

    pub fn set(&self, stamp: u64, matched: bool) {
        self.0.store((stamp << 1) | matched as u64, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(EMPTY_SLOT, Ordering::Relaxed);
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MatchCache {
    // A copied record has not been matched by anything yet.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Read access to one entry of the record store.
///
/// Unknown categories simply have no tags; nothing here can fail.
pub trait Record {
    /// All tag values the record holds in `category`.
    fn tags_of_category(&self, category: &str) -> &BTreeSet<String>;

    fn has_tag(&self, category: &str, value: &str) -> bool {
        self.tags_of_category(category).contains(value)
    }

    fn has_any_tag(&self, category: &str, values: &HashSet<String>) -> bool {
        let tags = self.tags_of_category(category);
        if tags.len() <= values.len() {
            tags.iter().any(|t| values.contains(t))
        } else {
            values.iter().any(|v| tags.contains(v))
        }
    }

    fn date_range(&self) -> DateRange;

    /// Locked records are hidden from browsing.
    fn is_locked(&self) -> bool {
        false
    }

    fn media_type(&self) -> MediaType {
        MediaType::Image
    }

    fn label(&self) -> &str {
        ""
    }

    fn description(&self) -> &str {
        ""
    }

    /// File name relative to the image root.
    fn file_name(&self) -> &str;

    fn rating(&self) -> u8 {
        0
    }

    /// Pixel dimensions as `(width, height)`.
    fn size(&self) -> (u32, u32) {
        (0, 0)
    }

    fn coordinates(&self) -> Option<Coordinates> {
        None
    }

    /// Slot for memoized match results, if the record carries one.
    fn match_cache(&self) -> Option<&MatchCache> {
        None
    }
}

/// In-memory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub file_name: String,
    pub label: String,
    pub description: String,
    pub date: DateRange,
    pub media_type: MediaType,
    pub rating: u8,
    pub width: u32,
    pub height: u32,
    pub coordinates: Option<Coordinates>,
    pub locked: bool,
    /// Tags keyed by category.
    pub categories: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip)]
    cache: MatchCache,
}

impl Image {
    /// Creates an untagged image record for `file_name`.
    pub fn new<T: Into<String>>(file_name: T) -> Self {
        Image {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Adds tags in `category`.
    pub fn with_tags<I, T>(mut self, category: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let entry = self.categories.entry(category.to_string()).or_default();
        entry.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_date(mut self, date: DateRange) -> Self {
        self.date = date;
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

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lon });
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Adds a single tag, returning whether it was new.
    pub fn add_tag(&mut self, category: &str, value: &str) -> bool {
        self.cache.clear();
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(value.to_string())
    }

    /// Removes a single tag, returning whether it was present.
    pub fn remove_tag(&mut self, category: &str, value: &str) -> bool {
        self.cache.clear();
        self.categories
            .get_mut(category)
            .is_some_and(|tags| tags.remove(value))
    }

    /// Moves every tag of `old` to `new`.
    pub fn rename_category(&mut self, old: &str, new: &str) {
        self.cache.clear();
        if let Some(tags) = self.categories.remove(old) {
            self.categories.entry(new.to_string()).or_default().extend(tags);
        }
    }

    /// Renames one tag value within `category`.
    pub fn rename_tag(&mut self, category: &str, old: &str, new: &str) {
        if self.remove_tag(category, old) {
            self.add_tag(category, new);
        }
    }
}

impl Record for Image {
    fn tags_of_category(&self, category: &str) -> &BTreeSet<String> {
        self.categories.get(category).unwrap_or(&NO_TAGS)
    }

    fn date_range(&self) -> DateRange {
        self.date
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn rating(&self) -> u8 {
        self.rating
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    fn match_cache(&self) -> Option<&MatchCache> {
        Some(&self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::{Image, MatchCache, MediaMask, MediaType, Record, Revision, next_stamp};
    use std::collections::HashSet;

    #[test]
    fn test_tags_of_unknown_category_is_empty() {
        let image = Image::new("a.jpg").with_tags("People", ["Jesper"]);

        assert!(image.tags_of_category("Places").is_empty());
        assert!(!image.has_tag("Places", "Jesper"));
        assert!(image.has_tag("People", "Jesper"));
    }

    #[test]
    fn test_has_any_tag() {
        let image = Image::new("a.jpg").with_tags("People", ["Jesper", "Anne"]);
        let wanted: HashSet<String> = ["Jim".to_string(), "Anne".to_string()].into();
        let unwanted: HashSet<String> = ["Jim".to_string()].into();

        assert!(image.has_any_tag("People", &wanted));
        assert!(!image.has_any_tag("People", &unwanted));
        assert!(!image.has_any_tag("People", &HashSet::new()));
    }

    #[test]
    fn test_match_cache() {
        let cache = MatchCache::new();
        assert_eq!(None, cache.get(0));

        cache.set(7, true);
        assert_eq!(Some(true), cache.get(7));
        assert_eq!(None, cache.get(8));

        cache.set(8, false);
        assert_eq!(Some(false), cache.get(8));
        assert_eq!(None, cache.get(7));
    }

    #[test]
    fn test_stamps_are_unique() {
        let first = next_stamp();
        let second = next_stamp();
        assert!(second > first);

        let mut revision = Revision::new();
        let copy = revision;
        assert_eq!(copy, revision);
        revision.bump();
        assert_ne!(copy, revision);
        assert_ne!(Revision::new(), Revision::new());
    }

    #[test]
    fn test_tag_edits_invalidate_cache() {
        let mut image = Image::new("a.jpg");
        image.match_cache().unwrap().set(3, true);

        assert!(image.add_tag("People", "Jesper"));
        assert_eq!(None, image.match_cache().unwrap().get(3));
        assert!(image.remove_tag("People", "Jesper"));
        assert!(!image.remove_tag("People", "Jesper"));
    }

    #[test]
    fn test_media_mask() {
        assert!(MediaMask::ANY.accepts(MediaType::Video));
        assert!(MediaMask::IMAGE.accepts(MediaType::Image));
        assert!(!MediaMask::IMAGE.accepts(MediaType::Video));
    }

    #[test]
    fn test_deserialize_image() {
        let json = r#"{
            "file_name": "2020/beach.jpg",
            "rating": 4,
            "categories": { "Places": ["Paris"] }
        }"#;
        let image: Image = serde_json::from_str(json).unwrap();

        assert_eq!("2020/beach.jpg", image.file_name());
        assert_eq!(4, image.rating());
        assert!(image.has_tag("Places", "Paris"));
    }
}
