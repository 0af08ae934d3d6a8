//! Global, category-independent filters of a search query.

use crate::date::DateRange;
use crate::record::{Coordinates, Record};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Extensions of camera RAW formats, lowercase.
pub const RAW_EXTENSIONS: &[&str] = &[
    "crw", "cr2", "nef", "bay", "mos", "mrw", "orf", "cs1", "dc2", "kdc", "raf", "rdc", "x3f",
    "arw", "dng", "rw2", "pef", "srw",
];

/// True when `file_name` carries a known RAW extension.
pub fn is_raw_file_name(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            RAW_EXTENSIONS
                .iter()
                .any(|raw| raw.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// How the record's rating is compared with the query's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingMode {
    #[default]
    Exact,
    AtLeast,
    LessThan,
    NotEqual,
}

impl RatingMode {
    pub fn accepts(&self, wanted: u8, actual: u8) -> bool {
        match self {
            RatingMode::Exact => actual == wanted,
            RatingMode::AtLeast => actual >= wanted,
            RatingMode::LessThan => actual < wanted,
            RatingMode::NotEqual => actual != wanted,
        }
    }
}

/// Megapixel bounds; zero disables a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub min_megapixel: u32,
    pub max_megapixel: u32,
}

impl Resolution {
    pub fn is_unbounded(&self) -> bool {
        self.min_megapixel == 0 && self.max_megapixel == 0
    }

    pub fn accepts(&self, (width, height): (u32, u32)) -> bool {
        let pixels = width as u64 * height as u64;
        if self.min_megapixel > 0 && pixels < self.min_megapixel as u64 * 1_000_000 {
            return false;
        }
        if self.max_megapixel > 0 && pixels > self.max_megapixel as u64 * 1_000_000 {
            return false;
        }
        true
    }
}

/// Latitude/longitude bounding box. `west > east` crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBox {
    pub fn contains(&self, at: Coordinates) -> bool {
        if at.lat < self.south || at.lat > self.north {
            return false;
        }
        if self.west <= self.east {
            at.lon >= self.west && at.lon <= self.east
        } else {
            at.lon >= self.west || at.lon <= self.east
        }
    }
}

/// Metadata search delegated to an EXIF database.
pub trait ExifPredicate: Debug + Send + Sync {
    fn matches(&self, file_name: &str) -> bool;
}

/// All global filters. The default value filters nothing.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub date: DateRange,
    pub rating: Option<u8>,
    pub rating_mode: RatingMode,
    pub resolution: Resolution,
    /// Substring of the record label.
    pub label: String,
    /// Space separated words that must all occur in the description.
    pub description: String,
    pub raw_only: bool,
    pub region: Option<GeoBox>,
    pub file_name_pattern: Option<Regex>,
    pub exif: Option<Arc<dyn ExifPredicate>>,
    pub freeform: Option<Regex>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.date.is_null()
            && self.rating.is_none()
            && self.resolution.is_unbounded()
            && self.label.is_empty()
            && self.description.is_empty()
            && !self.raw_only
            && self.region.is_none()
            && self.file_name_pattern.is_none()
            && self.exif.is_none()
            && self.freeform.is_none()
    }

    /// Every filter that runs before the category matchers.
    pub(crate) fn accepts_before_categories<R: Record + ?Sized>(&self, record: &R) -> bool {
        if let Some(wanted) = self.rating {
            if !self.rating_mode.accepts(wanted, record.rating()) {
                return false;
            }
        }

        if !self.resolution.accepts(record.size()) {
            return false;
        }

        if !self.date.is_null() {
            let actual = record.date_range();
            if actual.upper() < self.date.lower() || actual.lower() > self.date.upper() {
                return false;
            }
        }

        if !self.label.is_empty() && !record.label().contains(&self.label) {
            return false;
        }

        if self.raw_only && !is_raw_file_name(record.file_name()) {
            return false;
        }

        if let Some(region) = &self.region {
            match record.coordinates() {
                Some(at) if region.contains(at) => {}
                _ => return false,
            }
        }

        if let Some(pattern) = &self.file_name_pattern {
            if !pattern.is_match(record.file_name()) {
                return false;
            }
        }

        true
    }

    /// Description words and the EXIF predicate, which run after the
    /// category matchers.
    pub(crate) fn accepts_after_categories<R: Record + ?Sized>(&self, record: &R) -> bool {
        if !self.description.is_empty() {
            let text = record.description().to_lowercase();
            let all_found = self
                .description
                .split_whitespace()
                .all(|word| text.contains(&word.to_lowercase()));
            if !all_found {
                return false;
            }
        }

        if let Some(exif) = &self.exif {
            if !exif.matches(record.file_name()) {
                return false;
            }
        }

        true
    }

    /// Free-form text against label, file name and description.
    pub(crate) fn freeform_hits_text<R: Record + ?Sized>(&self, record: &R) -> bool {
        match &self.freeform {
            None => true,
            Some(re) => {
                re.is_match(record.label())
                    || re.is_match(record.file_name())
                    || re.is_match(record.description())
            }
        }
    }
}
