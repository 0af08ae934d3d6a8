//! # Date Range Index
//!
//! Answers "how many records fall into this window" for the date bar, which
//! asks the same handful of windows on every redraw.
//!
//! Ranges are kept sorted by start. A second, end-keyed map records for
//! every distinct end value the first start-sorted position from which a
//! range with at least that end can appear, so a query for `[qs, qe]` jumps
//! straight past everything that ended before `qs` and stops once starts pass
//! `qe`. Results are memoized in a small LRU keyed by window.
//!
//! ```rust
//! use tagsift::date::{day, DateRange};
//! use tagsift::date_index::{DateRangeIndex, ImageCount};
//!
//! let index = DateRangeIndex::build([
//!     DateRange::instant(day(2020, 5, 1)),
//!     DateRange::between(day(2020, 12, 1), day(2021, 2, 1)),
//!     DateRange::instant(day(2022, 1, 1)),
//! ]);
//!
//! let year = DateRange::between(day(2020, 1, 1), day(2020, 12, 31));
//! assert_eq!(ImageCount { exact: 1, overlapping: 1 }, index.count(&year));
//! ```

use crate::date::{DateRange, MatchType, Timestamp, day};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Records in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageCount {
    /// Fully inside the window.
    pub exact: usize,
    /// Intersecting the window but sticking out of it.
    pub overlapping: usize,
}

pub struct DateRangeIndex {
    by_start: Vec<DateRange>,
    /// end -> first position in `by_start` of any range ending at or after it.
    by_end: BTreeMap<Timestamp, usize>,
    lower: Option<Timestamp>,
    upper: Option<Timestamp>,
    cache: Mutex<LruCache<DateRange, ImageCount>>,
}

impl DateRangeIndex {
    pub fn build<I: IntoIterator<Item = DateRange>>(ranges: I) -> Self {
        Self::build_with_capacity(ranges, DEFAULT_CACHE_CAPACITY)
    }

    pub fn build_with_capacity<I: IntoIterator<Item = DateRange>>(
        ranges: I,
        cache_capacity: NonZeroUsize,
    ) -> Self {
        let started = Instant::now();

        let mut by_start: Vec<DateRange> = ranges.into_iter().collect();
        by_start.sort_by_key(|range| (range.lower(), range.upper()));

        let mut ends: Vec<(Timestamp, usize)> = by_start
            .iter()
            .enumerate()
            .map(|(pos, range)| (range.upper(), pos))
            .collect();
        ends.sort_by(|a, b| b.0.cmp(&a.0));

        let mut by_end = BTreeMap::new();
        let mut first = usize::MAX;
        for (end, pos) in ends {
            first = first.min(pos);
            by_end.insert(end, first);
        }

        let lower = by_start.iter().filter_map(|r| r.start).min();
        let upper = by_start.iter().filter_map(|r| r.end).max();

        debug!(
            ranges = by_start.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built date range index"
        );

        DateRangeIndex {
            by_start,
            by_end,
            lower,
            upper,
            cache: Mutex::new(LruCache::new(cache_capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }

    /// Counts the ranges contained in and overlapping `window`.
    pub fn count(&self, window: &DateRange) -> ImageCount {
        if let Some(hit) = self.cache.lock().get(window) {
            return *hit;
        }

        let counted = self.scan(window);
        self.cache.lock().put(*window, counted);
        counted
    }

    fn scan(&self, window: &DateRange) -> ImageCount {
        let mut counted = ImageCount::default();

        let Some((_, &first)) = self.by_end.range(window.lower()..).next() else {
            return counted;
        };

        let last_start = window.upper();
        for range in &self.by_start[first..] {
            if range.lower() > last_start {
                break;
            }
            match range.is_included_in(window) {
                MatchType::IsContained => counted.exact += 1,
                MatchType::Overlap => counted.overlapping += 1,
                MatchType::NoMatch => {}
            }
        }

        counted
    }

    /// Earliest known start, or 1900-01-01 when there is none.
    pub fn lower_bound(&self) -> Timestamp {
        self.lower.unwrap_or_else(|| day(1900, 1, 1))
    }

    /// Latest known end, or 2100-01-01 when there is none.
    pub fn upper_bound(&self) -> Timestamp {
        self.upper.unwrap_or_else(|| day(2100, 1, 1))
    }
}

impl fmt::Debug for DateRangeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeIndex")
            .field("ranges", &self.by_start.len())
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .finish_non_exhaustive()
    }
}
