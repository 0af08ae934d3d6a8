//! Date ranges attached to records and used as search windows.
//!
//! A photo rarely has an exact timestamp: scanned prints carry a year, a
//! month, or a span of days. Every record therefore exposes a [`DateRange`]
//! rather than a single instant. Either bound may be missing, in which case
//! the range is open on that side.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Point in time used throughout the engine.
pub type Timestamp = DateTime<Utc>;

/// How a record's range relates to a search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// The range lies completely inside the window.
    IsContained,
    /// The range intersects the window but sticks out on at least one side.
    Overlap,
    /// No intersection at all.
    NoMatch,
}

/// A possibly open interval `[start, end]`.
///
/// Invariant: `start <= end` whenever both are present. The constructor
/// swaps reversed bounds instead of rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => DateRange {
                start: Some(e),
                end: Some(s),
            },
            _ => DateRange { start, end },
        }
    }

    /// A closed range.
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// A zero-length range covering a single instant.
    pub fn instant(at: Timestamp) -> Self {
        Self::new(Some(at), Some(at))
    }

    /// The fully open range. Matches everything.
    pub fn unbounded() -> Self {
        DateRange::default()
    }

    /// True when neither bound is set.
    pub fn is_null(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Lower bound with an open start mapped to the earliest representable time.
    pub fn lower(&self) -> Timestamp {
        self.start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Upper bound with an open end mapped to the latest representable time.
    pub fn upper(&self) -> Timestamp {
        self.end.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Classifies `self` against the search window `window`.
    pub fn is_included_in(&self, window: &DateRange) -> MatchType {
        let (start, end) = (self.lower(), self.upper());
        let (ws, we) = (window.lower(), window.upper());

        if ws <= start && we >= end {
            MatchType::IsContained
        } else if ws <= end && we >= start {
            MatchType::Overlap
        } else {
            MatchType::NoMatch
        }
    }

    /// True when the two ranges share at least one instant.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.is_included_in(other) != MatchType::NoMatch
    }

    /// True when `at` lies inside the range.
    pub fn includes(&self, at: Timestamp) -> bool {
        DateRange::instant(at).is_included_in(self) == MatchType::IsContained
    }

    /// Grows `self` so that it also covers `other`.
    ///
    /// A null range adopts `other` wholesale. Open bounds stay open.
    pub fn extend_to(&mut self, other: &DateRange) {
        if self.is_null() {
            *self = *other;
            return;
        }
        if other.is_null() {
            return;
        }

        self.start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        };
        self.end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }
}

/// Midnight UTC at the start of the given day.
///
/// Falls back to the Unix epoch for dates that do not exist.
pub fn day(year: i32, month: u32, day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{DateRange, MatchType, day};

    #[test]
    fn test_new_swaps_reversed_bounds() {
        let range = DateRange::between(day(2020, 5, 1), day(2020, 1, 1));

        assert_eq!(Some(day(2020, 1, 1)), range.start);
        assert_eq!(Some(day(2020, 5, 1)), range.end);
    }

    #[test]
    fn test_is_included_in() {
        let window = DateRange::between(day(2020, 1, 1), day(2020, 12, 31));

        assert_eq!(
            MatchType::IsContained,
            DateRange::instant(day(2020, 6, 1)).is_included_in(&window)
        );
        assert_eq!(
            MatchType::Overlap,
            DateRange::between(day(2019, 6, 1), day(2020, 2, 1)).is_included_in(&window)
        );
        assert_eq!(
            MatchType::NoMatch,
            DateRange::between(day(2018, 1, 1), day(2019, 1, 1)).is_included_in(&window)
        );
    }

    #[test]
    fn test_open_bounds() {
        let window = DateRange::between(day(2020, 1, 1), day(2020, 12, 31));
        let open_start = DateRange::new(None, Some(day(2020, 3, 1)));

        assert_eq!(MatchType::Overlap, open_start.is_included_in(&window));
        assert_eq!(
            MatchType::IsContained,
            window.is_included_in(&DateRange::unbounded())
        );
        assert_eq!(
            MatchType::Overlap,
            DateRange::unbounded().is_included_in(&window)
        );
    }

    #[test]
    fn test_extend_to() {
        let mut range = DateRange::default();
        range.extend_to(&DateRange::instant(day(2021, 1, 1)));
        range.extend_to(&DateRange::instant(day(2019, 1, 1)));

        assert_eq!(DateRange::between(day(2019, 1, 1), day(2021, 1, 1)), range);

        range.extend_to(&DateRange::new(Some(day(2022, 1, 1)), None));
        assert_eq!(None, range.end);
        assert_eq!(Some(day(2019, 1, 1)), range.start);
    }

    #[test]
    fn test_includes() {
        let range = DateRange::between(day(2020, 1, 1), day(2020, 1, 31));

        assert!(range.includes(day(2020, 1, 15)));
        assert!(range.includes(day(2020, 1, 31)));
        assert!(!range.includes(day(2020, 2, 1)));
    }
}
