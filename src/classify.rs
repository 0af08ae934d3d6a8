//! Per-value counts for the category browser.
//!
//! Classification answers "how many of the records matched by this query
//! carry each value of category C", which is what the browser shows next to
//! every entry. Alongside the plain values it reports the [`NONE`] bucket
//! (records with no other value in C) and rolls member counts up into their
//! groups.

use crate::{
    NONE,
    date::{DateRange, MatchType},
    members::Membership,
    query::SearchQuery,
    record::{MediaMask, Record},
    store::Vocabulary,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Instant;
use tracing::debug;

/// Number of records in a bucket and the dates they span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountWithRange {
    pub count: usize,
    pub date_range: DateRange,
}

impl CountWithRange {
    fn add(&mut self, date: &DateRange) {
        self.count += 1;
        self.date_range.extend_to(date);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    #[default]
    Exact,
    /// Stop once more than one bucket is populated.
    Partial,
}

/// Rolls value counts up into the groups that contain them.
///
/// A record is counted once per group even when it carries several members
/// of it. A value that is itself a group counts toward that group.
#[derive(Debug)]
pub struct GroupCounter {
    member_to_groups: HashMap<String, Vec<String>>,
    counts: BTreeMap<String, CountWithRange>,
}

impl GroupCounter {
    pub fn new<M: Membership + ?Sized>(category: &str, members: &M) -> Self {
        let mut member_to_groups: HashMap<String, Vec<String>> = HashMap::new();
        let mut counts = BTreeMap::new();

        for (group, group_members) in members.group_map(category) {
            for member in group_members {
                member_to_groups
                    .entry(member)
                    .or_default()
                    .push(group.clone());
            }
            counts.insert(group, CountWithRange::default());
        }

        GroupCounter {
            member_to_groups,
            counts,
        }
    }

    pub fn count(&mut self, items: &BTreeSet<String>, date: &DateRange) {
        let mut counted: HashSet<&str> = HashSet::new();

        for item in items {
            if let Some(groups) = self.member_to_groups.get(item) {
                for group in groups {
                    if counted.insert(group) {
                        if let Some(entry) = self.counts.get_mut(group) {
                            entry.add(date);
                        }
                    }
                }
            }

            if let Some(entry) = self.counts.get_mut(item) {
                if counted.insert(item) {
                    entry.add(date);
                }
            }
        }
    }

    /// Groups with at least one record.
    pub fn result(self) -> BTreeMap<String, CountWithRange> {
        self.counts
            .into_iter()
            .filter(|(_, entry)| entry.count > 0)
            .collect()
    }
}

/// Configures and runs one classification pass.
///
/// ```rust
/// use tagsift::{classify::Classifier, record::Image, store::RecordStore};
///
/// let mut store = RecordStore::new();
/// store.insert(Image::new("a.jpg").with_tags("Places", ["Paris"]));
/// store.insert(Image::new("b.jpg"));
///
/// let query = store.new_query();
/// let counts = Classifier::new(&query, "Places").run(store.images(), &store);
///
/// assert_eq!(1, counts["Paris"].count);
/// assert_eq!(1, counts[tagsift::NONE].count);
/// ```
#[derive(Debug)]
pub struct Classifier<'q> {
    query: &'q SearchQuery,
    category: String,
    media: MediaMask,
    mode: CountMode,
    window: Option<(DateRange, bool)>,
}

impl<'q> Classifier<'q> {
    pub fn new(query: &'q SearchQuery, category: &str) -> Self {
        Classifier {
            query,
            category: category.to_string(),
            media: MediaMask::ANY,
            mode: CountMode::Exact,
            window: None,
        }
    }

    pub fn media(mut self, media: MediaMask) -> Self {
        self.media = media;
        self
    }

    pub fn mode(mut self, mode: CountMode) -> Self {
        self.mode = mode;
        self
    }

    /// Only count records inside the date-bar window. Records that merely
    /// overlap it count when `include_overlapping` is set. A window without
    /// a start does not restrict anything.
    pub fn within(mut self, window: DateRange, include_overlapping: bool) -> Self {
        self.window = window.start.map(|_| (window, include_overlapping));
        self
    }

    fn in_window<R: Record + ?Sized>(&self, record: &R) -> bool {
        let Some((window, include_overlapping)) = &self.window else {
            return true;
        };
        match record.date_range().is_included_in(window) {
            MatchType::IsContained => true,
            MatchType::Overlap => *include_overlapping,
            MatchType::NoMatch => false,
        }
    }

    // Query restricted to records without any other value in the category.
    fn no_match_query(&self) -> SearchQuery {
        let mut query = self.query.clone();
        let text = match self.query.category_text(&self.category) {
            Some(current) => format!("{current} & {NONE}"),
            None => NONE.to_string(),
        };
        query.set_category_text(&self.category, &text);
        query
    }

    pub fn run<'r, I, R, V>(&self, records: I, vocab: &V) -> BTreeMap<String, CountWithRange>
    where
        I: IntoIterator<Item = &'r R>,
        R: Record + ?Sized + 'r,
        V: Vocabulary + ?Sized,
    {
        let started = Instant::now();
        let base = self.query.compile(vocab);
        let no_match = self.no_match_query().compile(vocab);
        let already_matched = self.query.find_already_matched(&self.category);
        let mut groups = GroupCounter::new(&self.category, vocab);

        let mut map: BTreeMap<String, CountWithRange> = BTreeMap::new();
        map.insert(NONE.to_string(), CountWithRange::default());
        let mut populated = 0usize;
        let mut visited = 0usize;

        for record in records {
            if record.is_locked()
                || !self.media.accepts(record.media_type())
                || !self.in_window(record)
                || !base.matches(record)
            {
                continue;
            }
            visited += 1;

            let date = record.date_range();
            let items = record.tags_of_category(&self.category);
            groups.count(items, &date);

            for item in items {
                if !already_matched.contains(item) {
                    bump(&mut map, item, &date, &mut populated);
                }
            }

            if no_match.matches(record) {
                bump(&mut map, NONE, &date, &mut populated);
            }

            if self.mode == CountMode::Partial && populated > 1 {
                debug!(category = %self.category, "partial count satisfied");
                break;
            }
        }

        map.extend(groups.result());

        debug!(
            category = %self.category,
            matched = visited,
            buckets = map.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classified records"
        );
        map
    }
}

fn bump(
    map: &mut BTreeMap<String, CountWithRange>,
    key: &str,
    date: &DateRange,
    populated: &mut usize,
) {
    let entry = map.entry(key.to_string()).or_default();
    if entry.count == 0 {
        *populated += 1;
    }
    entry.add(date);
}

#[cfg(test)]
mod tests {
    use super::{Classifier, CountMode, GroupCounter};
    use crate::{
        NONE,
        date::{DateRange, day},
        members::MemberMap,
        record::{Image, MediaMask, MediaType, Record},
        store::RecordStore,
    };
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::collections::BTreeSet;

    fn store_with(images: Vec<Image>) -> RecordStore {
        let mut store = RecordStore::new();
        for image in images {
            store.insert(image);
        }
        store
    }

    fn counts(
        map: &std::collections::BTreeMap<String, super::CountWithRange>,
    ) -> Vec<(&str, usize)> {
        map.iter().map(|(k, v)| (k.as_str(), v.count)).collect()
    }

    #[test]
    fn test_places_scenario() {
        let store = store_with(vec![
            Image::new("1.jpg").with_tags("Places", ["Paris"]),
            Image::new("2.jpg").with_tags("Places", ["Paris"]),
            Image::new("3.jpg").with_tags("Places", ["Paris"]),
            Image::new("4.jpg").with_tags("Places", ["London"]),
            Image::new("5.jpg").with_tags("Places", ["London"]),
        ]);
        let query = store.new_query();

        let result = Classifier::new(&query, "Places").run(store.images(), &store);

        assert_eq!(vec![(NONE, 0), ("London", 2), ("Paris", 3)], counts(&result));
    }

    #[test]
    fn test_none_bucket_counts_untagged_records() {
        let mut rng = StdRng::seed_from_u64(0xc1a5);
        let values = ["Jesper", "Anne", "Jim"];

        for _ in 0..20 {
            let images: Vec<Image> = (0..rng.gen_range(0..30))
                .map(|i| {
                    let tags: Vec<&str> =
                        values.iter().copied().filter(|_| rng.gen_bool(0.3)).collect();
                    Image::new(format!("{i}.jpg")).with_tags("People", tags)
                })
                .collect();
            let store = store_with(images);
            let tagged = store
                .images()
                .iter()
                .filter(|i| !i.tags_of_category("People").is_empty())
                .count();

            let result = Classifier::new(&store.new_query(), "People").run(store.images(), &store);

            assert_eq!(store.len() - tagged, result[NONE].count);
        }
    }

    #[test]
    fn test_already_matched_values_are_not_counted() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("People", ["Jesper", "Anne"]),
            Image::new("b.jpg").with_tags("People", ["Jesper"]),
            Image::new("c.jpg").with_tags("People", ["Anne"]),
        ]);
        let mut query = store.new_query();
        query.set_category_text("People", "Jesper");

        let result = Classifier::new(&query, "People").run(store.images(), &store);

        assert_eq!(vec![(NONE, 1), ("Anne", 1)], counts(&result));
    }

    #[test]
    fn test_group_roll_up() {
        let mut store = store_with(vec![
            Image::new("a.jpg").with_tags("Places", ["Chicago", "New York"]),
            Image::new("b.jpg").with_tags("Places", ["Chicago"]),
            Image::new("c.jpg").with_tags("Places", ["USA"]),
            Image::new("d.jpg").with_tags("Places", ["Paris"]),
        ]);
        store
            .members_mut()
            .set_members("Places", "USA", ["Chicago", "New York"]);

        let result = Classifier::new(&store.new_query(), "Places").run(store.images(), &store);

        assert_eq!(3, result["USA"].count);
        assert_eq!(2, result["Chicago"].count);
        assert_eq!(1, result["Paris"].count);
    }

    #[test]
    fn test_group_counter_nested_groups() {
        let mut members = MemberMap::new();
        members.set_members("Places", "Europe", ["France"]);
        members.set_members("Places", "France", ["Paris"]);
        let mut counter = GroupCounter::new("Places", &members);

        let date = DateRange::default();
        counter.count(&BTreeSet::from(["Paris".to_string()]), &date);
        counter.count(&BTreeSet::from(["France".to_string()]), &date);
        let result = counter.result();

        assert_eq!(2, result["Europe"].count);
        assert_eq!(2, result["France"].count);
    }

    #[test]
    fn test_locked_and_media_mask() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("Places", ["Paris"]),
            Image::new("b.jpg").with_tags("Places", ["Paris"]).locked(),
            Image::new("c.mov")
                .with_tags("Places", ["Paris"])
                .with_media_type(MediaType::Video),
        ]);
        let query = store.new_query();

        let all = Classifier::new(&query, "Places").run(store.images(), &store);
        let images = Classifier::new(&query, "Places")
            .media(MediaMask::IMAGE)
            .run(store.images(), &store);

        assert_eq!(2, all["Paris"].count);
        assert_eq!(1, images["Paris"].count);
    }

    #[test]
    fn test_partial_count_stops_early() {
        let store = store_with(vec![
            Image::new("a.jpg").with_tags("Places", ["Paris"]),
            Image::new("b.jpg").with_tags("Places", ["London"]),
            Image::new("c.jpg").with_tags("Places", ["Berlin"]),
        ]);
        let query = store.new_query();

        let result = Classifier::new(&query, "Places")
            .mode(CountMode::Partial)
            .run(store.images(), &store);

        assert!(result.contains_key("London"));
        assert!(!result.contains_key("Berlin"));
    }

    #[test]
    fn test_within_window_and_date_ranges() {
        let store = store_with(vec![
            Image::new("a.jpg")
                .with_tags("Places", ["Paris"])
                .with_date(DateRange::instant(day(2020, 3, 1))),
            Image::new("b.jpg")
                .with_tags("Places", ["Paris"])
                .with_date(DateRange::instant(day(2020, 9, 1))),
            Image::new("c.jpg")
                .with_tags("Places", ["Paris"])
                .with_date(DateRange::between(day(2019, 12, 1), day(2020, 2, 1))),
            Image::new("d.jpg")
                .with_tags("Places", ["Paris"])
                .with_date(DateRange::instant(day(2018, 1, 1))),
        ]);
        let query = store.new_query();
        let window = DateRange::between(day(2020, 1, 1), day(2020, 12, 31));

        let strict = Classifier::new(&query, "Places")
            .within(window, false)
            .run(store.images(), &store);
        let fuzzy = Classifier::new(&query, "Places")
            .within(window, true)
            .run(store.images(), &store);

        assert_eq!(2, strict["Paris"].count);
        assert_eq!(
            DateRange::between(day(2020, 3, 1), day(2020, 9, 1)),
            strict["Paris"].date_range
        );
        assert_eq!(3, fuzzy["Paris"].count);
    }
}
