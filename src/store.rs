//! In-memory record store.
//!
//! [`RecordStore`] is the collaborator the engine queries: it owns the
//! records, the member map and the generation source that mints search
//! queries, and it answers catalog questions (which categories exist, which
//! values a category has) for free-text compilation.
//!
//! Anything that can change a compiled query's outcome moves the store to a
//! new [`Vocabulary::revision`]: inserting records, handing out mutable
//! access to records or to the member map, and renames.

use crate::{
    members::{MemberMap, Membership},
    query::{GenerationSource, SearchQuery},
    record::{Image, Record, Revision},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;

/// Which categories and values exist.
pub trait TagCatalog {
    fn categories(&self) -> Vec<String>;

    /// Every value known in `category`: tags in use plus declared groups.
    fn items_of_category(&self, category: &str) -> BTreeSet<String>;
}

/// Everything compilation needs to know about the database.
pub trait Vocabulary: Membership + TagCatalog {
    /// Differs between any two states that could compile differently,
    /// including states of two distinct vocabularies.
    fn revision(&self) -> u64;
}

/// Serialized form of a store, as read by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFixture {
    pub records: Vec<Image>,
    /// `{ category -> { group -> [member] } }`
    pub groups: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    images: Vec<Image>,
    members: MemberMap,
    generations: GenerationSource,
    revision: Revision,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: StoreFixture) -> Self {
        RecordStore {
            images: fixture.records,
            members: MemberMap::from_groups(fixture.groups),
            generations: GenerationSource::new(),
            revision: Revision::new(),
        }
    }

    /// Reads a JSON [`StoreFixture`].
    pub fn from_json<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let fixture: StoreFixture = serde_json::from_reader(reader)?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn insert(&mut self, image: Image) {
        self.revision.bump();
        self.images.push(image);
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut [Image] {
        self.revision.bump();
        &mut self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn members(&self) -> &MemberMap {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut MemberMap {
        self.revision.bump();
        &mut self.members
    }

    pub fn generations(&self) -> &GenerationSource {
        &self.generations
    }

    /// A fresh, null query whose generations are unique within this store.
    pub fn new_query(&self) -> SearchQuery {
        SearchQuery::new(self.generations.clone())
    }

    /// Renames a category in every record and in the member map.
    pub fn rename_category(&mut self, old: &str, new: &str) {
        self.revision.bump();
        for image in &mut self.images {
            image.rename_category(old, new);
        }
        self.members.rename_category(old, new);
    }

    /// Renames one value in every record and in the member map.
    pub fn rename_item(&mut self, category: &str, old: &str, new: &str) {
        self.revision.bump();
        for image in &mut self.images {
            image.rename_tag(category, old, new);
        }
        self.members.rename_item(category, old, new);
    }
}

impl Vocabulary for RecordStore {
    // Both parts are drawn from one increasing counter, so the larger one
    // changes whenever either does.
    fn revision(&self) -> u64 {
        self.revision.max(self.members.revision()).get()
    }
}

impl TagCatalog for RecordStore {
    fn categories(&self) -> Vec<String> {
        let mut categories: BTreeSet<String> = self.members.direct().keys().cloned().collect();
        for image in &self.images {
            categories.extend(image.categories.keys().cloned());
        }
        categories.into_iter().collect()
    }

    fn items_of_category(&self, category: &str) -> BTreeSet<String> {
        let mut items: BTreeSet<String> = self.members.groups(category).into_iter().collect();
        for image in &self.images {
            items.extend(image.tags_of_category(category).iter().cloned());
        }
        items
    }
}

impl Membership for RecordStore {
    fn members_of(&self, category: &str, group: &str) -> HashSet<String> {
        self.members.members_of(category, group)
    }

    fn groups_of(&self, category: &str) -> HashSet<String> {
        self.members.groups_of(category)
    }

    fn group_map(&self, category: &str) -> BTreeMap<String, BTreeSet<String>> {
        self.members.group_map(category)
    }
}
