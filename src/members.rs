//! Hierarchical tag groups.
//!
//! A tag value can itself act as a group of other values in the same
//! category: "USA" may contain "Chicago" and "California", and "California"
//! may contain "Los Angeles". Selecting a group in a query also selects every
//! value it transitively contains, and the classifier rolls member counts up
//! into their groups.
//!
//! [`MemberMap`] keeps the direct memberships as the primary data and derives
//! the transitive closure eagerly whenever a category changes, so lookups
//! never mutate anything. Every edit also moves the map to a new
//! [`Revision`], which compiled queries compare against.

use crate::record::Revision;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Group membership as seen by the compiler and the classifier.
pub trait Membership {
    /// Every value transitively contained in `group`. Empty for plain values.
    fn members_of(&self, category: &str, group: &str) -> HashSet<String>;

    /// Names of all groups declared in `category`.
    fn groups_of(&self, category: &str) -> HashSet<String>;

    /// Group name to transitive members, for one category.
    fn group_map(&self, category: &str) -> BTreeMap<String, BTreeSet<String>>;
}

type GroupTable = BTreeMap<String, BTreeSet<String>>;

/// In-memory member map: `{ category -> { group -> [member] } }`.
#[derive(Debug, Clone, Default)]
pub struct MemberMap {
    members: BTreeMap<String, GroupTable>,
    closure: BTreeMap<String, GroupTable>,
    revision: Revision,
}

impl PartialEq for MemberMap {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl MemberMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a member map from direct memberships.
    pub fn from_groups(groups: BTreeMap<String, GroupTable>) -> Self {
        let mut map = MemberMap {
            members: groups,
            closure: BTreeMap::new(),
            revision: Revision::new(),
        };
        let categories: Vec<String> = map.members.keys().cloned().collect();
        for category in categories {
            map.calculate(&category);
        }
        map
    }

    /// Direct memberships, as stored.
    pub fn direct(&self) -> &BTreeMap<String, GroupTable> {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.values().all(|groups| groups.is_empty())
    }

    /// Changes with every edit of the map.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Declares `group` without members.
    pub fn add_group(&mut self, category: &str, group: &str) {
        self.members
            .entry(category.to_string())
            .or_default()
            .entry(group.to_string())
            .or_default();
        self.calculate(category);
    }

    pub fn is_group(&self, category: &str, name: &str) -> bool {
        self.members
            .get(category)
            .is_some_and(|groups| groups.contains_key(name))
    }

    /// Group names of `category`, sorted.
    pub fn groups(&self, category: &str) -> Vec<String> {
        self.members
            .get(category)
            .map(|groups| groups.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Members of `group`, either direct or transitive.
    pub fn members(&self, category: &str, group: &str, closure: bool) -> BTreeSet<String> {
        let table = if closure {
            &self.closure
        } else {
            &self.members
        };
        table
            .get(category)
            .and_then(|groups| groups.get(group))
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the direct members of `group`.
    pub fn set_members<I, T>(&mut self, category: &str, group: &str, members: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.members
            .entry(category.to_string())
            .or_default()
            .insert(group.to_string(), members.into_iter().map(Into::into).collect());
        self.calculate(category);
    }

    pub fn add_member_to_group(&mut self, category: &str, group: &str, item: &str) {
        self.members
            .entry(category.to_string())
            .or_default()
            .entry(group.to_string())
            .or_default()
            .insert(item.to_string());
        self.calculate(category);
    }

    pub fn remove_member_from_group(&mut self, category: &str, group: &str, item: &str) {
        if let Some(members) = self
            .members
            .get_mut(category)
            .and_then(|groups| groups.get_mut(group))
        {
            members.remove(item);
            self.calculate(category);
        }
    }

    /// Deletes `group`. Its members stay members of any other group.
    pub fn delete_group(&mut self, category: &str, group: &str) {
        if let Some(groups) = self.members.get_mut(category) {
            groups.remove(group);
            for members in groups.values_mut() {
                members.remove(group);
            }
            self.calculate(category);
        }
    }

    pub fn rename_group(&mut self, category: &str, old: &str, new: &str) {
        let Some(groups) = self.members.get_mut(category) else {
            return;
        };
        if let Some(members) = groups.remove(old) {
            groups.insert(new.to_string(), members);
        }
        for members in groups.values_mut() {
            if members.remove(old) {
                members.insert(new.to_string());
            }
        }
        self.calculate(category);
    }

    pub fn rename_category(&mut self, old: &str, new: &str) {
        if let Some(groups) = self.members.remove(old) {
            self.members.insert(new.to_string(), groups);
        }
        if let Some(groups) = self.closure.remove(old) {
            self.closure.insert(new.to_string(), groups);
        }
        self.revision.bump();
    }

    /// Removes a tag value everywhere it appears, as group or as member.
    pub fn delete_item(&mut self, category: &str, name: &str) {
        self.delete_group(category, name);
    }

    /// Renames a tag value everywhere it appears, as group or as member.
    pub fn rename_item(&mut self, category: &str, old: &str, new: &str) {
        self.rename_group(category, old, new);
    }

    fn calculate(&mut self, category: &str) {
        self.revision.bump();
        let Some(groups) = self.members.get(category) else {
            self.closure.remove(category);
            return;
        };

        let result = groups
            .keys()
            .map(|group| (group.clone(), closure_of(groups, group)))
            .collect();
        self.closure.insert(category.to_string(), result);
    }
}

// Everything reachable from `group`. Each group gets its own walk, so a
// cycle never hands a partial result to another group.
fn closure_of(groups: &GroupTable, group: &str) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut visited = HashSet::from([group]);
    let mut pending = vec![group];

    while let Some(current) = pending.pop() {
        for member in groups.get(current).into_iter().flatten() {
            result.insert(member.clone());
            if groups.contains_key(member) && visited.insert(member.as_str()) {
                pending.push(member.as_str());
            }
        }
    }

    result
}

impl Membership for MemberMap {
    fn members_of(&self, category: &str, group: &str) -> HashSet<String> {
        self.closure
            .get(category)
            .and_then(|groups| groups.get(group))
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn groups_of(&self, category: &str) -> HashSet<String> {
        self.members
            .get(category)
            .map(|groups| groups.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn group_map(&self, category: &str) -> BTreeMap<String, BTreeSet<String>> {
        self.closure.get(category).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberMap, Membership};
    use std::collections::{BTreeSet, HashSet};

    fn places() -> MemberMap {
        let mut map = MemberMap::new();
        map.set_members("Places", "USA", ["Chicago", "California"]);
        map.set_members("Places", "California", ["Los Angeles", "Santa Clara"]);
        map
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_transitive_members() {
        let map = places();

        assert_eq!(
            set(&["Chicago", "California", "Los Angeles", "Santa Clara"]),
            map.members_of("Places", "USA")
        );
        assert_eq!(
            set(&["Los Angeles", "Santa Clara"]),
            map.members_of("Places", "California")
        );
        assert!(map.members_of("Places", "Chicago").is_empty());
        assert!(map.members_of("People", "USA").is_empty());
    }

    #[test]
    fn test_direct_members() {
        let map = places();

        assert_eq!(
            BTreeSet::from(["California".to_string(), "Chicago".to_string()]),
            map.members("Places", "USA", false)
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut map = MemberMap::new();
        map.set_members("People", "Family", ["Parents"]);
        map.set_members("People", "Parents", ["Family", "Mom"]);

        let family = map.members_of("People", "Family");
        assert!(family.contains("Mom"));
        assert!(family.contains("Parents"));
    }

    #[test]
    fn test_cycle_closure_is_complete_for_every_group() {
        let mut map = MemberMap::new();
        map.set_members("People", "Family", ["Parents", "Kid"]);
        map.set_members("People", "Parents", ["Family", "Mom"]);

        assert_eq!(
            set(&["Family", "Kid", "Mom", "Parents"]),
            map.members_of("People", "Parents")
        );
        assert_eq!(
            set(&["Family", "Kid", "Mom", "Parents"]),
            map.members_of("People", "Family")
        );
    }

    #[test]
    fn test_edits_change_revision() {
        let mut map = places();
        let start = map.revision();

        map.remove_member_from_group("Places", "USA", "Chicago");
        let removed = map.revision();
        assert_ne!(start, removed);

        map.rename_category("Places", "Locations");
        assert_ne!(removed, map.revision());

        let copy = map.clone();
        assert_eq!(copy.revision(), map.revision());
        assert_eq!(copy, map);
    }

    #[test]
    fn test_rename_group_updates_memberships() {
        let mut map = places();
        map.rename_group("Places", "California", "CA");

        assert!(map.is_group("Places", "CA"));
        assert!(!map.is_group("Places", "California"));
        assert!(map.members_of("Places", "USA").contains("CA"));
        assert!(map.members_of("Places", "USA").contains("Los Angeles"));
    }

    #[test]
    fn test_delete_group() {
        let mut map = places();
        map.delete_group("Places", "California");

        assert_eq!(set(&["USA"]), map.groups_of("Places"));
        assert_eq!(set(&["Chicago"]), map.members_of("Places", "USA"));
    }

    #[test]
    fn test_remove_member() {
        let mut map = places();
        map.remove_member_from_group("Places", "USA", "California");

        assert_eq!(set(&["Chicago"]), map.members_of("Places", "USA"));
    }

    #[test]
    fn test_rename_category() {
        let mut map = places();
        map.rename_category("Places", "Locations");

        assert!(map.members_of("Places", "USA").is_empty());
        assert_eq!(4, map.members_of("Locations", "USA").len());
    }
}
