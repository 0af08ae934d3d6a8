//! Compiles per-category match text into matcher trees.
//!
//! Each category with non-empty text yields exactly one root [`Matcher`];
//! the roots are implicitly ANDed by the search query. Within a category:
//!
//! - `|` separates OR-branches,
//! - `" & "` separates AND-terms of a branch,
//! - a leading `!` negates a term,
//! - the [`NONE`] marker turns the branch into a "no other" constraint: with
//!   other terms present the branch becomes an [`ExactMatcher`] over them,
//!   alone it becomes [`Matcher::NoTag`]. A `!` on the marker negates that
//!   whole constraint.
//!
//! Values are expanded with their transitive group members at compile time,
//! so the resulting tree is self-contained and safe to share read-only.

use crate::{
    NONE,
    matcher::{ExactMatcher, ExactTerm, Matcher, ValueMatcher, WildcardMatcher},
    members::Membership,
    parser::parse_match_text,
    store::TagCatalog,
};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Compiles every category's text, skipping categories whose text yields
/// nothing.
pub fn compile<M: Membership + ?Sized>(
    per_category_text: &BTreeMap<String, String>,
    members: &M,
) -> Vec<Matcher> {
    per_category_text
        .iter()
        .filter_map(|(category, text)| compile_category(category, text, members))
        .collect()
}

/// Compiles one category's match text.
///
/// Returns `None` when the text holds no terms, i.e. the category is
/// unconstrained.
pub fn compile_category<M: Membership + ?Sized>(
    category: &str,
    text: &str,
    members: &M,
) -> Option<Matcher> {
    let mut branches = Vec::new();

    for terms in parse_match_text(text) {
        let mut leaves: Vec<ExactTerm> = Vec::new();
        let mut exact_requested = false;
        let mut exact_negated = false;

        for term in terms {
            if term.value == NONE {
                exact_requested = true;
                exact_negated |= term.negated;
                continue;
            }

            let value = ValueMatcher::new(category, term.value.as_str())
                .with_members(members.members_of(category, &term.value));
            leaves.push(ExactTerm {
                value,
                negated: term.negated,
            });
        }

        let branch = if exact_requested {
            let constraint = if leaves.is_empty() {
                Matcher::NoTag(category.to_string())
            } else {
                Matcher::Exact(ExactMatcher {
                    category: category.to_string(),
                    terms: leaves,
                })
            };
            Some(if exact_negated {
                Matcher::negate(constraint)
            } else {
                constraint
            })
        } else {
            collapse(leaves.into_iter().map(leaf).collect(), Matcher::And)
        };

        branches.extend(branch);
    }

    let root = collapse(branches, Matcher::Or);
    if let Some(root) = &root {
        debug!(
            category,
            text,
            "compiled match text:\n{}",
            root.debug_tree()
        );
    }
    root
}

/// Resolves a free-text pattern against every tag the catalog knows.
pub fn compile_wildcard<C: TagCatalog + ?Sized>(pattern: Regex, catalog: &C) -> WildcardMatcher {
    let mut matching = BTreeMap::new();

    for category in catalog.categories() {
        let hits: HashSet<String> = catalog
            .items_of_category(&category)
            .into_iter()
            .filter(|item| pattern.is_match(item))
            .collect();
        if !hits.is_empty() {
            matching.insert(category, hits);
        }
    }

    WildcardMatcher { pattern, matching }
}

fn leaf(term: ExactTerm) -> Matcher {
    if term.negated {
        Matcher::negate(Matcher::Value(term.value))
    } else {
        Matcher::Value(term.value)
    }
}

// Drops an empty container and unwraps a single child.
fn collapse(mut children: Vec<Matcher>, container: fn(Vec<Matcher>) -> Matcher) -> Option<Matcher> {
    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(container(children)),
    }
}
