//! Matcher trees.
//!
//! A compiled category expression is a tree of [`Matcher`] nodes evaluated
//! against one record at a time. Leaves test tags of a single category;
//! `And`/`Or`/`Not` combine them. [`ExactMatcher`] implements the "no other"
//! constraint: it evaluates its terms while recording every value they
//! mention, then rejects the record if it holds any tag in the category that
//! was not mentioned.

use crate::record::Record;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;

/// Values mentioned so far during one evaluation, per category.
///
/// An untracked context never allocates; only [`ExactMatcher`] builds a
/// tracking one for its own terms.
#[derive(Debug, Default)]
pub struct MatchContext {
    tracking: bool,
    matched: HashMap<String, HashSet<String>>,
}

impl MatchContext {
    /// A context that ignores value bookkeeping.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that records every value leaf it passes through.
    pub fn tracking() -> Self {
        MatchContext {
            tracking: true,
            matched: HashMap::new(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Values recorded for `category`.
    pub fn matched(&self, category: &str) -> Option<&HashSet<String>> {
        self.matched.get(category)
    }

    fn note(&mut self, category: &str, value: &str) {
        if !self.tracking {
            return;
        }
        self.matched
            .entry(category.to_string())
            .or_default()
            .insert(value.to_string());
    }
}

/// `category` holds `value`, or any value that `value` groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMatcher {
    pub category: String,
    pub value: String,
    /// Transitive members of `value` when it is a group.
    pub members: HashSet<String>,
}

impl ValueMatcher {
    pub fn new<C: Into<String>, V: Into<String>>(category: C, value: V) -> Self {
        ValueMatcher {
            category: category.into(),
            value: value.into(),
            members: HashSet::new(),
        }
    }

    pub fn with_members<I: IntoIterator<Item = String>>(mut self, members: I) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    pub fn eval<R: Record + ?Sized>(&self, record: &R, ctx: &mut MatchContext) -> bool {
        ctx.note(&self.category, &self.value);
        record.has_tag(&self.category, &self.value)
            || (!self.members.is_empty() && record.has_any_tag(&self.category, &self.members))
    }
}

/// One term of an exact group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactTerm {
    pub value: ValueMatcher,
    pub negated: bool,
}

/// "These terms, and no other tag in `category`."
///
/// The terms are ANDed. They are leaves by construction, so an exact group
/// can never contain another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatcher {
    pub category: String,
    pub terms: Vec<ExactTerm>,
}

impl ExactMatcher {
    pub fn eval<R: Record + ?Sized>(&self, record: &R) -> bool {
        if self.terms.is_empty() {
            return false;
        }

        let mut nested = MatchContext::tracking();
        for term in &self.terms {
            if term.value.eval(record, &mut nested) == term.negated {
                return false;
            }
        }

        let mentioned = nested.matched(&self.category);
        record
            .tags_of_category(&self.category)
            .iter()
            .all(|tag| mentioned.is_some_and(|m| m.contains(tag)))
    }
}

/// Free-text pattern resolved against the tag catalog at compile time.
#[derive(Debug, Clone)]
pub struct WildcardMatcher {
    pub pattern: Regex,
    /// Tags whose name matched `pattern`, per category. Categories without
    /// a hit are absent.
    pub matching: BTreeMap<String, HashSet<String>>,
}

impl WildcardMatcher {
    pub fn eval<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.matching
            .iter()
            .any(|(category, tags)| record.has_any_tag(category, tags))
    }
}

impl PartialEq for WildcardMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.matching == other.matching
    }
}

/// A node of a compiled category expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// All children match. Short-circuits left to right.
    And(Vec<Matcher>),
    /// Any child matches. Short-circuits left to right.
    Or(Vec<Matcher>),
    Not(Box<Matcher>),
    Value(ValueMatcher),
    Exact(ExactMatcher),
    /// The record has no tag at all in the category.
    NoTag(String),
    Wildcard(WildcardMatcher),
}

impl Matcher {
    pub fn value<C: Into<String>, V: Into<String>>(category: C, value: V) -> Self {
        Matcher::Value(ValueMatcher::new(category, value))
    }

    pub fn negate(matcher: Matcher) -> Self {
        Matcher::Not(Box::new(matcher))
    }

    /// Evaluates the tree against `record`.
    pub fn eval<R: Record + ?Sized>(&self, record: &R, ctx: &mut MatchContext) -> bool {
        match self {
            Matcher::And(children) => children.iter().all(|c| c.eval(record, ctx)),
            Matcher::Or(children) => children.iter().any(|c| c.eval(record, ctx)),
            Matcher::Not(child) => !child.eval(record, ctx),
            Matcher::Value(value) => value.eval(record, ctx),
            Matcher::Exact(exact) => exact.eval(record),
            Matcher::NoTag(category) => record.tags_of_category(category).is_empty(),
            Matcher::Wildcard(wildcard) => wildcard.eval(record),
        }
    }

    /// Evaluates with a fresh, untracked context.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.eval(record, &mut MatchContext::new())
    }

    /// True when the tree contains an exact group anywhere.
    pub fn has_exact(&self) -> bool {
        match self {
            Matcher::And(children) | Matcher::Or(children) => {
                children.iter().any(Matcher::has_exact)
            }
            Matcher::Not(child) => child.has_exact(),
            Matcher::Exact(_) => true,
            Matcher::Value(_) | Matcher::NoTag(_) | Matcher::Wildcard(_) => false,
        }
    }

    /// Indented dump of the tree, one node per line.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(0, &mut out);
        out
    }

    fn write_tree(&self, level: usize, out: &mut String) {
        let pad = " ".repeat(level * 3);
        match self {
            Matcher::And(children) | Matcher::Or(children) => {
                let name = if matches!(self, Matcher::And(_)) { "AND" } else { "OR" };
                let _ = writeln!(out, "{pad}{name}:");
                for child in children {
                    child.write_tree(level + 1, out);
                }
            }
            Matcher::Not(child) => {
                let _ = writeln!(out, "{pad}NOT:");
                child.write_tree(level + 1, out);
            }
            Matcher::Value(v) => {
                let _ = writeln!(out, "{pad}{}: {}", v.category, v.value);
            }
            Matcher::Exact(exact) => {
                let _ = writeln!(out, "{pad}EXACT:");
                let inner = " ".repeat((level + 1) * 3);
                for term in &exact.terms {
                    let bang = if term.negated { "!" } else { "" };
                    let _ = writeln!(
                        out,
                        "{inner}{}: {bang}{}",
                        term.value.category, term.value.value
                    );
                }
            }
            Matcher::NoTag(category) => {
                let _ = writeln!(out, "{pad}{category}:EMPTY");
            }
            Matcher::Wildcard(w) => {
                let _ = writeln!(out, "{pad}WILDCARD: {}", w.pattern.as_str());
            }
        }
    }
}
