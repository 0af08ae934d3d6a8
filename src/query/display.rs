//! Human-readable rendering of the category constraints.

use super::SearchQuery;
use crate::{
    compiler::compile_category,
    matcher::{ExactMatcher, Matcher},
    members::MemberMap,
};

/// Words used when rendering a query. The default is English.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayVocabulary {
    pub and: String,
    pub or: String,
    pub not: String,
    /// `{}` is replaced by the category name.
    pub no_tag: String,
    /// `{}` is replaced by the category name.
    pub no_other: String,
    /// Separator between categories and between plain AND-terms.
    pub separator: String,
}

impl Default for DisplayVocabulary {
    fn default() -> Self {
        DisplayVocabulary {
            and: "and".to_string(),
            or: "or".to_string(),
            not: "not".to_string(),
            no_tag: "No {}".to_string(),
            no_other: "No other {}".to_string(),
            separator: " / ".to_string(),
        }
    }
}

impl DisplayVocabulary {
    fn no_tag(&self, category: &str) -> String {
        self.no_tag.replace("{}", category)
    }

    fn no_other(&self, category: &str) -> String {
        self.no_other.replace("{}", category)
    }
}

impl SearchQuery {
    pub fn to_display_string(&self) -> String {
        self.to_display_string_with(&DisplayVocabulary::default())
    }

    /// Renders every constrained category, in name order.
    ///
    /// Group membership plays no part in the rendering, so the tree is
    /// compiled against an empty member map.
    pub fn to_display_string_with(&self, words: &DisplayVocabulary) -> String {
        let members = MemberMap::new();

        self.category_text
            .iter()
            .filter_map(|(category, text)| compile_category(category, text, &members))
            .map(|root| {
                let and = if matches!(root, Matcher::Or(_)) {
                    format!(" {} ", words.and)
                } else {
                    words.separator.clone()
                };
                let rendered = match &root {
                    Matcher::NoTag(category) => words.no_tag(category),
                    other => render(other, &and, words),
                };
                simplify_whitespace(&rendered)
            })
            .collect::<Vec<_>>()
            .join(&words.separator)
    }
}

fn render(node: &Matcher, and: &str, words: &DisplayVocabulary) -> String {
    match node {
        Matcher::Or(children) => children
            .iter()
            .map(|child| render(child, and, words))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", words.or)),
        Matcher::And(children) => children
            .iter()
            .map(|child| render(child, and, words))
            .collect::<Vec<_>>()
            .join(and),
        Matcher::Not(child) => format!("{} {}", words.not, render(child, and, words)),
        Matcher::Value(value) => value.value.clone(),
        Matcher::NoTag(category) => words.no_other(category),
        Matcher::Exact(exact) => render_exact(exact, and, words),
        Matcher::Wildcard(wildcard) => wildcard.pattern.as_str().to_string(),
    }
}

fn render_exact(exact: &ExactMatcher, and: &str, words: &DisplayVocabulary) -> String {
    let mut parts: Vec<String> = exact
        .terms
        .iter()
        .map(|term| {
            if term.negated {
                format!("{} {}", words.not, term.value.value)
            } else {
                term.value.value.clone()
            }
        })
        .collect();
    parts.push(words.no_other(&exact.category));
    parts.join(and)
}

fn simplify_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
