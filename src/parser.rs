//! # Match Text Parser
//!
//! Tokenizer for the per-category match text typed into the search dialog
//! or assembled by the browser, e.g. `Jesper & !Jim | Anne & **NONE**`.
//!
//! ## Grammar
//!
//! ```text
//! <text>   ::= <branch> { "|" <branch> }
//! <branch> ::= <term> { " & " <term> }
//! <term>   ::= [ "!" ] <value>
//! ```
//!
//! The AND separator is the three-character `" & "`, never a bare `&`. A
//! literal ampersand inside a tag name is written doubled (`A&&B` is the tag
//! `A&B`), which is what [`escape_value`] produces and [`parse_term`] undoes.
//!
//! Splitting is permissive: empty branches and empty terms are dropped and
//! anything else becomes a tag name, so no input is ever rejected here.
//! [`check_match_text`] is the strict counterpart for callers that want to
//! warn about suspicious input.
//!
//! ## Example Usage
//!
//! ```rust
//! # use tagsift::parser::{parse_match_text, Term};
//! let branches = parse_match_text("Jesper & !Jim | Tom&&Jerry");
//! assert_eq!(
//!     vec![
//!         vec![Term::value("Jesper"), Term::negated("Jim")],
//!         vec![Term::value("Tom&Jerry")],
//!     ],
//!     branches
//! );
//! ```

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag as t, take_until},
    character::complete::{char, multispace0},
    combinator::{opt, rest},
    multi::separated_list0,
};
use thiserror::Error;

/// Separator between OR-branches.
pub const OR_SEPARATOR: &str = "|";

/// Separator between AND-terms.
pub const AND_SEPARATOR: &str = " & ";

/// One AND-term of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Tag name with `&&` already unescaped.
    pub value: String,
    pub negated: bool,
}

impl Term {
    pub fn value<T: Into<String>>(value: T) -> Self {
        Term {
            value: value.into(),
            negated: false,
        }
    }

    pub fn negated<T: Into<String>>(value: T) -> Self {
        Term {
            value: value.into(),
            negated: true,
        }
    }
}

/// Splits a full match text into OR-branches of AND-terms.
pub fn parse_match_text(text: &str) -> Vec<Vec<Term>> {
    split_or_branches(text)
        .into_iter()
        .map(|branch| {
            split_and_terms(branch)
                .into_iter()
                .filter_map(parse_term)
                .collect::<Vec<_>>()
        })
        .filter(|terms| !terms.is_empty())
        .collect()
}

/// Splits on `|`, dropping empty branches.
pub fn split_or_branches(text: &str) -> Vec<&str> {
    split_on(text, OR_SEPARATOR)
}

/// Splits on `" & "`, dropping empty terms.
pub fn split_and_terms(branch: &str) -> Vec<&str> {
    split_on(branch, AND_SEPARATOR)
}

/// Parses one AND-term: optional leading `!`, trimmed, `&&` unescaped.
///
/// Returns `None` for a term that is blank once the negation is stripped.
pub fn parse_term(term: &str) -> Option<Term> {
    let parsed: IResult<&str, (&str, Option<char>, &str)> =
        (multispace0, opt(char('!')), rest).parse(term);

    let (negated, value) = match parsed {
        Ok((_, (_, bang, value))) => (bang.is_some(), value),
        Err(_) => (false, term),
    };

    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    Some(Term {
        value: unescape_value(value),
        negated,
    })
}

/// Doubles every `&` so the value survives the AND splitter.
pub fn escape_value(value: &str) -> String {
    value.replace('&', "&&")
}

/// Reverses [`escape_value`].
pub fn unescape_value(value: &str) -> String {
    value.replace("&&", "&")
}

fn split_on<'a>(input: &'a str, separator: &'static str) -> Vec<&'a str> {
    let parsed: IResult<&str, Vec<&str>> =
        separated_list0(t(separator), alt((take_until(separator), rest))).parse(input);

    let parts = match parsed {
        Ok((_, parts)) => parts,
        Err(_) => vec![input],
    };

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Strict validation of a match text.
///
/// `compile` never calls this; it accepts anything. The CLI and UI callers
/// use it to flag input that was probably mistyped.
pub fn check_match_text(text: &str) -> Result<(), MatchTextError> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let raw_branches: IResult<&str, Vec<&str>> =
        separated_list0(t(OR_SEPARATOR), alt((take_until(OR_SEPARATOR), rest))).parse(text);
    let raw_branches = raw_branches.map(|(_, b)| b).unwrap_or_else(|_| vec![text]);

    for branch in raw_branches {
        if branch.trim().is_empty() {
            return Err(MatchTextError {
                kind: MatchTextErrorKind::EmptyBranch,
                location: text.to_string(),
            });
        }

        for term in branch.split(AND_SEPARATOR) {
            let trimmed = term.trim();
            if trimmed.is_empty() {
                return Err(MatchTextError {
                    kind: MatchTextErrorKind::EmptyTerm,
                    location: branch.to_string(),
                });
            }
            if trimmed.trim_start_matches('!').trim().is_empty() {
                return Err(MatchTextError {
                    kind: MatchTextErrorKind::DanglingNegation,
                    location: term.to_string(),
                });
            }
            if has_stray_ampersand(trimmed) {
                return Err(MatchTextError {
                    kind: MatchTextErrorKind::StrayAmpersand,
                    location: term.to_string(),
                });
            }
        }
    }

    Ok(())
}

// A single `&` that is not half of an escaped `&&` pair.
fn has_stray_ampersand(term: &str) -> bool {
    let mut run = 0usize;
    for c in term.chars().chain(std::iter::once('\0')) {
        if c == '&' {
            run += 1;
        } else {
            if run % 2 == 1 {
                return true;
            }
            run = 0;
        }
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTextErrorKind {
    EmptyBranch,
    EmptyTerm,
    DanglingNegation,
    StrayAmpersand,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} at {location:?}")]
pub struct MatchTextError {
    pub kind: MatchTextErrorKind,
    pub location: String,
}
