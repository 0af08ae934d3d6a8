//! # Tag Query Engine
//!
//! This crate evaluates tag queries against a photo collection. Records carry
//! tags grouped in categories ("People", "Places", ...), a possibly fuzzy
//! date range and a few attributes such as rating and label. A query holds
//! one match text per category plus global filters, and the engine answers
//! three questions about it:
//!
//! - **Matching**: does a record satisfy the query? See [`query::SearchQuery`].
//! - **Classification**: how many matched records carry each value of a
//!   category, including the "no other value" bucket and group roll-ups?
//!   See [`classify::Classifier`].
//! - **Date counting**: how many records fall into (or overlap) a date
//!   window? See [`date_index::DateRangeIndex`].
//!
//! ## Match Text
//!
//! Per category, `|` separates alternatives, `" & "` joins required terms,
//! a leading `!` negates a term and [`NONE`] stands for "no other value in
//! this category". Literal ampersands in tag names are doubled.
//!
//! ## Usage
//!
//! ```rust
//! use tagsift::{classify::Classifier, record::Image, store::RecordStore};
//!
//! let mut store = RecordStore::new();
//! store.insert(Image::new("a.jpg").with_tags("People", ["Jesper", "Anne"]));
//! store.insert(Image::new("b.jpg").with_tags("People", ["Jesper"]));
//!
//! let mut query = store.new_query();
//! query.set_category_text("People", "Jesper");
//! assert!(query.matches(&store.images()[1], &store));
//!
//! let counts = Classifier::new(&query, "People").run(store.images(), &store);
//! assert_eq!(1, counts["Anne"].count);
//! assert_eq!(1, counts[tagsift::NONE].count);
//! ```

pub mod app;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod date;
pub mod date_index;
pub mod matcher;
pub mod members;
pub mod parser;
pub mod query;
pub mod record;
pub mod store;

/// Match text marker for "no other value in this category".
pub const NONE: &str = "**NONE**";

pub mod prelude {
    pub use crate::NONE;
    pub use crate::app::{AppError, SearchRequest};
    pub use crate::classify::{Classifier, CountMode, CountWithRange};
    pub use crate::date::{DateRange, Timestamp};
    pub use crate::date_index::{DateRangeIndex, ImageCount};
    pub use crate::members::{MemberMap, Membership};
    pub use crate::query::{CompiledQuery, GenerationSource, SearchQuery};
    pub use crate::record::{Image, MediaMask, MediaType, Record};
    pub use crate::store::{RecordStore, TagCatalog, Vocabulary};
}
