//! Runtime settings read from the environment.
//!
//! Environment variables:
//! - `TAGSIFT_LOG` tracing filter directive (default: `info`)
//! - `TAGSIFT_DATE_CACHE` date index window cache size (default: 256)
//! - `TAGSIFT_PARTIAL_COUNT` stop classification at the second bucket
//!   (default: false)

use crate::date_index::DEFAULT_CACHE_CAPACITY;
use std::env;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_filter: String,
    pub date_cache_capacity: NonZeroUsize,
    pub partial_count: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: "info".to_string(),
            date_cache_capacity: DEFAULT_CACHE_CAPACITY,
            partial_count: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Missing or unparsable values
    /// fall back to the defaults.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Config::default();

        Config {
            log_filter: lookup("TAGSIFT_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            date_cache_capacity: lookup("TAGSIFT_DATE_CACHE")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(NonZeroUsize::new)
                .unwrap_or(defaults.date_cache_capacity),
            partial_count: lookup("TAGSIFT_PARTIAL_COUNT")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.partial_count),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
