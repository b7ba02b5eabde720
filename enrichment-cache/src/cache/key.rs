//! Cache key derivation
//!
//! Keys have the shape `<namespace>_<title>_<year>_<attribution>`. The title is
//! normalized so that queries a person would consider the same movie land on
//! the same key: case, punctuation and runs of whitespace do not matter.

use crate::cache::types::CacheKey;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Placeholder for a missing year or attribution
pub const UNKNOWN: &str = "unknown";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a title for key derivation
///
/// Lower-cases, drops everything that is neither a word character nor
/// whitespace, collapses whitespace runs to a single space and trims.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Derive the storage key for a lookup
///
/// A year of `0` and an empty attribution count as unknown.
pub fn derive_key(
    namespace: &str,
    title: &str,
    year: Option<u32>,
    attributed_name: Option<&str>,
) -> CacheKey {
    let year = match year {
        Some(y) if y > 0 => y.to_string(),
        _ => UNKNOWN.to_string(),
    };
    let name = match attributed_name {
        Some(n) if !n.is_empty() => n,
        _ => UNKNOWN,
    };

    format!("{}_{}_{}_{}", namespace, normalize_title(title), year, name)
}

/// A metadata lookup: title plus optional release year and attributed creator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupQuery {
    pub title: String,
    pub year: Option<u32>,
    pub attributed_name: Option<String>,
}

impl LookupQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            attributed_name: None,
        }
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_attributed_name(mut self, name: impl Into<String>) -> Self {
        self.attributed_name = Some(name.into());
        self
    }

    /// Storage key for this query under the given namespace
    pub fn cache_key(&self, namespace: &str) -> CacheKey {
        derive_key(
            namespace,
            &self.title,
            self.year,
            self.attributed_name.as_deref(),
        )
    }
}

impl std::fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}
