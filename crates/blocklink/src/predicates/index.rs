//! Index-backed predicates and the index service they consume.
//!
//! The similarity index itself is built elsewhere. This module only fixes
//! the parameters an index predicate is addressed by and the contract of the
//! service that answers it.

use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;

use crate::error::Result;
use crate::record::{FieldValue, Keys};

/// The similarity-index rule behind an index predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKind {
    TfidfTextSearch,
    TfidfTextCanopy,
    TfidfSetSearch,
    TfidfSetCanopy,
    TfidfNGramSearch,
    TfidfNGramCanopy,
    LevenshteinSearch,
    LevenshteinCanopy,
}

impl IndexKind {
    /// Stable name used in predicate display names.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::TfidfTextSearch => "TfidfTextSearchPredicate",
            IndexKind::TfidfTextCanopy => "TfidfTextCanopyPredicate",
            IndexKind::TfidfSetSearch => "TfidfSetSearchPredicate",
            IndexKind::TfidfSetCanopy => "TfidfSetCanopyPredicate",
            IndexKind::TfidfNGramSearch => "TfidfNGramSearchPredicate",
            IndexKind::TfidfNGramCanopy => "TfidfNGramCanopyPredicate",
            IndexKind::LevenshteinSearch => "LevenshteinSearchPredicate",
            IndexKind::LevenshteinCanopy => "LevenshteinCanopyPredicate",
        }
    }

    /// Returns true for canopy rules, false for search rules.
    pub fn is_canopy(&self) -> bool {
        matches!(
            self,
            IndexKind::TfidfTextCanopy
                | IndexKind::TfidfSetCanopy
                | IndexKind::TfidfNGramCanopy
                | IndexKind::LevenshteinCanopy
        )
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A read-only similarity index answering index predicates.
///
/// Implementations are shared across worker threads during cover building
/// and must not mutate during evaluation.
pub trait IndexService: Send + Sync {
    /// Keys for `value` under the index addressed by `(kind, threshold, field_index)`.
    fn keys(
        &self,
        kind: IndexKind,
        threshold: f64,
        field_index: usize,
        value: &FieldValue,
    ) -> Result<Keys>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IndexAddress {
    kind: IndexKind,
    threshold: OrderedFloat<f64>,
    field_index: usize,
    value: String,
}

/// An in-memory index over a fixed lookup table.
///
/// Values are addressed by their canonical rendering; unknown values map to
/// no keys.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedIndex {
    entries: HashMap<IndexAddress, Keys>,
}

impl PrecomputedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the keys for a value under one index address.
    pub fn insert<I, S>(
        &mut self,
        kind: IndexKind,
        threshold: f64,
        field_index: usize,
        value: &FieldValue,
        keys: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let address = IndexAddress {
            kind,
            threshold: OrderedFloat(threshold),
            field_index,
            value: value.render(),
        };
        self.entries
            .entry(address)
            .or_default()
            .extend(keys.into_iter().map(Into::into));
    }

    /// Number of addressed values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IndexService for PrecomputedIndex {
    fn keys(
        &self,
        kind: IndexKind,
        threshold: f64,
        field_index: usize,
        value: &FieldValue,
    ) -> Result<Keys> {
        let address = IndexAddress {
            kind,
            threshold: OrderedFloat(threshold),
            field_index,
            value: value.render(),
        };
        Ok(self.entries.get(&address).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(IndexKind::TfidfNGramSearch.name(), "TfidfNGramSearchPredicate");
        assert!(IndexKind::LevenshteinCanopy.is_canopy());
        assert!(!IndexKind::TfidfSetSearch.is_canopy());
    }

    #[test]
    fn test_precomputed_lookup() {
        let mut index = PrecomputedIndex::new();
        let value = FieldValue::text("donald");
        index.insert(IndexKind::TfidfTextSearch, 0.2, 0, &value, ["7", "9"]);

        let keys = index.keys(IndexKind::TfidfTextSearch, 0.2, 0, &value).unwrap();
        assert_eq!(keys.len(), 2);

        // Any other address is unknown
        assert!(index.keys(IndexKind::TfidfTextSearch, 0.4, 0, &value).unwrap().is_empty());
        assert!(index.keys(IndexKind::TfidfTextCanopy, 0.2, 0, &value).unwrap().is_empty());
        assert!(index.keys(IndexKind::TfidfTextSearch, 0.2, 1, &value).unwrap().is_empty());
        assert_eq!(index.len(), 1);
    }
}
