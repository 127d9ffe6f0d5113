//! Per-type predicate configuration.

use std::collections::HashMap;

use crate::predicates::{IndexKind, PredicateFunction};

use super::definition::VariableType;

/// Default thresholds of the index predicate grid.
pub const DEFAULT_INDEX_THRESHOLDS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Functions shared by every string-like type.
pub const BASE_STRING_FUNCTIONS: [PredicateFunction; 18] = [
    PredicateFunction::WholeField,
    PredicateFunction::FirstToken,
    PredicateFunction::FirstTwoTokens,
    PredicateFunction::CommonInteger,
    PredicateFunction::NearIntegers,
    PredicateFunction::FirstInteger,
    PredicateFunction::HundredInteger,
    PredicateFunction::HundredIntegersOdd,
    PredicateFunction::AlphaNumeric,
    PredicateFunction::SameThreeCharStart,
    PredicateFunction::SameFiveCharStart,
    PredicateFunction::SameSevenCharStart,
    PredicateFunction::CommonTwoTokens,
    PredicateFunction::CommonThreeTokens,
    PredicateFunction::Fingerprint,
    PredicateFunction::OneGramFingerprint,
    PredicateFunction::TwoGramFingerprint,
    PredicateFunction::SortedAcronym,
];

/// Functions short strings add on top of the base list.
pub const SHORT_STRING_FUNCTIONS: [PredicateFunction; 6] = [
    PredicateFunction::CommonFourGram,
    PredicateFunction::CommonSixGram,
    PredicateFunction::TokenField,
    PredicateFunction::SuffixArray,
    PredicateFunction::DoubleMetaphone,
    PredicateFunction::MetaphoneToken,
];

/// Predicate configuration of one variable type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTypeConfig {
    /// Functions instantiated as simple predicates, in order.
    pub functions: Vec<PredicateFunction>,
    /// Index rules combined with every threshold.
    pub index_kinds: Vec<IndexKind>,
    /// Ascending thresholds for the index grid.
    pub index_thresholds: Vec<f64>,
    /// Whether `has_missing` may attach an exists predicate.
    pub missing_predicate: bool,
}

static EMPTY_FIELD_TYPE: FieldTypeConfig = FieldTypeConfig {
    functions: Vec::new(),
    index_kinds: Vec::new(),
    index_thresholds: Vec::new(),
    missing_predicate: true,
};

impl Default for FieldTypeConfig {
    fn default() -> Self {
        EMPTY_FIELD_TYPE.clone()
    }
}

impl FieldTypeConfig {
    /// A config with only simple predicates.
    pub fn with_functions(functions: impl IntoIterator<Item = PredicateFunction>) -> Self {
        Self {
            functions: functions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add an index grid.
    pub fn with_index(mut self, kinds: &[IndexKind], thresholds: &[f64]) -> Self {
        self.index_kinds = kinds.to_vec();
        self.index_thresholds = thresholds.to_vec();
        self
    }

    /// Number of predicates a variable of this type gets, before `has_missing`.
    pub fn predicate_count(&self) -> usize {
        self.functions.len() + self.index_kinds.len() * self.index_thresholds.len()
    }
}

/// Predicate configuration for every variable type.
///
/// Passed explicitly into variable construction; types without an entry get
/// no predicates.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    field_types: HashMap<VariableType, FieldTypeConfig>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let short_string_functions: Vec<PredicateFunction> = BASE_STRING_FUNCTIONS
            .iter()
            .chain(SHORT_STRING_FUNCTIONS.iter())
            .copied()
            .collect();

        let mut field_types = HashMap::new();
        field_types.insert(
            VariableType::Exact,
            FieldTypeConfig::with_functions([PredicateFunction::WholeField]),
        );
        field_types.insert(
            VariableType::Text,
            FieldTypeConfig::with_functions(BASE_STRING_FUNCTIONS).with_index(
                &[IndexKind::TfidfTextCanopy, IndexKind::TfidfTextSearch],
                &DEFAULT_INDEX_THRESHOLDS,
            ),
        );
        field_types.insert(
            VariableType::ShortString,
            FieldTypeConfig::with_functions(short_string_functions.clone()).with_index(
                &[IndexKind::TfidfNGramCanopy, IndexKind::TfidfNGramSearch],
                &DEFAULT_INDEX_THRESHOLDS,
            ),
        );
        field_types.insert(
            VariableType::String,
            FieldTypeConfig::with_functions(short_string_functions).with_index(
                &[
                    IndexKind::TfidfNGramCanopy,
                    IndexKind::TfidfNGramSearch,
                    IndexKind::TfidfTextCanopy,
                    IndexKind::TfidfTextSearch,
                ],
                &DEFAULT_INDEX_THRESHOLDS,
            ),
        );
        field_types.insert(
            VariableType::Set,
            FieldTypeConfig::with_functions([
                PredicateFunction::WholeSet,
                PredicateFunction::CommonSetElement,
                PredicateFunction::LastSetElement,
                PredicateFunction::CommonTwoElements,
                PredicateFunction::CommonThreeElements,
                PredicateFunction::MagnitudeOfCardinality,
                PredicateFunction::FirstSetElement,
            ])
            .with_index(
                &[IndexKind::TfidfSetSearch, IndexKind::TfidfSetCanopy],
                &DEFAULT_INDEX_THRESHOLDS,
            ),
        );
        field_types.insert(
            VariableType::Price,
            FieldTypeConfig::with_functions([
                PredicateFunction::OrderOfMagnitude,
                PredicateFunction::WholeField,
                PredicateFunction::RoundTo1,
            ]),
        );
        field_types.insert(
            VariableType::LatLong,
            FieldTypeConfig::with_functions([PredicateFunction::LatLongGrid]),
        );
        field_types.insert(
            VariableType::Categorical,
            FieldTypeConfig::with_functions([PredicateFunction::WholeField]),
        );
        field_types.insert(VariableType::Custom, FieldTypeConfig::default());
        field_types.insert(VariableType::Exists, FieldTypeConfig::default());

        Self { field_types }
    }
}

impl ModelConfig {
    /// Configuration for one type.
    pub fn field_type(&self, variable_type: VariableType) -> &FieldTypeConfig {
        self.field_types
            .get(&variable_type)
            .unwrap_or(&EMPTY_FIELD_TYPE)
    }

    /// Replace the configuration of one type.
    pub fn with_field_type(mut self, variable_type: VariableType, config: FieldTypeConfig) -> Self {
        self.field_types.insert(variable_type, config);
        self
    }

    /// Drop every index grid, for datasets blocked without an index service.
    pub fn without_index_predicates(mut self) -> Self {
        for config in self.field_types.values_mut() {
            config.index_kinds.clear();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_sizes() {
        let config = ModelConfig::default();
        assert_eq!(config.field_type(VariableType::Exact).predicate_count(), 1);
        assert_eq!(config.field_type(VariableType::Text).predicate_count(), 18 + 8);
        assert_eq!(config.field_type(VariableType::ShortString).predicate_count(), 24 + 8);
        assert_eq!(config.field_type(VariableType::String).predicate_count(), 24 + 16);
        assert_eq!(config.field_type(VariableType::Set).predicate_count(), 7 + 8);
        assert_eq!(config.field_type(VariableType::Price).predicate_count(), 3);
        assert_eq!(config.field_type(VariableType::LatLong).predicate_count(), 1);
        assert_eq!(config.field_type(VariableType::Custom).predicate_count(), 0);
    }

    #[test]
    fn test_unconfigured_type_is_empty() {
        let config = ModelConfig::default();
        let derived = config.field_type(VariableType::Derived);
        assert!(derived.functions.is_empty());
        assert!(derived.missing_predicate);
    }

    #[test]
    fn test_without_index_predicates() {
        let config = ModelConfig::default().without_index_predicates();
        assert_eq!(config.field_type(VariableType::String).predicate_count(), 24);
    }
}
