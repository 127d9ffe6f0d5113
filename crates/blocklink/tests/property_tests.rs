//! Property-based tests for predicates, variable models and covers.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p blocklink --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p blocklink --test property_tests
//! ```

use proptest::prelude::*;

use blocklink::predicates::{functions, phonetic, SimplePredicate, ValueDomain};
use blocklink::{
    Cover, CoverConfig, DataModel, FieldValue, IdentifiedRecord, ModelConfig, Predicate,
    PredicateFunction, Variable, VariableDefinition, VariableType,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Short name-like text with digits and punctuation.
fn name_like() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 '\\-\\.\n]{0,40}"
}

fn text_function() -> impl Strategy<Value = PredicateFunction> {
    proptest::sample::select(
        PredicateFunction::ALL
            .iter()
            .copied()
            .filter(|f| matches!(f.domain(), ValueDomain::Text | ValueDomain::Any))
            .collect::<Vec<_>>(),
    )
}

fn records() -> impl Strategy<Value = Vec<IdentifiedRecord>> {
    prop::collection::vec(name_like(), 0..60).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| IdentifiedRecord::new(i as u64, vec![FieldValue::text(name)]))
            .collect()
    })
}

proptest! {
    // =========================================================================
    // Predicate Functions
    // =========================================================================

    /// Text predicates never panic and always agree with themselves.
    #[test]
    fn text_predicates_are_deterministic(function in text_function(), value in any::<String>()) {
        let field = FieldValue::text(value);
        let first = function.apply(&field).unwrap();
        let second = function.apply(&field).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Token keys are non-empty and integer keys carry no leading zeros.
    #[test]
    fn token_keys_are_non_empty(value in name_like()) {
        for key in functions::token_field(&value) {
            prop_assert!(!key.is_empty());
        }
        for key in functions::common_integer(&value) {
            prop_assert!(key.chars().all(|c| c.is_ascii_digit()));
            prop_assert!(key == "0" || !key.starts_with('0'));
        }
    }

    #[test]
    fn suffixes_have_minimum_length(value in any::<String>()) {
        let length = value.chars().count();
        let suffixes: Vec<&str> = functions::suffix_array(&value).collect();
        prop_assert_eq!(suffixes.len(), length.saturating_sub(4));
        for suffix in suffixes {
            prop_assert!(suffix.chars().count() >= functions::MIN_SUFFIX_LEN);
            prop_assert!(value.ends_with(suffix));
        }
    }

    #[test]
    fn metaphone_codes_are_bounded(value in any::<String>()) {
        let (primary, secondary) = phonetic::double_metaphone(&value);
        prop_assert!(primary.chars().count() <= 4);
        prop_assert!(secondary.chars().count() <= 4);
    }

    #[test]
    fn near_integers_surround_each_integer(n in 1u64..1_000_000) {
        let keys = functions::near_integers(&format!("x{}y", n));
        prop_assert!(keys.contains(&(n - 1).to_string()));
        prop_assert!(keys.contains(&n.to_string()));
        prop_assert!(keys.contains(&(n + 1).to_string()));
    }

    // =========================================================================
    // Predicate Identity
    // =========================================================================

    /// Equal predicates have equal fingerprints; different field indexes differ.
    #[test]
    fn predicate_equality_contract(function in text_function(), i in 0usize..8, j in 0usize..8) {
        let a: Predicate = SimplePredicate::new(function, i).into();
        let b: Predicate = SimplePredicate::new(function, j).into();
        prop_assert_eq!(a == b, i == j);
        prop_assert_eq!(a.fingerprint() == b.fingerprint(), i == j);
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Declaring missing data only ever adds predicates.
    #[test]
    fn has_missing_is_monotone(
        variable_type in prop::sample::select(vec![
            VariableType::String,
            VariableType::ShortString,
            VariableType::Text,
            VariableType::Exact,
            VariableType::Set,
            VariableType::Price,
            VariableType::LatLong,
        ]),
        field_index in 0usize..5,
    ) {
        let plain = DataModel::new(&[VariableDefinition::field(field_index, variable_type)]).unwrap();
        let missing = DataModel::new(&[
            VariableDefinition::field(field_index, variable_type).with_missing(true),
        ])
        .unwrap();

        let before = plain.predicates();
        let after = missing.predicates();
        prop_assert_eq!(after.len(), before.len() + 1);
        prop_assert!(before.iter().all(|p| after.contains(p)));
    }

    /// Categorical interactions expand into the product of their levels.
    #[test]
    fn expansion_cardinality(a in 1usize..5, b in 1usize..5) {
        let categories = |prefix: &str, n: usize| -> Vec<String> {
            (0..n).map(|i| format!("{}{}", prefix, i)).collect()
        };
        let model = DataModel::builder()
            .config(ModelConfig::default().without_index_predicates())
            .definitions([
                VariableDefinition::field(0, VariableType::Categorical)
                    .with_categories(categories("a", a))
                    .with_variable_name("first"),
                VariableDefinition::field(1, VariableType::Categorical)
                    .with_categories(categories("b", b))
                    .with_variable_name("second"),
                VariableDefinition::interaction(["first", "second"]),
            ])
            .build()
            .unwrap();

        let levels = |n: usize| n * (n + 1) / 2 - 1;
        let Some(Variable::Interaction(interaction)) =
            model.get("(Interaction: ['first', 'second'])")
        else {
            panic!("interaction missing from model");
        };
        prop_assert_eq!(interaction.higher_vars.len(), levels(a) * levels(b));
    }

    // =========================================================================
    // Covers
    // =========================================================================

    /// The cover does not depend on how records are sharded.
    #[test]
    fn cover_is_shard_independent(records in records(), shard_size in 1usize..20) {
        let predicates: Vec<Predicate> = [
            PredicateFunction::FirstToken,
            PredicateFunction::SameThreeCharStart,
            PredicateFunction::CommonInteger,
        ]
        .into_iter()
        .map(|f| SimplePredicate::new(f, 0).into())
        .collect();

        let reference = Cover::build_with_config(&predicates, &records, None, &CoverConfig {
            shard_size: records.len().max(1),
        })
        .unwrap();
        let sharded =
            Cover::build_with_config(&predicates, &records, None, &CoverConfig { shard_size })
                .unwrap();
        prop_assert_eq!(reference, sharded);
    }

    /// Every covered record shares a key with another covered record.
    #[test]
    fn covered_records_share_keys(records in records()) {
        let predicate: Predicate = SimplePredicate::new(PredicateFunction::FirstToken, 0).into();
        let cover = Cover::build(&[predicate.clone()], &records, None).unwrap();

        if let Some(covered) = cover.get(&predicate) {
            prop_assert!(covered.len() >= 2);
            for id in covered {
                let keys = predicate.keys(&records[*id as usize].fields, None).unwrap();
                let shared = records.iter().any(|other| {
                    other.id != *id
                        && !predicate
                            .keys(&other.fields, None)
                            .unwrap()
                            .is_disjoint(&keys)
                });
                prop_assert!(shared);
            }
        }
    }
}
