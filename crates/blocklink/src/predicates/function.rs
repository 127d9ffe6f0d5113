//! Closed enumeration of the key-generating functions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlockingError, Result};
use crate::record::{FieldValue, Keys};

use super::functions;

/// The kind of value a predicate function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDomain {
    /// Any present value, through its canonical rendering.
    Any,
    /// Free text.
    Text,
    /// A set of strings.
    Set,
    /// Text or set; only the number of items matters.
    Collection,
    /// A number.
    Number,
    /// A (latitude, longitude) pair.
    LatLong,
}

impl ValueDomain {
    /// Human-readable name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueDomain::Any => "any",
            ValueDomain::Text => "text",
            ValueDomain::Set => "set",
            ValueDomain::Collection => "text or set",
            ValueDomain::Number => "number",
            ValueDomain::LatLong => "lat/long",
        }
    }
}

/// A key-generating function.
///
/// Each function has a stable name that identifies it in predicate names and
/// configuration files. The name never changes between releases, because
/// persisted blocking rules refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PredicateFunction {
    WholeField,
    TokenField,
    FirstToken,
    FirstTwoTokens,
    CommonInteger,
    AlphaNumeric,
    NearIntegers,
    HundredInteger,
    HundredIntegersOdd,
    FirstInteger,
    CommonTwoTokens,
    CommonThreeTokens,
    Fingerprint,
    OneGramFingerprint,
    TwoGramFingerprint,
    CommonFourGram,
    CommonSixGram,
    SameThreeCharStart,
    SameFiveCharStart,
    SameSevenCharStart,
    SuffixArray,
    SortedAcronym,
    DoubleMetaphone,
    MetaphoneToken,
    WholeSet,
    CommonSetElement,
    CommonTwoElements,
    CommonThreeElements,
    FirstSetElement,
    LastSetElement,
    MagnitudeOfCardinality,
    OrderOfMagnitude,
    RoundTo1,
    LatLongGrid,
}

impl PredicateFunction {
    /// Every function, in declaration order.
    pub const ALL: [PredicateFunction; 34] = [
        PredicateFunction::WholeField,
        PredicateFunction::TokenField,
        PredicateFunction::FirstToken,
        PredicateFunction::FirstTwoTokens,
        PredicateFunction::CommonInteger,
        PredicateFunction::AlphaNumeric,
        PredicateFunction::NearIntegers,
        PredicateFunction::HundredInteger,
        PredicateFunction::HundredIntegersOdd,
        PredicateFunction::FirstInteger,
        PredicateFunction::CommonTwoTokens,
        PredicateFunction::CommonThreeTokens,
        PredicateFunction::Fingerprint,
        PredicateFunction::OneGramFingerprint,
        PredicateFunction::TwoGramFingerprint,
        PredicateFunction::CommonFourGram,
        PredicateFunction::CommonSixGram,
        PredicateFunction::SameThreeCharStart,
        PredicateFunction::SameFiveCharStart,
        PredicateFunction::SameSevenCharStart,
        PredicateFunction::SuffixArray,
        PredicateFunction::SortedAcronym,
        PredicateFunction::DoubleMetaphone,
        PredicateFunction::MetaphoneToken,
        PredicateFunction::WholeSet,
        PredicateFunction::CommonSetElement,
        PredicateFunction::CommonTwoElements,
        PredicateFunction::CommonThreeElements,
        PredicateFunction::FirstSetElement,
        PredicateFunction::LastSetElement,
        PredicateFunction::MagnitudeOfCardinality,
        PredicateFunction::OrderOfMagnitude,
        PredicateFunction::RoundTo1,
        PredicateFunction::LatLongGrid,
    ];

    /// The stable identifier of this function.
    pub fn name(&self) -> &'static str {
        use PredicateFunction::*;
        match self {
            WholeField => "wholeFieldPredicate",
            TokenField => "tokenFieldPredicate",
            FirstToken => "firstTokenPredicate",
            FirstTwoTokens => "firstTwoTokensPredicate",
            CommonInteger => "commonIntegerPredicate",
            AlphaNumeric => "alphaNumericPredicate",
            NearIntegers => "nearIntegersPredicate",
            HundredInteger => "hundredIntegerPredicate",
            HundredIntegersOdd => "hundredIntegersOddPredicate",
            FirstInteger => "firstIntegerPredicate",
            CommonTwoTokens => "commonTwoTokens",
            CommonThreeTokens => "commonThreeTokens",
            Fingerprint => "fingerprint",
            OneGramFingerprint => "oneGramFingerprint",
            TwoGramFingerprint => "twoGramFingerprint",
            CommonFourGram => "commonFourGram",
            CommonSixGram => "commonSixGram",
            SameThreeCharStart => "sameThreeCharStartPredicate",
            SameFiveCharStart => "sameFiveCharStartPredicate",
            SameSevenCharStart => "sameSevenCharStartPredicate",
            SuffixArray => "suffixArray",
            SortedAcronym => "sortedAcronym",
            DoubleMetaphone => "doubleMetaphone",
            MetaphoneToken => "metaphoneToken",
            WholeSet => "wholeSetPredicate",
            CommonSetElement => "commonSetElementPredicate",
            CommonTwoElements => "commonTwoElementsPredicate",
            CommonThreeElements => "commonThreeElementsPredicate",
            FirstSetElement => "firstSetElementPredicate",
            LastSetElement => "lastSetElementPredicate",
            MagnitudeOfCardinality => "magnitudeOfCardinality",
            OrderOfMagnitude => "orderOfMagnitude",
            RoundTo1 => "roundTo1",
            LatLongGrid => "latLongGridPredicate",
        }
    }

    /// The kind of value this function accepts.
    pub fn domain(&self) -> ValueDomain {
        use PredicateFunction::*;
        match self {
            WholeField => ValueDomain::Any,
            WholeSet | CommonSetElement | CommonTwoElements | CommonThreeElements
            | FirstSetElement | LastSetElement => ValueDomain::Set,
            MagnitudeOfCardinality => ValueDomain::Collection,
            OrderOfMagnitude | RoundTo1 => ValueDomain::Number,
            LatLongGrid => ValueDomain::LatLong,
            _ => ValueDomain::Text,
        }
    }

    /// Apply the function to a field value.
    ///
    /// Absent values produce no keys. A present value outside the
    /// function's domain is an error.
    pub fn apply(&self, value: &FieldValue) -> Result<Keys> {
        if !value.is_present() {
            return Ok(Keys::new());
        }

        match (self.domain(), value) {
            (ValueDomain::Any, FieldValue::Text(s)) => Ok(functions::whole_field(s)),
            (ValueDomain::Any, other) => Ok(functions::whole_field(&other.render())),
            (ValueDomain::Text, FieldValue::Text(s)) => Ok(self.apply_text(s)),
            (ValueDomain::Set, FieldValue::Set(s)) => Ok(self.apply_set(s)),
            (ValueDomain::Collection, FieldValue::Set(s)) => {
                Ok(functions::magnitude_of_cardinality(s))
            }
            (ValueDomain::Collection, FieldValue::Text(s)) => {
                Ok(functions::magnitude_of_cardinality(s.chars()))
            }
            (ValueDomain::Number, FieldValue::Number(n)) => Ok(match self {
                PredicateFunction::RoundTo1 => functions::round_to_1(*n),
                _ => functions::order_of_magnitude(*n),
            }),
            (ValueDomain::LatLong, FieldValue::LatLong(lat, lng)) => {
                Ok(functions::lat_long_grid(*lat, *lng))
            }
            (domain, _) => Err(BlockingError::ValueType {
                predicate: self.name().to_string(),
                expected: domain.as_str(),
            }),
        }
    }

    fn apply_text(&self, value: &str) -> Keys {
        use PredicateFunction::*;
        match self {
            TokenField => functions::token_field(value),
            FirstToken => functions::first_token(value),
            FirstTwoTokens => functions::first_two_tokens(value),
            CommonInteger => functions::common_integer(value),
            AlphaNumeric => functions::alpha_numeric(value),
            NearIntegers => functions::near_integers(value),
            HundredInteger => functions::hundred_integer(value),
            HundredIntegersOdd => functions::hundred_integers_odd(value),
            FirstInteger => functions::first_integer(value),
            CommonTwoTokens => functions::common_two_tokens(value),
            CommonThreeTokens => functions::common_three_tokens(value),
            Fingerprint => functions::fingerprint(value),
            OneGramFingerprint => functions::one_gram_fingerprint(value),
            TwoGramFingerprint => functions::two_gram_fingerprint(value),
            CommonFourGram => functions::common_four_gram(value),
            CommonSixGram => functions::common_six_gram(value),
            SameThreeCharStart => functions::same_three_char_start(value),
            SameFiveCharStart => functions::same_five_char_start(value),
            SameSevenCharStart => functions::same_seven_char_start(value),
            SuffixArray => functions::suffix_array_keys(value),
            SortedAcronym => functions::sorted_acronym(value),
            DoubleMetaphone => functions::double_metaphone(value),
            MetaphoneToken => functions::metaphone_token(value),
            _ => functions::whole_field(value),
        }
    }

    fn apply_set(&self, value: &std::collections::BTreeSet<String>) -> Keys {
        use PredicateFunction::*;
        match self {
            CommonSetElement => functions::common_set_element(value),
            CommonTwoElements => functions::common_two_elements(value),
            CommonThreeElements => functions::common_three_elements(value),
            FirstSetElement => functions::first_set_element(value),
            LastSetElement => functions::last_set_element(value),
            _ => functions::whole_set(value),
        }
    }
}

impl fmt::Display for PredicateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PredicateFunction {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self> {
        PredicateFunction::ALL
            .iter()
            .copied()
            .find(|function| function.name() == s)
            .ok_or_else(|| BlockingError::Configuration(format!("unknown predicate function '{}'", s)))
    }
}

impl TryFrom<String> for PredicateFunction {
    type Error = BlockingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PredicateFunction> for String {
    fn from(function: PredicateFunction) -> Self {
        function.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let names: HashSet<&str> = PredicateFunction::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), PredicateFunction::ALL.len());

        for function in PredicateFunction::ALL {
            let parsed: PredicateFunction = function.name().parse().unwrap();
            assert_eq!(parsed, function);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "nopePredicate".parse::<PredicateFunction>().unwrap_err();
        assert!(matches!(err, BlockingError::Configuration(_)));
    }

    #[test]
    fn test_serde_uses_stable_name() {
        let json = serde_json::to_string(&PredicateFunction::SameFiveCharStart).unwrap();
        assert_eq!(json, "\"sameFiveCharStartPredicate\"");
        let back: PredicateFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PredicateFunction::SameFiveCharStart);
    }

    #[test]
    fn test_apply_by_domain() {
        let keys = PredicateFunction::WholeField.apply(&FieldValue::text("donald")).unwrap();
        assert!(keys.contains("donald"));

        let keys = PredicateFunction::WholeField.apply(&FieldValue::Number(3.0)).unwrap();
        assert!(keys.contains("3.0"));

        let keys = PredicateFunction::LatLongGrid
            .apply(&FieldValue::LatLong(1.11, 2.27))
            .unwrap();
        assert!(keys.contains("[1.1, 2.3]"));

        let keys = PredicateFunction::MagnitudeOfCardinality
            .apply(&FieldValue::set(["a", "b", "c"]))
            .unwrap();
        assert!(keys.contains("0"));
    }

    #[test]
    fn test_absent_values_produce_nothing() {
        for function in PredicateFunction::ALL {
            assert!(function.apply(&FieldValue::Missing).unwrap().is_empty());
            assert!(function.apply(&FieldValue::text("")).unwrap().is_empty());
        }
    }

    #[test]
    fn test_wrong_domain_is_an_error() {
        let err = PredicateFunction::TokenField
            .apply(&FieldValue::Number(1.0))
            .unwrap_err();
        match err {
            BlockingError::ValueType { predicate, expected } => {
                assert_eq!(predicate, "tokenFieldPredicate");
                assert_eq!(expected, "text");
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(PredicateFunction::WholeSet.apply(&FieldValue::text("x")).is_err());
        assert!(PredicateFunction::RoundTo1.apply(&FieldValue::text("12")).is_err());
    }
}
