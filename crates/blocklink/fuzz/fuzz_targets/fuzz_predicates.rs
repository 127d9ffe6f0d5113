//! Fuzz target for the predicate functions.
//!
//! Every function must accept any value of its domain without panicking,
//! and produce the same keys twice.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use blocklink::{FieldValue, PredicateFunction};

#[derive(Debug, Arbitrary)]
enum Input {
    Text(String),
    Set(Vec<String>),
    Number(f64),
    LatLong(f64, f64),
}

fuzz_target!(|input: Input| {
    let value = match input {
        Input::Text(s) => FieldValue::text(s),
        Input::Set(items) => FieldValue::set(items),
        Input::Number(n) => FieldValue::Number(n),
        Input::LatLong(lat, lng) => FieldValue::LatLong(lat, lng),
    };

    for function in PredicateFunction::ALL {
        // Out-of-domain values are an error, never a panic
        if let Ok(keys) = function.apply(&value) {
            assert_eq!(function.apply(&value).ok(), Some(keys));
        }
    }
});
