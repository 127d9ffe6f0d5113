//! Fuzz target for the Double Metaphone encoder.

#![no_main]

use libfuzzer_sys::fuzz_target;

use blocklink::predicates::phonetic::double_metaphone;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let (primary, secondary) = double_metaphone(&input);
    assert!(primary.chars().count() <= 4);
    assert!(secondary.chars().count() <= 4);
});
