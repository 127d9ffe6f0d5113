//! Key-generating functions used by simple predicates.
//!
//! Every function is pure: the same input always yields the same key set.
//! Functions are grouped by the kind of value they accept.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::Keys;
use crate::render;

use super::phonetic;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w']+").unwrap());
static START_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w']+").unwrap());
static TWO_START_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w']+\W+[\w']+").unwrap());
static INTEGERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static START_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());
static ALNUM_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

fn single(key: impl Into<String>) -> Keys {
    let mut keys = Keys::new();
    keys.insert(key.into());
    keys
}

fn from_iter<I, S>(keys: I) -> Keys
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

/// Characters of a value with all whitespace removed.
fn compact(value: &str) -> Vec<char> {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// TEXT FUNCTIONS
// =============================================================================

/// The whole value as the sole key.
pub fn whole_field(value: &str) -> Keys {
    single(value)
}

/// Distinct word tokens.
pub fn token_field(value: &str) -> Keys {
    from_iter(WORDS.find_iter(value).map(|m| m.as_str()))
}

/// The leading word token, if the value starts with one.
pub fn first_token(value: &str) -> Keys {
    from_iter(START_WORD.find(value).map(|m| m.as_str()))
}

/// The first two word tokens together with their original separator.
pub fn first_two_tokens(value: &str) -> Keys {
    from_iter(TWO_START_WORDS.find(value).map(|m| m.as_str()))
}

/// Digit runs with leading zeros stripped.
pub fn common_integer(value: &str) -> Keys {
    from_iter(INTEGERS.find_iter(value).map(|m| normalize_integer(m.as_str())))
}

/// Alphanumeric runs that mix letters and digits.
pub fn alpha_numeric(value: &str) -> Keys {
    from_iter(ALNUM_RUNS.find_iter(value).map(|m| m.as_str()).filter(|run| {
        run.bytes().any(|b| b.is_ascii_digit()) && run.bytes().any(|b| b.is_ascii_alphabetic())
    }))
}

/// Every integer in the value together with its neighbours.
pub fn near_integers(value: &str) -> Keys {
    let mut keys = Keys::new();
    for m in INTEGERS.find_iter(value) {
        let n = normalize_integer(m.as_str());
        keys.insert(decrement(n));
        keys.insert(increment(n));
        keys.insert(n.to_string());
    }
    keys
}

/// Every integer rounded down to its hundreds.
pub fn hundred_integer(value: &str) -> Keys {
    from_iter(
        INTEGERS
            .find_iter(value)
            .map(|m| format!("{}00", hundreds_prefix(normalize_integer(m.as_str())))),
    )
}

/// Every integer rounded down to its hundreds, keeping its parity.
pub fn hundred_integers_odd(value: &str) -> Keys {
    from_iter(INTEGERS.find_iter(value).map(|m| {
        let n = normalize_integer(m.as_str());
        let parity = n.bytes().last().map(|b| (b - b'0') % 2).unwrap_or(0);
        format!("{}0{}", hundreds_prefix(n), parity)
    }))
}

/// The leading digit run, verbatim.
pub fn first_integer(value: &str) -> Keys {
    from_iter(START_INTEGER.find(value).map(|m| m.as_str()))
}

/// Every window of two whitespace tokens.
pub fn common_two_tokens(value: &str) -> Keys {
    token_windows(value, 2)
}

/// Every window of three whitespace tokens.
pub fn common_three_tokens(value: &str) -> Keys {
    token_windows(value, 3)
}

fn token_windows(value: &str, n: usize) -> Keys {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    from_iter(tokens.windows(n).map(|w| w.join(" ")))
}

/// Sorted distinct tokens, concatenated.
pub fn fingerprint(value: &str) -> Keys {
    let tokens: BTreeSet<&str> = value.split_whitespace().collect();
    let joined: String = tokens.into_iter().collect();
    single(joined.trim())
}

/// Sorted distinct characters, ignoring whitespace.
pub fn one_gram_fingerprint(value: &str) -> Keys {
    let grams: BTreeSet<char> = compact(value).into_iter().collect();
    single(grams.into_iter().collect::<String>())
}

/// Sorted distinct character bigrams, ignoring whitespace.
///
/// Fewer than two non-whitespace characters yield no key, never `""`.
pub fn two_gram_fingerprint(value: &str) -> Keys {
    let chars = compact(value);
    if chars.len() < 2 {
        return Keys::new();
    }
    let grams: BTreeSet<String> = chars.windows(2).map(|w| w.iter().collect()).collect();
    single(grams.into_iter().collect::<String>())
}

/// Every four-character window, ignoring whitespace.
pub fn common_four_gram(value: &str) -> Keys {
    char_ngrams(value, 4)
}

/// Every six-character window, ignoring whitespace.
pub fn common_six_gram(value: &str) -> Keys {
    char_ngrams(value, 6)
}

fn char_ngrams(value: &str, n: usize) -> Keys {
    from_iter(compact(value).windows(n).map(|w| w.iter().collect::<String>()))
}

/// The first `n` non-whitespace characters.
pub fn initials(value: &str, n: usize) -> Keys {
    single(compact(value).into_iter().take(n).collect::<String>())
}

/// The first three non-whitespace characters.
pub fn same_three_char_start(value: &str) -> Keys {
    initials(value, 3)
}

/// The first five non-whitespace characters.
pub fn same_five_char_start(value: &str) -> Keys {
    initials(value, 5)
}

/// The first seven non-whitespace characters.
pub fn same_seven_char_start(value: &str) -> Keys {
    initials(value, 7)
}

/// Suffixes of a value, longest first, down to five characters.
///
/// The iterator is lazy and cloning it restarts the sequence.
#[derive(Debug, Clone)]
pub struct SuffixArray<'a> {
    rest: &'a str,
    remaining: usize,
}

/// Minimum suffix length produced by [`suffix_array`].
pub const MIN_SUFFIX_LEN: usize = 5;

/// Iterate the suffixes of `value`.
pub fn suffix_array(value: &str) -> SuffixArray<'_> {
    let len = value.chars().count();
    SuffixArray {
        rest: value,
        remaining: (len + 1).saturating_sub(MIN_SUFFIX_LEN),
    }
}

impl<'a> Iterator for SuffixArray<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let suffix = self.rest;
        let mut chars = self.rest.chars();
        chars.next();
        self.rest = chars.as_str();
        self.remaining -= 1;
        Some(suffix)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SuffixArray<'_> {}

/// All suffixes as a key set.
pub fn suffix_array_keys(value: &str) -> Keys {
    from_iter(suffix_array(value))
}

/// Sorted first characters of each token.
pub fn sorted_acronym(value: &str) -> Keys {
    let mut initials: Vec<char> = value
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .collect();
    initials.sort_unstable();
    single(initials.into_iter().collect::<String>())
}

/// Non-empty Double Metaphone codes of the whole value.
pub fn double_metaphone(value: &str) -> Keys {
    let (primary, secondary) = phonetic::double_metaphone(value);
    from_iter([primary, secondary].into_iter().filter(|code| !code.is_empty()))
}

/// Non-empty Double Metaphone codes of every distinct token.
pub fn metaphone_token(value: &str) -> Keys {
    let tokens: BTreeSet<&str> = value.split_whitespace().collect();
    tokens.into_iter().flat_map(double_metaphone).collect()
}

// =============================================================================
// INTEGER STRINGS
// =============================================================================

fn normalize_integer(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

fn hundreds_prefix(n: &str) -> &str {
    &n[..n.len().saturating_sub(2)]
}

/// Add one to a normalized decimal string.
fn increment(n: &str) -> String {
    let mut digits: Vec<u8> = n.bytes().collect();
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return String::from_utf8_lossy(&digits).into_owned();
        }
    }
    let mut out = String::with_capacity(digits.len() + 1);
    out.push('1');
    out.push_str(&String::from_utf8_lossy(&digits));
    out
}

/// Subtract one from a normalized decimal string; zero goes to `-1`.
fn decrement(n: &str) -> String {
    if n == "0" {
        return "-1".to_string();
    }
    let mut digits: Vec<u8> = n.bytes().collect();
    for d in digits.iter_mut().rev() {
        if *d == b'0' {
            *d = b'9';
        } else {
            *d -= 1;
            break;
        }
    }
    let out = String::from_utf8_lossy(&digits).into_owned();
    normalize_integer(&out).to_string()
}

// =============================================================================
// SET FUNCTIONS
// =============================================================================

/// The canonical rendering of the whole set.
pub fn whole_set(value: &BTreeSet<String>) -> Keys {
    single(render::set(value))
}

/// Every element of the set.
pub fn common_set_element(value: &BTreeSet<String>) -> Keys {
    value.iter().cloned().collect()
}

/// Adjacent pairs of sorted elements.
pub fn common_two_elements(value: &BTreeSet<String>) -> Keys {
    element_windows(value, 2)
}

/// Adjacent triples of sorted elements.
pub fn common_three_elements(value: &BTreeSet<String>) -> Keys {
    element_windows(value, 3)
}

fn element_windows(value: &BTreeSet<String>, n: usize) -> Keys {
    let sorted: Vec<&str> = value.iter().map(String::as_str).collect();
    from_iter(sorted.windows(n).map(|w| w.join(" ")))
}

/// The smallest element.
pub fn first_set_element(value: &BTreeSet<String>) -> Keys {
    from_iter(value.first().cloned())
}

/// The largest element.
pub fn last_set_element(value: &BTreeSet<String>) -> Keys {
    from_iter(value.last().cloned())
}

/// Rounded order of magnitude of a collection's size; nothing when empty.
pub fn magnitude_of_cardinality<I: IntoIterator>(items: I) -> Keys {
    order_of_magnitude(items.into_iter().count() as f64)
}

// =============================================================================
// NUMERIC FUNCTIONS
// =============================================================================

/// Rounded base-10 logarithm; nothing for non-positive values.
pub fn order_of_magnitude(value: f64) -> Keys {
    if value > 0.0 {
        single((value.log10().round_ties_even() as i64).to_string())
    } else {
        Keys::new()
    }
}

/// The value rounded to one significant figure, truncated to an integer.
pub fn round_to_1(value: f64) -> Keys {
    let magnitude = value.abs();
    let order = if magnitude > 0.0 {
        magnitude.log10().floor() as i32
    } else {
        0
    };
    let scale = 10f64.powi(order);
    let rounded = (magnitude / scale).round_ties_even() * scale;
    single((rounded.copysign(value).trunc() as i64).to_string())
}

/// A grid cell of one decimal degree, e.g. `[1.1, 2.3]`.
pub fn lat_long_grid(lat: f64, lng: f64) -> Keys {
    if lat == 0.0 && lng == 0.0 {
        return Keys::new();
    }
    single(format!(
        "[{}, {}]",
        render::float(render::round_tenth(lat)),
        render::float(render::round_tenth(lng))
    ))
}
