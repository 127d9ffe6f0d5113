//! Canonical text renderings for block keys and display names.
//!
//! Keys must be reproducible byte for byte, so values are rendered in the
//! literal form used by existing blocking indexes: `'quoted'` strings,
//! `['a', 'b']` lists, `{'a', 'b'}` sets and shortest round-trip floats
//! that always carry a decimal point.

use std::collections::BTreeSet;

/// Render a float in shortest round-trip form, e.g. `1.1`, `3.0`, `1e-05`.
pub fn float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent(value);
    }

    let shortest = format!("{}", value);
    if shortest.contains('.') {
        shortest
    } else {
        format!("{}.0", shortest)
    }
}

/// Exponent notation with at least two exponent digits, e.g. `1.5e-07`.
fn exponent(value: f64) -> String {
    let raw = format!("{:e}", value);
    let Some((mantissa, exp)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Round to one decimal place, ties to even on the exact binary value.
pub fn round_tenth(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Quote a string the way literal reprs do.
pub fn quoted(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render a list of strings, e.g. `['a', 'b']`.
pub fn list<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| quoted(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

/// Render a set of strings in sorted order, e.g. `{'a', 'b'}`.
pub fn set(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        return "set()".to_string();
    }
    let inner: Vec<String> = items.iter().map(|s| quoted(s)).collect();
    format!("{{{}}}", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float() {
        assert_eq!(float(1.1), "1.1");
        assert_eq!(float(2.0), "2.0");
        assert_eq!(float(-0.5), "-0.5");
        assert_eq!(float(0.0), "0.0");
        assert_eq!(float(0.00001), "1e-05");
        assert_eq!(float(1.5e20), "1.5e+20");
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(1.11), 1.1);
        assert_eq!(round_tenth(2.27), 2.3);
        assert_eq!(round_tenth(-1.19), -1.2);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted("i"), "'i'");
        assert_eq!(quoted("don't"), "\"don't\"");
        assert_eq!(quoted("a\nb"), "'a\\nb'");
    }

    #[test]
    fn test_list_and_set() {
        assert_eq!(list(&["a", "b"]), "['a', 'b']");
        let items: BTreeSet<String> = ["goofy".to_string()].into_iter().collect();
        assert_eq!(set(&items), "{'goofy'}");
        assert_eq!(set(&BTreeSet::new()), "set()");
    }
}
