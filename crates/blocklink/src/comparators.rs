//! Pair comparators exposed by field variables.
//!
//! Every comparator maps two field values to a distance. When either value is
//! absent the result is NaN; the data model turns that into a zero feature
//! plus a "not missing" indicator.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::record::FieldValue;

/// Signature of a user-supplied comparator.
pub type ComparatorFn = Arc<dyn Fn(&FieldValue, &FieldValue) -> f64 + Send + Sync>;

/// Weights for the affine gap distance.
#[derive(Debug, Clone, Copy)]
pub struct AffineGapWeights {
    pub matching: f64,
    pub mismatch: f64,
    pub gap: f64,
    pub space: f64,
    /// Scale applied to gaps at the end of the shorter string.
    pub abbreviation_scale: f64,
}

impl Default for AffineGapWeights {
    fn default() -> Self {
        Self {
            matching: 1.0,
            mismatch: 11.0,
            gap: 10.0,
            space: 7.0,
            abbreviation_scale: 0.125,
        }
    }
}

/// Affine gap edit distance between two strings.
///
/// Trailing gaps are discounted so that abbreviations score close to the
/// full form.
pub fn affine_gap_distance(a: &str, b: &str, weights: &AffineGapWeights) -> f64 {
    let mut s1: Vec<char> = a.chars().collect();
    let mut s2: Vec<char> = b.chars().collect();

    if s1 == s2 && weights.matching <= weights.mismatch.min(weights.gap).min(weights.space) {
        return weights.matching * s1.len() as f64;
    }
    if s1.len() < s2.len() {
        std::mem::swap(&mut s1, &mut s2);
    }

    let len1 = s1.len();
    let len2 = s2.len();
    let scale = weights.abbreviation_scale;

    let mut deletion = vec![f64::INFINITY; len1 + 1];
    let mut current = vec![0.0; len1 + 1];
    let mut previous = vec![0.0; len1 + 1];

    for (i, slot) in current.iter_mut().enumerate().skip(1) {
        *slot = weights.gap + weights.space * i as f64;
    }

    for j in 1..=len2 {
        let ch2 = s2[j - 1];
        previous.copy_from_slice(&current);
        current[0] = weights.gap + weights.space * j as f64;
        let mut insertion = f64::INFINITY;

        for i in 1..=len1 {
            insertion = if j == len2 {
                insertion.min(current[i - 1] + weights.gap * scale) + weights.space * scale
            } else {
                insertion.min(current[i - 1] + weights.gap) + weights.space
            };

            deletion[i] = if i == len1 {
                deletion[i].min(previous[i] + weights.gap * scale) + weights.space * scale
            } else {
                deletion[i].min(previous[i] + weights.gap) + weights.space
            };

            let substitution = if s1[i - 1] == ch2 {
                previous[i - 1] + weights.matching
            } else {
                previous[i - 1] + weights.mismatch
            };

            current[i] = insertion.min(deletion[i]).min(substitution);
        }
    }

    current[len1]
}

/// Affine gap distance divided by the combined length; NaN for two empty strings.
pub fn normalized_affine_gap_distance(a: &str, b: &str) -> f64 {
    let normalizer = (a.chars().count() + b.chars().count()) as f64;
    if normalizer == 0.0 {
        return f64::NAN;
    }
    affine_gap_distance(a, b, &AffineGapWeights::default()) / normalizer
}

/// One minus the cosine similarity of the two token bags.
pub fn cosine_distance(a: &str, b: &str) -> f64 {
    fn bag(s: &str) -> HashMap<&str, f64> {
        let mut counts = HashMap::new();
        for token in s.split_whitespace() {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }
        counts
    }

    let bag_a = bag(a);
    let bag_b = bag(b);
    let norm = |bag: &HashMap<&str, f64>| bag.values().map(|c| c * c).sum::<f64>().sqrt();
    let denominator = norm(&bag_a) * norm(&bag_b);
    if denominator == 0.0 {
        return f64::NAN;
    }

    let dot: f64 = bag_a
        .iter()
        .filter_map(|(token, count)| bag_b.get(token).map(|other| count * other))
        .sum();
    (1.0 - dot / denominator).max(0.0)
}

/// One minus the Jaccard index of two sets.
pub fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return f64::NAN;
    }
    let intersection = a.intersection(b).count();
    1.0 - intersection as f64 / union as f64
}

/// Absolute difference of base-10 logarithms; NaN unless both are positive.
pub fn price_distance(a: f64, b: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return f64::NAN;
    }
    (a.log10() - b.log10()).abs()
}

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance in kilometres.
pub fn haversine_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

fn as_token_set(value: &FieldValue) -> Option<BTreeSet<String>> {
    match value {
        FieldValue::Set(s) => Some(s.clone()),
        FieldValue::Text(s) => Some(s.split_whitespace().map(str::to_string).collect()),
        _ => None,
    }
}

/// The comparator of a field variable.
#[derive(Clone)]
pub enum Comparator {
    AffineGap,
    Cosine,
    Jaccard,
    Price,
    Haversine,
    Exact,
    Custom { name: String, function: ComparatorFn },
}

impl Comparator {
    /// Identifier of the comparator.
    pub fn name(&self) -> &str {
        match self {
            Comparator::AffineGap => "affineGap",
            Comparator::Cosine => "cosine",
            Comparator::Jaccard => "jaccard",
            Comparator::Price => "price",
            Comparator::Haversine => "haversine",
            Comparator::Exact => "exact",
            Comparator::Custom { name, .. } => name,
        }
    }

    /// Distance between two field values.
    pub fn compare(&self, a: &FieldValue, b: &FieldValue) -> f64 {
        if !a.is_present() || !b.is_present() {
            return f64::NAN;
        }

        match self {
            Comparator::AffineGap => normalized_affine_gap_distance(&a.render(), &b.render()),
            Comparator::Cosine => cosine_distance(&a.render(), &b.render()),
            Comparator::Jaccard => match (as_token_set(a), as_token_set(b)) {
                (Some(x), Some(y)) => jaccard_distance(&x, &y),
                _ => f64::NAN,
            },
            Comparator::Price => match (a, b) {
                (FieldValue::Number(x), FieldValue::Number(y)) => price_distance(*x, *y),
                _ => f64::NAN,
            },
            Comparator::Haversine => match (a, b) {
                (FieldValue::LatLong(x1, y1), FieldValue::LatLong(x2, y2)) => {
                    haversine_distance((*x1, *y1), (*x2, *y2))
                }
                _ => f64::NAN,
            },
            Comparator::Exact => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            Comparator::Custom { function, .. } => function(a, b),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparator({})", self.name())
    }
}

/// Named comparators available to `Custom` variables.
#[derive(Clone, Default)]
pub struct ComparatorRegistry {
    comparators: HashMap<String, ComparatorFn>,
}

impl ComparatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in distances under their names.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in [
            Comparator::AffineGap,
            Comparator::Cosine,
            Comparator::Jaccard,
            Comparator::Price,
            Comparator::Haversine,
            Comparator::Exact,
        ] {
            let name = builtin.name().to_string();
            registry.comparators.insert(
                name,
                Arc::new(move |a: &FieldValue, b: &FieldValue| builtin.compare(a, b)),
            );
        }
        registry
    }

    /// Register a comparator under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&FieldValue, &FieldValue) -> f64 + Send + Sync + 'static,
    {
        self.comparators.insert(name.into(), Arc::new(function));
        self
    }

    /// Resolve a comparator by name.
    pub fn get(&self, name: &str) -> Option<Comparator> {
        self.comparators.get(name).map(|function| Comparator::Custom {
            name: name.to_string(),
            function: Arc::clone(function),
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.comparators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ComparatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorRegistry")
            .field("comparators", &self.names())
            .finish()
    }
}

/// One-hot comparison of categorical values.
///
/// Every unordered pair of categories gets one slot: same-category pairs in
/// category order, then the cross pairs. The first slot is the baseline and
/// is dropped from the output vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalComparator {
    categories: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl CategoricalComparator {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let mut pairs: Vec<(String, String)> =
            categories.iter().map(|c| (c.clone(), c.clone())).collect();
        for (i, first) in categories.iter().enumerate() {
            for second in &categories[i + 1..] {
                pairs.push((first.clone(), second.clone()));
            }
        }
        Self { categories, pairs }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Length of the comparison vector.
    pub fn dimension(&self) -> usize {
        self.pairs.len().saturating_sub(1)
    }

    /// Display names of the non-baseline pairs, e.g. `('a', 'b')`.
    pub fn dummy_names(&self) -> Vec<String> {
        self.pairs
            .iter()
            .skip(1)
            .map(|(a, b)| {
                format!(
                    "({}, {})",
                    crate::render::quoted(a),
                    crate::render::quoted(b)
                )
            })
            .collect()
    }

    /// One-hot vector for the pair; NaN everywhere for unknown categories.
    pub fn compare(&self, a: &str, b: &str) -> Vec<f64> {
        let position = self
            .pairs
            .iter()
            .position(|(x, y)| (x == a && y == b) || (x == b && y == a));

        match position {
            Some(slot) => {
                let mut vector = vec![0.0; self.dimension()];
                if slot > 0 {
                    vector[slot - 1] = 1.0;
                }
                vector
            }
            None => vec![f64::NAN; self.dimension()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_affine_gap_identical() {
        let weights = AffineGapWeights::default();
        assert_eq!(affine_gap_distance("abc", "abc", &weights), 3.0);
        assert!(approx(normalized_affine_gap_distance("abc", "abc"), 0.5));
    }

    #[test]
    fn test_affine_gap_orders_similarity() {
        let close = normalized_affine_gap_distance("donald", "donalt");
        let far = normalized_affine_gap_distance("donald", "goofy");
        assert!(close < far);

        // Symmetric
        let ab = normalized_affine_gap_distance("chicago", "chgo");
        let ba = normalized_affine_gap_distance("chgo", "chicago");
        assert!(approx(ab, ba));
        assert!(normalized_affine_gap_distance("", "").is_nan());
    }

    #[test]
    fn test_cosine_and_jaccard() {
        assert!(approx(cosine_distance("a b", "a b"), 0.0));
        assert!(approx(cosine_distance("a", "b"), 1.0));

        let x: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let y: BTreeSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(approx(jaccard_distance(&x, &y), 1.0 - 1.0 / 3.0));
    }

    #[test]
    fn test_price_and_haversine() {
        assert!(approx(price_distance(10.0, 1000.0), 2.0));
        assert!(price_distance(0.0, 5.0).is_nan());

        assert!(approx(haversine_distance((1.0, 2.0), (1.0, 2.0)), 0.0));
        let d = haversine_distance((0.0, 0.0), (0.0, 1.0));
        assert!((d - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_comparator_missing_is_nan() {
        let c = Comparator::Exact;
        assert!(c.compare(&FieldValue::Missing, &FieldValue::text("a")).is_nan());
        assert_eq!(c.compare(&FieldValue::text("a"), &FieldValue::text("a")), 1.0);
        assert_eq!(c.compare(&FieldValue::text("a"), &FieldValue::text("b")), 0.0);
    }

    #[test]
    fn test_registry() {
        let mut registry = ComparatorRegistry::with_builtins();
        registry.register("len_diff", |a: &FieldValue, b: &FieldValue| {
            (a.render().len() as f64 - b.render().len() as f64).abs()
        });

        let custom = registry.get("len_diff").unwrap();
        assert_eq!(custom.name(), "len_diff");
        assert_eq!(
            custom.compare(&FieldValue::text("abc"), &FieldValue::text("a")),
            2.0
        );
        assert!(registry.get("jaccard").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_categorical_vector() {
        let c = CategoricalComparator::new(["a", "b", "c"]);
        // aa, bb, cc, ab, ac, bc with aa as baseline
        assert_eq!(c.dimension(), 5);
        assert_eq!(c.compare("a", "a"), vec![0.0; 5]);
        assert_eq!(c.compare("b", "b"), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(c.compare("c", "a"), vec![0.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(c.compare("a", "z").iter().all(|v| v.is_nan()));
        assert_eq!(c.dummy_names()[0], "('b', 'b')");
    }
}
