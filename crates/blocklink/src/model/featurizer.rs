//! Feature-vector layout of a data model.

use std::collections::HashMap;
use std::ops::Range;

use indexmap::IndexMap;

use crate::error::{BlockingError, Result};
use crate::record::FieldValue;
use crate::variables::{MissingDataVariable, Variable};

/// Column layout computed once from an expanded model.
///
/// Columns are, in order: one per primary variable (one per dummy for
/// categorical and exists variables), one per derived interaction, and one
/// "not missing" indicator per variable declaring `has_missing`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Featurizer {
    names: Vec<String>,
    interactions: Vec<Vec<usize>>,
    missing: Vec<Range<usize>>,
}

impl Featurizer {
    pub(crate) fn new(variables: &IndexMap<String, Variable>) -> Result<Self> {
        let mut names = Vec::new();
        let mut columns: HashMap<String, usize> = HashMap::new();
        let mut missing_sources: Vec<(String, Range<usize>)> = Vec::new();

        for variable in variables.values() {
            let start = names.len();
            let column_names: Vec<&str> = match variable {
                Variable::Field(v) => vec![v.name.as_str()],
                Variable::Categorical(v) => v.higher_vars.iter().map(|d| d.name.as_str()).collect(),
                Variable::Exists(v) => v.higher_vars.iter().map(|d| d.name.as_str()).collect(),
                _ => continue,
            };
            for name in column_names {
                columns.insert(name.to_string(), names.len());
                names.push(name.to_string());
            }
            if variable.has_missing() {
                missing_sources.push((variable.name().to_string(), start..names.len()));
            }
        }

        let mut interactions = Vec::new();
        for variable in variables.values() {
            let Variable::Interaction(parent) = variable else {
                continue;
            };
            for derived in &parent.higher_vars {
                let members = derived
                    .interactions
                    .iter()
                    .map(|member| {
                        columns.get(member).copied().ok_or_else(|| {
                            BlockingError::Lookup(format!(
                                "interaction {} refers to {}, which has no comparison column",
                                derived.name, member
                            ))
                        })
                    })
                    .collect::<Result<Vec<usize>>>()?;

                let column = names.len();
                names.push(derived.name.clone());
                interactions.push(members);
                if derived.has_missing {
                    missing_sources.push((derived.name.clone(), column..column + 1));
                }
            }
        }

        let mut missing = Vec::new();
        for (source, range) in missing_sources {
            names.push(MissingDataVariable::new(&source).name);
            missing.push(range);
        }

        Ok(Self {
            names,
            interactions,
            missing,
        })
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn distances(
        &self,
        variables: &IndexMap<String, Variable>,
        a: &[FieldValue],
        b: &[FieldValue],
    ) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.names.len());

        for variable in variables.values() {
            match variable {
                Variable::Field(v) => features.push(v.compare(a, b)),
                Variable::Categorical(v) => features.extend(v.compare(a, b)),
                Variable::Exists(v) => features.extend(v.compare(a, b)),
                _ => {}
            }
        }

        for members in &self.interactions {
            let value: f64 = members.iter().map(|&column| features[column]).product();
            features.push(value);
        }

        for range in &self.missing {
            let present = features[range.clone()].iter().any(|x| !x.is_nan());
            features.push(if present { 1.0 } else { 0.0 });
        }

        for value in features.iter_mut() {
            if value.is_nan() {
                *value = 0.0;
            }
        }
        features
    }
}
