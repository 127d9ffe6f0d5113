//! Variables reading one physical field.

use tracing::{debug, warn};

use crate::comparators::{Comparator, ComparatorRegistry};
use crate::error::{BlockingError, Result};
use crate::predicates::{index_predicates, ExistsPredicate, Predicate, SimplePredicate};
use crate::record::FieldValue;

use super::config::{FieldTypeConfig, ModelConfig};
use super::definition::{VariableDefinition, VariableType};

/// Simple predicates for every configured function plus the index grid.
pub(crate) fn field_predicates(field_index: usize, config: &FieldTypeConfig) -> Vec<Predicate> {
    let mut predicates: Vec<Predicate> = config
        .functions
        .iter()
        .map(|&function| SimplePredicate::new(function, field_index).into())
        .collect();

    predicates.extend(
        index_predicates(&config.index_kinds, &config.index_thresholds, field_index)
            .into_iter()
            .map(Predicate::from),
    );
    predicates
}

/// Append an exists predicate for `has_missing`, if the type allows it.
///
/// A refusal is not an error: the variable simply gets no exists predicate.
pub(crate) fn attach_missing_predicate(
    name: &str,
    field_index: Option<usize>,
    config: &FieldTypeConfig,
    predicates: &mut Vec<Predicate>,
) {
    match ExistsPredicate::try_new(field_index, config) {
        Ok(exists) => predicates.push(exists.into()),
        Err(e) => warn!(variable = name, error = %e, "missing-data predicate not attached"),
    }
}

/// A string, text, set, price, lat/long, exact or custom variable.
#[derive(Debug, Clone)]
pub struct FieldVariable {
    pub name: String,
    pub variable_type: VariableType,
    pub field_index: usize,
    pub has_missing: bool,
    pub predicates: Vec<Predicate>,
    pub comparator: Comparator,
    pub definition: VariableDefinition,
}

impl FieldVariable {
    /// Build a field variable from its definition.
    pub fn new(
        definition: &VariableDefinition,
        config: &ModelConfig,
        registry: &ComparatorRegistry,
    ) -> Result<Self> {
        let variable_type = definition.variable_type;
        let field_index = definition.require_field()?;
        let type_config = config.field_type(variable_type);

        let comparator = match variable_type {
            VariableType::String | VariableType::ShortString => Comparator::AffineGap,
            VariableType::Text => Comparator::Cosine,
            VariableType::Set => Comparator::Jaccard,
            VariableType::Price => Comparator::Price,
            VariableType::LatLong => Comparator::Haversine,
            VariableType::Exact => Comparator::Exact,
            VariableType::Custom => {
                let id = definition.comparator.as_deref().ok_or_else(|| {
                    BlockingError::Configuration(
                        "'Custom' variables must define a comparator".to_string(),
                    )
                })?;
                registry.get(id).ok_or_else(|| {
                    BlockingError::Configuration(format!(
                        "comparator '{}' is not registered (available: {})",
                        id,
                        registry.names().join(", ")
                    ))
                })?
            }
            other => {
                return Err(BlockingError::Configuration(format!(
                    "'{}' is not a field variable type",
                    other
                )));
            }
        };

        let name = match (&definition.variable_name, variable_type) {
            (Some(name), _) => name.clone(),
            (None, VariableType::Custom) => {
                format!("({}: {}, {})", field_index, variable_type, comparator.name())
            }
            (None, _) => format!("({}: {})", field_index, variable_type),
        };

        let mut predicates = field_predicates(field_index, type_config);
        if definition.has_missing {
            attach_missing_predicate(&name, Some(field_index), type_config, &mut predicates);
        }

        debug!(variable = %name, predicates = predicates.len(), "built field variable");

        Ok(Self {
            name,
            variable_type,
            field_index,
            has_missing: definition.has_missing,
            predicates,
            comparator,
            definition: definition.clone(),
        })
    }

    /// Compare this variable's field in two records.
    pub fn compare(&self, a: &[FieldValue], b: &[FieldValue]) -> f64 {
        match (a.get(self.field_index), b.get(self.field_index)) {
            (Some(x), Some(y)) => self.comparator.compare(x, y),
            _ => f64::NAN,
        }
    }
}
