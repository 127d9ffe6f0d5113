//! Categorical, exists, derived and missing-data variables.
//!
//! Categorical and exists variables decompose into one dummy indicator per
//! non-baseline level. Interactions over them expand into one interaction per
//! combination of levels.

use tracing::debug;

use crate::comparators::CategoricalComparator;
use crate::error::{BlockingError, Result};
use crate::predicates::Predicate;
use crate::record::FieldValue;

use super::config::ModelConfig;
use super::definition::{VariableDefinition, VariableType};
use super::field::{attach_missing_predicate, field_predicates};

/// A variable that decomposes into dummy indicators.
pub trait CategoricalExpandable {
    /// One derived dummy variable per non-baseline level.
    fn higher_vars(&self) -> &[DerivedVariable];
}

/// A name-only wrapper around a derived feature.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedVariable {
    pub name: String,
    pub variable_type: VariableType,
    pub has_missing: bool,
    pub definition: VariableDefinition,
}

impl DerivedVariable {
    pub fn new(definition: &VariableDefinition) -> Result<Self> {
        let base = definition.require_name()?;
        Ok(Self {
            name: format!("({}: {})", base, definition.variable_type),
            variable_type: definition.variable_type,
            has_missing: definition.has_missing,
            definition: definition.clone(),
        })
    }

    /// A dummy indicator named after one category level.
    pub fn dummy(name: impl Into<String>) -> Self {
        let definition = VariableDefinition::synthetic(VariableType::Dummy).with_name(name);
        let base = definition.name.clone().unwrap_or_default();
        Self {
            name: format!("({}: {})", base, VariableType::Dummy),
            variable_type: VariableType::Dummy,
            has_missing: false,
            definition,
        }
    }
}

/// Indicator of whether another variable's field was present.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingDataVariable {
    pub name: String,
    pub definition: VariableDefinition,
}

impl MissingDataVariable {
    /// Indicator for the variable called `base`.
    pub fn new(base: &str) -> Self {
        Self {
            name: format!("({}: Not Missing)", base),
            definition: VariableDefinition::synthetic(VariableType::MissingData).with_name(base),
        }
    }

    pub fn from_definition(definition: &VariableDefinition) -> Result<Self> {
        let base = definition.require_name()?;
        Ok(Self {
            name: format!("({}: Not Missing)", base),
            definition: definition.clone(),
        })
    }
}

fn dummies(variable_name: &str, comparator: &CategoricalComparator) -> Vec<DerivedVariable> {
    comparator
        .dummy_names()
        .into_iter()
        .map(|level| DerivedVariable::dummy(format!("{}: {}", variable_name, level)))
        .collect()
}

/// A field compared by category level.
#[derive(Debug, Clone)]
pub struct CategoricalVariable {
    pub name: String,
    pub field_index: usize,
    pub has_missing: bool,
    pub predicates: Vec<Predicate>,
    pub comparator: CategoricalComparator,
    pub higher_vars: Vec<DerivedVariable>,
    pub definition: VariableDefinition,
}

impl CategoricalVariable {
    pub fn new(definition: &VariableDefinition, config: &ModelConfig) -> Result<Self> {
        let field_index = definition.require_field()?;
        let categories = definition
            .categories
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                BlockingError::Configuration(
                    "'Categorical' variables must define categories".to_string(),
                )
            })?;

        let name = definition
            .variable_name
            .clone()
            .unwrap_or_else(|| format!("({}: {})", field_index, VariableType::Categorical));

        let type_config = config.field_type(VariableType::Categorical);
        let mut predicates = field_predicates(field_index, type_config);
        if definition.has_missing {
            attach_missing_predicate(&name, Some(field_index), type_config, &mut predicates);
        }

        let comparator = CategoricalComparator::new(categories.iter().cloned());
        let higher_vars = dummies(&name, &comparator);
        debug!(variable = %name, levels = higher_vars.len(), "built categorical variable");

        Ok(Self {
            name,
            field_index,
            has_missing: definition.has_missing,
            predicates,
            comparator,
            higher_vars,
            definition: definition.clone(),
        })
    }

    /// Comparison vector; NaN everywhere when either value is absent.
    pub fn compare(&self, a: &[FieldValue], b: &[FieldValue]) -> Vec<f64> {
        match (a.get(self.field_index), b.get(self.field_index)) {
            (Some(x), Some(y)) if x.is_present() && y.is_present() => {
                self.comparator.compare(&x.render(), &y.render())
            }
            _ => vec![f64::NAN; self.comparator.dimension()],
        }
    }
}

impl CategoricalExpandable for CategoricalVariable {
    fn higher_vars(&self) -> &[DerivedVariable] {
        &self.higher_vars
    }
}

const ABSENT: &str = "0";
const PRESENT: &str = "1";

/// Compares whether a field is present in both records, one, or neither.
#[derive(Debug, Clone)]
pub struct ExistsVariable {
    pub name: String,
    pub field_index: usize,
    pub has_missing: bool,
    pub predicates: Vec<Predicate>,
    pub comparator: CategoricalComparator,
    pub higher_vars: Vec<DerivedVariable>,
    pub definition: VariableDefinition,
}

impl ExistsVariable {
    pub fn new(definition: &VariableDefinition, config: &ModelConfig) -> Result<Self> {
        let field_index = definition.require_field()?;
        let name = definition
            .variable_name
            .clone()
            .unwrap_or_else(|| format!("({}: {})", field_index, VariableType::Exists));

        let type_config = config.field_type(VariableType::Exists);
        let mut predicates = field_predicates(field_index, type_config);
        if definition.has_missing {
            attach_missing_predicate(&name, Some(field_index), type_config, &mut predicates);
        }

        let comparator = CategoricalComparator::new([ABSENT, PRESENT]);
        let higher_vars = dummies(&name, &comparator);

        Ok(Self {
            name,
            field_index,
            has_missing: definition.has_missing,
            predicates,
            comparator,
            higher_vars,
            definition: definition.clone(),
        })
    }

    /// `[both present, exactly one present]`.
    pub fn compare(&self, a: &[FieldValue], b: &[FieldValue]) -> Vec<f64> {
        let present = |record: &[FieldValue]| {
            record
                .get(self.field_index)
                .is_some_and(FieldValue::is_present)
        };
        let (x, y) = match (present(a), present(b)) {
            (true, true) => (PRESENT, PRESENT),
            (false, false) => (ABSENT, ABSENT),
            _ => (ABSENT, PRESENT),
        };
        self.comparator.compare(x, y)
    }
}

impl CategoricalExpandable for ExistsVariable {
    fn higher_vars(&self) -> &[DerivedVariable] {
        &self.higher_vars
    }
}
