//! The closed set of variable kinds.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::comparators::ComparatorRegistry;
use crate::error::{BlockingError, Result};
use crate::predicates::Predicate;

use super::categorical::{
    CategoricalExpandable, CategoricalVariable, DerivedVariable, ExistsVariable,
    MissingDataVariable,
};
use super::config::ModelConfig;
use super::definition::{VariableDefinition, VariableType};
use super::field::FieldVariable;
use super::interaction::InteractionVariable;

/// A comparison variable.
///
/// Two variables are the same variable when their names are equal.
#[derive(Debug, Clone)]
pub enum Variable {
    Field(FieldVariable),
    Categorical(CategoricalVariable),
    Exists(ExistsVariable),
    MissingData(MissingDataVariable),
    Derived(DerivedVariable),
    Interaction(InteractionVariable),
}

impl Variable {
    /// Build the variable a definition describes.
    pub fn from_definition(
        definition: &VariableDefinition,
        config: &ModelConfig,
        registry: &ComparatorRegistry,
    ) -> Result<Self> {
        let variable = match definition.variable_type {
            VariableType::String
            | VariableType::ShortString
            | VariableType::Text
            | VariableType::Exact
            | VariableType::Set
            | VariableType::Price
            | VariableType::LatLong
            | VariableType::Custom => {
                Variable::Field(FieldVariable::new(definition, config, registry)?)
            }
            VariableType::Categorical => {
                Variable::Categorical(CategoricalVariable::new(definition, config)?)
            }
            VariableType::Exists => Variable::Exists(ExistsVariable::new(definition, config)?),
            VariableType::MissingData => {
                Variable::MissingData(MissingDataVariable::from_definition(definition)?)
            }
            VariableType::Derived | VariableType::Dummy => {
                Variable::Derived(DerivedVariable::new(definition)?)
            }
            VariableType::Interaction => {
                Variable::Interaction(InteractionVariable::new(definition)?)
            }
        };
        Ok(variable)
    }

    pub fn name(&self) -> &str {
        match self {
            Variable::Field(v) => &v.name,
            Variable::Categorical(v) => &v.name,
            Variable::Exists(v) => &v.name,
            Variable::MissingData(v) => &v.name,
            Variable::Derived(v) => &v.name,
            Variable::Interaction(v) => &v.name,
        }
    }

    pub fn has_missing(&self) -> bool {
        match self {
            Variable::Field(v) => v.has_missing,
            Variable::Categorical(v) => v.has_missing,
            Variable::Exists(v) => v.has_missing,
            Variable::MissingData(_) => false,
            Variable::Derived(v) => v.has_missing,
            Variable::Interaction(v) => v.has_missing,
        }
    }

    pub fn variable_type(&self) -> VariableType {
        self.definition().variable_type
    }

    /// Blocking predicates owned by this variable.
    pub fn predicates(&self) -> &[Predicate] {
        match self {
            Variable::Field(v) => &v.predicates,
            Variable::Categorical(v) => &v.predicates,
            Variable::Exists(v) => &v.predicates,
            Variable::MissingData(_) | Variable::Derived(_) | Variable::Interaction(_) => &[],
        }
    }

    pub fn definition(&self) -> &VariableDefinition {
        match self {
            Variable::Field(v) => &v.definition,
            Variable::Categorical(v) => &v.definition,
            Variable::Exists(v) => &v.definition,
            Variable::MissingData(v) => &v.definition,
            Variable::Derived(v) => &v.definition,
            Variable::Interaction(v) => &v.definition,
        }
    }

    /// The dummy decomposition, for variables that have one.
    pub fn as_expandable(&self) -> Option<&dyn CategoricalExpandable> {
        match self {
            Variable::Categorical(v) => Some(v),
            Variable::Exists(v) => Some(v),
            _ => None,
        }
    }

    /// The part of the variable that crosses a serialization boundary.
    pub fn persist(&self) -> PersistedVariable {
        PersistedVariable {
            name: self.name().to_string(),
            has_missing: self.has_missing(),
            definition: self.definition().clone(),
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

/// A stored variable: name, missing flag and the definition it came from.
///
/// Predicates are never stored; they are rebuilt from the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedVariable {
    pub name: String,
    pub has_missing: bool,
    pub definition: VariableDefinition,
}

impl PersistedVariable {
    /// Rebuild the live variable.
    ///
    /// Interactions come back unexpanded; the data model expands them again.
    pub fn rehydrate(
        &self,
        config: &ModelConfig,
        registry: &ComparatorRegistry,
    ) -> Result<Variable> {
        let variable = Variable::from_definition(&self.definition, config, registry)?;
        if variable.name() != self.name {
            return Err(BlockingError::Configuration(format!(
                "stored variable '{}' rebuilt as '{}'",
                self.name,
                variable.name()
            )));
        }
        Ok(variable)
    }
}
