//! Interaction variables and their expansion.
//!
//! An interaction is built from its definition alone. Expansion is a separate
//! step run once the whole model is known: nested interactions are flattened
//! to atomic fields and categorical members fan out into one derived
//! interaction per combination of levels.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{BlockingError, Result};
use crate::render;

use super::definition::VariableDefinition;
use super::variable::Variable;

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionVariable {
    pub name: String,
    /// Member names as configured.
    pub interactions: Vec<String>,
    /// Atomic member names; equal to `interactions` until expanded.
    pub interaction_fields: Vec<String>,
    pub has_missing: bool,
    /// Derived interactions, populated by expansion.
    pub higher_vars: Vec<InteractionVariable>,
    pub definition: VariableDefinition,
}

impl InteractionVariable {
    pub fn new(definition: &VariableDefinition) -> Result<Self> {
        let interactions = definition
            .interaction_variables
            .as_ref()
            .filter(|members| !members.is_empty())
            .cloned()
            .ok_or_else(|| {
                BlockingError::Configuration(format!(
                    "'interaction_variables' can not be empty for variable {} of type {}",
                    definition.name.as_deref().unwrap_or("<unnamed>"),
                    definition.variable_type
                ))
            })?;

        let name = definition
            .variable_name
            .clone()
            .unwrap_or_else(|| format!("(Interaction: {})", render::list(&interactions)));

        Ok(Self {
            name,
            interaction_fields: interactions.clone(),
            interactions,
            has_missing: definition.has_missing,
            higher_vars: Vec::new(),
            definition: definition.clone(),
        })
    }

    /// Flatten `names` into atomic field names, in traversal order.
    ///
    /// Unknown names are a lookup error; a name that re-enters its own
    /// expansion path is a cycle. Shared members are kept once per path.
    pub fn atomic_interactions(
        &self,
        names: &[String],
        model: &IndexMap<String, Variable>,
    ) -> Result<Vec<String>> {
        let mut path = vec![self.name.clone()];
        let mut atoms = Vec::new();
        flatten(names, model, &mut path, &mut atoms)?;
        Ok(atoms)
    }

    /// Flatten members, propagate `has_missing` and build the derived
    /// interactions.
    pub fn expand(&mut self, model: &IndexMap<String, Variable>) -> Result<()> {
        self.interaction_fields = self.atomic_interactions(&self.interactions, model)?;

        for field in &self.interaction_fields {
            if model.get(field).is_some_and(Variable::has_missing) {
                self.has_missing = true;
            }
        }

        self.categorical(model)
    }

    /// One derived interaction per combination of categorical levels.
    fn categorical(&mut self, model: &IndexMap<String, Variable>) -> Result<()> {
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut plain: Vec<String> = Vec::new();

        for field in &self.interaction_fields {
            match model.get(field).and_then(Variable::as_expandable) {
                Some(expandable) => levels.push(
                    expandable
                        .higher_vars()
                        .iter()
                        .map(|dummy| dummy.name.clone())
                        .collect(),
                ),
                None => plain.push(field.clone()),
            }
        }

        let mut higher_vars = Vec::new();
        for combo in cartesian_product(&levels) {
            let members: Vec<String> = combo.into_iter().chain(plain.iter().cloned()).collect();
            let definition = VariableDefinition {
                has_missing: self.has_missing,
                ..VariableDefinition::interaction(members)
            };
            higher_vars.push(InteractionVariable::new(&definition)?);
        }

        debug!(
            variable = %self.name,
            atoms = self.interaction_fields.len(),
            derived = higher_vars.len(),
            "expanded interaction"
        );
        self.higher_vars = higher_vars;
        Ok(())
    }
}

fn flatten(
    names: &[String],
    model: &IndexMap<String, Variable>,
    path: &mut Vec<String>,
    atoms: &mut Vec<String>,
) -> Result<()> {
    for name in names {
        let variable = model.get(name).ok_or_else(|| {
            BlockingError::Lookup(format!(
                "The interaction variable {} is not a named variable in the variable definition",
                name
            ))
        })?;

        match variable {
            Variable::Interaction(nested) => {
                if path.contains(name) {
                    let mut cycle = path.clone();
                    cycle.push(name.clone());
                    return Err(BlockingError::CyclicInteraction { path: cycle });
                }
                path.push(name.clone());
                flatten(&nested.interaction_fields, model, path, atoms)?;
                path.pop();
            }
            _ => atoms.push(name.clone()),
        }
    }
    Ok(())
}

/// Every combination taking one item from each list; one empty combination
/// when there are no lists.
fn cartesian_product(lists: &[Vec<String>]) -> Vec<Vec<String>> {
    lists.iter().fold(vec![Vec::new()], |combos, list| {
        combos
            .iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut combo = prefix.clone();
                    combo.push(item.clone());
                    combo
                })
            })
            .collect()
    })
}
