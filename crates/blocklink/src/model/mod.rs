//! The data model: every variable of a linkage configuration, expanded.

mod featurizer;
mod persistence;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::comparators::ComparatorRegistry;
use crate::error::{BlockingError, Result};
use crate::predicates::Predicate;
use crate::record::FieldValue;
use crate::variables::{ModelConfig, Variable, VariableDefinition, VariableType};

use featurizer::Featurizer;

pub use persistence::{PersistedModel, FORMAT_VERSION};

/// A built and expanded set of variables.
///
/// Variables keep definition order. Interactions are expanded against the
/// complete model before it is handed out.
#[derive(Debug, Clone)]
pub struct DataModel {
    variables: IndexMap<String, Variable>,
    featurizer: Featurizer,
    config: ModelConfig,
    registry: ComparatorRegistry,
}

/// Builder for [`DataModel`].
#[derive(Debug, Default)]
pub struct DataModelBuilder {
    definitions: Vec<VariableDefinition>,
    config: Option<ModelConfig>,
    registry: Option<ComparatorRegistry>,
}

impl DataModelBuilder {
    pub fn definition(mut self, definition: VariableDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn definitions(mut self, definitions: impl IntoIterator<Item = VariableDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn registry(mut self, registry: ComparatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<DataModel> {
        let config = self.config.unwrap_or_default();
        let registry = self
            .registry
            .unwrap_or_else(ComparatorRegistry::with_builtins);

        let variables = self
            .definitions
            .iter()
            .map(|definition| Variable::from_definition(definition, &config, &registry))
            .collect::<Result<Vec<Variable>>>()?;

        DataModel::assemble(variables, config, registry)
    }
}

impl DataModel {
    /// Build a model with the default configuration and built-in comparators.
    pub fn new(definitions: &[VariableDefinition]) -> Result<Self> {
        Self::builder().definitions(definitions.iter().cloned()).build()
    }

    pub fn builder() -> DataModelBuilder {
        DataModelBuilder::default()
    }

    /// Index constructed variables by name and expand the interactions.
    pub(crate) fn assemble(
        constructed: Vec<Variable>,
        config: ModelConfig,
        registry: ComparatorRegistry,
    ) -> Result<Self> {
        let mut variables: IndexMap<String, Variable> = IndexMap::with_capacity(constructed.len());
        for variable in constructed {
            let name = variable.name().to_string();
            if variables.contains_key(&name) {
                return Err(BlockingError::Configuration(format!(
                    "duplicate variable name '{}'",
                    name
                )));
            }
            variables.insert(name, variable);
        }

        let snapshot = variables.clone();
        for variable in variables.values_mut() {
            if let Variable::Interaction(interaction) = variable {
                interaction.expand(&snapshot)?;
            }
        }

        let featurizer = Featurizer::new(&variables)?;
        debug!(
            variables = variables.len(),
            features = featurizer.names().len(),
            "assembled data model"
        );

        Ok(Self {
            variables,
            featurizer,
            config,
            registry,
        })
    }

    /// Variables in definition order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComparatorRegistry {
        &self.registry
    }

    /// Every predicate of every variable, in model order, without duplicates.
    pub fn predicates(&self) -> Vec<Predicate> {
        let unique: IndexSet<&Predicate> = self
            .variables
            .values()
            .flat_map(|variable| variable.predicates())
            .collect();
        unique.into_iter().cloned().collect()
    }

    /// Names of the feature-vector columns.
    pub fn feature_names(&self) -> &[String] {
        self.featurizer.names()
    }

    /// Feature vector comparing two records.
    pub fn distances(&self, a: &[FieldValue], b: &[FieldValue]) -> Vec<f64> {
        self.featurizer.distances(&self.variables, a, b)
    }

    /// The value kind each referenced field should be read as.
    ///
    /// Set, price and lat/long variables decide the kind of their field;
    /// every other field is read as text.
    pub fn field_kinds(&self) -> Vec<(usize, VariableType)> {
        let mut kinds: IndexMap<usize, VariableType> = IndexMap::new();
        for variable in self.variables.values() {
            let definition = variable.definition();
            let Some(field_index) = definition.field_index else {
                continue;
            };
            if !definition.variable_type.is_field() {
                continue;
            }
            let kind = match definition.variable_type {
                t @ (VariableType::Set | VariableType::Price | VariableType::LatLong) => t,
                _ => VariableType::Text,
            };
            let entry = kinds.entry(field_index).or_insert(kind);
            if *entry == VariableType::Text {
                *entry = kind;
            }
        }
        let mut kinds: Vec<(usize, VariableType)> = kinds.into_iter().collect();
        kinds.sort_by_key(|(index, _)| *index);
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::field(0, VariableType::String).with_variable_name("name"),
            VariableDefinition::field(1, VariableType::Price)
                .with_variable_name("price")
                .with_missing(true),
            VariableDefinition::interaction(["name", "price"]),
        ]
    }

    #[test]
    fn test_builds_and_expands() {
        let model = DataModel::new(&definitions()).unwrap();
        assert_eq!(model.len(), 3);

        let interaction = model.get("(Interaction: ['name', 'price'])").unwrap();
        match interaction {
            Variable::Interaction(v) => {
                assert!(v.has_missing);
                assert_eq!(v.higher_vars.len(), 1);
            }
            other => panic!("unexpected variable {}", other.name()),
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let defs = vec![
            VariableDefinition::field(0, VariableType::Text).with_variable_name("x"),
            VariableDefinition::field(1, VariableType::Exact).with_variable_name("x"),
        ];
        let err = DataModel::new(&defs).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_predicates_are_deduplicated() {
        let defs = vec![
            VariableDefinition::field(0, VariableType::Exact).with_variable_name("a"),
            VariableDefinition::field(0, VariableType::Exact).with_variable_name("b"),
        ];
        let model = DataModel::new(&defs).unwrap();
        assert_eq!(model.predicates().len(), 1);
    }

    #[test]
    fn test_feature_layout() {
        let model = DataModel::new(&definitions()).unwrap();
        assert_eq!(
            model.feature_names(),
            &[
                "name".to_string(),
                "price".to_string(),
                "(Interaction: ['name', 'price'])".to_string(),
                "(price: Not Missing)".to_string(),
                "((Interaction: ['name', 'price']): Not Missing)".to_string(),
            ]
        );
    }

    #[test]
    fn test_distances() {
        let model = DataModel::new(&definitions()).unwrap();
        let a = vec![FieldValue::text("ab"), FieldValue::Number(10.0)];
        let b = vec![FieldValue::text("ab"), FieldValue::Number(1000.0)];
        let features = model.distances(&a, &b);
        assert_eq!(features.len(), 5);
        assert_eq!(features[0], 0.5);
        assert_eq!(features[1], 2.0);
        assert_eq!(features[2], 1.0);
        assert_eq!(features[3], 1.0);
        assert_eq!(features[4], 1.0);

        let c = vec![FieldValue::text("ab"), FieldValue::Missing];
        let features = model.distances(&a, &c);
        assert_eq!(features[1], 0.0);
        assert_eq!(features[2], 0.0);
        assert_eq!(features[3], 0.0);
        assert_eq!(features[4], 0.0);
    }

    #[test]
    fn test_categorical_interaction_columns() {
        let defs = vec![
            VariableDefinition::field(0, VariableType::Categorical)
                .with_categories(["a", "b"])
                .with_variable_name("kind"),
            VariableDefinition::field(1, VariableType::Exact).with_variable_name("code"),
            VariableDefinition::interaction(["kind", "code"]),
        ];
        let model = DataModel::new(&defs).unwrap();
        // 2 dummies + code + 2 derived interactions
        assert_eq!(model.feature_names().len(), 5);

        let a = vec![FieldValue::text("b"), FieldValue::text("x")];
        let b = vec![FieldValue::text("b"), FieldValue::text("x")];
        assert_eq!(model.distances(&a, &b), vec![1.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_field_kinds() {
        let defs = vec![
            VariableDefinition::field(2, VariableType::Exists),
            VariableDefinition::field(2, VariableType::Set),
            VariableDefinition::field(0, VariableType::Text),
            VariableDefinition::field(1, VariableType::LatLong),
        ];
        let model = DataModel::new(&defs).unwrap();
        assert_eq!(
            model.field_kinds(),
            vec![
                (0, VariableType::Text),
                (1, VariableType::LatLong),
                (2, VariableType::Set),
            ]
        );
    }
}
