//! Variable definitions and the typed variables built from them.

mod categorical;
mod config;
mod definition;
mod field;
mod interaction;
mod variable;

pub use categorical::{
    CategoricalExpandable, CategoricalVariable, DerivedVariable, ExistsVariable,
    MissingDataVariable,
};
pub use config::{
    FieldTypeConfig, ModelConfig, BASE_STRING_FUNCTIONS, DEFAULT_INDEX_THRESHOLDS,
    SHORT_STRING_FUNCTIONS,
};
pub use definition::{load_definitions, VariableDefinition, VariableType};
pub use field::FieldVariable;
pub use interaction::InteractionVariable;
pub use variable::{PersistedVariable, Variable};
