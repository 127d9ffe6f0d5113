//! Variable definitions as produced by the configuration layer.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BlockingError, Result};

/// Type tag of a variable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableType {
    String,
    #[serde(alias = "short_string", alias = "Short String")]
    ShortString,
    Text,
    Exact,
    Set,
    Price,
    #[serde(alias = "lat_long", alias = "Lat Long")]
    LatLong,
    Categorical,
    Exists,
    Custom,
    #[serde(alias = "__interaction__")]
    Interaction,
    Derived,
    Dummy,
    #[serde(alias = "missing_data", alias = "Missing Data")]
    MissingData,
}

impl VariableType {
    /// Canonical tag as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "String",
            VariableType::ShortString => "ShortString",
            VariableType::Text => "Text",
            VariableType::Exact => "Exact",
            VariableType::Set => "Set",
            VariableType::Price => "Price",
            VariableType::LatLong => "LatLong",
            VariableType::Categorical => "Categorical",
            VariableType::Exists => "Exists",
            VariableType::Custom => "Custom",
            VariableType::Interaction => "Interaction",
            VariableType::Derived => "Derived",
            VariableType::Dummy => "Dummy",
            VariableType::MissingData => "MissingData",
        }
    }

    /// Returns true for types that read one physical field.
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            VariableType::String
                | VariableType::ShortString
                | VariableType::Text
                | VariableType::Exact
                | VariableType::Set
                | VariableType::Price
                | VariableType::LatLong
                | VariableType::Categorical
                | VariableType::Exists
                | VariableType::Custom
        )
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comparison slot of a record-linkage model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Index of the record field this variable reads.
    #[serde(default, alias = "field", skip_serializing_if = "Option::is_none")]
    pub field_index: Option<usize>,

    /// Type tag selecting the variable kind.
    #[serde(rename = "type")]
    pub variable_type: VariableType,

    /// Ordered category levels for categorical variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Identifier of a registered comparator, required for `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,

    #[serde(default, alias = "has missing")]
    pub has_missing: bool,

    /// Names of the variables combined by an interaction.
    #[serde(
        default,
        alias = "interaction variables",
        skip_serializing_if = "Option::is_none"
    )]
    pub interaction_variables: Option<Vec<String>>,

    /// Base name of a derived variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Display name overriding the generated one.
    #[serde(default, alias = "variable name", skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,

    #[serde(default, alias = "other fields", skip_serializing_if = "Option::is_none")]
    pub other_fields: Option<Vec<usize>>,
}

impl VariableDefinition {
    /// A definition for a field-reading variable.
    pub fn field(field_index: usize, variable_type: VariableType) -> Self {
        Self {
            field_index: Some(field_index),
            ..Self::synthetic(variable_type)
        }
    }

    /// A definition with no physical field.
    pub fn synthetic(variable_type: VariableType) -> Self {
        Self {
            field_index: None,
            variable_type,
            categories: None,
            comparator: None,
            has_missing: false,
            interaction_variables: None,
            name: None,
            variable_name: None,
            other_fields: None,
        }
    }

    /// An interaction over the named variables.
    pub fn interaction<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interaction_variables: Some(names.into_iter().map(Into::into).collect()),
            ..Self::synthetic(VariableType::Interaction)
        }
    }

    pub fn with_missing(mut self, has_missing: bool) -> Self {
        self.has_missing = has_missing;
        self
    }

    pub fn with_variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_comparator(mut self, comparator: impl Into<String>) -> Self {
        self.comparator = Some(comparator.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Field index, required for field-reading types.
    pub(crate) fn require_field(&self) -> Result<usize> {
        self.field_index.ok_or_else(|| {
            BlockingError::Configuration(format!(
                "'{}' variables need a field index",
                self.variable_type
            ))
        })
    }

    /// Base name, required for derived and missing-data types.
    pub(crate) fn require_name(&self) -> Result<&str> {
        self.name.as_deref().ok_or_else(|| {
            BlockingError::Configuration(format!(
                "'{}' variables need a name",
                self.variable_type
            ))
        })
    }
}

/// Load a JSON array of variable definitions.
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<VariableDefinition>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BlockingError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let definitions = serde_json::from_reader(BufReader::new(file))?;
    Ok(definitions)
}
