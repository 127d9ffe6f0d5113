//! Persistence for data models - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comparators::ComparatorRegistry;
use crate::error::{BlockingError, Result};
use crate::variables::{ModelConfig, PersistedVariable, Variable};

use super::DataModel;

/// Current persisted model format version.
pub const FORMAT_VERSION: u32 = 1;

/// The stored form of a data model.
///
/// Only names, missing flags and definitions are kept. Predicates and
/// expansions are rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedModel {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub variables: Vec<PersistedVariable>,
}

impl PersistedModel {
    /// Rebuild the live model.
    pub fn rehydrate(&self, config: ModelConfig, registry: ComparatorRegistry) -> Result<DataModel> {
        if self.format_version != FORMAT_VERSION {
            return Err(BlockingError::Configuration(format!(
                "unsupported model format version {}",
                self.format_version
            )));
        }

        let variables = self
            .variables
            .iter()
            .map(|stored| stored.rehydrate(&config, &registry))
            .collect::<Result<Vec<Variable>>>()?;

        let model = DataModel::assemble(variables, config, registry)?;

        for stored in &self.variables {
            let live = model.get(&stored.name).map(Variable::has_missing);
            if live != Some(stored.has_missing) {
                return Err(BlockingError::Configuration(format!(
                    "stored variable '{}' no longer matches its definition",
                    stored.name
                )));
            }
        }
        Ok(model)
    }

    /// Save to a JSON file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| BlockingError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| BlockingError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BlockingError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let model = serde_json::from_reader(BufReader::new(file))?;
        Ok(model)
    }
}

impl DataModel {
    /// The stored projection of this model.
    pub fn persist(&self) -> PersistedModel {
        PersistedModel {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            variables: self.variables().map(Variable::persist).collect(),
        }
    }

    /// Save the model to a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use blocklink::DataModel;
    /// # fn example(model: &DataModel) -> blocklink::Result<()> {
    /// model.save("settings/model.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.persist().save(path)
    }

    /// Load a model saved with [`DataModel::save`], using the default
    /// configuration and the built-in comparators.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, ModelConfig::default(), ComparatorRegistry::with_builtins())
    }

    /// Load a model with an explicit configuration and comparator registry.
    pub fn load_with(
        path: impl AsRef<Path>,
        config: ModelConfig,
        registry: ComparatorRegistry,
    ) -> Result<Self> {
        PersistedModel::load(path)?.rehydrate(config, registry)
    }
}
