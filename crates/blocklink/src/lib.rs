//! Blocklink: comparison variables and blocking predicates for record linkage.
//!
//! A linkage configuration is a list of variable definitions. Each variable
//! knows how to compare two records and which blocking predicates can group
//! likely duplicates together without comparing every pair.
//!
//! # Core Pieces
//!
//! - **Predicates**: deterministic functions from a field value to block keys
//! - **Variables**: typed comparisons built from declarative definitions
//! - **Covers**: which records each predicate groups, for predicate learning
//!
//! # Example
//!
//! ```no_run
//! use blocklink::{Cover, DataModel, Parser, RecordReader, VariableDefinition, VariableType};
//!
//! let model = DataModel::new(&[
//!     VariableDefinition::field(0, VariableType::String),
//!     VariableDefinition::field(1, VariableType::Price).with_missing(true),
//! ])
//! .unwrap();
//!
//! let (table, _source) = Parser::new().parse_file("records.csv").unwrap();
//! let records = RecordReader::new(&model).read(&table).unwrap();
//!
//! let simple: Vec<_> = model
//!     .predicates()
//!     .into_iter()
//!     .filter(|p| !p.requires_index())
//!     .collect();
//! let cover = Cover::build(&simple, &records, None).unwrap();
//! println!("Covering predicates: {}", cover.len());
//! ```

pub mod comparators;
pub mod cover;
pub mod error;
pub mod input;
pub mod model;
pub mod predicates;
pub mod record;
pub mod variables;

mod render;

pub use comparators::{CategoricalComparator, Comparator, ComparatorRegistry};
pub use cover::{ComparisonCover, Cover, CoverConfig, CoverEntry};
pub use error::{BlockingError, Result};
pub use input::{DataTable, Parser, RecordReader, SourceMetadata, TrainingData};
pub use model::{DataModel, DataModelBuilder};
pub use predicates::{IndexKind, IndexService, Predicate, PredicateFunction};
pub use record::{FieldValue, IdentifiedRecord, Keys, Record, RecordId};
pub use variables::{ModelConfig, Variable, VariableDefinition, VariableType};
