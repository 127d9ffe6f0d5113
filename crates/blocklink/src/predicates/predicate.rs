//! Predicate types with a structural identity.
//!
//! Predicates are used as mapping keys in covers, so two predicates are equal
//! and hash alike exactly when they have the same variant, function or index
//! kind, field index and threshold.

use std::fmt;

use ordered_float::OrderedFloat;
use sha2::{Digest, Sha256};

use crate::error::{BlockingError, Result};
use crate::record::{FieldValue, Keys};
use crate::render;
use crate::variables::FieldTypeConfig;

use super::function::PredicateFunction;
use super::index::{IndexKind, IndexService};

static MISSING_VALUE: FieldValue = FieldValue::Missing;

/// Key emitted by an [`ExistsPredicate`] for a present value.
pub const EXISTS_KEY: &str = "1";

fn field(record: &[FieldValue], field_index: usize) -> &FieldValue {
    record.get(field_index).unwrap_or(&MISSING_VALUE)
}

/// A pure function applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimplePredicate {
    pub function: PredicateFunction,
    pub field_index: usize,
}

impl SimplePredicate {
    pub fn new(function: PredicateFunction, field_index: usize) -> Self {
        Self {
            function,
            field_index,
        }
    }

    /// Keys for a single field value.
    pub fn apply(&self, value: &FieldValue) -> Result<Keys> {
        self.function.apply(value)
    }

    /// Keys for a record.
    pub fn keys(&self, record: &[FieldValue]) -> Result<Keys> {
        self.apply(field(record, self.field_index))
    }
}

/// A lookup against an externally supplied similarity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPredicate {
    pub kind: IndexKind,
    pub threshold: OrderedFloat<f64>,
    pub field_index: usize,
}

impl IndexPredicate {
    pub fn new(kind: IndexKind, threshold: f64, field_index: usize) -> Self {
        Self {
            kind,
            threshold: OrderedFloat(threshold),
            field_index,
        }
    }

    /// Keys for a single field value, answered by `index`.
    pub fn apply(&self, value: &FieldValue, index: Option<&dyn IndexService>) -> Result<Keys> {
        if !value.is_present() {
            return Ok(Keys::new());
        }
        let index = index.ok_or_else(|| BlockingError::IndexUnavailable(self.to_string()))?;
        index.keys(self.kind, self.threshold.into_inner(), self.field_index, value)
    }

    /// Keys for a record.
    pub fn keys(&self, record: &[FieldValue], index: Option<&dyn IndexService>) -> Result<Keys> {
        self.apply(field(record, self.field_index), index)
    }
}

impl fmt::Display for IndexPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({}, {})",
            self.kind.name(),
            render::float(self.threshold.into_inner()),
            self.field_index
        )
    }
}

/// Emits [`EXISTS_KEY`] when the field is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExistsPredicate {
    pub field_index: usize,
}

impl ExistsPredicate {
    /// Build an exists predicate for a field whose type supports one.
    ///
    /// Fails when the variable has no physical field or its type config
    /// does not allow a missing-data predicate.
    pub fn try_new(field_index: Option<usize>, config: &FieldTypeConfig) -> Result<Self> {
        let field_index = field_index.ok_or_else(|| {
            BlockingError::Configuration("missing-data predicate needs a field index".to_string())
        })?;
        if !config.missing_predicate {
            return Err(BlockingError::Configuration(format!(
                "field {} does not support a missing-data predicate",
                field_index
            )));
        }
        Ok(Self { field_index })
    }

    pub fn apply(&self, value: &FieldValue) -> Keys {
        let mut keys = Keys::new();
        if value.is_present() {
            keys.insert(EXISTS_KEY.to_string());
        }
        keys
    }

    pub fn keys(&self, record: &[FieldValue]) -> Keys {
        self.apply(field(record, self.field_index))
    }
}

/// An ordered conjunction of predicates.
///
/// A record's keys are every combination of one key per member, joined
/// with `:`. Colons inside member keys are escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompoundPredicate {
    members: Vec<Predicate>,
}

impl CompoundPredicate {
    pub fn new(members: Vec<Predicate>) -> Result<Self> {
        if members.is_empty() {
            return Err(BlockingError::Configuration(
                "compound predicate needs at least one member".to_string(),
            ));
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[Predicate] {
        &self.members
    }

    pub fn keys(&self, record: &[FieldValue], index: Option<&dyn IndexService>) -> Result<Keys> {
        let mut combined: Vec<String> = vec![String::new()];
        for (position, member) in self.members.iter().enumerate() {
            let member_keys = member.keys(record, index)?;
            if member_keys.is_empty() {
                return Ok(Keys::new());
            }
            let mut next = Vec::with_capacity(combined.len() * member_keys.len());
            for prefix in &combined {
                for key in &member_keys {
                    let escaped = key.replace(':', "\\:");
                    if position == 0 {
                        next.push(escaped);
                    } else {
                        next.push(format!("{}:{}", prefix, escaped));
                    }
                }
            }
            combined = next;
        }
        Ok(combined.into_iter().collect())
    }
}

/// A blocking predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predicate {
    Simple(SimplePredicate),
    Index(IndexPredicate),
    Exists(ExistsPredicate),
    Compound(CompoundPredicate),
}

impl Predicate {
    /// Name of the predicate's variant, as it appears in display names.
    pub fn type_name(&self) -> &'static str {
        match self {
            Predicate::Simple(_) => "SimplePredicate",
            Predicate::Index(p) => p.kind.name(),
            Predicate::Exists(_) => "ExistsPredicate",
            Predicate::Compound(_) => "CompoundPredicate",
        }
    }

    /// The field this predicate reads; compound predicates read several.
    pub fn field_index(&self) -> Option<usize> {
        match self {
            Predicate::Simple(p) => Some(p.field_index),
            Predicate::Index(p) => Some(p.field_index),
            Predicate::Exists(p) => Some(p.field_index),
            Predicate::Compound(_) => None,
        }
    }

    /// Returns true if evaluating this predicate needs an index service.
    pub fn requires_index(&self) -> bool {
        match self {
            Predicate::Index(_) => true,
            Predicate::Compound(c) => c.members.iter().any(Predicate::requires_index),
            _ => false,
        }
    }

    /// Block keys of a record under this predicate.
    pub fn keys(&self, record: &[FieldValue], index: Option<&dyn IndexService>) -> Result<Keys> {
        match self {
            Predicate::Simple(p) => p.keys(record),
            Predicate::Index(p) => p.keys(record, index),
            Predicate::Exists(p) => Ok(p.keys(record)),
            Predicate::Compound(p) => p.keys(record, index),
        }
    }

    /// Stable content hash of the predicate's display name.
    ///
    /// Identical for equal predicates in every process.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        format!("sha256:{:x}", hasher.finalize())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Simple(p) => {
                write!(f, "{}: ({}, {})", self.type_name(), p.function, p.field_index)
            }
            Predicate::Index(p) => fmt::Display::fmt(p, f),
            Predicate::Exists(p) => write!(f, "{}: (Exists, {})", self.type_name(), p.field_index),
            Predicate::Compound(p) => {
                let members: Vec<String> = p.members.iter().map(ToString::to_string).collect();
                write!(f, "{}: ({})", self.type_name(), members.join(", "))
            }
        }
    }
}

impl From<SimplePredicate> for Predicate {
    fn from(p: SimplePredicate) -> Self {
        Predicate::Simple(p)
    }
}

impl From<IndexPredicate> for Predicate {
    fn from(p: IndexPredicate) -> Self {
        Predicate::Index(p)
    }
}

impl From<ExistsPredicate> for Predicate {
    fn from(p: ExistsPredicate) -> Self {
        Predicate::Exists(p)
    }
}

impl From<CompoundPredicate> for Predicate {
    fn from(p: CompoundPredicate) -> Self {
        Predicate::Compound(p)
    }
}

/// Every (kind, threshold) combination for one field, kind-major.
pub fn index_predicates(
    kinds: &[IndexKind],
    thresholds: &[f64],
    field_index: usize,
) -> Vec<IndexPredicate> {
    kinds
        .iter()
        .flat_map(|&kind| {
            thresholds
                .iter()
                .map(move |&threshold| IndexPredicate::new(kind, threshold, field_index))
        })
        .collect()
}
