//! Blocking predicates and the key-generating functions behind them.

pub mod functions;
pub mod phonetic;

mod function;
mod index;
mod predicate;

pub use function::{PredicateFunction, ValueDomain};
pub use index::{IndexKind, IndexService, PrecomputedIndex};
pub use predicate::{
    index_predicates, CompoundPredicate, ExistsPredicate, IndexPredicate, Predicate,
    SimplePredicate, EXISTS_KEY,
};
