//! Deterministic collection utilities used by the ledger.

pub mod ordered_set;

pub use ordered_set::OrderedSet;
