//! Scoring of converted models.
//!
//! Evaluates [`TreeModel`](crate::repr::pmml::TreeModel) and
//! [`MiningModel`](crate::repr::pmml::MiningModel) against a [`Row`] of named
//! field values, the way a PMML consumer would.
//!
//! # Missing values
//!
//! A predicate on a field absent from the row is unknown. An unknown
//! predicate never selects a node, so a row missing a field that the tree
//! tests has no prediction and `predict` returns `Ok(None)`.

mod evaluate;
mod row;

pub use evaluate::EvaluationError;
pub use row::Row;
