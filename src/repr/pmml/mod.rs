//! PMML-shaped model objects.
//!
//! A small, owned object model for decision trees and tree ensembles:
//!
//! - [`Predicate`]: condition guarding entry into a node
//! - [`Node`]: branch with two children, or leaf with a score
//! - [`TreeModel`]: one tree plus its declared interface
//! - [`MiningModel`]: ordered member trees combined by a [`Segmentation`],
//!   followed by an optional [`Targets`] rescale
//!
//! Values are built once and never mutated. Writing them out as XML is left
//! to the caller.

pub mod mining;
pub mod node;
pub mod predicate;
pub mod tree;
pub mod value;

pub use mining::{MiningModel, MultipleModelMethod, Segment, Segmentation, Target, Targets};
pub use node::{BranchNode, LeafNode, Node, NodeId};
pub use predicate::{Operator, Predicate, SimplePredicate};
pub use tree::{MiningFunction, MiningSchema, SplitCharacteristic, TreeModel};
pub use value::{DataType, Value};
