//! Tree model.

use super::Node;

/// Kind of prediction a model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiningFunction {
    /// Single continuous target.
    #[default]
    Regression,
}

/// How many children a branch may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCharacteristic {
    /// Every branch has exactly two children.
    #[default]
    BinarySplit,
}

/// Fields a model declares as its interface.
///
/// Only the target is recorded here; active input fields are attached by
/// whoever assembles the surrounding document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiningSchema {
    target: Option<String>,
}

impl MiningSchema {
    /// Schema of a model predicting the named target.
    pub fn with_target(name: impl Into<String>) -> Self {
        Self {
            target: Some(name.into()),
        }
    }

    /// Schema of a model whose output is not a named field.
    pub fn anonymous() -> Self {
        Self { target: None }
    }

    #[inline]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// A single decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    mining_function: MiningFunction,
    mining_schema: MiningSchema,
    root: Node,
    split_characteristic: SplitCharacteristic,
}

impl TreeModel {
    pub fn new(mining_function: MiningFunction, mining_schema: MiningSchema, root: Node) -> Self {
        Self {
            mining_function,
            mining_schema,
            root,
            split_characteristic: SplitCharacteristic::default(),
        }
    }

    pub fn with_split_characteristic(mut self, split_characteristic: SplitCharacteristic) -> Self {
        self.split_characteristic = split_characteristic;
        self
    }

    #[inline]
    pub fn mining_function(&self) -> MiningFunction {
        self.mining_function
    }

    #[inline]
    pub fn mining_schema(&self) -> &MiningSchema {
        &self.mining_schema
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[inline]
    pub fn split_characteristic(&self) -> SplitCharacteristic {
        self.split_characteristic
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
