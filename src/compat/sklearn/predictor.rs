//! Flat, array-based tree encoding of histogram gradient boosting models.
//!
//! A [`TreePredictor`] stores one tree as parallel arrays indexed by node id,
//! with node 0 as the root. Only entries reachable from the root matter; the
//! fields that do not apply to a node's kind (children and split of a leaf,
//! value of a branch) are ignored.
//!
//! Trees can be built three ways:
//!
//! - [`TreePredictor::new`] from the arrays directly
//! - [`TreePredictor::from_nodes`] from per-node [`PredictorNode`] records
//! - [`TreePredictorBuilder`] node by node, mostly for tests
//!
//! All three are also reachable through serde: a tree deserializes either
//! from `{"nodes": [...]}` or from an object holding the six arrays.

use serde::Deserialize;

use super::ConversionError;

/// Leaf flag of a leaf node.
pub const LEAF: u8 = 1;

/// Leaf flag of a branch node.
pub const BRANCH: u8 = 0;

// =============================================================================
// PredictorNode
// =============================================================================

/// One node record as stored by the source regressor.
///
/// The source record also carries `count`, `missing_go_to_left`, `gain`,
/// `depth`, `bin_threshold` and `bitset_idx`. None of them affect the encoded
/// tree, so they are accepted and skipped when deserializing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PredictorNode {
    /// Output of a leaf.
    #[serde(default)]
    pub value: f64,
    /// Split feature of a branch.
    #[serde(default)]
    pub feature_idx: i64,
    /// Split threshold of a branch, in raw feature units.
    #[serde(default)]
    pub num_threshold: f64,
    #[serde(default)]
    pub left: i64,
    #[serde(default)]
    pub right: i64,
    pub is_leaf: u8,
    /// Non-zero when the split tests membership in a category bitset.
    #[serde(default)]
    pub is_categorical: u8,
}

impl PredictorNode {
    /// Leaf record with the given output.
    pub fn leaf(value: f64) -> Self {
        Self {
            value,
            is_leaf: LEAF,
            ..Default::default()
        }
    }

    /// Numeric split record: `x[feature_idx] <= threshold` goes to `left`.
    pub fn split(feature_idx: i64, threshold: f64, left: i64, right: i64) -> Self {
        Self {
            feature_idx,
            num_threshold: threshold,
            left,
            right,
            is_leaf: BRANCH,
            ..Default::default()
        }
    }
}

// =============================================================================
// TreePredictor
// =============================================================================

/// Structure-of-arrays encoding of a single tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PredictorRepr")]
pub struct TreePredictor {
    is_leaf: Box<[u8]>,
    left: Box<[i64]>,
    right: Box<[i64]>,
    feature_idx: Box<[i64]>,
    threshold: Box<[f64]>,
    value: Box<[f64]>,
}

impl TreePredictor {
    /// Create a tree from parallel arrays.
    ///
    /// # Errors
    ///
    /// [`ConversionError::EmptyTree`] if there are no nodes, and
    /// [`ConversionError::ArrayLengthMismatch`] if any array's length differs
    /// from `is_leaf`'s.
    pub fn new(
        is_leaf: Vec<u8>,
        left: Vec<i64>,
        right: Vec<i64>,
        feature_idx: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<f64>,
    ) -> Result<Self, ConversionError> {
        let n_nodes = is_leaf.len();
        if n_nodes == 0 {
            return Err(ConversionError::EmptyTree);
        }

        for (field, len) in [
            ("left", left.len()),
            ("right", right.len()),
            ("feature_idx", feature_idx.len()),
            ("threshold", threshold.len()),
            ("value", value.len()),
        ] {
            if len != n_nodes {
                return Err(ConversionError::ArrayLengthMismatch {
                    field,
                    len,
                    expected: n_nodes,
                });
            }
        }

        Ok(Self {
            is_leaf: is_leaf.into_boxed_slice(),
            left: left.into_boxed_slice(),
            right: right.into_boxed_slice(),
            feature_idx: feature_idx.into_boxed_slice(),
            threshold: threshold.into_boxed_slice(),
            value: value.into_boxed_slice(),
        })
    }

    /// Create a tree from node records.
    ///
    /// # Errors
    ///
    /// [`ConversionError::EmptyTree`] for an empty slice, and
    /// [`ConversionError::UnsupportedCategoricalSplit`] for a reachable branch
    /// that splits on a category bitset, which a threshold cannot express.
    ///
    /// Only branches reachable from the root are checked. Bad child links and
    /// malformed leaf flags are left for encoding to report.
    pub fn from_nodes(nodes: &[PredictorNode]) -> Result<Self, ConversionError> {
        let tree = Self::new(
            nodes.iter().map(|n| n.is_leaf).collect(),
            nodes.iter().map(|n| n.left).collect(),
            nodes.iter().map(|n| n.right).collect(),
            nodes.iter().map(|n| n.feature_idx).collect(),
            nodes.iter().map(|n| n.num_threshold).collect(),
            nodes.iter().map(|n| n.value).collect(),
        )?;

        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            let record = &nodes[node];
            if record.is_leaf != BRANCH {
                continue;
            }
            if record.is_categorical != 0 {
                return Err(ConversionError::UnsupportedCategoricalSplit { node });
            }
            for child in [record.right, record.left] {
                if let Ok(child) = tree.child(node, child) {
                    stack.push(child);
                }
            }
        }

        Ok(tree)
    }

    /// Number of node entries, reachable or not.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Raw leaf flag of a node: [`LEAF`], [`BRANCH`] or malformed.
    #[inline]
    pub fn leaf_flag(&self, node: usize) -> u8 {
        self.is_leaf[node]
    }

    #[inline]
    pub fn left(&self, node: usize) -> i64 {
        self.left[node]
    }

    #[inline]
    pub fn right(&self, node: usize) -> i64 {
        self.right[node]
    }

    #[inline]
    pub fn feature_idx(&self, node: usize) -> i64 {
        self.feature_idx[node]
    }

    #[inline]
    pub fn threshold(&self, node: usize) -> f64 {
        self.threshold[node]
    }

    #[inline]
    pub fn value(&self, node: usize) -> f64 {
        self.value[node]
    }

    /// Resolve a child reference of `node`, checking it is in range.
    pub(crate) fn child(&self, node: usize, child: i64) -> Result<usize, ConversionError> {
        usize::try_from(child)
            .ok()
            .filter(|&c| c < self.n_nodes())
            .ok_or(ConversionError::InvalidNodeIndex {
                node,
                child,
                n_nodes: self.n_nodes(),
            })
    }

    /// Score a row of raw feature values by walking the arrays.
    ///
    /// This is the source regressor's own decision rule (`x <= threshold`
    /// goes left), with indicator features passed as 0.0 / 1.0. Missing
    /// values are not handled.
    ///
    /// # Errors
    ///
    /// The same structural errors as conversion, plus
    /// [`ConversionError::FeatureIndexOutOfRange`] if `features` is too short.
    pub fn predict_row(&self, features: &[f64]) -> Result<f64, ConversionError> {
        let mut node = 0usize;

        // A well-formed path visits each node at most once.
        for _ in 0..self.n_nodes() {
            match self.leaf_flag(node) {
                LEAF => return Ok(self.value(node)),
                BRANCH => {
                    let feature = self.feature_idx(node);
                    let x = usize::try_from(feature)
                        .ok()
                        .and_then(|f| features.get(f))
                        .ok_or(ConversionError::FeatureIndexOutOfRange {
                            node,
                            feature,
                            n_features: features.len(),
                        })?;

                    let next = if *x <= self.threshold(node) {
                        self.left(node)
                    } else {
                        self.right(node)
                    };
                    node = self.child(node, next)?;
                }
                flag => return Err(ConversionError::MalformedTreeEncoding { node, flag }),
            }
        }

        Err(ConversionError::CyclicTree { node })
    }
}

/// Serialized forms of a [`TreePredictor`].
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictorRepr {
    Nodes {
        nodes: Vec<PredictorNode>,
    },
    Arrays {
        is_leaf: Vec<u8>,
        left: Vec<i64>,
        right: Vec<i64>,
        feature_idx: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<f64>,
    },
}

impl TryFrom<PredictorRepr> for TreePredictor {
    type Error = ConversionError;

    fn try_from(repr: PredictorRepr) -> Result<Self, Self::Error> {
        match repr {
            PredictorRepr::Nodes { nodes } => Self::from_nodes(&nodes),
            PredictorRepr::Arrays {
                is_leaf,
                left,
                right,
                feature_idx,
                threshold,
                value,
            } => Self::new(is_leaf, left, right, feature_idx, threshold, value),
        }
    }
}

// =============================================================================
// TreePredictorBuilder
// =============================================================================

/// Node-by-node construction of a [`TreePredictor`].
///
/// All nodes are allocated up front as leaves with value 0; splits and leaf
/// values are then set by node id.
///
/// ```
/// use boosters_pmml::compat::sklearn::TreePredictorBuilder;
///
/// let mut builder = TreePredictorBuilder::with_n_nodes(3);
/// builder.set_split(0, 0, 3.5, 1, 2);
/// builder.make_leaf(1, 2.0);
/// builder.make_leaf(2, 5.0);
/// let tree = builder.build().unwrap();
///
/// assert_eq!(tree.predict_row(&[1.0]).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreePredictorBuilder {
    is_leaf: Vec<u8>,
    left: Vec<i64>,
    right: Vec<i64>,
    feature_idx: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl TreePredictorBuilder {
    /// Allocate `n_nodes` placeholder leaves.
    pub fn with_n_nodes(n_nodes: usize) -> Self {
        Self {
            is_leaf: vec![LEAF; n_nodes],
            left: vec![-1; n_nodes],
            right: vec![-1; n_nodes],
            feature_idx: vec![-1; n_nodes],
            threshold: vec![0.0; n_nodes],
            value: vec![0.0; n_nodes],
        }
    }

    /// Turn `node` into a split on `feature` at `threshold`.
    pub fn set_split(
        &mut self,
        node: usize,
        feature: i64,
        threshold: f64,
        left: i64,
        right: i64,
    ) -> &mut Self {
        self.is_leaf[node] = BRANCH;
        self.feature_idx[node] = feature;
        self.threshold[node] = threshold;
        self.left[node] = left;
        self.right[node] = right;
        self
    }

    /// Turn `node` into a leaf with `value`.
    pub fn make_leaf(&mut self, node: usize, value: f64) -> &mut Self {
        self.is_leaf[node] = LEAF;
        self.value[node] = value;
        self
    }

    /// Overwrite the raw leaf flag of `node`.
    pub fn set_leaf_flag(&mut self, node: usize, flag: u8) -> &mut Self {
        self.is_leaf[node] = flag;
        self
    }

    /// Finish the tree.
    pub fn build(self) -> Result<TreePredictor, ConversionError> {
        TreePredictor::new(
            self.is_leaf,
            self.left,
            self.right,
            self.feature_idx,
            self.threshold,
            self.value,
        )
    }
}
