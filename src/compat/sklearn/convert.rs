//! Conversion from flat tree encodings to tree and mining models.
//!
//! - [`encode_tree_model`]: one [`TreePredictor`] to one [`TreeModel`]
//! - [`encode_ensemble`]: the trees of one output column, plus its baseline,
//!   to a summing [`MiningModel`]
//! - [`encode_column`]: selects one column out of per-round tree lists and
//!   per-column baselines, then delegates to [`encode_ensemble`]

use std::borrow::Borrow;
use std::sync::Arc;

use log::{debug, trace};

use crate::data::{ContinuousLabel, Schema};
use crate::repr::pmml::{
    BranchNode, DataType, LeafNode, MiningFunction, MiningModel, MiningSchema,
    MultipleModelMethod, Node, NodeId, Predicate, Segmentation, SplitCharacteristic, Targets,
    TreeModel,
};

use super::predictor::{BRANCH, LEAF};
use super::{ColumnContext, ConversionError, EncoderConfig, PredicateManager, TreePredictor};

// =============================================================================
// Tree encoding
// =============================================================================

/// Convert one flat tree into a binary-split regression [`TreeModel`].
///
/// Uses a fresh [`PredicateManager`]; see [`encode_tree_model_with`] to
/// share one across trees.
pub fn encode_tree_model(
    tree: &TreePredictor,
    schema: &Schema,
    config: &EncoderConfig,
) -> Result<TreeModel, ConversionError> {
    let mut manager = PredicateManager::with_interning(config.intern_predicates);
    encode_tree_model_with(tree, &mut manager, schema)
}

/// Convert one flat tree, taking predicates from `manager`.
///
/// Node `i` of the result has id `i`. Leaf scores are copied unchanged.
///
/// # Errors
///
/// - [`ConversionError::MalformedTreeEncoding`] for a leaf flag other than 0 or 1
/// - [`ConversionError::InvalidNodeIndex`] for a child reference outside the arrays
/// - [`ConversionError::CyclicTree`] if a node is reachable twice
/// - [`ConversionError::FeatureIndexOutOfRange`] for a split feature missing
///   from `schema`
/// - [`ConversionError::Split`] if the split cannot be expressed for its feature
pub fn encode_tree_model_with(
    tree: &TreePredictor,
    manager: &mut PredicateManager,
    schema: &Schema,
) -> Result<TreeModel, ConversionError> {
    let root = encode_nodes(tree, manager, schema)?;

    trace!(
        "encoded tree: {} of {} nodes reachable, depth {}",
        root.node_count(),
        tree.n_nodes(),
        root.depth()
    );

    Ok(TreeModel::new(
        MiningFunction::Regression,
        mining_schema(schema.label()),
        root,
    )
    .with_split_characteristic(SplitCharacteristic::BinarySplit))
}

/// Work item of the tree walk.
enum Frame {
    /// Visit a node entered under `predicate`.
    Enter {
        node: usize,
        predicate: Arc<Predicate>,
    },
    /// Both children of a branch are finished; assemble it.
    Exit {
        node: usize,
        predicate: Arc<Predicate>,
    },
}

/// Pre-order walk from node 0 with an explicit stack.
///
/// Finished subtrees collect on `done`; a branch's `Exit` frame pops its
/// right and then its left child from there.
fn encode_nodes(
    tree: &TreePredictor,
    manager: &mut PredicateManager,
    schema: &Schema,
) -> Result<Node, ConversionError> {
    let mut visited = vec![false; tree.n_nodes()];
    let mut done: Vec<Node> = Vec::new();
    let mut stack = vec![Frame::Enter {
        node: 0,
        predicate: manager.true_predicate(),
    }];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter { node, predicate } => {
                if std::mem::replace(&mut visited[node], true) {
                    return Err(ConversionError::CyclicTree { node });
                }

                match tree.leaf_flag(node) {
                    LEAF => {
                        done.push(Node::Leaf(LeafNode::new(
                            node as NodeId,
                            predicate,
                            tree.value(node),
                        )));
                    }
                    BRANCH => {
                        let feature_idx = tree.feature_idx(node);
                        let feature = usize::try_from(feature_idx)
                            .ok()
                            .and_then(|f| schema.feature(f))
                            .ok_or(ConversionError::FeatureIndexOutOfRange {
                                node,
                                feature: feature_idx,
                                n_features: schema.n_features(),
                            })?;

                        let (left_predicate, right_predicate) = manager
                            .split_predicates(feature, tree.threshold(node))
                            .map_err(|source| ConversionError::Split { node, source })?;

                        let left = tree.child(node, tree.left(node))?;
                        let right = tree.child(node, tree.right(node))?;

                        stack.push(Frame::Exit { node, predicate });
                        stack.push(Frame::Enter {
                            node: right,
                            predicate: right_predicate,
                        });
                        stack.push(Frame::Enter {
                            node: left,
                            predicate: left_predicate,
                        });
                    }
                    flag => return Err(ConversionError::MalformedTreeEncoding { node, flag }),
                }
            }
            Frame::Exit { node, predicate } => {
                let (Some(right), Some(left)) = (done.pop(), done.pop()) else {
                    unreachable!("branch {node} exited before both children were built");
                };
                done.push(Node::Branch(BranchNode::new(
                    node as NodeId,
                    predicate,
                    left,
                    right,
                )));
            }
        }
    }

    debug_assert_eq!(done.len(), 1);
    done.pop().ok_or(ConversionError::EmptyTree)
}

fn mining_schema(label: &ContinuousLabel) -> MiningSchema {
    label
        .name()
        .map_or_else(MiningSchema::anonymous, |name| MiningSchema::with_target(name))
}

// =============================================================================
// Ensemble assembly
// =============================================================================

/// Convert the trees of one output column into a summing [`MiningModel`].
///
/// Member trees are encoded against the anonymous regressor version of
/// `schema`, in the given order, and their predictions summed. The result
/// predicts `sum + baseline` for the label of `schema`; a zero baseline adds
/// no [`Targets`].
///
/// # Errors
///
/// - [`ConversionError::EmptyEnsemble`] if `trees` is empty
/// - [`ConversionError::InvalidBaseline`] if `baseline` is NaN or infinite
/// - [`ConversionError::Round`] wrapping the first tree that fails to encode
pub fn encode_ensemble<T>(
    trees: &[T],
    baseline: f64,
    schema: &Schema,
    config: &EncoderConfig,
) -> Result<MiningModel, ConversionError>
where
    T: Borrow<TreePredictor> + Sync,
{
    if trees.is_empty() {
        return Err(ConversionError::EmptyEnsemble);
    }
    if !baseline.is_finite() {
        return Err(ConversionError::InvalidBaseline { value: baseline });
    }

    let segment_schema = schema.to_anonymous_regressor_schema(DataType::Double);

    let tree_models = if config.parallelism.is_parallel() {
        config
            .parallelism
            .maybe_par_map(0..trees.len(), |round| {
                encode_tree_model(trees[round].borrow(), &segment_schema, config)
                    .map_err(|e| e.in_round(round))
            })
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let mut manager = PredicateManager::with_interning(config.intern_predicates);
        trees
            .iter()
            .enumerate()
            .map(|(round, tree)| {
                encode_tree_model_with(tree.borrow(), &mut manager, &segment_schema)
                    .map_err(|e| e.in_round(round))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let label = schema.label();
    let n_nodes: usize = tree_models.iter().map(TreeModel::node_count).sum();
    debug!(
        "assembled ensemble for {}: {} trees, {} nodes, baseline {}",
        label.name().unwrap_or("<anonymous>"),
        tree_models.len(),
        n_nodes,
        baseline
    );

    let segmentation = Segmentation::new(MultipleModelMethod::Sum, tree_models);
    let targets = Targets::rescale(label.name(), None, Some(baseline));

    Ok(
        MiningModel::new(MiningFunction::Regression, mining_schema(label), segmentation)
            .with_targets(targets),
    )
}

/// Convert output column `column` of a multi-output ensemble.
///
/// `trees_per_round[round][column]` is the tree round `round` fitted for
/// `column`, and `baselines[column]` its baseline.
///
/// # Errors
///
/// [`ConversionError::ColumnOutOfRange`] if a round or the baselines lack
/// `column`, otherwise as [`encode_ensemble`].
pub fn encode_column<R>(
    trees_per_round: &[R],
    baselines: &[f64],
    column: usize,
    schema: &Schema,
    config: &EncoderConfig,
) -> Result<MiningModel, ConversionError>
where
    R: AsRef<[TreePredictor]>,
{
    let trees = trees_per_round
        .iter()
        .enumerate()
        .map(|(round, trees)| {
            let trees = trees.as_ref();
            trees.get(column).ok_or(ConversionError::ColumnOutOfRange {
                column,
                context: ColumnContext::Round(round),
                n_columns: trees.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let baseline = baselines
        .get(column)
        .copied()
        .ok_or(ConversionError::ColumnOutOfRange {
            column,
            context: ColumnContext::Baselines,
            n_columns: baselines.len(),
        })?;

    encode_ensemble(&trees, baseline, schema, config)
}
