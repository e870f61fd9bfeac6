//! Error types for tree and ensemble conversion.

use super::predicates::SplitError;

/// Error type for converting flat tree encodings.
///
/// Every variant is an integrity violation: the encoding does not match the
/// schema or is not a well-formed tree. Conversion stops at the first one and
/// returns no partial model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("tree array `{field}` has {len} entries, expected {expected}")]
    ArrayLengthMismatch {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("node {node}: leaf flag {flag} is neither 1 (leaf) nor 0 (branch)")]
    MalformedTreeEncoding { node: usize, flag: u8 },
    #[error("node {node} references child {child} but tree has {n_nodes} nodes")]
    InvalidNodeIndex {
        node: usize,
        child: i64,
        n_nodes: usize,
    },
    #[error("node {node} is reachable more than once from the root")]
    CyclicTree { node: usize },
    #[error("node {node} splits on feature {feature} but schema has {n_features} features")]
    FeatureIndexOutOfRange {
        node: usize,
        feature: i64,
        n_features: usize,
    },
    #[error("node {node}: {source}")]
    Split {
        node: usize,
        #[source]
        source: SplitError,
    },
    #[error("node {node}: categorical bitset splits are not supported")]
    UnsupportedCategoricalSplit { node: usize },
    #[error("ensemble has no trees")]
    EmptyEnsemble,
    #[error("baseline {value} is not a finite number")]
    InvalidBaseline { value: f64 },
    #[error("column {column} out of range: {context} has {n_columns} columns")]
    ColumnOutOfRange {
        column: usize,
        context: ColumnContext,
        n_columns: usize,
    },
    #[error("round {round}: {source}")]
    Round {
        round: usize,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// The innermost error, past any round context.
    pub fn root_cause(&self) -> &ConversionError {
        match self {
            ConversionError::Round { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_round(self, round: usize) -> Self {
        ConversionError::Round {
            round,
            source: Box::new(self),
        }
    }
}

/// Where a column index was looked up, for [`ConversionError::ColumnOutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnContext {
    Round(usize),
    Baselines,
}

impl std::fmt::Display for ColumnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnContext::Round(round) => write!(f, "round {round}"),
            ColumnContext::Baselines => f.write_str("baseline predictions"),
        }
    }
}
