//! Predicate and model evaluation.

use log::trace;

use crate::repr::pmml::{
    DataType, MiningModel, MultipleModelMethod, Node, Operator, Predicate, SimplePredicate,
    TreeModel, Value,
};

use super::Row;

/// Error scoring a row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("field `{field}` holds {actual:?} value {value}, predicate `{predicate}` expects {expected:?}")]
    TypeMismatch {
        field: String,
        value: Value,
        actual: DataType,
        expected: DataType,
        predicate: String,
    },
}

// =============================================================================
// Predicates
// =============================================================================

impl SimplePredicate {
    /// Three-valued truth of the predicate on `row`.
    ///
    /// `Ok(None)` when the field is missing. Numbers compare numerically
    /// regardless of integer or double representation; strings only support
    /// equality.
    pub fn evaluate(&self, row: &Row) -> Result<Option<bool>, EvaluationError> {
        let Some(input) = row.get(&self.field) else {
            return Ok(None);
        };

        let mismatch = || EvaluationError::TypeMismatch {
            field: self.field.clone(),
            value: input.clone(),
            actual: input.data_type(),
            expected: self.value.data_type(),
            predicate: self.to_string(),
        };

        let result = match (input.as_f64(), self.value.as_f64()) {
            (Some(x), Some(v)) => match self.operator {
                Operator::Equal => x == v,
                Operator::NotEqual => x != v,
                Operator::LessOrEqual => x <= v,
                Operator::GreaterThan => x > v,
            },
            _ => match (input.as_str(), self.value.as_str()) {
                (Some(x), Some(v)) if !self.operator.is_ordering() => {
                    (x == v) == (self.operator == Operator::Equal)
                }
                _ => return Err(mismatch()),
            },
        };

        Ok(Some(result))
    }
}

impl Predicate {
    /// Three-valued truth of the predicate on `row`. See
    /// [`SimplePredicate::evaluate`].
    pub fn evaluate(&self, row: &Row) -> Result<Option<bool>, EvaluationError> {
        match self {
            Predicate::True => Ok(Some(true)),
            Predicate::Simple(simple) => simple.evaluate(row),
        }
    }
}

// =============================================================================
// Models
// =============================================================================

impl TreeModel {
    /// Score of the leaf `row` reaches.
    ///
    /// Starting at the root, descends into the first child whose predicate is
    /// true. Returns `Ok(None)` when the root or no child of some branch
    /// evaluates to true.
    pub fn predict(&self, row: &Row) -> Result<Option<f64>, EvaluationError> {
        let mut node = self.root();
        if node.predicate().evaluate(row)? != Some(true) {
            return Ok(None);
        }

        loop {
            match node {
                Node::Leaf(leaf) => return Ok(Some(leaf.score)),
                Node::Branch(branch) => {
                    let mut next = None;
                    for child in branch.children() {
                        if child.predicate().evaluate(row)? == Some(true) {
                            next = Some(child);
                            break;
                        }
                    }

                    match next {
                        Some(child) => node = child,
                        None => {
                            trace!("no child of node {} matched", branch.id);
                            return Ok(None);
                        }
                    }
                }
            }
        }
    }
}

impl MiningModel {
    /// Combined score of the segments, after target rescaling.
    ///
    /// Segments whose predicate is not true are skipped. Any selected member
    /// without a prediction makes the whole prediction `None`.
    pub fn predict(&self, row: &Row) -> Result<Option<f64>, EvaluationError> {
        let segmentation = self.segmentation();

        let mut sum = 0.0;
        for segment in segmentation.segments() {
            if segment.predicate.evaluate(row)? != Some(true) {
                continue;
            }
            match segment.model.predict(row)? {
                Some(score) => match segmentation.method() {
                    MultipleModelMethod::Sum => sum += score,
                },
                None => return Ok(None),
            }
        }

        let target = self
            .targets()
            .and_then(|targets| targets.get(self.mining_schema().target()));

        Ok(Some(target.map_or(sum, |t| t.rescale(sum))))
    }
}
