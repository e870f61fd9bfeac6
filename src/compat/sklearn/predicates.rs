//! Split predicate construction and interning.
//!
//! Every split of the source trees is a single test "go left when
//! `x <= threshold`". How that test reads in terms of the model's input
//! fields depends on the feature it splits on:
//!
//! | Feature | Left | Right |
//! |---------|------|-------|
//! | binary indicator for `v` (threshold must be 0.5) | `field != v` | `field == v` |
//! | continuous | `field <= t` | `field > t` |
//!
//! Indicator columns hold 0 when the category is absent, so the absent case
//! is the one sent left.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::Feature;
use crate::repr::pmml::{DataType, Operator, Predicate, SimplePredicate, Value};

/// The only threshold that separates the 0 and 1 of an indicator column.
pub const BINARY_SPLIT_THRESHOLD: f64 = 0.5;

/// Error building the predicates of one split.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    #[error("binary feature `{feature}` is split at {threshold}, expected 0.5")]
    InvalidSplitEncoding { feature: String, threshold: f64 },
    #[error("cannot split on {kind} feature `{feature}`")]
    UnsupportedFeatureKind { feature: String, kind: &'static str },
}

/// Factory for predicates that hands out shared instances.
///
/// Predicates are keyed by (field, operator, value); asking twice for the
/// same test returns the same [`Arc`]. Sharing only affects the size of the
/// produced model, never what it predicts.
#[derive(Debug, Clone)]
pub struct PredicateManager {
    intern: bool,
    cache: HashMap<SimplePredicate, Arc<Predicate>>,
    always: Arc<Predicate>,
}

impl Default for PredicateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateManager {
    /// Manager with interning enabled.
    pub fn new() -> Self {
        Self::with_interning(true)
    }

    /// Manager that interns only when `intern` is set.
    pub fn with_interning(intern: bool) -> Self {
        Self {
            intern,
            cache: HashMap::new(),
            always: Arc::new(Predicate::True),
        }
    }

    /// The shared always-true predicate.
    #[inline]
    pub fn true_predicate(&self) -> Arc<Predicate> {
        Arc::clone(&self.always)
    }

    /// Predicate testing `field <operator> value`.
    pub fn create_simple_predicate(
        &mut self,
        field: &str,
        operator: Operator,
        value: Value,
    ) -> Arc<Predicate> {
        let key = SimplePredicate::new(field, operator, value);
        if !self.intern {
            return Arc::new(Predicate::Simple(key));
        }

        Arc::clone(
            self.cache
                .entry(key)
                .or_insert_with_key(|key| Arc::new(Predicate::Simple(key.clone()))),
        )
    }

    /// Left and right predicates of a split on `feature` at `threshold`.
    ///
    /// The two predicates are complements over the feature's domain.
    ///
    /// # Errors
    ///
    /// - [`SplitError::InvalidSplitEncoding`] if `feature` is a binary
    ///   indicator and `threshold` is not exactly 0.5
    /// - [`SplitError::UnsupportedFeatureKind`] if `feature` can be neither
    ///   an indicator nor a continuous feature
    pub fn split_predicates(
        &mut self,
        feature: &Feature,
        threshold: f64,
    ) -> Result<(Arc<Predicate>, Arc<Predicate>), SplitError> {
        if let Feature::Binary(binary) = feature {
            if threshold != BINARY_SPLIT_THRESHOLD {
                return Err(SplitError::InvalidSplitEncoding {
                    feature: binary.name().to_owned(),
                    threshold,
                });
            }

            let left = self.create_simple_predicate(
                binary.name(),
                Operator::NotEqual,
                binary.value().clone(),
            );
            let right =
                self.create_simple_predicate(binary.name(), Operator::Equal, binary.value().clone());

            return Ok((left, right));
        }

        let continuous = feature.to_continuous_feature(DataType::Double).ok_or_else(|| {
            SplitError::UnsupportedFeatureKind {
                feature: feature.name().to_owned(),
                kind: feature.kind(),
            }
        })?;

        let value = Value::Double(threshold);
        let left =
            self.create_simple_predicate(continuous.name(), Operator::LessOrEqual, value.clone());
        let right = self.create_simple_predicate(continuous.name(), Operator::GreaterThan, value);

        Ok((left, right))
    }

    /// Number of distinct interned predicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
