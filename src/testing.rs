//! Testing utilities for boosters-pmml.
//!
//! Assertion helpers and input builders shared by unit tests and
//! integration tests.
//!
//! ```
//! use boosters_pmml::testing::DEFAULT_TOLERANCE_F64;
//! use boosters_pmml::assert_approx_eq_f64;
//!
//! assert_approx_eq_f64!(1.0, 1.0 + DEFAULT_TOLERANCE_F64 / 2.0, DEFAULT_TOLERANCE_F64);
//! ```

use approx::AbsDiffEq;

use crate::data::{Feature, Schema};
use crate::inference::Row;
use crate::repr::pmml::Value;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons of O(1) predictions.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-9;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are approximately equal.
///
/// # Examples
///
/// ```
/// # use boosters_pmml::assert_approx_eq_f64;
/// assert_approx_eq_f64!(1.0f64, 1.0001f64, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq_f64 {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

// =============================================================================
// Prediction Assertions
// =============================================================================

/// Git-style diff of the rows whose predictions differ.
fn diff_predictions(actual: &[Option<f64>], expected: &[Option<f64>], epsilon: f64) -> String {
    let mut result = format!("Epsilon: {epsilon:.0e}\n\n");

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if !prediction_eq(*a, *e, epsilon) {
            result.push_str(&format!("[{i:3}] - {e:>14?}  (expected)\n"));
            result.push_str(&format!("      + {a:>14?}  (actual)\n"));
        }
    }

    result
}

fn prediction_eq(actual: Option<f64>, expected: Option<f64>, epsilon: f64) -> bool {
    match (actual, expected) {
        (Some(a), Some(e)) => a.abs_diff_eq(&e, epsilon),
        (None, None) => true,
        _ => false,
    }
}

/// Assert that model predictions match expected values.
///
/// `None` only matches `None`. On failure, shows a diff of the differing
/// rows.
///
/// # Panics
///
/// Panics if lengths differ or any prediction differs by more than
/// `epsilon`.
pub fn assert_predictions_match(
    actual: &[Option<f64>],
    expected: &[Option<f64>],
    epsilon: f64,
    context: &str,
) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    let diff_count = actual
        .iter()
        .zip(expected)
        .filter(|(a, e)| !prediction_eq(**a, **e, epsilon))
        .count();

    if diff_count > 0 {
        let diff_output = diff_predictions(actual, expected, epsilon);
        panic!(
            "\n{context}: {diff_count}/{} predictions differ\n\n{diff_output}",
            actual.len()
        );
    }
}

// =============================================================================
// Input Builders
// =============================================================================

/// Named input row for a model converted with `schema`, from the encoded
/// feature vector the source trees consume.
///
/// Continuous features copy their column. A binary indicator column above
/// 0.5 sets its field to the indicator's value. Fields whose indicators are
/// all off get `absent`, which must differ from every indicator value.
///
/// # Panics
///
/// Panics if `features` is shorter than the schema.
pub fn encoded_row(schema: &Schema, features: &[f64], absent: &Value) -> Row {
    assert!(
        features.len() >= schema.n_features(),
        "{} features for a schema of {}",
        features.len(),
        schema.n_features()
    );

    let mut row = Row::new();
    for (feature, &x) in schema.features().iter().zip(features) {
        match feature {
            Feature::Binary(binary) => {
                if x > 0.5 {
                    row.insert(binary.name(), binary.value().clone());
                } else if row.get(binary.name()).is_none() {
                    row.insert(binary.name(), absent.clone());
                }
            }
            Feature::Continuous(continuous) => row.insert(continuous.name(), x),
            Feature::Categorical(categorical) => row.insert(categorical.name(), x),
        }
    }
    row
}
