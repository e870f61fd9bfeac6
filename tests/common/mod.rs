//! Test case loading utilities for integration tests.
//!
//! For assertion helpers, use `boosters_pmml::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use boosters_pmml::compat::sklearn::HistGradientBoosting;
use boosters_pmml::data::Schema;
use boosters_pmml::repr::pmml::Value;

#[allow(unused_imports)]
pub use boosters_pmml::assert_approx_eq_f64;
#[allow(unused_imports)]
pub use boosters_pmml::testing::{assert_predictions_match, encoded_row, DEFAULT_TOLERANCE_F64};

// =============================================================================
// Test Case Loading
// =============================================================================

/// Base directory for test cases.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// Directory for scikit-learn test cases.
pub fn sklearn_test_cases_dir() -> PathBuf {
    test_cases_dir().join("sklearn")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

// =============================================================================
// Common Test Data Structures
// =============================================================================

/// Input rows for a test case, in the encoded form the trees consume.
#[derive(Debug, Deserialize)]
pub struct TestInput {
    pub features: Vec<Vec<f64>>,
    /// Field value standing for "no indicator set".
    #[serde(default)]
    pub absent: Option<Value>,
}

impl TestInput {
    pub fn absent(&self) -> Value {
        self.absent.clone().unwrap_or_else(|| Value::from("__absent__"))
    }
}

/// Expected predictions, indexed `[column][row]`.
#[derive(Debug, Deserialize)]
pub struct TestExpected {
    pub predictions: Vec<Vec<f64>>,
}

/// A complete fixture: model, schema, inputs and expected outputs.
pub struct TestCase {
    pub model: HistGradientBoosting,
    pub schema: Schema,
    pub input: TestInput,
    pub expected: TestExpected,
}

/// Load the `<name>.{model,schema,input,expected}.json` fixture files.
pub fn load_sklearn_case(name: &str) -> TestCase {
    let dir = sklearn_test_cases_dir();
    TestCase {
        model: load_json(&dir.join(format!("{name}.model.json"))),
        schema: load_json(&dir.join(format!("{name}.schema.json"))),
        input: load_json(&dir.join(format!("{name}.input.json"))),
        expected: load_json(&dir.join(format!("{name}.expected.json"))),
    }
}
