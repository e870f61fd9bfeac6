//! scikit-learn conversion tests: fixture loading, conversion, and
//! prediction parity between converted models and the flat trees.
//!
//! Fixtures live under `tests/test-cases/sklearn`; expected outputs are
//! computed by hand from the tree definitions.

use std::sync::Arc;

use rstest::rstest;

use boosters_pmml::compat::sklearn::{
    encode_ensemble, encode_tree_model, ColumnContext, ConversionError, EncoderConfig,
    HistGradientBoosting, PredictorNode, SplitError, TreePredictor, TreePredictorBuilder,
};
use boosters_pmml::data::{BinaryFeature, CategoricalFeature, ContinuousFeature, ContinuousLabel, Schema};
use boosters_pmml::inference::Row;
use boosters_pmml::repr::pmml::{
    DataType, MiningFunction, MultipleModelMethod, Node, Operator, Predicate, SimplePredicate,
    SplitCharacteristic, Value,
};
use boosters_pmml::utils::Parallelism;

use crate::common::{
    assert_predictions_match, encoded_row, load_sklearn_case, DEFAULT_TOLERANCE_F64,
};

// =============================================================================
// Helpers
// =============================================================================

fn configs() -> [EncoderConfig; 2] {
    [
        EncoderConfig::default(),
        EncoderConfig::builder()
            .parallelism(Parallelism::Parallel)
            .build(),
    ]
}

fn continuous_schema(n_features: usize) -> Schema {
    Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        (0..n_features)
            .map(|i| ContinuousFeature::new(format!("x{i}"), DataType::Double).into())
            .collect(),
    )
}

/// The worked example tree: split on x0 at 3.5 into leaf 2.0 and a split on
/// x1 at 1.0 into leaves -1.0 and 4.0.
fn worked_example_tree() -> TreePredictor {
    TreePredictor::from_nodes(&[
        PredictorNode::split(0, 3.5, 1, 2),
        PredictorNode::leaf(2.0),
        PredictorNode::split(1, 1.0, 3, 4),
        PredictorNode::leaf(-1.0),
        PredictorNode::leaf(4.0),
    ])
    .unwrap()
}

fn simple(predicate: &Predicate) -> &SimplePredicate {
    predicate.as_simple().expect("simple predicate")
}

// =============================================================================
// Fixture parity
// =============================================================================

#[rstest]
#[case::regression_continuous("regression_continuous")]
#[case::binary_indicators("binary_indicators")]
#[case::multi_column("multi_column")]
fn converted_model_matches_expected(#[case] name: &str) {
    let case = load_sklearn_case(name);
    let absent = case.input.absent();

    assert_eq!(case.model.n_columns(), case.expected.predictions.len());

    for config in configs() {
        for (column, expected) in case.expected.predictions.iter().enumerate() {
            let mining = case
                .model
                .to_mining_model(column, &case.schema, &config)
                .unwrap_or_else(|e| panic!("{name}[{column}]: {e}"));

            assert_eq!(mining.segmentation().len(), case.model.n_rounds());

            let actual: Vec<Option<f64>> = case
                .input
                .features
                .iter()
                .map(|features| {
                    let row = encoded_row(&case.schema, features, &absent);
                    mining.predict(&row).unwrap()
                })
                .collect();
            let expected: Vec<Option<f64>> = expected.iter().copied().map(Some).collect();

            assert_predictions_match(
                &actual,
                &expected,
                DEFAULT_TOLERANCE_F64,
                &format!("{name}[{column}] converted"),
            );
        }
    }
}

#[rstest]
#[case::regression_continuous("regression_continuous")]
#[case::binary_indicators("binary_indicators")]
#[case::multi_column("multi_column")]
fn reference_scorer_matches_expected(#[case] name: &str) {
    let case = load_sklearn_case(name);

    for (column, expected) in case.expected.predictions.iter().enumerate() {
        let actual: Vec<Option<f64>> = case
            .input
            .features
            .iter()
            .map(|features| Some(case.model.predict_row(column, features).unwrap()))
            .collect();
        let expected: Vec<Option<f64>> = expected.iter().copied().map(Some).collect();

        assert_predictions_match(
            &actual,
            &expected,
            DEFAULT_TOLERANCE_F64,
            &format!("{name}[{column}] reference"),
        );
    }
}

#[rstest]
#[case::regression_continuous("regression_continuous")]
#[case::binary_indicators("binary_indicators")]
#[case::multi_column("multi_column")]
fn parallel_conversion_is_deterministic(#[case] name: &str) {
    let case = load_sklearn_case(name);
    let [sequential, parallel] = configs();

    for column in 0..case.model.n_columns() {
        let a = case.model.to_mining_model(column, &case.schema, &sequential).unwrap();
        let b = case.model.to_mining_model(column, &case.schema, &parallel).unwrap();
        assert_eq!(a, b, "{name}[{column}]");
    }
}

#[test]
fn fixture_deserializes_both_tree_layouts() {
    let nodes = load_sklearn_case("regression_continuous");
    let arrays = load_sklearn_case("binary_indicators");

    let tree = &nodes.model.predictors()[0][0];
    assert_eq!(tree.n_nodes(), 5);
    assert_eq!(tree.threshold(2), 1000.0);

    let tree = &arrays.model.predictors()[0][0];
    assert_eq!(tree.n_nodes(), 5);
    assert_eq!(tree.feature_idx(0), 1);
}

// =============================================================================
// Worked examples
// =============================================================================

#[test_log::test]
fn worked_example_tree_structure() {
    let schema = continuous_schema(2);
    let model = encode_tree_model(&worked_example_tree(), &schema, &EncoderConfig::default())
        .unwrap();

    assert_eq!(model.mining_function(), MiningFunction::Regression);
    assert_eq!(model.split_characteristic(), SplitCharacteristic::BinarySplit);
    assert_eq!(model.mining_schema().target(), Some("y"));

    let Node::Branch(root) = model.root() else {
        panic!("root should be a branch");
    };
    assert!(root.predicate.is_true());

    let Node::Leaf(left) = root.left() else {
        panic!("left child should be a leaf");
    };
    assert_eq!(left.score, 2.0);
    assert_eq!(
        simple(&left.predicate),
        &SimplePredicate::new("x0", Operator::LessOrEqual, Value::Double(3.5))
    );

    let Node::Branch(right) = root.right() else {
        panic!("right child should be a branch");
    };
    assert_eq!(
        simple(&right.predicate),
        &SimplePredicate::new("x0", Operator::GreaterThan, Value::Double(3.5))
    );
    assert_eq!(
        simple(right.left().predicate()),
        &SimplePredicate::new("x1", Operator::LessOrEqual, Value::Double(1.0))
    );
    assert_eq!(
        simple(right.right().predicate()),
        &SimplePredicate::new("x1", Operator::GreaterThan, Value::Double(1.0))
    );

    assert_eq!(model.node_count(), 5);
    assert_eq!(model.leaf_count(), 3);
}

#[rstest]
#[case(&[3.5, 9.0], 2.0)]
#[case(&[4.0, 1.0], -1.0)]
#[case(&[4.0, 1.5], 4.0)]
fn worked_example_tree_predictions(#[case] features: &[f64], #[case] expected: f64) {
    let schema = continuous_schema(2);
    let tree = worked_example_tree();
    let model = encode_tree_model(&tree, &schema, &EncoderConfig::default()).unwrap();

    let row: Row = [("x0", features[0]), ("x1", features[1])].into_iter().collect();

    assert_eq!(model.predict(&row).unwrap(), Some(expected));
    assert_eq!(tree.predict_row(features).unwrap(), expected);
}

#[test_log::test]
fn worked_example_ensemble() {
    let schema = continuous_schema(1);
    let trees = [
        TreePredictor::from_nodes(&[PredictorNode::leaf(0.5)]).unwrap(),
        TreePredictor::from_nodes(&[PredictorNode::leaf(-0.2)]).unwrap(),
    ];

    let model = encode_ensemble(&trees, 10.0, &schema, &EncoderConfig::default()).unwrap();

    assert_eq!(model.mining_function(), MiningFunction::Regression);
    assert_eq!(model.segmentation().method(), MultipleModelMethod::Sum);
    assert_eq!(model.segmentation().len(), 2);
    for (i, segment) in model.segmentation().segments().iter().enumerate() {
        assert_eq!(segment.id as usize, i + 1);
        assert!(segment.predicate.is_true());
        assert_eq!(segment.model.mining_schema().target(), None);
    }

    let targets = model.targets().expect("baseline target");
    assert_eq!(targets.targets().len(), 1);
    assert_eq!(targets.targets()[0].field.as_deref(), Some("y"));
    assert_eq!(targets.targets()[0].rescale_constant, Some(10.0));
    assert_eq!(targets.targets()[0].rescale_factor, None);

    let prediction = model.predict(&Row::new().with("x0", 0.0)).unwrap().unwrap();
    boosters_pmml::assert_approx_eq_f64!(prediction, 10.3, DEFAULT_TOLERANCE_F64);
}

#[test]
fn worked_example_binary_split() {
    let schema = Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        vec![BinaryFeature::new("color", "red").into()],
    );
    let tree = TreePredictor::from_nodes(&[
        PredictorNode::split(0, 0.5, 1, 2),
        PredictorNode::leaf(0.0),
        PredictorNode::leaf(1.0),
    ])
    .unwrap();

    let model = encode_tree_model(&tree, &schema, &EncoderConfig::default()).unwrap();
    let [left, right] = model.root().children() else {
        panic!("root should have two children");
    };
    assert_eq!(
        simple(left.predicate()),
        &SimplePredicate::new("color", Operator::NotEqual, Value::from("red"))
    );
    assert_eq!(
        simple(right.predicate()),
        &SimplePredicate::new("color", Operator::Equal, Value::from("red"))
    );

    assert_eq!(model.predict(&Row::new().with("color", "red")).unwrap(), Some(1.0));
    assert_eq!(model.predict(&Row::new().with("color", "blue")).unwrap(), Some(0.0));
}

fn stump_arrays(threshold: f64) -> TreePredictor {
    TreePredictor::new(
        vec![0, 1, 1],
        vec![1, -1, -1],
        vec![2, -1, -1],
        vec![0, -1, -1],
        vec![threshold, 0.0, 0.0],
        vec![0.0, 2.0, 5.0],
    )
    .unwrap()
}

#[rstest]
#[case(3.0, 3.0)]
#[case(3.5, 3.0)]
#[case(3.6, 6.0)]
fn stump_with_baseline(#[case] x: f64, #[case] expected: f64) {
    let schema = Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        vec![ContinuousFeature::new("f0", DataType::Double).into()],
    );
    let model = HistGradientBoosting::new(vec![vec![stump_arrays(3.5)]], vec![1.0]);
    let mining = model
        .to_mining_model(0, &schema, &EncoderConfig::default())
        .unwrap();

    assert_eq!(mining.predict(&Row::new().with("f0", x)).unwrap(), Some(expected));
    assert_eq!(model.predict_row(0, &[x]).unwrap(), expected);
}

#[rstest]
#[case(0.5, true)]
#[case(0.0, false)]
#[case(1.0, false)]
#[case(0.25, false)]
fn indicator_stump_threshold(#[case] threshold: f64, #[case] accepted: bool) {
    let schema = Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        vec![BinaryFeature::new("f0", "A").into()],
    );
    let result = encode_tree_model(&stump_arrays(threshold), &schema, &EncoderConfig::default());
    assert_eq!(result.is_ok(), accepted, "{result:?}");

    if let Ok(model) = result {
        assert_eq!(model.predict(&Row::new().with("f0", "B")).unwrap(), Some(2.0));
        assert_eq!(model.predict(&Row::new().with("f0", "A")).unwrap(), Some(5.0));
    }
}

#[test]
fn missing_field_has_no_prediction() {
    let schema = continuous_schema(2);
    let model =
        encode_tree_model(&worked_example_tree(), &schema, &EncoderConfig::default()).unwrap();

    assert_eq!(model.predict(&Row::new().with("x0", 4.0)).unwrap(), None);
    assert_eq!(model.predict(&Row::new().with("x0", 1.0)).unwrap(), Some(2.0));
}

#[test]
fn interned_predicates_are_shared_across_trees() {
    let schema = continuous_schema(2);
    let trees = [worked_example_tree(), worked_example_tree()];

    let model = encode_ensemble(&trees, 0.0, &schema, &EncoderConfig::default()).unwrap();
    let segments = model.segmentation().segments();
    let a = segments[0].model.root().children()[0].predicate();
    let b = segments[1].model.root().children()[0].predicate();
    assert!(Arc::ptr_eq(a, b));
    assert!(model.targets().is_none());
}

// =============================================================================
// Deep trees
// =============================================================================

/// Right-leaning chain of `depth` splits: node `2k` tests `x0 <= k`, with
/// leaf `2k + 1` (score `k`) on the left and node `2k + 2` on the right.
fn chain_tree(depth: usize) -> TreePredictor {
    let mut builder = TreePredictorBuilder::with_n_nodes(2 * depth + 1);
    for k in 0..depth {
        let node = 2 * k;
        builder
            .set_split(node, 0, k as f64, node as i64 + 1, node as i64 + 2)
            .make_leaf(node + 1, k as f64);
    }
    builder.make_leaf(2 * depth, -1.0);
    builder.build().unwrap()
}

#[rstest]
#[case(0.5, Some(1.0))]
#[case(1e12, Some(-1.0))]
fn deep_chain_converts_without_recursion(#[case] x: f64, #[case] expected: Option<f64>) {
    let depth = 150_000;
    let schema = continuous_schema(1);
    let tree = chain_tree(depth);

    let model = encode_tree_model(&tree, &schema, &EncoderConfig::default()).unwrap();
    assert_eq!(model.node_count(), 2 * depth + 1);
    assert_eq!(model.leaf_count(), depth + 1);
    assert_eq!(model.depth(), depth);

    let row = Row::new().with("x0", x);
    assert_eq!(model.predict(&row).unwrap(), expected);
    assert_eq!(Some(tree.predict_row(&[x]).unwrap()), expected);

    let copy = model.clone();
    assert!(copy == model);
    drop(copy);
    drop(model);
}

#[test]
fn deep_chain_ensemble_in_parallel() {
    let schema = continuous_schema(1);
    let trees = [chain_tree(100_000), chain_tree(100_000)];
    let [sequential, parallel] = configs();

    let a = encode_ensemble(&trees, 0.5, &schema, &sequential).unwrap();
    let b = encode_ensemble(&trees, 0.5, &schema, &parallel).unwrap();
    assert!(a == b);

    let row = Row::new().with("x0", 2.5);
    assert_eq!(a.predict(&row).unwrap(), Some(3.0 + 3.0 + 0.5));
}

// =============================================================================
// Errors
// =============================================================================

fn assert_tree_error(nodes: &[PredictorNode], schema: &Schema, expected: ConversionError) {
    let tree = TreePredictor::from_nodes(nodes).unwrap();
    for config in configs() {
        let err = encode_tree_model(&tree, schema, &config).unwrap_err();
        assert_eq!(err, expected);
    }
}

#[rstest]
#[case::bad_flag(
    vec![PredictorNode { is_leaf: 2, ..Default::default() }],
    ConversionError::MalformedTreeEncoding { node: 0, flag: 2 }
)]
#[case::bad_flag_with_category_bitset(
    vec![PredictorNode { is_leaf: 2, is_categorical: 1, ..Default::default() }],
    ConversionError::MalformedTreeEncoding { node: 0, flag: 2 }
)]
#[case::unreachable_category_bitset(
    vec![
        PredictorNode::split(0, 1.0, 1, 3),
        PredictorNode::leaf(1.0),
        PredictorNode { is_categorical: 1, ..PredictorNode::split(0, 0.0, 1, 1) },
    ],
    ConversionError::InvalidNodeIndex { node: 0, child: 3, n_nodes: 3 }
)]
#[case::child_out_of_range(
    vec![PredictorNode::split(0, 1.0, 1, 7), PredictorNode::leaf(1.0)],
    ConversionError::InvalidNodeIndex { node: 0, child: 7, n_nodes: 2 }
)]
#[case::negative_child(
    vec![PredictorNode::split(0, 1.0, -1, 1), PredictorNode::leaf(1.0)],
    ConversionError::InvalidNodeIndex { node: 0, child: -1, n_nodes: 2 }
)]
#[case::self_loop(
    vec![PredictorNode::split(0, 1.0, 0, 1), PredictorNode::leaf(1.0)],
    ConversionError::CyclicTree { node: 0 }
)]
#[case::feature_out_of_range(
    vec![PredictorNode::split(5, 1.0, 1, 2), PredictorNode::leaf(1.0), PredictorNode::leaf(2.0)],
    ConversionError::FeatureIndexOutOfRange { node: 0, feature: 5, n_features: 2 }
)]
fn malformed_trees_are_rejected(#[case] nodes: Vec<PredictorNode>, #[case] expected: ConversionError) {
    assert_tree_error(&nodes, &continuous_schema(2), expected);
}

#[test]
fn binary_split_off_half_is_rejected() {
    let schema = Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        vec![BinaryFeature::new("color", "red").into()],
    );
    assert_tree_error(
        &[
            PredictorNode::split(0, 0.7, 1, 2),
            PredictorNode::leaf(0.0),
            PredictorNode::leaf(1.0),
        ],
        &schema,
        ConversionError::Split {
            node: 0,
            source: SplitError::InvalidSplitEncoding {
                feature: "color".into(),
                threshold: 0.7,
            },
        },
    );
}

#[test]
fn categorical_feature_split_is_rejected() {
    let schema = Schema::new(
        ContinuousLabel::new("y", DataType::Double),
        vec![CategoricalFeature::new("shape", vec!["a".into(), "b".into()]).into()],
    );
    let tree = TreePredictor::from_nodes(&[
        PredictorNode::split(0, 0.5, 1, 2),
        PredictorNode::leaf(0.0),
        PredictorNode::leaf(1.0),
    ])
    .unwrap();

    let err = encode_tree_model(&tree, &schema, &EncoderConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Split {
            source: SplitError::UnsupportedFeatureKind { .. },
            ..
        }
    ));
}

#[test]
fn categorical_bitset_split_is_rejected() {
    let nodes = [
        PredictorNode {
            is_categorical: 1,
            ..PredictorNode::split(0, 0.0, 1, 2)
        },
        PredictorNode::leaf(0.0),
        PredictorNode::leaf(1.0),
    ];
    assert_eq!(
        TreePredictor::from_nodes(&nodes).unwrap_err(),
        ConversionError::UnsupportedCategoricalSplit { node: 0 }
    );
}

#[test]
fn ensemble_preconditions() {
    let schema = continuous_schema(1);
    let config = EncoderConfig::default();
    let leaf = TreePredictor::from_nodes(&[PredictorNode::leaf(1.0)]).unwrap();

    let empty: [TreePredictor; 0] = [];
    assert_eq!(
        encode_ensemble(&empty, 0.0, &schema, &config).unwrap_err(),
        ConversionError::EmptyEnsemble
    );

    let err = encode_ensemble(&[leaf], f64::INFINITY, &schema, &config).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidBaseline { .. }));
}

#[test]
fn failing_round_is_identified() {
    let schema = continuous_schema(1);
    let good = TreePredictor::from_nodes(&[PredictorNode::leaf(1.0)]).unwrap();
    let bad = TreePredictor::from_nodes(&[PredictorNode {
        is_leaf: 9,
        ..Default::default()
    }])
    .unwrap();
    let trees = [good.clone(), good, bad];

    for config in configs() {
        let err = encode_ensemble(&trees, 0.0, &schema, &config).unwrap_err();
        let ConversionError::Round { round, .. } = &err else {
            panic!("expected a round error, got {err}");
        };
        assert_eq!(*round, 2);
        assert_eq!(
            err.root_cause(),
            &ConversionError::MalformedTreeEncoding { node: 0, flag: 9 }
        );
    }
}

#[test]
fn column_out_of_range() {
    let case = load_sklearn_case("multi_column");
    let err = case
        .model
        .to_mining_model(2, &case.schema, &EncoderConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::ColumnOutOfRange {
            column: 2,
            context: ColumnContext::Round(0),
            n_columns: 2,
        }
    ));

    let ragged = HistGradientBoosting::new(
        vec![vec![TreePredictor::from_nodes(&[PredictorNode::leaf(1.0)]).unwrap(); 2]],
        vec![0.0],
    );
    let err = ragged
        .to_mining_model(1, &case.schema, &EncoderConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::ColumnOutOfRange {
            context: ColumnContext::Baselines,
            ..
        }
    ));
}
