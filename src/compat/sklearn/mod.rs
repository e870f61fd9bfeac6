//! scikit-learn histogram gradient boosting support.
//!
//! Converts the flat tree arrays of a fitted histogram gradient boosting
//! regressor into PMML-shaped [`TreeModel`](crate::repr::pmml::TreeModel)s
//! and summing [`MiningModel`](crate::repr::pmml::MiningModel)s that predict
//! exactly what the regressor predicts.
//!
//! # Example
//!
//! ```
//! use boosters_pmml::compat::sklearn::{encode_ensemble, EncoderConfig, TreePredictorBuilder};
//! use boosters_pmml::data::{ContinuousFeature, ContinuousLabel, Schema};
//! use boosters_pmml::inference::Row;
//! use boosters_pmml::repr::pmml::DataType;
//!
//! let mut builder = TreePredictorBuilder::with_n_nodes(3);
//! builder.set_split(0, 0, 3.5, 1, 2).make_leaf(1, 2.0).make_leaf(2, 5.0);
//! let tree = builder.build()?;
//!
//! let schema = Schema::new(
//!     ContinuousLabel::new("y", DataType::Double),
//!     vec![ContinuousFeature::new("x", DataType::Double).into()],
//! );
//! let model = encode_ensemble(&[tree], 1.0, &schema, &EncoderConfig::default())?;
//!
//! assert_eq!(model.predict(&Row::new().with("x", 3.0))?, Some(3.0));
//! assert_eq!(model.predict(&Row::new().with("x", 4.0))?, Some(6.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod convert;
mod error;
mod model;
mod predicates;
mod predictor;

pub use config::EncoderConfig;
pub use convert::{encode_column, encode_ensemble, encode_tree_model, encode_tree_model_with};
pub use error::{ColumnContext, ConversionError};
pub use model::HistGradientBoosting;
pub use predicates::{PredicateManager, SplitError, BINARY_SPLIT_THRESHOLD};
pub use predictor::{PredictorNode, TreePredictor, TreePredictorBuilder, BRANCH, LEAF};
