//! boosters-pmml: histogram gradient boosting trees as PMML-shaped models.
//!
//! Converts the flat node arrays of a fitted histogram gradient boosting
//! regressor into an explicit tree representation (`TreeModel` of nodes
//! guarded by predicates) and an additive ensemble (`MiningModel` summing the
//! trees plus a baseline), and scores both.
//!
//! # Modules
//!
//! - [`compat::sklearn`]: flat tree arrays and their conversion
//! - [`data`]: feature schemas describing the model inputs
//! - [`repr::pmml`]: the produced model objects
//! - [`inference`]: evaluation of produced models against named rows
//! - [`utils`]: parallelism control
//! - [`testing`]: assertion helpers for tests

pub mod compat;
pub mod data;
pub mod inference;
pub mod repr;
pub mod testing;
pub mod utils;

pub use compat::sklearn::{
    encode_ensemble, encode_tree_model, ConversionError, EncoderConfig, HistGradientBoosting,
    TreePredictor,
};
pub use data::Schema;
pub use inference::{EvaluationError, Row};
pub use repr::pmml::{MiningModel, TreeModel};
pub use utils::Parallelism;
