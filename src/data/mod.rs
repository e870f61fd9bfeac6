//! Model input description.
//!
//! [`Schema`] lists the features a model reads, by position, and the label
//! it predicts. Features come in three kinds:
//!
//! - [`BinaryFeature`]: indicator for one category value
//! - [`ContinuousFeature`]: real-valued input
//! - [`CategoricalFeature`]: raw categorical input, not split on directly

mod schema;

pub use schema::{
    BinaryFeature, CategoricalFeature, ContinuousFeature, ContinuousLabel, Feature, Schema,
};
