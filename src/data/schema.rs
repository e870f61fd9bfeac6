//! Feature and label definitions.
//!
//! This module describes the model's input features and its target, as
//! supplied by whoever encoded the training data. The converter only reads
//! these types.

use serde::Deserialize;

use crate::repr::pmml::{DataType, Value};

/// Indicator for one category of a field: present when `field == value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct BinaryFeature {
    name: String,
    value: Value,
}

impl BinaryFeature {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category whose presence this feature indicates.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Real-valued feature compared against numeric thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ContinuousFeature {
    name: String,
    #[serde(default)]
    data_type: DataType,
}

impl ContinuousFeature {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Multi-valued categorical feature that was not expanded into indicators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct CategoricalFeature {
    name: String,
    values: Vec<Value>,
}

impl CategoricalFeature {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A model input feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feature {
    Binary(BinaryFeature),
    Continuous(ContinuousFeature),
    Categorical(CategoricalFeature),
}

impl Feature {
    /// Name of the underlying input field.
    pub fn name(&self) -> &str {
        match self {
            Feature::Binary(f) => f.name(),
            Feature::Continuous(f) => f.name(),
            Feature::Categorical(f) => f.name(),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Feature::Binary(_) => "binary",
            Feature::Continuous(_) => "continuous",
            Feature::Categorical(_) => "categorical",
        }
    }

    /// View this feature as a continuous one of the given data type.
    ///
    /// Only continuous features convert; indicators and raw categoricals
    /// would need a derived field, which this layer does not create.
    pub fn to_continuous_feature(&self, data_type: DataType) -> Option<ContinuousFeature> {
        match self {
            Feature::Continuous(f) => Some(ContinuousFeature::new(f.name(), data_type)),
            Feature::Binary(_) | Feature::Categorical(_) => None,
        }
    }
}

impl From<BinaryFeature> for Feature {
    fn from(feature: BinaryFeature) -> Self {
        Feature::Binary(feature)
    }
}

impl From<ContinuousFeature> for Feature {
    fn from(feature: ContinuousFeature) -> Self {
        Feature::Continuous(feature)
    }
}

impl From<CategoricalFeature> for Feature {
    fn from(feature: CategoricalFeature) -> Self {
        Feature::Categorical(feature)
    }
}

/// Regression target.
///
/// An unnamed label marks intermediate outputs, such as the members of an
/// ensemble, that only feed a parent model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContinuousLabel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data_type: DataType,
}

impl ContinuousLabel {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Some(name.into()),
            data_type,
        }
    }

    pub fn anonymous(data_type: DataType) -> Self {
        Self {
            name: None,
            data_type,
        }
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

/// Label plus ordered input features.
///
/// Feature indices used by the tree encodings refer to positions in this
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Schema {
    label: ContinuousLabel,
    features: Vec<Feature>,
}

impl Schema {
    pub fn new(label: ContinuousLabel, features: Vec<Feature>) -> Self {
        Self { label, features }
    }

    #[inline]
    pub fn label(&self) -> &ContinuousLabel {
        &self.label
    }

    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Feature at `index`, if any.
    #[inline]
    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// Same features, unnamed regression target of the given type.
    pub fn to_anonymous_regressor_schema(&self, data_type: DataType) -> Schema {
        Schema {
            label: ContinuousLabel::anonymous(data_type),
            features: self.features.clone(),
        }
    }
}
