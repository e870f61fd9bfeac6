//! Ensemble model: segmentation of member trees plus output targets.

use std::sync::Arc;

use super::{MiningFunction, MiningSchema, Predicate, TreeModel};

/// Rule combining the predictions of a segmentation's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultipleModelMethod {
    /// Sum of all member predictions.
    #[default]
    Sum,
}

/// One member of a [`Segmentation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// 1-based position within the segmentation.
    pub id: u32,
    pub predicate: Arc<Predicate>,
    pub model: TreeModel,
}

/// Ordered list of member models and the rule combining them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    method: MultipleModelMethod,
    segments: Vec<Segment>,
}

impl Segmentation {
    /// Wrap `models` as always-selected segments, keeping their order.
    pub fn new(method: MultipleModelMethod, models: Vec<TreeModel>) -> Self {
        let always = Arc::new(Predicate::True);
        let segments = models
            .into_iter()
            .enumerate()
            .map(|(i, model)| Segment {
                id: i as u32 + 1,
                predicate: Arc::clone(&always),
                model,
            })
            .collect();

        Self { method, segments }
    }

    #[inline]
    pub fn method(&self) -> MultipleModelMethod {
        self.method
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Member models in segment order.
    pub fn models(&self) -> impl Iterator<Item = &TreeModel> {
        self.segments.iter().map(|s| &s.model)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Post-processing of a target value: `value * rescale_factor + rescale_constant`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Target {
    pub field: Option<String>,
    pub rescale_factor: Option<f64>,
    pub rescale_constant: Option<f64>,
}

impl Target {
    /// Apply the rescale to a raw prediction.
    #[inline]
    pub fn rescale(&self, value: f64) -> f64 {
        value * self.rescale_factor.unwrap_or(1.0) + self.rescale_constant.unwrap_or(0.0)
    }
}

/// Target declarations of a model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Targets {
    targets: Vec<Target>,
}

impl Targets {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Rescale target with the given factor and constant.
    ///
    /// Returns `None` when the rescale would be the identity (factor one,
    /// constant zero).
    pub fn rescale(
        field: Option<&str>,
        rescale_factor: Option<f64>,
        rescale_constant: Option<f64>,
    ) -> Option<Self> {
        let rescale_factor = rescale_factor.filter(|&f| f != 1.0);
        let rescale_constant = rescale_constant.filter(|&c| c != 0.0);

        if rescale_factor.is_none() && rescale_constant.is_none() {
            return None;
        }

        Some(Self::new(vec![Target {
            field: field.map(str::to_owned),
            rescale_factor,
            rescale_constant,
        }]))
    }

    #[inline]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Target declared for `field`, falling back to an unnamed target.
    pub fn get(&self, field: Option<&str>) -> Option<&Target> {
        self.targets
            .iter()
            .find(|t| t.field.as_deref() == field)
            .or_else(|| self.targets.iter().find(|t| t.field.is_none()))
    }
}

/// Ensemble model combining member trees.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningModel {
    mining_function: MiningFunction,
    mining_schema: MiningSchema,
    segmentation: Segmentation,
    targets: Option<Targets>,
}

impl MiningModel {
    pub fn new(
        mining_function: MiningFunction,
        mining_schema: MiningSchema,
        segmentation: Segmentation,
    ) -> Self {
        Self {
            mining_function,
            mining_schema,
            segmentation,
            targets: None,
        }
    }

    pub fn with_targets(mut self, targets: Option<Targets>) -> Self {
        self.targets = targets;
        self
    }

    #[inline]
    pub fn mining_function(&self) -> MiningFunction {
        self.mining_function
    }

    #[inline]
    pub fn mining_schema(&self) -> &MiningSchema {
        &self.mining_schema
    }

    #[inline]
    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    #[inline]
    pub fn targets(&self) -> Option<&Targets> {
        self.targets.as_ref()
    }

    /// Constant added after summation, zero when no target rescales.
    pub fn baseline(&self) -> f64 {
        self.targets
            .as_ref()
            .and_then(|t| t.get(self.mining_schema.target()))
            .and_then(|t| t.rescale_constant)
            .unwrap_or(0.0)
    }
}
