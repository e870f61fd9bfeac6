//! Fitted histogram gradient boosting ensemble.

use serde::Deserialize;

use crate::data::Schema;
use crate::repr::pmml::MiningModel;

use super::{encode_column, ColumnContext, ConversionError, EncoderConfig, TreePredictor};

/// The trees and baselines of a fitted regressor.
///
/// Round `r` contributes one tree per output column:
/// `predictors[r][column]`. The prediction for a column is
/// `baseline_prediction[column]` plus the sum of that column's trees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistGradientBoosting {
    predictors: Vec<Vec<TreePredictor>>,
    baseline_prediction: Vec<f64>,
}

impl HistGradientBoosting {
    pub fn new(predictors: Vec<Vec<TreePredictor>>, baseline_prediction: Vec<f64>) -> Self {
        Self {
            predictors,
            baseline_prediction,
        }
    }

    /// Number of boosting rounds.
    #[inline]
    pub fn n_rounds(&self) -> usize {
        self.predictors.len()
    }

    /// Number of output columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.baseline_prediction.len()
    }

    #[inline]
    pub fn predictors(&self) -> &[Vec<TreePredictor>] {
        &self.predictors
    }

    #[inline]
    pub fn baseline_prediction(&self) -> &[f64] {
        &self.baseline_prediction
    }

    /// Convert output column `column` into a [`MiningModel`].
    ///
    /// See [`encode_column`].
    pub fn to_mining_model(
        &self,
        column: usize,
        schema: &Schema,
        config: &EncoderConfig,
    ) -> Result<MiningModel, ConversionError> {
        encode_column(
            &self.predictors,
            &self.baseline_prediction,
            column,
            schema,
            config,
        )
    }

    /// Reference prediction of column `column` for one row of raw features.
    ///
    /// Walks the flat trees directly; used to cross-check converted models.
    pub fn predict_row(&self, column: usize, features: &[f64]) -> Result<f64, ConversionError> {
        let mut sum = 0.0;
        for (round, trees) in self.predictors.iter().enumerate() {
            let tree = trees.get(column).ok_or(ConversionError::ColumnOutOfRange {
                column,
                context: ColumnContext::Round(round),
                n_columns: trees.len(),
            })?;
            sum += tree.predict_row(features).map_err(|e| e.in_round(round))?;
        }

        let baseline = self.baseline_prediction.get(column).ok_or(
            ConversionError::ColumnOutOfRange {
                column,
                context: ColumnContext::Baselines,
                n_columns: self.n_columns(),
            },
        )?;

        Ok(sum + baseline)
    }
}
