//! Standardization - zero mean, unit variance per dimension
//!
//! `scale` already includes the epsilon, so `transform` never divides by zero
//! even for a dimension with no variance.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;
use super::vector::FeatureVector;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("cannot fit standardization on an empty pool")]
    EmptyPool,

    #[error("expected {expected} feature columns, got {actual}")]
    ColumnMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    /// Population std + epsilon
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit on an `n × FEATURE_COUNT` matrix (population std, ddof = 0)
    pub fn fit(data: &Array2<f64>, epsilon: f64) -> Result<Self, FeatureError> {
        if data.ncols() != FEATURE_COUNT {
            return Err(FeatureError::ColumnMismatch {
                expected: FEATURE_COUNT,
                actual: data.ncols(),
            });
        }
        let mean = data.mean_axis(Axis(0)).ok_or(FeatureError::EmptyPool)?;
        let std = data.std_axis(Axis(0), 0.0);

        let mut params = Self {
            mean: [0.0; FEATURE_COUNT],
            scale: [0.0; FEATURE_COUNT],
        };
        for i in 0..FEATURE_COUNT {
            params.mean[i] = mean[i];
            params.scale[i] = std[i] + epsilon;
        }
        Ok(params)
    }

    /// Every mean finite and every scale finite and positive
    pub fn is_well_formed(&self) -> bool {
        self.mean.iter().all(|m| m.is_finite())
            && self.scale.iter().all(|s| s.is_finite() && *s > 0.0)
    }

    /// Standardize one row of a matrix with the fitted parameters
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_iter(
            row.iter()
                .zip(self.mean.iter().zip(&self.scale))
                .map(|(x, (m, s))| (x - m) / s),
        )
    }

    /// Standardize every row; returns a new matrix
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for mut row in out.rows_mut() {
            for (i, cell) in row.iter_mut().enumerate() {
                *cell = (*cell - self.mean[i]) / self.scale[i];
            }
        }
        out
    }

    /// Standardize a single feature vector
    pub fn transform_vector(&self, vector: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (vector.values[i] - self.mean[i]) / self.scale[i];
        }
        out
    }
}
