//! Per-column min-max feature scaling

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, Axis};

/// Scales each feature column into [0, 1] using the extrema seen at fit time.
///
/// Constant columns (max == min) transform to 0 rather than dividing by zero.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    /// Fit column extrema on a feature matrix.
    pub fn fit(features: &Array2<f64>) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(LearningError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }

        let n_cols = features.ncols();
        let mut min = Array1::zeros(n_cols);
        let mut range = Array1::zeros(n_cols);

        for (j, column) in features.axis_iter(Axis(1)).enumerate() {
            let lo = column.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            min[j] = lo;
            range[j] = hi - lo;
        }

        Ok(Self { min, range })
    }

    /// Number of feature columns this scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    /// Scale a matrix with the fitted extrema.
    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(LearningError::ShapeMismatch {
                expected: format!("{} columns", self.n_features()),
                actual: format!("{} columns", features.ncols()),
            });
        }

        let mut scaled = features.clone();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let lo = self.min[j];
            let span = self.range[j];
            if span == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|v| (v - lo) / span);
            }
        }
        Ok(scaled)
    }

    /// Fit and transform in one pass.
    pub fn fit_transform(features: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(features)?;
        let scaled = scaler.transform(features)?;
        Ok((scaler, scaled))
    }
}
