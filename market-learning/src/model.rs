//! Sequence-to-scalar regression model
//!
//! The trainable function is deliberately opaque behind [`SequenceModel`]:
//! callers only rely on the fit/predict contract. The default implementation
//! is a linear read-out over the flattened window, trained by full-batch
//! gradient descent on mean squared error.

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, Array3, ArrayView2};

/// Fit/predict contract for models mapping a feature window to a scalar.
pub trait SequenceModel {
    /// Fit on windows of shape `[n_samples, n_timepoints, n_features]`.
    /// Returns the training loss (MSE) after the final epoch.
    fn fit(&mut self, windows: &Array3<f64>, targets: &[f64]) -> Result<f64>;

    /// Score a single window of shape `[n_timepoints, n_features]`.
    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64>;

    /// Whether `fit` has completed at least once.
    fn is_fitted(&self) -> bool;
}

/// Linear regression over the flattened window, trained by gradient descent.
#[derive(Debug, Clone)]
pub struct LinearSequenceModel {
    learning_rate: f64,
    n_epochs: usize,
    weights: Option<Array1<f64>>,
    bias: f64,
    input_shape: Option<(usize, usize)>,
}

impl LinearSequenceModel {
    pub fn new(learning_rate: f64, n_epochs: usize) -> Self {
        Self {
            learning_rate,
            n_epochs,
            weights: None,
            bias: 0.0,
            input_shape: None,
        }
    }

    fn flatten_window(window: ArrayView2<'_, f64>) -> Array1<f64> {
        let (t, f) = window.dim();
        Array1::from_shape_fn(t * f, |k| window[[k / f, k % f]])
    }
}

impl SequenceModel for LinearSequenceModel {
    fn fit(&mut self, windows: &Array3<f64>, targets: &[f64]) -> Result<f64> {
        let (n_samples, n_timepoints, n_features) = windows.dim();
        if n_samples == 0 {
            return Err(LearningError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }
        if targets.len() != n_samples {
            return Err(LearningError::ShapeMismatch {
                expected: format!("{n_samples} targets"),
                actual: format!("{} targets", targets.len()),
            });
        }

        let dim = n_timepoints * n_features;
        let flat = Array2::from_shape_fn((n_samples, dim), |(i, k)| {
            windows[[i, k / n_features, k % n_features]]
        });
        let y = Array1::from(targets.to_vec());

        let mut weights = Array1::<f64>::zeros(dim);
        let mut bias = 0.0;
        let mut loss = 0.0;

        for _ in 0..self.n_epochs {
            let predictions = flat.dot(&weights) + bias;
            let residuals = &predictions - &y;
            loss = residuals.mapv(|r| r * r).sum() / n_samples as f64;

            let grad_w = flat.t().dot(&residuals) * (1.0 / n_samples as f64);
            let grad_b = residuals.sum() / n_samples as f64;

            weights = weights - grad_w * self.learning_rate;
            bias -= grad_b * self.learning_rate;
        }

        self.weights = Some(weights);
        self.bias = bias;
        self.input_shape = Some((n_timepoints, n_features));
        Ok(loss)
    }

    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
        let weights = self.weights.as_ref().ok_or(LearningError::NotFitted)?;
        let expected = self.input_shape.ok_or(LearningError::NotFitted)?;
        if window.dim() != expected {
            return Err(LearningError::ShapeMismatch {
                expected: format!("{:?} window", expected),
                actual: format!("{:?} window", window.dim()),
            });
        }

        let flat = Self::flatten_window(window);
        Ok(weights.dot(&flat) + self.bias)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_problem() -> (Array3<f64>, Vec<f64>) {
        // Target is the sum of the window's entries, scaled into [0, 1]
        let windows = Array3::from_shape_fn((20, 4, 2), |(i, t, f)| {
            ((i + t * 2 + f) % 5) as f64 / 5.0
        });
        let targets = (0..20)
            .map(|i| {
                (0..4)
                    .flat_map(|t| (0..2).map(move |f| ((i + t * 2 + f) % 5) as f64 / 5.0))
                    .sum::<f64>()
            })
            .collect();
        (windows, targets)
    }

    #[test]
    fn test_fit_reduces_loss_from_zero_baseline() {
        let (windows, targets) = toy_problem();
        let baseline: f64 =
            targets.iter().map(|y| y * y).sum::<f64>() / targets.len() as f64;

        let mut model = LinearSequenceModel::new(0.01, 500);
        let final_loss = model.fit(&windows, &targets).unwrap();

        assert!(model.is_fitted());
        assert!(final_loss.is_finite());
        assert!(final_loss < baseline);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LinearSequenceModel::new(0.01, 10);
        let window = Array2::zeros((4, 2));
        assert!(matches!(
            model.predict(window.view()),
            Err(LearningError::NotFitted)
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_window_shape() {
        let (windows, targets) = toy_problem();
        let mut model = LinearSequenceModel::new(0.01, 10);
        model.fit(&windows, &targets).unwrap();

        let wrong = Array2::zeros((3, 2));
        assert!(matches!(
            model.predict(wrong.view()),
            Err(LearningError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let mut model = LinearSequenceModel::new(0.01, 10);
        let windows = Array3::zeros((0, 4, 2));
        assert!(matches!(
            model.fit(&windows, &[]),
            Err(LearningError::InsufficientData { .. })
        ));
    }
}
