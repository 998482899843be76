//! Training pipeline
//!
//! Sequences the full batch pass: rewards -> discounted returns, feature
//! scaling, window reshaping, model fit. This is a heavyweight offline-style
//! operation invoked explicitly by the owner of the experience store, never
//! from the per-step quote path.

use crate::dataset::window_sequences;
use crate::error::{LearningError, Result};
use crate::experience::ExperienceStore;
use crate::model::{LinearSequenceModel, SequenceModel};
use crate::returns::discounted_returns;
use crate::scaler::MinMaxScaler;
use log::info;
use ndarray::Array2;

/// Hyperparameters for the training pipeline
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Reward discount factor
    pub gamma: f64,
    /// Window length fed to the sequence model
    pub n_timepoints: usize,
    /// Gradient-descent epochs per fit
    pub n_epochs: usize,
    /// Gradient-descent step size
    pub learning_rate: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            n_timepoints: 16,
            n_epochs: 20,
            learning_rate: 0.005,
        }
    }
}

/// Summary of one completed fit
#[derive(Debug, Clone, Copy)]
pub struct TrainingReport {
    /// Rows in the experience table at fit time
    pub rows: usize,
    /// Windows formed from those rows
    pub windows: usize,
    /// Training MSE after the final epoch
    pub final_loss: f64,
}

/// Owns the scaler and model across fits
pub struct Trainer {
    config: TrainerConfig,
    scaler: Option<MinMaxScaler>,
    model: Box<dyn SequenceModel + Send>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        let model = LinearSequenceModel::new(config.learning_rate, config.n_epochs);
        Self {
            config,
            scaler: None,
            model: Box::new(model),
        }
    }

    /// Swap in a different model implementation
    pub fn with_model(config: TrainerConfig, model: Box<dyn SequenceModel + Send>) -> Self {
        Self {
            config,
            scaler: None,
            model,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.scaler.is_some() && self.model.is_fitted()
    }

    /// Run one full training pass over the accumulated experience.
    ///
    /// Fails with `InsufficientData` before `n_timepoints` rows exist; the
    /// store is left untouched either way.
    pub fn fit(&mut self, store: &ExperienceStore) -> Result<TrainingReport> {
        let rows = store.len();
        if rows < self.config.n_timepoints {
            return Err(LearningError::InsufficientData {
                needed: self.config.n_timepoints,
                available: rows,
            });
        }

        let returns = discounted_returns(&store.rewards(), self.config.gamma);
        let (scaler, scaled) = MinMaxScaler::fit_transform(&store.feature_matrix())?;
        let (windows, targets) = window_sequences(&scaled, &returns, self.config.n_timepoints)?;

        let n_windows = targets.len();
        let final_loss = self.model.fit(&windows, &targets)?;
        self.scaler = Some(scaler);

        info!(
            "fitted sequence model: {} rows, {} windows, final loss {:.6}",
            rows, n_windows, final_loss
        );

        Ok(TrainingReport {
            rows,
            windows: n_windows,
            final_loss,
        })
    }

    /// Score one raw (unscaled) window of `n_timepoints` rows.
    pub fn predict_window(&self, window: &Array2<f64>) -> Result<f64> {
        let scaler = self.scaler.as_ref().ok_or(LearningError::NotFitted)?;
        if window.nrows() != self.config.n_timepoints {
            return Err(LearningError::ShapeMismatch {
                expected: format!("{} rows", self.config.n_timepoints),
                actual: format!("{} rows", window.nrows()),
            });
        }
        let scaled = scaler.transform(window)?;
        self.model.predict(scaled.view())
    }
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("fitted", &self.is_fitted())
            .finish()
    }
}
