//! Experience collection and sequence-model training
//!
//! The learning agent appends one labeled observation per simulation step to
//! an append-only [`ExperienceStore`]; the [`Trainer`] periodically converts
//! the accumulated rewards into discounted returns, scales the feature table,
//! reshapes it into overlapping fixed-length windows and fits a
//! sequence-to-scalar regression model.

mod dataset;
mod error;
mod experience;
mod model;
mod returns;
mod scaler;
mod trainer;

pub use dataset::window_sequences;
pub use error::{LearningError, Result};
pub use experience::{ExperienceRecord, ExperienceStore, N_COLUMNS, N_FEATURES};
pub use model::{LinearSequenceModel, SequenceModel};
pub use returns::discounted_returns;
pub use scaler::MinMaxScaler;
pub use trainer::{Trainer, TrainerConfig, TrainingReport};
