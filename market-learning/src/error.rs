use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearningError {
    #[error("insufficient data: need at least {needed} rows, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LearningError>;
