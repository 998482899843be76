use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("price history is empty")]
    EmptyPriceHistory,

    #[error("degenerate price history: zero mean over the last {window} observations")]
    DegenerateHistory { window: usize },

    #[error(transparent)]
    Learning(#[from] market_learning::LearningError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
