use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Index {index} is out of range!")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("No URL was entered")]
    Cancelled,

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Retrieval failed: {0}")]
    Engine(String),
}

impl From<crate::engine::EngineError> for AppError {
    fn from(err: crate::engine::EngineError) -> Self {
        AppError::Engine(err.to_string())
    }
}
