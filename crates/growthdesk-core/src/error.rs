use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrowthDeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, GrowthDeskError>;
