use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid schedule '{name}': {reason}")]
    InvalidSchedule { name: String, reason: String },

    #[error("Invalid halving schedule: {0}")]
    InvalidHalvingSchedule(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Price history has no '{0}' column")]
    MissingColumn(String),

    #[error("No dates shared between the hashrate and price series")]
    EmptyAlignment,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    pub(crate) fn schedule(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
