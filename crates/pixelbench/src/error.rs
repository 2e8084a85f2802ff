use thiserror::Error;

use crate::types::{Implementation, Scenario};

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("No trials to aggregate for {scenario} ({implementation})")]
    EmptyBatch {
        scenario: Scenario,
        implementation: Implementation,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("{implementation} {scenario} failed: {message}")]
    Processing {
        scenario: Scenario,
        implementation: Implementation,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// Conversion from std::io::Error
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Wrap a routine failure with the scenario and implementation it came from
    pub fn processing(
        scenario: Scenario,
        implementation: Implementation,
        message: impl Into<String>,
    ) -> Self {
        Error::Processing {
            scenario,
            implementation,
            message: message.into(),
        }
    }
}
