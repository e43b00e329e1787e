// error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Keyword não pode estar vazia")]
    EmptyKeyword,

    #[error("Data integrity error: {message}")]
    DataIntegrity { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl OracleError {
    pub fn integrity(message: impl Into<String>) -> Self {
        OracleError::DataIntegrity {
            message: message.into(),
        }
    }
}
