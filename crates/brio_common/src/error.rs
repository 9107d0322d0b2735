//! Error types for Brio.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrioError {
    #[error("Invalid user id: {0:?}")]
    InvalidUser(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrioError {
    /// Short machine-readable kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            BrioError::InvalidUser(_) => "invalid_user",
            BrioError::Store(_) => "store",
            BrioError::Io(_) => "io",
            BrioError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, BrioError>;
