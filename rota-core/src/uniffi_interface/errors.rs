use thiserror::Error as ThisError;
use uniffi::Error;

use crate::errors::SessionError;

#[derive(Debug, ThisError, Error)]
#[uniffi(flat_error)]
#[non_exhaustive]
pub enum RotaError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("error: {0}")]
    Common(String),
}

impl From<anyhow::Error> for RotaError {
    fn from(e: anyhow::Error) -> Self {
        RotaError::Common(format!("{e:#}"))
    }
}

impl From<std::io::Error> for RotaError {
    fn from(e: std::io::Error) -> Self {
        RotaError::Common(e.to_string())
    }
}

impl From<tokio::task::JoinError> for RotaError {
    fn from(e: tokio::task::JoinError) -> Self {
        RotaError::Common(format!("background task failed: {e}"))
    }
}
