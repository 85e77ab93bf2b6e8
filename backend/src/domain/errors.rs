//! Error type shared by all domain services.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// One or more user inputs were rejected; each entry is a display message
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Please log in first.")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(vec![message.into()])
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(e: sqlx::Error) -> Self {
        DomainError::Internal(e.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
