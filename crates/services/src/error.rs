//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ActionError, IdError};
use quiz_core::progress::{PaginationError, ProgressError};

/// Errors emitted by `QuizBackend` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("backend is not configured")]
    Disabled,
    #[error("no session has been started")]
    NotStarted,
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("backend response is malformed: {0}")]
    Malformed(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while loading session configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {key}: {raw}")]
    InvalidValue { key: &'static str, raw: String },
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// Errors emitted by session start and answer routing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Validation(#[from] ActionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
