use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{application::repos::RepoError, infra::error::InfraError};

/// Diagnostic payload attached to error responses and consumed by the
/// response logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure surfaced by the catalog services. Cache failures never appear
/// here; they are logged and swallowed inside the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },
    #[error("constraint violated: {0}")]
    ConstraintViolation(&'static str),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    pub fn invalid_id() -> Self {
        Self::InvalidArgument {
            field: "id",
            reason: "must be a positive integer",
        }
    }

    /// Lifts a store `NotFound` into an entity-scoped one; other store
    /// failures pass through unchanged.
    pub fn from_repo(entity: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound { entity },
            other => Self::Repo(other),
        }
    }
}

pub(crate) fn ensure_positive_id(id: i64) -> Result<(), ServiceError> {
    if id <= 0 {
        return Err(ServiceError::invalid_id());
    }
    Ok(())
}

pub(crate) fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ConstraintViolation(field));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
