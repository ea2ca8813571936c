use async_graphql::ErrorExtensions;
use axum::http::StatusCode;
use thiserror::Error;

use crate::infrastructure::storage::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Authentication required.")]
    Unauthenticated,
    #[error("Invalid password.")]
    InvalidPassword,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Unauthenticated | ServiceError::InvalidPassword => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable kind exposed to GraphQL clients under `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "BAD_USER_INPUT",
            ServiceError::Unauthenticated | ServiceError::InvalidPassword => "UNAUTHENTICATED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn into_graphql_error(self) -> async_graphql::Error {
        let code = self.code();
        let status = self.status_code().as_u16();
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| {
            extensions.set("code", code);
            extensions.set("status", status);
        })
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(_) => ServiceError::Conflict("User already exists.".into()),
            RepositoryError::Backend(err) => ServiceError::Internal(err.to_string()),
        }
    }
}
