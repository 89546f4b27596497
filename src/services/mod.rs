//! Use cases behind the HTTP handlers, generic over the [`crate::api::Api`]
//! seam so they run against [`crate::api::mock::MockApi`] in tests.

use thiserror::Error;

use crate::api::ApiError;

pub mod auth;
pub mod dashboard;
pub mod loader;
pub mod public;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    #[error("backend error: {0}")]
    Api(ApiError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
