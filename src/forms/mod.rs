//! Field-driven forms: descriptors, the submission engine, sign-in and uploads.

use thiserror::Error;
use validator::ValidationErrors;

pub mod engine;
pub mod field;
pub mod login;
#[cfg(feature = "server")]
pub mod upload;

#[derive(Debug, Error)]
/// Errors that can occur when building or processing a form.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("field `{0}` is declared twice")]
    DuplicateField(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("invalid form data: {0}")]
    InvalidData(String),
}
