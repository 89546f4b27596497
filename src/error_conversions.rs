//! Error conversion glue between layers.
//!
//! The domain, api and form layers know nothing about services; these impls
//! let services use `?` on all of them.

use crate::api::{ApiError, ApiErrorKind};
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ApiError> for ServiceError {
    fn from(val: ApiError) -> Self {
        match val.kind() {
            ApiErrorKind::NotFound => ServiceError::NotFound,
            ApiErrorKind::Unauthenticated => ServiceError::Unauthorized,
            _ => ServiceError::Api(val),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Validation(_) | FormError::InvalidData(_) => {
                ServiceError::Form(val.to_string())
            }
            FormError::DuplicateField(_) | FormError::UnknownField(_) => {
                ServiceError::Internal(val.to_string())
            }
        }
    }
}

impl From<regex::Error> for ServiceError {
    fn from(val: regex::Error) -> Self {
        ServiceError::Internal(format!("invalid route pattern: {val}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_by_kind() {
        let not_found = ServiceError::from(ApiError::new("gone", Some(404), "u"));
        assert!(matches!(not_found, ServiceError::NotFound));

        let login = ServiceError::from(ApiError::new("who", Some(401), "u"));
        assert!(matches!(login, ServiceError::Unauthorized));

        let server = ServiceError::from(ApiError::new("boom", Some(502), "u"));
        assert!(matches!(server, ServiceError::Api(err) if err.status == Some(502)));
    }

    #[test]
    fn broken_form_declarations_are_internal() {
        let err = ServiceError::from(FormError::DuplicateField("name".to_string()));
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
