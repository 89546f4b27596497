//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! non-empty names) so that once a value reaches the domain layer it can be
//! treated as trusted.
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// A JSON payload did not have the expected shape.
    #[error("unexpected payload: {0}")]
    UnexpectedShape(String),
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i64` backing this identifier.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Reads an identifier from a JSON number or numeric string.
            pub fn from_json(value: &Value) -> Result<Self, TypeConstraintError> {
                let raw = match value {
                    Value::Number(number) => number.as_i64(),
                    Value::String(text) => text.trim().parse::<i64>().ok(),
                    _ => None,
                };
                match raw {
                    Some(raw) => Self::new(raw),
                    None => Err(TypeConstraintError::InvalidValue(value.to_string())),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let raw = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| TypeConstraintError::InvalidValue(value.to_string()))?;
                Self::new(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(EntityId, "Identifier of a backend entity (event, category, user, ...).");
id_newtype!(UserId, "Identifier of an authenticated platform user.");

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn entity_id_rejects_non_positive_values() {
        assert_eq!(EntityId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(EntityId::new(-4), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(EntityId::new(7).map(EntityId::get), Ok(7));
    }

    #[test]
    fn entity_id_reads_numbers_and_numeric_strings() {
        assert_eq!(EntityId::from_json(&json!(5)).map(i64::from), Ok(5));
        assert_eq!(EntityId::from_json(&json!(" 12 ")).map(i64::from), Ok(12));
        assert!(EntityId::from_json(&json!("abc")).is_err());
        assert!(EntityId::from_json(&json!(null)).is_err());
        assert_eq!("33/".trim_end_matches('/').parse::<EntityId>().map(i64::from), Ok(33));
    }

    #[test]
    fn non_empty_string_trims() {
        assert_eq!(NonEmptyString::new("  Fete ").unwrap().as_str(), "Fete");
        assert_eq!(
            NonEmptyString::new("   "),
            Err(TypeConstraintError::EmptyString)
        );
    }
}
