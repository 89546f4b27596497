//! Identity of the person using the site.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::TypeConstraintError;

/// Role required to open the administrative dashboard.
pub const STAFF_ROLE: &str = "staff";

/// Authenticated user together with the backend token used on their behalf.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Bearer token issued by the backend at login.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Builds the user from the backend login payload `{token, user: {...}}`.
    pub fn from_login(body: &Value, exp: usize) -> Result<Self, TypeConstraintError> {
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TypeConstraintError::UnexpectedShape("missing token".to_string()))?;
        let user = body
            .get("user")
            .and_then(Value::as_object)
            .ok_or_else(|| TypeConstraintError::UnexpectedShape("missing user".to_string()))?;

        let sub = match user.get("id") {
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(id)) => id.clone(),
            _ => return Err(TypeConstraintError::UnexpectedShape("missing user id".to_string())),
        };
        let email = user
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let name = user
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&email)
            .to_string();

        let mut roles: Vec<String> = user
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if user.get("is_staff").and_then(Value::as_bool) == Some(true)
            && !roles.iter().any(|role| role == STAFF_ROLE)
        {
            roles.push(STAFF_ROLE.to_string());
        }

        Ok(Self {
            sub,
            email,
            name,
            roles,
            token: token.to_string(),
            exp,
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn login_payload_maps_staff_flag_to_role() {
        let body = json!({
            "token": "abc",
            "user": {"id": 9, "email": "ann@example.com", "name": "Ann", "is_staff": true}
        });
        let user = AuthenticatedUser::from_login(&body, 100).unwrap();
        assert_eq!(user.sub, "9");
        assert_eq!(user.token, "abc");
        assert!(user.has_role(STAFF_ROLE));
    }

    #[test]
    fn login_payload_without_token_is_rejected() {
        let body = json!({"user": {"id": 1}});
        assert!(AuthenticatedUser::from_login(&body, 0).is_err());
    }
}
