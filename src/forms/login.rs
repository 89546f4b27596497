use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Credentials posted by the sign-in page.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Where to go after signing in.
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Body for the backend login endpoint.
    pub fn payload(&self) -> Value {
        json!({
            "email": self.email.trim(),
            "password": self.password,
        })
    }

    /// Local redirect target; anything pointing off-site falls back to `fallback`.
    pub fn next_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, next: Option<&str>) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
            next: next.map(str::to_string),
        }
    }

    #[test]
    fn validates_email_and_password() {
        assert!(form("ann@example.com", "secret", None).validate().is_ok());
        assert!(form("not-an-email", "secret", None).validate().is_err());
        assert!(form("ann@example.com", "", None).validate().is_err());
    }

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(form("a@b.co", "x", Some("/dashboard/users/")).next_or("/"), "/dashboard/users/");
        assert_eq!(form("a@b.co", "x", Some("//evil.example")).next_or("/"), "/");
        assert_eq!(form("a@b.co", "x", Some("https://evil.example")).next_or("/"), "/");
        assert_eq!(form("a@b.co", "x", None).next_or("/dashboard/"), "/dashboard/");
    }
}
