//! Session token carrying the signed-in user between requests.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, error, web};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;

/// Expiry timestamp for a session starting now.
pub fn session_expiry(hours: u64) -> usize {
    let seconds = i64::try_from(hours.saturating_mul(3600)).unwrap_or(i64::MAX);
    usize::try_from(Utc::now().timestamp().saturating_add(seconds)).unwrap_or(usize::MAX)
}

pub fn encode_session(
    user: &AuthenticatedUser,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        user,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_session(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let identity = req
        .get_identity()
        .map_err(|_| error::ErrorUnauthorized("not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| error::ErrorUnauthorized("not signed in"))?;

    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| error::ErrorInternalServerError("server config is missing"))?;

    decode_session(&token, &config.secret).map_err(|err| {
        log::info!("Rejected session token: {err}");
        error::ErrorUnauthorized("session expired")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(exp: usize) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "4".to_string(),
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
            roles: vec!["staff".to_string()],
            token: "backend-token".to_string(),
            exp,
        }
    }

    #[test]
    fn session_token_keeps_the_backend_token() {
        let token = encode_session(&user(session_expiry(1)), "secret").unwrap();
        let decoded = decode_session(&token, "secret").unwrap();
        assert_eq!(decoded.token, "backend-token");
        assert!(decode_session(&token, "other").is_err());
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let token = encode_session(&user(1), "secret").unwrap();
        assert!(decode_session(&token, "secret").is_err());
    }
}
