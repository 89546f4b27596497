//! Sign-in and session-wide data.

use crate::api::errors::body_message;
use crate::api::{Api, ApiErrorKind, QueryArgs};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::company::Company;
use crate::domain::context::SharedContext;
use crate::forms::login::LoginForm;
use crate::services::{ServiceError, ServiceResult};

pub const LOGIN_ENDPOINT: &str = "auth/login/";
pub const LOGOUT_ENDPOINT: &str = "auth/logout/";
pub const COMPANY_ENDPOINT: &str = "company/";

/// 470 is the backend's "credentials rejected" answer.
pub const LOGIN_EXPECTED: &[u16] = &[200, 470];
const LOGOUT_EXPECTED: &[u16] = &[200, 204];

const LOGIN_REJECTED: &str = "Incorrect email or password.";

/// Exchanges credentials for a backend token. Rejected credentials are not
/// an error: the backend's message lands in the shared error slot and
/// `None` is returned.
pub async fn login<A>(
    api: &A,
    form: &LoginForm,
    exp: usize,
    context: &mut SharedContext,
) -> ServiceResult<Option<AuthenticatedUser>>
where
    A: Api + ?Sized,
{
    let response = match api.post(LOGIN_ENDPOINT, Some(form.payload()), LOGIN_EXPECTED).await {
        Ok(response) => response,
        Err(err) if matches!(
            err.kind(),
            ApiErrorKind::Unauthenticated | ApiErrorKind::Validation
        ) =>
        {
            log::warn!("Login rejected with {:?}: {err}", err.status);
            context.set_error(LOGIN_REJECTED);
            return Ok(None);
        }
        Err(err) => {
            log::error!("Login request failed: {err}");
            context.set_error(err.message);
            return Ok(None);
        }
    };

    if !response.is_ok() {
        log::info!("Login for {} refused by the backend", form.email.trim());
        context.set_error(
            body_message(response.body()).unwrap_or_else(|| LOGIN_REJECTED.to_string()),
        );
        return Ok(None);
    }

    let user = AuthenticatedUser::from_login(response.body(), exp)?;
    log::info!("User {} signed in", user.sub);
    context.set_user(Some(user.clone()));
    Ok(Some(user))
}

/// Tells the backend to revoke the token. The local session is cleared
/// regardless of the outcome.
pub async fn logout<A>(api: &A)
where
    A: Api + ?Sized,
{
    if let Err(err) = api.post(LOGOUT_ENDPOINT, None, LOGOUT_EXPECTED).await {
        log::warn!("Failed to revoke token: {err}");
    }
}

pub async fn load_company<A>(api: &A) -> ServiceResult<Company>
where
    A: Api + ?Sized,
{
    let response = api.get(COMPANY_ENDPOINT, &QueryArgs::new()).await?;
    serde_json::from_value(response.into_body())
        .map_err(|err| ServiceError::Internal(format!("unreadable company settings: {err}")))
}
