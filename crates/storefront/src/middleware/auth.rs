//! Authentication extractors and session helpers.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::htmx::{HX_REDIRECT, is_htmx};
use crate::auth::{AuthSession, SessionState};
use crate::models::CurrentUser;

/// Where unauthenticated shoppers are sent.
pub const LOGIN_PATH: &str = "/auth?mode=login";

/// Extractor that requires a signed-in user.
///
/// Page requests are redirected to the sign-in form; HTMX requests get an
/// `HX-Redirect` so the whole page navigates instead of swapping a fragment.
///
/// # Example
///
/// ```rust,ignore
/// async fn checkout(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to the sign-in form (full page requests).
    RedirectToLogin,
    /// Ask HTMX to navigate to the sign-in form.
    HxRedirectToLogin,
    /// No session layer; should not happen in a wired router.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::HxRedirectToLogin => {
                let mut response = StatusCode::UNAUTHORIZED.into_response();
                response
                    .headers_mut()
                    .insert(HX_REDIRECT, HeaderValue::from_static(LOGIN_PATH));
                response
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        match SessionState::load(session).await {
            SessionState::Authenticated(user) => Ok(Self(user)),
            SessionState::Anonymous if is_htmx(&parts.headers) => {
                Err(AuthRejection::HxRedirectToLogin)
            }
            SessionState::Anonymous => Err(AuthRejection::RedirectToLogin),
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => match SessionState::load(session).await {
                SessionState::Authenticated(user) => Some(user),
                SessionState::Anonymous => None,
            },
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store a successful sign-in in the session and tag Sentry with the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    SessionState::establish(session, auth).await?;
    crate::error::set_sentry_user(&auth.user.id, Some(auth.user.email.as_str()));
    Ok(())
}

/// Clear the signed-in user, token and cart from the session (sign-out).
///
/// Returns the access token that was stored, for revocation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<Option<secrecy::SecretString>, tower_sessions::session::Error> {
    let token = SessionState::end(session).await?;
    crate::error::clear_sentry_user();
    Ok(token)
}
