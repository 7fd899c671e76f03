//! Authentication route handlers.
//!
//! One page serves both sign-in and sign-up (`?mode=login|register`).
//! Failures re-render the form inline with the shopper's name and email
//! kept: as a full page (200) for plain posts, as the form fragment (422)
//! for HTMX. Successes navigate away with a flash notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::auth::{AuthFailure, AuthForm, AuthMode, SessionState};
use crate::components::AuthFormView;
use crate::error::Result;
use crate::filters;
use crate::middleware::{
    CspNonce, HxRequest, LOGIN_PATH, OptionalAuth, clear_current_user, navigate, set_current_user,
};
use crate::models::Flash;
use crate::state::AppState;

/// Password reset is handled by support for now.
pub const PASSWORD_RESET_NOTICE: &str = "Please contact support for password reset assistance.";

/// Query parameters for the auth page.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub mode: AuthMode,
}

/// Auth page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/page.html")]
pub struct AuthPageTemplate {
    pub layout: Layout,
    pub form: AuthFormView,
}

/// Auth form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/auth_form.html")]
pub struct AuthFormTemplate {
    pub form: AuthFormView,
}

/// Display the sign-in or sign-up form.
///
/// Signed-in shoppers are sent home.
#[instrument(skip(session, nonce, user))]
pub async fn page(
    session: Session,
    nonce: CspNonce,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    AuthPageTemplate {
        form: AuthFormView::new(query.mode, None, None),
        layout: Layout::load(&session, nonce).await,
    }
    .into_response()
}

/// Handle sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, nonce, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    HxRequest(htmx): HxRequest,
    Form(form): Form<AuthForm>,
) -> Result<Response> {
    match state.auth().sign_in(&form).await {
        Ok(auth) => {
            set_current_user(&session, &auth).await?;
            tracing::info!(user_id = %auth.user.id, "Signed in");
            Flash::new("Welcome back!", "You have successfully signed in.")
                .push(&session)
                .await;
            Ok(navigate(htmx, "/"))
        }
        Err(failure) => {
            Ok(render_failure(&session, nonce, htmx, AuthMode::SignIn, &form, &failure).await)
        }
    }
}

/// Handle sign-up.
///
/// The shopper stays signed out and lands on the sign-in form.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, nonce, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    HxRequest(htmx): HxRequest,
    Form(form): Form<AuthForm>,
) -> Result<Response> {
    match state.auth().sign_up(&form).await {
        Ok(outcome) => {
            tracing::info!(
                user_id = ?outcome.user_id,
                confirmation_required = outcome.confirmation_required,
                "Account created"
            );
            Flash::new(
                "Account created!",
                "Please check your email to verify your account before signing in.",
            )
            .push(&session)
            .await;
            Ok(navigate(htmx, LOGIN_PATH))
        }
        Err(failure) => {
            Ok(render_failure(&session, nonce, htmx, AuthMode::SignUp, &form, &failure).await)
        }
    }
}

/// Handle sign-out: revoke the token, clear the user and the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    HxRequest(htmx): HxRequest,
) -> Result<Response> {
    let was_signed_in = SessionState::load(&session).await.is_authenticated();
    let token = clear_current_user(&session).await?;
    state.auth().sign_out(token.as_ref()).await;

    if was_signed_in {
        tracing::info!("Signed out");
    }
    Ok(navigate(htmx, "/"))
}

/// "Forgot your password?": no reset flow yet, show the support notice.
#[instrument(skip(session))]
pub async fn forgot_password(session: Session, HxRequest(htmx): HxRequest) -> Response {
    Flash::new("Password reset", PASSWORD_RESET_NOTICE)
        .push(&session)
        .await;
    navigate(htmx, LOGIN_PATH)
}

async fn render_failure(
    session: &Session,
    nonce: CspNonce,
    htmx: bool,
    mode: AuthMode,
    form: &AuthForm,
    failure: &AuthFailure,
) -> Response {
    if failure.is_local() {
        tracing::debug!(?mode, "Auth form rejected: {failure}");
    } else {
        tracing::warn!(?mode, "Auth attempt failed: {failure}");
    }

    let form = AuthFormView::new(mode, Some(form), Some(failure));
    if htmx {
        return (StatusCode::UNPROCESSABLE_ENTITY, AuthFormTemplate { form }).into_response();
    }

    AuthPageTemplate {
        form,
        layout: Layout::load(session, nonce).await,
    }
    .into_response()
}
