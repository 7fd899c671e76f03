//! Combined sign-in / sign-up form.

use crate::auth::{AuthFailure, AuthForm, AuthMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFormView {
    pub mode: AuthMode,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub card_title: &'static str,
    pub submit_label: &'static str,
    /// Swapped in for the submit label while a request is in flight.
    pub busy_label: &'static str,
    /// Prompt and link that switch to the other mode.
    pub toggle_prompt: &'static str,
    pub toggle_label: &'static str,
    pub toggle_href: String,
    pub action: &'static str,
    /// Name and confirm-password fields.
    pub show_signup_fields: bool,
    pub show_forgot_password: bool,
    /// Echoed back after a failed submit; passwords never are.
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

impl AuthFormView {
    /// The form for `mode`, re-filled from a failed `submitted` form.
    ///
    /// An "already registered" failure flips the form to sign-in.
    #[must_use]
    pub fn new(mode: AuthMode, submitted: Option<&AuthForm>, failure: Option<&AuthFailure>) -> Self {
        let mode = if failure.is_some_and(AuthFailure::switches_to_sign_in) {
            AuthMode::SignIn
        } else {
            mode
        };
        let sign_in = mode == AuthMode::SignIn;

        Self {
            mode,
            title: if sign_in {
                "Sign in to your account"
            } else {
                "Create your account"
            },
            subtitle: if sign_in {
                "Welcome back to MedPlus"
            } else {
                "Join MedPlus today"
            },
            card_title: if sign_in { "Sign In" } else { "Sign Up" },
            submit_label: if sign_in { "Sign In" } else { "Sign Up" },
            busy_label: "Please wait...",
            toggle_prompt: if sign_in {
                "Don't have an account?"
            } else {
                "Already have an account?"
            },
            toggle_label: if sign_in { "Sign up" } else { "Sign in" },
            toggle_href: format!("/auth?mode={}", mode.toggled().as_query()),
            action: if sign_in { "/auth/login" } else { "/auth/register" },
            show_signup_fields: !sign_in,
            show_forgot_password: sign_in,
            name: submitted
                .and_then(|form| form.name.clone())
                .unwrap_or_default(),
            email: submitted.map(|form| form.email.trim().to_string()).unwrap_or_default(),
            error: failure.map(ToString::to_string),
        }
    }
}
