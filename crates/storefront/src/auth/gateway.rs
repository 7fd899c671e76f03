//! Sign-in, sign-up and sign-out over an [`AuthProvider`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use medplus_core::Email;

use super::failure::{AuthAttempt, AuthFailure};
use super::{AuthProvider, AuthSession, SignUpOutcome};

/// Shortest accepted sign-up password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Which variant of the auth form is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AuthMode {
    #[default]
    #[serde(rename = "login")]
    SignIn,
    #[serde(rename = "register")]
    SignUp,
}

impl AuthMode {
    /// Query-string value for this mode.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::SignIn => "login",
            Self::SignUp => "register",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

/// Auth form submission.
///
/// `Debug` redacts both password fields.
#[derive(Clone, Default, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl std::fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

/// Set of emails with a submission in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held while a submission runs; releases the email on drop.
#[derive(Debug)]
pub struct SubmitPermit {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SubmitGuard {
    /// Claim `key`, or `None` if a submission for it is already running.
    #[must_use]
    pub fn try_begin(&self, key: &str) -> Option<SubmitPermit> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.insert(key.to_string()).then(|| SubmitPermit {
            key: key.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Whether a submission for `key` is running.
    #[must_use]
    pub fn is_busy(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Mailboxes differing only in case share one in-flight slot.
fn submit_key(email: &Email) -> String {
    email.as_str().to_lowercase()
}

/// Auth operations with validation and failure classification.
#[derive(Clone)]
pub struct AuthGateway {
    provider: Arc<dyn AuthProvider>,
    guard: SubmitGuard,
}

impl AuthGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            guard: SubmitGuard::default(),
        }
    }

    /// Sign in with the submitted email and password.
    ///
    /// # Errors
    ///
    /// Returns the classified `AuthFailure`; the session stays anonymous.
    #[instrument(skip(self, form))]
    pub async fn sign_in(&self, form: &AuthForm) -> Result<AuthSession, AuthFailure> {
        let email = Email::parse(&form.email).map_err(|_| AuthFailure::InvalidEmail)?;
        let _permit = self
            .guard
            .try_begin(&submit_key(&email))
            .ok_or(AuthFailure::Busy)?;

        match self.provider.sign_in(&email, &form.password).await {
            Ok(session) => {
                tracing::info!(email = %email.masked(), user_id = %session.user.id, "Sign-in succeeded");
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(email = %email.masked(), "Sign-in rejected: {e}");
                Err(AuthFailure::classify(AuthAttempt::SignIn, e))
            }
        }
    }

    /// Create an account.
    ///
    /// The password length is checked before anything leaves the server.
    ///
    /// # Errors
    ///
    /// Returns the classified `AuthFailure`.
    #[instrument(skip(self, form))]
    pub async fn sign_up(&self, form: &AuthForm) -> Result<SignUpOutcome, AuthFailure> {
        if form.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthFailure::PasswordTooShort);
        }
        if form
            .confirm_password
            .as_ref()
            .is_some_and(|confirm| *confirm != form.password)
        {
            return Err(AuthFailure::PasswordMismatch);
        }
        let email = Email::parse(&form.email).map_err(|_| AuthFailure::InvalidEmail)?;
        let _permit = self
            .guard
            .try_begin(&submit_key(&email))
            .ok_or(AuthFailure::Busy)?;

        let display_name = form.name.as_deref().map_or("", str::trim);
        match self
            .provider
            .sign_up(&email, &form.password, display_name)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    email = %email.masked(),
                    confirmation_required = outcome.confirmation_required,
                    "Sign-up succeeded"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(email = %email.masked(), "Sign-up rejected: {e}");
                Err(AuthFailure::classify(AuthAttempt::SignUp, e))
            }
        }
    }

    /// Revoke the provider session. Always succeeds from the shopper's
    /// point of view; provider failures are only logged.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: Option<&SecretString>) {
        let Some(token) = access_token else {
            return;
        };
        if let Err(e) = self.provider.sign_out(token).await {
            tracing::warn!("Provider sign-out failed, continuing: {e}");
        }
    }
}
