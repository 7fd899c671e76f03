//! Auth session gateway.
//!
//! Wraps sign-in, sign-up and sign-out on an injected [`AuthProvider`],
//! turns provider error text into [`AuthFailure`]s with shopper-facing
//! messages, and rejects a second submission for the same email while one
//! is in flight.
//!
//! # Flow
//!
//! ```text
//! POST /auth/login     -> AuthGateway::sign_in  -> SessionState::Authenticated
//! POST /auth/register  -> AuthGateway::sign_up  -> stays Anonymous, back to sign-in
//! POST /auth/logout    -> AuthGateway::sign_out -> SessionState::Anonymous
//! ```

mod failure;
mod gateway;
mod session;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use medplus_core::{Email, UserId};

use crate::backend::BackendError;
use crate::models::CurrentUser;

pub use failure::{AuthAttempt, AuthFailure};
pub use gateway::{AuthForm, AuthGateway, AuthMode, MIN_PASSWORD_LENGTH, SubmitGuard, SubmitPermit};
pub use session::{SessionState, access_token, cart_owner};

/// Identity provider operations.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, ProviderError>;

    /// Create an account. The account usually needs email confirmation
    /// before it can sign in.
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, ProviderError>;

    /// Revoke an access token.
    async fn sign_out(&self, access_token: &SecretString) -> Result<(), ProviderError>;
}

/// A signed-in session returned by the provider.
#[derive(Clone)]
pub struct AuthSession {
    pub user: CurrentUser,
    pub access_token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Account ID, when the provider reveals it.
    pub user_id: Option<UserId>,
    /// Whether the provider sent a confirmation email.
    pub confirmation_required: bool,
}

/// Errors from an [`AuthProvider`].
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The service answered with an error; carries its raw text.
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or answered garbage.
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

impl From<BackendError> for ProviderError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api { message, .. } => Self::Rejected(message),
            BackendError::RateLimited(_) => Self::Rejected("Request rate limit reached".to_string()),
            BackendError::Http(e) => Self::Unavailable(e.to_string()),
            BackendError::Parse(e) => Self::Unavailable(e.to_string()),
        }
    }
}
