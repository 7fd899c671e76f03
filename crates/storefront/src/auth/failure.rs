//! Auth failure taxonomy and provider error classification.

use thiserror::Error;

use super::ProviderError;

/// Which form was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAttempt {
    SignIn,
    SignUp,
}

impl AuthAttempt {
    const fn noun(self) -> &'static str {
        match self {
            Self::SignIn => "login",
            Self::SignUp => "signup",
        }
    }
}

/// A failed auth attempt. `Display` is the message shown on the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Invalid email or password. Please check your credentials and try again.")]
    InvalidCredentials,

    #[error(
        "Please check your email and click the confirmation link before signing in. If you didn't receive the email, try signing up again."
    )]
    EmailNotConfirmed,

    #[error("Too many {} attempts. Please wait a moment before trying again.", .0.noun())]
    RateLimited(AuthAttempt),

    #[error("An account with this email already exists. Try signing in instead.")]
    AlreadyRegistered,

    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("A request is already in progress. Please wait.")]
    Busy,

    #[error("An unexpected error occurred. Please try again.")]
    Unexpected,

    /// Provider text with no specific mapping, shown as-is.
    #[error("{0}")]
    Other(String),
}

impl AuthFailure {
    /// Map a provider error to the failure shown for `attempt`.
    #[must_use]
    pub fn classify(attempt: AuthAttempt, err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(_) => Self::Unexpected,
            ProviderError::Rejected(text) if text.trim().is_empty() => Self::Unexpected,
            ProviderError::Rejected(text) => match attempt {
                AuthAttempt::SignIn => Self::classify_sign_in(text),
                AuthAttempt::SignUp => Self::classify_sign_up(text),
            },
        }
    }

    fn classify_sign_in(text: String) -> Self {
        if text.contains("Email not confirmed") {
            Self::EmailNotConfirmed
        } else if text.contains("Invalid login credentials") {
            Self::InvalidCredentials
        } else if text.contains("rate limit") {
            Self::RateLimited(AuthAttempt::SignIn)
        } else {
            Self::Other(text)
        }
    }

    fn classify_sign_up(text: String) -> Self {
        if text.contains("rate limit") || text.contains("email_send_rate_limit") {
            Self::RateLimited(AuthAttempt::SignUp)
        } else if text.contains("User already registered") {
            Self::AlreadyRegistered
        } else if text.contains("Invalid email") {
            Self::InvalidEmail
        } else {
            Self::Other(text)
        }
    }

    /// Whether the form should flip to sign-in mode after this failure.
    #[must_use]
    pub const fn switches_to_sign_in(&self) -> bool {
        matches!(self, Self::AlreadyRegistered)
    }

    /// Whether the failure came from local validation, before any remote call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::PasswordTooShort | Self::PasswordMismatch | Self::InvalidEmail | Self::Busy
        )
    }
}
