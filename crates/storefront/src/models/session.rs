//! Session-related types.
//!
//! Types stored in the session for authentication state and one-shot
//! notices.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use medplus_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user. The
/// provider access token is kept under its own key (see
/// [`keys::ACCESS_TOKEN`]) so this struct can be logged and rendered freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account ID at the identity provider.
    pub id: UserId,
    /// Name shown in the navigation greeting.
    pub display_name: String,
    /// User's email address.
    pub email: Email,
}

impl CurrentUser {
    /// Create a session user, falling back to the email's local part when
    /// the account has no name.
    #[must_use]
    pub fn new(id: UserId, display_name: Option<&str>, email: Email) -> Self {
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| email.local_part().to_string(), str::to_string);
        Self {
            id,
            display_name,
            email,
        }
    }
}

/// A one-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub title: String,
    pub description: String,
}

impl Flash {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Queue a flash for the next page render.
    pub async fn push(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, &self).await {
            tracing::warn!("Failed to store flash message: {e}");
        }
    }

    /// Take the queued flash, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the identity provider access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let email = Email::parse("asha.rao@example.com").unwrap();
        let user = CurrentUser::new(UserId::random(), Some("   "), email.clone());
        assert_eq!(user.display_name, "asha.rao");

        let user = CurrentUser::new(UserId::random(), Some(" Asha Rao "), email);
        assert_eq!(user.display_name, "Asha Rao");
    }
}
