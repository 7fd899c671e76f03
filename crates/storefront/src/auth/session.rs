//! Anonymous/authenticated state kept in the session record.

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use super::AuthSession;
use crate::cart::{CartOwner, clear_cart};
use crate::models::{CurrentUser, session_keys};

/// Who the session belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(CurrentUser),
}

impl SessionState {
    /// Read the state from the session. Unreadable entries count as anonymous.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .map_or(Self::Anonymous, Self::Authenticated)
    }

    /// Store a fresh sign-in. The session id is rotated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn establish(
        session: &Session,
        auth: &AuthSession,
    ) -> Result<Self, tower_sessions::session::Error> {
        session.cycle_id().await?;
        session.insert(session_keys::CURRENT_USER, &auth.user).await?;
        session
            .insert(session_keys::ACCESS_TOKEN, auth.access_token.expose_secret())
            .await?;
        Ok(Self::Authenticated(auth.user.clone()))
    }

    /// Forget the user, the token and the cart.
    ///
    /// Returns the access token that was stored, so it can be revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn end(session: &Session) -> Result<Option<SecretString>, tower_sessions::session::Error> {
        let token = access_token(session).await;
        session
            .remove::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        session.remove::<String>(session_keys::ACCESS_TOKEN).await?;
        clear_cart(session).await?;
        session.cycle_id().await?;
        Ok(token)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// The stored provider access token, if signed in.
pub async fn access_token(session: &Session) -> Option<SecretString> {
    session
        .get::<String>(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
        .map(SecretString::from)
}

/// The cart owner for mirrored carts, if signed in.
pub async fn cart_owner(session: &Session) -> Option<CartOwner> {
    let SessionState::Authenticated(user) = SessionState::load(session).await else {
        return None;
    };
    let access_token = access_token(session).await?;
    Some(CartOwner {
        user_id: user.id,
        access_token,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use medplus_core::{Email, Price, ProductId, UserId};

    use super::*;
    use crate::cart::{Cart, CartProduct, load_cart, save_cart};

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn auth() -> AuthSession {
        AuthSession {
            user: CurrentUser::new(
                UserId::random(),
                Some("Asha"),
                Email::parse("asha@example.com").unwrap(),
            ),
            access_token: SecretString::from("token-123"),
        }
    }

    #[tokio::test]
    async fn test_fresh_session_is_anonymous() {
        let session = session();
        let state = SessionState::load(&session).await;
        assert_eq!(state, SessionState::Anonymous);
        assert!(state.user().is_none());
        assert!(cart_owner(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_establish_then_end() {
        let session = session();
        let auth = auth();

        let state = SessionState::establish(&session, &auth).await.unwrap();
        assert!(state.is_authenticated());
        assert_eq!(SessionState::load(&session).await, state);

        let owner = cart_owner(&session).await.unwrap();
        assert_eq!(owner.user_id, auth.user.id);
        assert_eq!(owner.access_token.expose_secret(), "token-123");

        let mut cart = Cart::new();
        cart.add(CartProduct {
            id: ProductId::random(),
            name: "Cetirizine 10mg".to_string(),
            brand: "Zyrtec".to_string(),
            price: Price::from_rupees(35),
            image_url: "/static/images/placeholder.svg".to_string(),
            requires_prescription: false,
        });
        save_cart(&session, &cart).await.unwrap();

        let token = SessionState::end(&session).await.unwrap();
        assert_eq!(token.unwrap().expose_secret(), "token-123");
        assert_eq!(SessionState::load(&session).await, SessionState::Anonymous);
        assert!(load_cart(&session).await.is_empty());
        assert!(access_token(&session).await.is_none());
    }
}
