//! In-memory demo backend with a seeded catalog and accounts.
//!
//! Mirrors the hosted service's observable behavior closely enough for
//! local runs and end-to-end tests: the same error texts, a pending
//! (unconfirmed) account, per-user cart rows keyed by access token, and
//! optional artificial latency on auth calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use medplus_core::{Category, Email, Product, ProductId, UserId, stable_uuid};

use super::{BackendError, seed};
use crate::auth::{AuthProvider, AuthSession, ProviderError, SignUpOutcome};
use crate::cart::{CartOwner, CartSync};
use crate::catalog::CatalogSource;
use crate::models::CurrentUser;

/// Confirmed demo account.
pub const DEMO_USER_EMAIL: &str = "demo@medplus.test";

/// Account that signed up but never confirmed its email.
pub const PENDING_USER_EMAIL: &str = "pending@medplus.test";

/// Password of both seeded accounts.
pub const DEMO_PASSWORD: &str = "medplus123";

#[derive(Debug, Clone)]
struct DemoAccount {
    id: UserId,
    display_name: String,
    email: Email,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct DemoState {
    /// Keyed by lowercased email.
    accounts: HashMap<String, DemoAccount>,
    /// Access token -> account.
    tokens: HashMap<String, UserId>,
    /// Mirrored cart rows per user, in insertion order.
    carts: HashMap<UserId, Vec<(ProductId, u32)>>,
}

/// Seeded backend living entirely in memory.
///
/// Clones share accounts, tokens and cart rows.
#[derive(Clone)]
pub struct DemoBackend {
    inner: Arc<DemoBackendInner>,
    auth_latency: Duration,
}

struct DemoBackendInner {
    products: Vec<Product>,
    categories: Vec<Category>,
    state: Mutex<DemoState>,
    offline: AtomicBool,
}

fn account_key(email: &Email) -> String {
    email.as_str().to_lowercase()
}

fn unavailable() -> BackendError {
    BackendError::Api {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

impl DemoBackend {
    /// A backend with the seeded catalog and the two seeded accounts.
    #[must_use]
    pub fn seeded() -> Self {
        let mut state = DemoState::default();
        for (email, name, confirmed) in [
            (DEMO_USER_EMAIL, "Demo Shopper", true),
            (PENDING_USER_EMAIL, "Pending Shopper", false),
        ] {
            let Ok(email) = Email::parse(email) else {
                continue;
            };
            state.accounts.insert(
                account_key(&email),
                DemoAccount {
                    id: UserId::new(stable_uuid(&format!("medplus:user:{email}"))),
                    display_name: name.to_string(),
                    email,
                    password: DEMO_PASSWORD.to_string(),
                    confirmed,
                },
            );
        }

        Self {
            inner: Arc::new(DemoBackendInner {
                products: seed::products(),
                categories: seed::categories(),
                state: Mutex::new(state),
                offline: AtomicBool::new(false),
            }),
            auth_latency: Duration::ZERO,
        }
    }

    /// Delay every sign-in and sign-up answer by `latency`.
    #[must_use]
    pub const fn with_auth_latency(mut self, latency: Duration) -> Self {
        self.auth_latency = latency;
        self
    }

    /// Simulate an outage: every call fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Mirrored cart rows for `user_id`.
    #[must_use]
    pub fn mirrored_cart(&self, user_id: UserId) -> Vec<(ProductId, u32)> {
        self.inner
            .lock()
            .carts
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Id of the account registered under `email`.
    #[must_use]
    pub fn account_id(&self, email: &str) -> Option<UserId> {
        let email = Email::parse(email).ok()?;
        self.inner
            .lock()
            .accounts
            .get(&account_key(&email))
            .map(|account| account.id)
    }

    fn is_offline(&self) -> bool {
        self.inner.offline.load(Ordering::SeqCst)
    }

    async fn auth_delay(&self) {
        if !self.auth_latency.is_zero() {
            tokio::time::sleep(self.auth_latency).await;
        }
    }

    /// Check that `owner`'s token belongs to `owner`.
    fn authorize(state: &DemoState, owner: &CartOwner) -> Result<(), BackendError> {
        match state.tokens.get(owner.access_token.expose_secret()) {
            Some(user_id) if *user_id == owner.user_id => Ok(()),
            _ => Err(BackendError::Api {
                status: 401,
                message: "JWT expired".to_string(),
            }),
        }
    }
}

impl DemoBackendInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogSource for DemoBackend {
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        if self.is_offline() {
            return Err(unavailable());
        }
        Ok(self.inner.products.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        if self.is_offline() {
            return Err(unavailable());
        }
        Ok(self.inner.categories.clone())
    }
}

#[async_trait]
impl AuthProvider for DemoBackend {
    #[instrument(skip(self, email, password))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, ProviderError> {
        self.auth_delay().await;
        if self.is_offline() {
            return Err(ProviderError::Unavailable("demo backend offline".to_string()));
        }

        let mut state = self.inner.lock();
        let account = state
            .accounts
            .get(&account_key(email))
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("Invalid login credentials".to_string()))?;
        if !account.confirmed {
            return Err(ProviderError::Rejected("Email not confirmed".to_string()));
        }

        let token = uuid::Uuid::new_v4().to_string();
        state.tokens.insert(token.clone(), account.id);

        Ok(AuthSession {
            user: CurrentUser::new(account.id, Some(&account.display_name), account.email),
            access_token: SecretString::from(token),
        })
    }

    #[instrument(skip(self, email, password, display_name))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, ProviderError> {
        self.auth_delay().await;
        if self.is_offline() {
            return Err(ProviderError::Unavailable("demo backend offline".to_string()));
        }

        let mut state = self.inner.lock();
        let key = account_key(email);
        if state.accounts.contains_key(&key) {
            return Err(ProviderError::Rejected("User already registered".to_string()));
        }

        let id = UserId::random();
        state.accounts.insert(
            key,
            DemoAccount {
                id,
                display_name: display_name.to_string(),
                email: email.clone(),
                password: password.to_string(),
                // No mail goes out from the demo; accounts are usable at once.
                confirmed: true,
            },
        );

        Ok(SignUpOutcome {
            user_id: Some(id),
            confirmation_required: false,
        })
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), ProviderError> {
        if self.is_offline() {
            return Err(ProviderError::Unavailable("demo backend offline".to_string()));
        }
        self.inner.lock().tokens.remove(access_token.expose_secret());
        Ok(())
    }
}

#[async_trait]
impl CartSync for DemoBackend {
    async fn upsert_line(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        if self.is_offline() {
            return Err(unavailable());
        }
        let mut state = self.inner.lock();
        Self::authorize(&state, owner)?;

        let rows = state.carts.entry(owner.user_id).or_default();
        match rows.iter_mut().find(|(id, _)| *id == product_id) {
            Some(row) => row.1 = quantity,
            None => rows.push((product_id, quantity)),
        }
        Ok(())
    }

    async fn delete_line(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        if self.is_offline() {
            return Err(unavailable());
        }
        let mut state = self.inner.lock();
        Self::authorize(&state, owner)?;

        if let Some(rows) = state.carts.get_mut(&owner.user_id) {
            rows.retain(|(id, _)| *id != product_id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_account_signs_in() {
        let backend = DemoBackend::seeded();

        let session = backend
            .sign_in(&email(DEMO_USER_EMAIL), DEMO_PASSWORD)
            .await
            .unwrap();

        assert_eq!(session.user.display_name, "Demo Shopper");
        assert_eq!(backend.account_id(DEMO_USER_EMAIL), Some(session.user.id));
        assert_eq!(backend.account_id("nobody@example.com"), None);
    }

    #[tokio::test]
    async fn test_sign_in_error_texts() {
        let backend = DemoBackend::seeded();

        let wrong = backend
            .sign_in(&email(DEMO_USER_EMAIL), "nope")
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), "Invalid login credentials");

        let pending = backend
            .sign_in(&email(PENDING_USER_EMAIL), DEMO_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(pending.to_string(), "Email not confirmed");
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let backend = DemoBackend::seeded();
        let new = email("new.shopper@example.com");

        let outcome = backend.sign_up(&new, "hunter22", "New Shopper").await.unwrap();
        assert!(outcome.user_id.is_some());

        let again = backend.sign_up(&new, "hunter22", "").await.unwrap_err();
        assert_eq!(again.to_string(), "User already registered");

        let session = backend.sign_in(&new, "hunter22").await.unwrap();
        assert_eq!(session.user.display_name, "New Shopper");
    }

    #[tokio::test]
    async fn test_cart_mirror_requires_live_token() {
        let backend = DemoBackend::seeded();
        let session = backend
            .sign_in(&email(DEMO_USER_EMAIL), DEMO_PASSWORD)
            .await
            .unwrap();
        let owner = CartOwner {
            user_id: session.user.id,
            access_token: session.access_token.clone(),
        };
        let product = seed::product_id("paracetamol-500");

        backend.upsert_line(&owner, product, 1).await.unwrap();
        backend.upsert_line(&owner, product, 3).await.unwrap();
        assert_eq!(backend.mirrored_cart(owner.user_id), vec![(product, 3)]);

        backend.sign_out(&session.access_token).await.unwrap();
        let err = backend.delete_line(&owner, product).await.unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 401, .. }));
        assert_eq!(backend.mirrored_cart(owner.user_id), vec![(product, 3)]);
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let backend = DemoBackend::seeded();
        backend.set_offline(true);

        assert!(backend.fetch_products().await.is_err());
        assert!(backend.fetch_categories().await.is_err());
        assert!(matches!(
            backend.sign_in(&email(DEMO_USER_EMAIL), DEMO_PASSWORD).await,
            Err(ProviderError::Unavailable(_))
        ));

        backend.set_offline(false);
        assert_eq!(backend.fetch_products().await.unwrap().len(), seed::products().len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_latency() {
        let backend = DemoBackend::seeded().with_auth_latency(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        backend
            .sign_in(&email(DEMO_USER_EMAIL), DEMO_PASSWORD)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
