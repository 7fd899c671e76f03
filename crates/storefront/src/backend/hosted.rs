//! Hosted database/auth service client.
//!
//! Talks to a Supabase-compatible deployment: PostgREST under `/rest/v1`
//! for products, categories and cart rows, GoTrue under `/auth/v1` for
//! accounts. Every request carries the anon key as `apikey`; the bearer is
//! the anon key for public reads and the user's access token for their own
//! rows and for sign-out.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use medplus_core::{Category, Email, Product, ProductId, UserId};

use super::BackendError;
use crate::auth::{AuthProvider, AuthSession, ProviderError, SignUpOutcome};
use crate::cart::{CartOwner, CartSync};
use crate::catalog::CatalogSource;
use crate::config::BackendConfig;
use crate::models::CurrentUser;

/// Keys GoTrue and PostgREST use for error text, in lookup order.
const ERROR_TEXT_KEYS: [&str; 4] = ["error_description", "msg", "message", "error"];

/// Client for the hosted backend.
#[derive(Clone)]
pub struct HostedBackend {
    inner: Arc<HostedBackendInner>,
}

struct HostedBackendInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: ServiceUser,
}

#[derive(Debug, Deserialize)]
struct ServiceUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

/// Sign-up answers with a bare user while confirmation is pending, or with
/// a full session when the project auto-confirms.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    user: Option<ServiceUser>,
}

impl HostedBackend {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HostedBackendInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Attach the `apikey` header and a bearer (the anon key when `bearer`
    /// is `None`).
    fn authorize(&self, request: RequestBuilder, bearer: Option<&SecretString>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.inner.anon_key);
        request
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_text(&body).unwrap_or_else(|| format!("HTTP {status}")),
            });
        }

        Ok(body)
    }

    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }
}

/// Pull the human-readable message out of an error body.
fn error_text(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ERROR_TEXT_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn session_user(user: ServiceUser, fallback_email: &Email) -> CurrentUser {
    let email = user
        .email
        .as_deref()
        .and_then(|raw| Email::parse(raw).ok())
        .unwrap_or_else(|| fallback_email.clone());
    let full_name = user.user_metadata.and_then(|metadata| metadata.full_name);
    CurrentUser::new(user.id, full_name.as_deref(), email)
}

#[async_trait]
impl CatalogSource for HostedBackend {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let request = self
            .inner
            .client
            .get(self.endpoint("/rest/v1/products"))
            .query(&[
                ("select", "*,categories(name,icon)"),
                ("order", "created_at.desc"),
            ]);
        self.execute_json(self.authorize(request, None)).await
    }

    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        let request = self
            .inner
            .client
            .get(self.endpoint("/rest/v1/categories"))
            .query(&[("select", "*"), ("order", "name.asc")]);
        self.execute_json(self.authorize(request, None)).await
    }
}

#[async_trait]
impl AuthProvider for HostedBackend {
    #[instrument(skip(self, email, password))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, ProviderError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.as_str(), "password": password }));
        let token: TokenResponse = self.execute_json(self.authorize(request, None)).await?;

        Ok(AuthSession {
            user: session_user(token.user, email),
            access_token: SecretString::from(token.access_token),
        })
    }

    #[instrument(skip(self, email, password, display_name))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, ProviderError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .json(&json!({
                "email": email.as_str(),
                "password": password,
                "data": { "full_name": display_name },
            }));
        let response: SignUpResponse = self.execute_json(self.authorize(request, None)).await?;

        Ok(SignUpOutcome {
            user_id: response.user.map(|user| user.id).or(response.id),
            confirmation_required: response.access_token.is_none(),
        })
    }

    #[instrument(skip(self, access_token))]
    async fn sign_out(&self, access_token: &SecretString) -> Result<(), ProviderError> {
        let request = self.inner.client.post(self.endpoint("/auth/v1/logout"));
        self.execute(self.authorize(request, Some(access_token)))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CartSync for HostedBackend {
    #[instrument(skip(self, owner), fields(user_id = %owner.user_id))]
    async fn upsert_line(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/rest/v1/cart_items"))
            .query(&[("on_conflict", "user_id,product_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "user_id": owner.user_id,
                "product_id": product_id,
                "quantity": quantity,
            }));
        self.execute(self.authorize(request, Some(&owner.access_token)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, owner), fields(user_id = %owner.user_id))]
    async fn delete_line(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint("/rest/v1/cart_items"))
            .query(&[
                ("user_id", format!("eq.{}", owner.user_id)),
                ("product_id", format!("eq.{product_id}")),
            ]);
        self.execute(self.authorize(request, Some(&owner.access_token)))
            .await?;
        Ok(())
    }
}
