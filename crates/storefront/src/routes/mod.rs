//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (catalog source reachable)
//!
//! # Products
//! GET  /products               - All products, ?q= search
//! GET  /products/grid          - Product grid fragment (HTMX), ?q=&limit=
//! GET  /products/{id}          - Quick info page, or fragment for HTMX
//!
//! # Cart (HTMX fragments, 303 redirects without HTMX)
//! GET  /cart                   - Cart page
//! GET  /cart/panel             - Cart panel fragment
//! GET  /cart/count             - Cart badge fragment
//! POST /cart/add               - Add one unit
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//!
//! # Auth
//! GET  /auth                   - Sign-in / sign-up form, ?mode=login|register
//! POST /auth/login             - Sign in (rate limited)
//! POST /auth/register          - Sign up (rate limited)
//! POST /auth/logout            - Sign out
//! POST /auth/forgot-password   - Password reset notice
//!
//! # Notices
//! GET  /checkout               - Checkout (requires sign-in)
//! GET  /prescriptions/upload   - Prescription upload
//! GET  /lab-tests              - Lab tests
//! GET  /consult                - Doctor consultation
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::auth::SessionState;
use crate::cart::load_cart;
use crate::components::NavigationView;
use crate::middleware::{CspNonce, auth_rate_limiter};
use crate::models::Flash;
use crate::state::AppState;

/// Chrome shared by every full page: header, nonce and pending flash.
#[derive(Debug, Clone)]
pub struct Layout {
    pub nav: NavigationView,
    pub nonce: String,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the layout for the current session, consuming its flash.
    pub async fn load(session: &Session, nonce: CspNonce) -> Self {
        let state = SessionState::load(session).await;
        let cart = load_cart(session).await;
        Self {
            nav: NavigationView::new(state.user(), cart.item_count()),
            nonce: nonce.into_inner(),
            flash: Flash::take(session).await,
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/grid", get(products::grid))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/panel", get(cart::panel))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the auth routes router.
///
/// Credential posts sit behind the per-IP limiter when `rate_limit` is set.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let credential_posts = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));
    let credential_posts = if rate_limit {
        credential_posts.layer(auth_rate_limiter())
    } else {
        credential_posts
    };

    Router::new()
        .route("/", get(auth::page))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .merge(credential_posts)
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes(rate_limit))
        .route("/checkout", get(pages::checkout))
        .route("/prescriptions/upload", get(pages::prescription_upload))
        .route("/lab-tests", get(pages::lab_tests))
        .route("/consult", get(pages::consult))
}
