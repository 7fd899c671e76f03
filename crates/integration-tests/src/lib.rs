//! End-to-end test harness for the MedPlus storefront.
//!
//! [`TestServer`] serves the real router from [`medplus_storefront::app`]
//! on an ephemeral local port, over a seeded [`DemoBackend`] with no
//! artificial latency. Tests drive it through [`TestServer::client`], a
//! cookie-keeping `reqwest` client that does not follow redirects, so
//! 303s and `HX-Redirect` headers can be asserted directly.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medplus-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use medplus_storefront::{
    app,
    backend::{Backend, DemoBackend},
    config::{DemoConfig, StorefrontConfig},
    state::AppState,
};
use reqwest::{Client, redirect::Policy};
use tokio::{net::TcpListener, sync::oneshot};

pub use medplus_storefront::backend::{
    DEMO_PASSWORD, DEMO_USER_EMAIL, PENDING_USER_EMAIL, seeded_product_id,
};

/// Header HTMX sets on every request it issues.
pub const HX_REQUEST: &str = "HX-Request";

/// A storefront served on `127.0.0.1:<ephemeral>` until dropped.
pub struct TestServer {
    addr: SocketAddr,
    backend: DemoBackend,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server over a freshly seeded demo backend.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        Self::start_with_cart_latency(Duration::ZERO).await
    }

    /// Start a server whose add-to-cart answers take `cart_latency`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with_cart_latency(cart_latency: Duration) -> Self {
        let backend = DemoBackend::seeded();
        let config = StorefrontConfig::local_demo(DemoConfig {
            auth_latency: Duration::ZERO,
            cart_latency,
        });
        let state = AppState::new(config, Backend::demo(backend.clone(), cart_latency));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local address");

        let (shutdown, signal) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app(state).into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                let _ = signal.await;
            })
            .await
            .expect("Test server error");
        });

        Self {
            addr,
            backend,
            shutdown: Some(shutdown),
        }
    }

    /// Shared handle on the backend behind the server.
    #[must_use]
    pub const fn backend(&self) -> &DemoBackend {
        &self.backend
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A new shopper: own cookie jar, redirects left unfollowed.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
