//! End-to-end tests for sign-in, sign-up, sign-out and the signed-in
//! cart mirror.

#![allow(clippy::unwrap_used)]

use medplus_integration_tests::{
    DEMO_PASSWORD, DEMO_USER_EMAIL, HX_REQUEST, PENDING_USER_EMAIL, TestServer, seeded_product_id,
};
use reqwest::{Client, Response, StatusCode};

async fn sign_in(server: &TestServer, client: &Client, email: &str, password: &str, htmx: bool) -> Response {
    let mut request = client
        .post(server.url("/auth/login"))
        .form(&[("email", email), ("password", password)]);
    if htmx {
        request = request.header(HX_REQUEST, "true");
    }
    request.send().await.unwrap()
}

async fn sign_up(server: &TestServer, client: &Client, email: &str, password: &str, confirm: &str) -> Response {
    client
        .post(server.url("/auth/register"))
        .header(HX_REQUEST, "true")
        .form(&[
            ("name", "Asha Rao"),
            ("email", email),
            ("password", password),
            ("confirm_password", confirm),
        ])
        .send()
        .await
        .unwrap()
}

async fn page(server: &TestServer, client: &Client, path: &str) -> String {
    client
        .get(server.url(path))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_auth_page_modes() {
    let server = TestServer::start().await;
    let client = server.client();

    let html = page(&server, &client, "/auth?mode=login").await;
    assert!(html.contains("Welcome back to MedPlus"));
    assert!(html.contains("action=\"/auth/login\""));
    assert!(html.contains("Forgot your password?"));

    let html = page(&server, &client, "/auth?mode=register").await;
    assert!(html.contains("action=\"/auth/register\""));
    assert!(html.contains("name=\"confirm_password\""));
}

#[tokio::test]
async fn test_bad_credentials_keep_shopper_anonymous() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = sign_in(&server, &client, DEMO_USER_EMAIL, "wrong-password", true).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = resp.text().await.unwrap();
    assert!(html.contains("id=\"auth-form\""));
    assert!(html.contains("Invalid email or password."));
    // The typed email survives, the password does not
    assert!(html.contains(DEMO_USER_EMAIL));
    assert!(!html.contains("wrong-password"));

    let resp = sign_in(&server, &client, DEMO_USER_EMAIL, "wrong-password", false).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("<html"));

    assert!(page(&server, &client, "/").await.contains("href=\"/auth?mode=login\""));
}

#[tokio::test]
async fn test_unconfirmed_account_is_refused() {
    let server = TestServer::start().await;

    let html = sign_in(&server, &server.client(), PENDING_USER_EMAIL, DEMO_PASSWORD, true)
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("click the confirmation link"));
}

#[tokio::test]
async fn test_sign_in_greets_and_flashes_once() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = sign_in(&server, &client, DEMO_USER_EMAIL, DEMO_PASSWORD, true).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-redirect"], "/");

    let html = page(&server, &client, "/").await;
    assert!(html.contains("Hi, Demo Shopper"));
    assert!(html.contains("Welcome back!"));
    assert!(html.contains("Logout"));

    // The flash is consumed by the first page that shows it
    let html = page(&server, &client, "/").await;
    assert!(!html.contains("Welcome back!"));

    // Signed-in shoppers are sent away from the form
    let resp = client.get(server.url("/auth")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_signed_in_cart_is_mirrored() {
    let server = TestServer::start().await;
    let client = server.client();
    sign_in(&server, &client, DEMO_USER_EMAIL, DEMO_PASSWORD, true).await;
    let user_id = server.backend().account_id(DEMO_USER_EMAIL).unwrap();
    let paracetamol = seeded_product_id("paracetamol-500");

    for _ in 0..2 {
        client
            .post(server.url("/cart/add"))
            .header(HX_REQUEST, "true")
            .form(&[("product_id", paracetamol.to_string())])
            .send()
            .await
            .unwrap();
    }
    assert_eq!(server.backend().mirrored_cart(user_id), vec![(paracetamol, 2)]);

    client
        .post(server.url("/cart/remove"))
        .header(HX_REQUEST, "true")
        .form(&[("product_id", paracetamol.to_string())])
        .send()
        .await
        .unwrap();
    assert!(server.backend().mirrored_cart(user_id).is_empty());
}

#[tokio::test]
async fn test_failed_mirror_write_leaves_cart_unchanged() {
    let server = TestServer::start().await;
    let client = server.client();
    sign_in(&server, &client, DEMO_USER_EMAIL, DEMO_PASSWORD, true).await;

    // Warm the catalog cache so only the mirror write fails
    page(&server, &client, "/products").await;
    server.backend().set_offline(true);

    let resp = client
        .post(server.url("/cart/add"))
        .header(HX_REQUEST, "true")
        .form(&[("product_id", seeded_product_id("multivitamin").to_string())])
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("hx-trigger").is_none());
    let html = resp.text().await.unwrap();
    assert!(html.contains("Could not update your cart. Please try again."));
    assert!(html.contains("Your cart is empty"));

    server.backend().set_offline(false);
    assert!(page(&server, &client, "/cart/count").await.contains("badge-hidden"));
}

#[tokio::test]
async fn test_sign_up_validation_and_success() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = sign_up(&server, &client, "asha@example.com", "abc", "abc").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Password must be at least 6 characters long."));

    let html = sign_up(&server, &client, "asha@example.com", "secret1", "secret2")
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Passwords do not match."));

    let resp = sign_up(&server, &client, "asha@example.com", "secret1", "secret1").await;
    assert_eq!(resp.headers()["hx-redirect"], "/auth?mode=login");
    let html = page(&server, &client, "/auth?mode=login").await;
    assert!(html.contains("Account created!"));
    assert!(server.backend().account_id("asha@example.com").is_some());

    // The new account can sign in straight away
    let resp = sign_in(&server, &client, "asha@example.com", "secret1", true).await;
    assert_eq!(resp.headers()["hx-redirect"], "/");
    assert!(page(&server, &client, "/").await.contains("Hi, Asha Rao"));
}

#[tokio::test]
async fn test_sign_up_with_taken_email_offers_sign_in() {
    let server = TestServer::start().await;

    let resp = sign_up(&server, &server.client(), DEMO_USER_EMAIL, "secret1", "secret1").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = resp.text().await.unwrap();
    assert!(html.contains("An account with this email already exists."));
    assert!(html.contains("action=\"/auth/login\""));
}

#[tokio::test]
async fn test_logout_clears_user_and_cart() {
    let server = TestServer::start().await;
    let client = server.client();
    sign_in(&server, &client, DEMO_USER_EMAIL, DEMO_PASSWORD, true).await;
    client
        .post(server.url("/cart/add"))
        .header(HX_REQUEST, "true")
        .form(&[("product_id", seeded_product_id("ibuprofen-400").to_string())])
        .send()
        .await
        .unwrap();

    let resp = client.post(server.url("/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    let html = page(&server, &client, "/").await;
    assert!(!html.contains("Hi, Demo Shopper"));
    assert!(page(&server, &client, "/cart/count").await.contains("badge-hidden"));
}

#[tokio::test]
async fn test_forgot_password_shows_notice() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = client
        .post(server.url("/auth/forgot-password"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(page(&server, &client, "/auth?mode=login").await.contains("Password reset"));
}
