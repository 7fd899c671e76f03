//! End-to-end tests for the storefront's pages and catalog fragments.

#![allow(clippy::unwrap_used)]

use medplus_integration_tests::{HX_REQUEST, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    server.backend().set_offline(true);
    let resp = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_home_page_renders_chrome_and_categories() {
    let server = TestServer::start().await;

    let resp = server.client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let csp = resp
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let html = resp.text().await.unwrap();

    assert!(html.contains("Your Health, Our Priority"));
    assert!(html.contains("Pain Relief"));
    assert!(html.contains("Login"));
    assert!(html.contains("id=\"product-grid\""));

    // Every inline-capable script carries the nonce the policy names
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap();
    assert!(html.contains(&format!("nonce=\"{nonce}\"")));
}

#[tokio::test]
async fn test_product_grid_fragment_searches() {
    let server = TestServer::start().await;
    let client = server.client();

    let html = client
        .get(server.url("/products/grid?limit=8"))
        .header(HX_REQUEST, "true")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Popular Medicines"));
    assert_eq!(html.matches("class=\"product-card").count(), 8);
    // Add to Cart stays disabled while its post is in flight
    assert!(html.contains("hx-disabled-elt=\"find button[type=submit]\""));

    let html = client
        .get(server.url("/products/grid?q=paracetamol"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Search Results"));
    assert!(html.contains("Paracetamol 500mg Tablets"));
    assert!(!html.contains("Ibuprofen"));

    let html = client
        .get(server.url("/products/grid?q=zzzz"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("No products found for &#34;zzzz&#34;"));
}

#[tokio::test]
async fn test_product_grid_shows_error_when_catalog_is_down() {
    let server = TestServer::start().await;
    server.backend().set_offline(true);

    let resp = server
        .client()
        .get(server.url("/products/grid"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("alert"));
    assert!(!html.contains("class=\"product-card"));
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let server = TestServer::start().await;

    let resp = server
        .client()
        .get(server.url("/products/00000000-0000-0000-0000-000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_coming_soon_notices() {
    let server = TestServer::start().await;
    let client = server.client();

    for (path, title) in [
        ("/prescriptions/upload", "Upload Prescription"),
        ("/lab-tests", "Lab Tests"),
        ("/consult", "Consult a Doctor"),
    ] {
        let resp = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        assert!(resp.text().await.unwrap().contains(title), "{path}");
    }
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let server = TestServer::start().await;
    let client = server.client();

    let resp = client.get(server.url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/auth?mode=login");

    let resp = client
        .get(server.url("/checkout"))
        .header(HX_REQUEST, "true")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["hx-redirect"], "/auth?mode=login");
}
