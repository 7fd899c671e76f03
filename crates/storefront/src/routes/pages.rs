//! Notice pages for features that are linked but not open yet.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::cart::load_cart;
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth};

/// Notice page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/notice.html")]
pub struct NoticeTemplate {
    pub layout: Layout,
    pub icon: &'static str,
    pub title: &'static str,
    pub message: String,
    pub back_href: &'static str,
    pub back_label: &'static str,
}

impl NoticeTemplate {
    fn coming_soon(layout: Layout, icon: &'static str, title: &'static str, message: &str) -> Self {
        Self {
            layout,
            icon,
            title,
            message: message.to_string(),
            back_href: "/",
            back_label: "Continue Shopping",
        }
    }
}

/// Checkout (signed-in shoppers only).
#[instrument(skip(session, nonce, user), fields(user_id = %user.id))]
pub async fn checkout(
    RequireAuth(user): RequireAuth,
    session: Session,
    nonce: CspNonce,
) -> impl IntoResponse {
    let summary = load_cart(&session).await.summary();
    let message = if summary.item_count == 0 {
        "Your cart is empty. Add some medicines to get started.".to_string()
    } else {
        format!(
            "Online payment is coming soon. Your {} item(s) totalling {} are saved in your cart.",
            summary.item_count, summary.total
        )
    };

    NoticeTemplate {
        layout: Layout::load(&session, nonce).await,
        icon: "🛒",
        title: "Checkout",
        message,
        back_href: "/cart",
        back_label: "Back to Cart",
    }
}

/// Upload Prescription.
#[instrument(skip(session, nonce))]
pub async fn prescription_upload(session: Session, nonce: CspNonce) -> impl IntoResponse {
    NoticeTemplate::coming_soon(
        Layout::load(&session, nonce).await,
        "📄",
        "Upload Prescription",
        "Prescription upload is coming soon. Meanwhile, call us and our pharmacist will help you order.",
    )
}

/// Lab tests.
#[instrument(skip(session, nonce))]
pub async fn lab_tests(session: Session, nonce: CspNonce) -> impl IntoResponse {
    NoticeTemplate::coming_soon(
        Layout::load(&session, nonce).await,
        "🧪",
        "Lab Tests",
        "Home sample collection for lab tests is coming soon.",
    )
}

/// Doctor consultation.
#[instrument(skip(session, nonce))]
pub async fn consult(session: Session, nonce: CspNonce) -> impl IntoResponse {
    NoticeTemplate::coming_soon(
        Layout::load(&session, nonce).await,
        "🩺",
        "Consult a Doctor",
        "Online doctor consultations are coming soon.",
    )
}
