//! Cart route handlers.
//!
//! The cart lives in the session. Every post takes the session's cart lock,
//! loads the cart, runs one [`CartAction`] through the cart service (which
//! mirrors signed-in carts remotely and rolls back on failure) and saves it
//! back. The lock rides on the response so posts from one browser apply in
//! turn.
//!
//! HTMX posts get the refreshed cart panel plus an `HX-Trigger:
//! cart-updated` header so the badge refreshes itself; plain form posts
//! are redirected to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use medplus_core::ProductId;

use super::Layout;
use crate::auth::cart_owner;
use crate::cart::{Cart, CartAction, CartProduct, CartWriteGuard, load_cart, save_cart};
use crate::components::{CartBadge, CartPanelView};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CART_UPDATED_EVENT, CspNonce, HX_TRIGGER, HxRequest};
use crate::models::Flash;
use crate::state::AppState;

/// Shown when the shopper adds a product with no stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "This product is out of stock.";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub panel: CartPanelView,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub panel: CartPanelView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub badge: CartBadge,
}

/// Display the cart page.
#[instrument(skip(session, nonce))]
pub async fn show(session: Session, nonce: CspNonce) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        panel: CartPanelView::new(&cart, None),
        layout: Layout::load(&session, nonce).await,
    }
}

/// Cart panel fragment (HTMX), loaded into the drawer.
#[instrument(skip(session))]
pub async fn panel(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartPanelTemplate {
        panel: CartPanelView::new(&cart, None),
    }
}

/// Cart badge fragment (HTMX), refreshed on `cart-updated`.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        badge: CartBadge {
            count: load_cart(&session).await.item_count(),
        },
    }
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns 404 for unknown products and 502 when the catalog is down.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    HxRequest(htmx): HxRequest,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find_product(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    let guard = state.cart().lock(&session).await;
    let response = if product.in_stock() {
        let (cart, error) =
            apply_action(&state, &session, CartAction::Add(CartProduct::from(&product))).await?;
        respond(&session, htmx, &cart, error).await
    } else {
        let cart = load_cart(&session).await;
        respond(&session, htmx, &cart, Some(OUT_OF_STOCK_MESSAGE.to_string())).await
    };
    Ok(hold_until_sent(response, guard))
}

/// Set a line's quantity; zero or below removes the line.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    HxRequest(htmx): HxRequest,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let action = CartAction::UpdateQuantity {
        product_id: form.product_id,
        quantity: form.quantity,
    };
    let guard = state.cart().lock(&session).await;
    let (cart, error) = apply_action(&state, &session, action).await?;
    Ok(hold_until_sent(respond(&session, htmx, &cart, error).await, guard))
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    HxRequest(htmx): HxRequest,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let guard = state.cart().lock(&session).await;
    let (cart, error) =
        apply_action(&state, &session, CartAction::Remove(form.product_id)).await?;
    Ok(hold_until_sent(respond(&session, htmx, &cart, error).await, guard))
}

/// Run `action` against the session cart and save it when it took effect.
///
/// Callers hold the session's cart lock. A rejected mirror write is not an
/// error here: the cart comes back unchanged together with the message to
/// show.
async fn apply_action(
    state: &AppState,
    session: &Session,
    action: CartAction,
) -> Result<(Cart, Option<String>)> {
    let mut cart = load_cart(session).await;
    let owner = cart_owner(session).await;
    add_breadcrumb("cart", action.kind(), None);

    match state.cart().apply(&mut cart, action, owner.as_ref()).await {
        Ok(()) => {
            save_cart(session, &cart).await?;
            Ok((cart, None))
        }
        Err(e) => Ok((cart, Some(e.to_string()))),
    }
}

/// Keep the cart lock until the session layer has saved this request's
/// record and the response is gone.
fn hold_until_sent(mut response: Response, guard: Option<CartWriteGuard>) -> Response {
    if let Some(guard) = guard {
        response.extensions_mut().insert(guard);
    }
    response
}

async fn respond(session: &Session, htmx: bool, cart: &Cart, error: Option<String>) -> Response {
    if htmx {
        let changed = error.is_none();
        let mut response = CartPanelTemplate {
            panel: CartPanelView::new(cart, error),
        }
        .into_response();
        if changed {
            response
                .headers_mut()
                .insert(HX_TRIGGER, HeaderValue::from_static(CART_UPDATED_EVENT));
        }
        return response;
    }

    if let Some(message) = error {
        Flash::new("Cart not updated", message).push(session).await;
    }
    Redirect::to("/cart").into_response()
}
