//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use medplus_core::ProductId;

use super::Layout;
use crate::components::{ProductGridView, ProductInfoView};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, HxRequest};
use crate::state::AppState;

/// Largest `limit` the grid fragment honors.
const MAX_GRID_LIMIT: usize = 100;

/// Search and paging query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct GridQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

impl GridQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.map(|limit| limit.clamp(1, MAX_GRID_LIMIT))
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub grid: ProductGridView,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: ProductGridView,
}

/// Quick info page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub info: ProductInfoView,
}

/// Quick info fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_info.html")]
pub struct ProductInfoTemplate {
    pub info: ProductInfoView,
}

/// Display all products, filtered by `?q=`.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Query(query): Query<GridQuery>,
) -> impl IntoResponse {
    let products = state.catalog().list_products().await;

    ProductsIndexTemplate {
        grid: ProductGridView::new(&products, &query.q, query.limit()),
        layout: Layout::load(&session, nonce).await,
    }
}

/// Product grid fragment (HTMX): search-as-you-type, the home grid and Retry.
#[instrument(skip(state))]
pub async fn grid(State(state): State<AppState>, Query(query): Query<GridQuery>) -> impl IntoResponse {
    let products = state.catalog().list_products().await;

    ProductGridTemplate {
        grid: ProductGridView::new(&products, &query.q, query.limit()),
    }
}

/// Quick info for one product: a modal fragment for HTMX, a page otherwise.
///
/// # Errors
///
/// Returns 404 for unknown products and 502 when the catalog is down.
#[instrument(skip(state, session, nonce), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    HxRequest(htmx): HxRequest,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    let info = ProductInfoView::from(&product);

    if htmx {
        return Ok(ProductInfoTemplate { info }.into_response());
    }

    Ok(ProductShowTemplate {
        info,
        layout: Layout::load(&session, nonce).await,
    }
    .into_response())
}
