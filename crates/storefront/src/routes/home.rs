//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use medplus_core::Product;

use super::Layout;
use crate::catalog::LoadState;
use crate::components::{CategoryGridView, HOME_GRID_LIMIT, HeroView, ProductGridView};
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub hero: HeroView,
    pub categories: CategoryGridView,
    pub grid: ProductGridView,
}

/// Display the home page.
///
/// Categories render with the page. The product grid starts as skeleton
/// tiles and is fetched by HTMX from `/products/grid`, so a slow catalog
/// never delays the first paint.
#[instrument(skip(state, session, nonce))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
) -> impl IntoResponse {
    let categories = state.catalog().list_categories().await;
    let products = state.catalog().list_products().await;
    let counted: &[Product] = products
        .loaded()
        .map(|products| &products[..])
        .unwrap_or_default();

    HomeTemplate {
        hero: HeroView::default(),
        categories: CategoryGridView::new(&categories, counted),
        grid: ProductGridView::new(&LoadState::<Vec<Product>>::Loading, "", Some(HOME_GRID_LIMIT)),
        layout: Layout::load(&session, nonce).await,
    }
}
