//! Presentation components.
//!
//! Each component is a view struct built by a pure function of catalog,
//! session and cart data, and rendered by a partial under
//! `templates/partials/`. Page templates include the partials; HTMX
//! endpoints render the same partials on their own.

mod auth_form;
mod cart_panel;
mod category_grid;
mod hero;
mod navigation;
mod product_card;

pub use auth_form::AuthFormView;
pub use cart_panel::{CartLineView, CartPanelView};
pub use category_grid::{CategoryGridView, CategoryTileView};
pub use hero::{HeroStat, HeroView};
pub use navigation::{CartBadge, NavLink, NavigationView};
pub use product_card::{HOME_GRID_LIMIT, ProductCardView, ProductGridView, ProductInfoView};
