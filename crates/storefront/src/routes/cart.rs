//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Cart lines persist in the session through the core engine's `KvStore`,
//! so the cart survives reloads and revisits from the same device.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kurohana_core::{Cart, CartLine, CartStore, CatalogReader, ProductId, VolumeSelection};

use crate::filters;
use crate::models::session_keys;
use crate::models::session::SessionKv;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.item.id.as_str().to_owned(),
            title: line.item.title.clone(),
            author: line.item.author.clone(),
            quantity: line.quantity,
            price: line.item.price.to_string(),
            line_price: line.line_price().to_string(),
            image: line.item.image.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_items(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    /// Single-volume selection on a series detail page.
    pub volume: Option<u32>,
    /// "Volumes 1..=n" selection on a series detail page.
    pub volume_count: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let store = CartStore::load(SessionKv::new(session), session_keys::CART).await;

    CartShowTemplate {
        cart: CartView::from(store.cart()),
    }
}

/// Add item to cart (HTMX).
///
/// Looks the product up in the catalog, freezes a snapshot (applying any
/// volume selection), and merges it into the cart. Returns an HTMX trigger
/// to update the cart count badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    // Snapshot at add-time through the catalog contract; the catalog is
    // never consulted again for this line.
    let product_id = ProductId::new(form.product_id.clone());
    let snapshot = match state.backend().product(&product_id).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<span class=\"text-red-500\">Item unavailable</span>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to read catalog for add-to-cart: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"text-red-500\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };
    let selection = match (form.volume, form.volume_count) {
        (Some(v), _) => Some(VolumeSelection::Single(v)),
        (None, Some(n)) => Some(VolumeSelection::Range(n)),
        (None, None) => None,
    };
    let item = match selection {
        Some(selection) => match selection.apply(&snapshot) {
            Ok(item) => item,
            Err(e) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Html(format!("<span class=\"text-red-500\">{e}</span>")),
                )
                    .into_response();
            }
        },
        None => snapshot,
    };

    let mut store = CartStore::load(SessionKv::new(session), session_keys::CART).await;
    if let Err(e) = store.add_item(item, form.quantity.unwrap_or(1)).await {
        tracing::error!("Failed to persist cart after add: {e}");
    }

    let count = store.cart().total_items();

    // Return cart count with HTMX trigger to update other elements
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response()
}

/// Update cart item quantity (HTMX). A quantity below one removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut store = CartStore::load(SessionKv::new(session), session_keys::CART).await;
    if let Err(e) = store.set_quantity(&form.item_id, form.quantity).await {
        tracing::error!("Failed to persist cart after update: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(store.cart()),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut store = CartStore::load(SessionKv::new(session), session_keys::CART).await;
    if let Err(e) = store.remove_item(&form.item_id).await {
        tracing::error!("Failed to persist cart after remove: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(store.cart()),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let store = CartStore::load(SessionKv::new(session), session_keys::CART).await;

    CartCountTemplate {
        count: store.cart().total_items(),
    }
}
