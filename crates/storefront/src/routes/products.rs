//! Product detail route handlers.
//!
//! The detail page is where snapshots are born: add-to-cart and buy-now both
//! freeze the catalog row (plus any volume selection) at click time. Buy-now
//! writes the single-item slot and jumps straight to checkout, bypassing the
//! cart entirely.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kurohana_core::{BuyNowStore, CatalogReader, ProductId, VolumeSelection};

use crate::backend::types::ProductRow;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::models::session::SessionKv;
use crate::routes::shop::ProductCardView;
use crate::state::AppState;

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<i64>,
    pub image: String,
    pub genre: Vec<String>,
    pub rating: String,
    pub volumes: u32,
    pub status: String,
    /// Whether the volume picker should render at all.
    pub multi_volume: bool,
}

impl From<&ProductRow> for ProductDetailView {
    fn from(row: &ProductRow) -> Self {
        let snapshot = row.snapshot();
        let discounted = snapshot.discounted();
        Self {
            id: row.id.clone(),
            title: row.title.clone(),
            author: row.author.clone(),
            description: row.description.clone(),
            price: snapshot.price.to_string(),
            original_price: discounted.then(|| snapshot.original_price.to_string()),
            discount_percent: discounted.then(|| snapshot.discount_percent()),
            image: row.image.clone(),
            genre: row.genre.clone(),
            rating: format!("{:.1}", row.rating),
            volumes: snapshot.volumes,
            status: snapshot.status.to_string(),
            multi_volume: snapshot.volumes > 1,
        }
    }
}

/// Buy-now form data (volume selection mirrors add-to-cart).
#[derive(Debug, Deserialize)]
pub struct BuyNowForm {
    pub volume: Option<u32>,
    pub volume_count: Option<u32>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
    pub volume_error: Option<String>,
}

async fn load_page(
    state: &AppState,
    id: &str,
    volume_error: Option<String>,
) -> Result<ProductShowTemplate> {
    let rows = state.backend().catalog().await?;
    let row = rows
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(id.to_owned()))?;

    // Related titles share a genre; the product itself is excluded.
    let related = rows
        .iter()
        .filter(|p| p.id != row.id && p.genre.iter().any(|g| row.genre.contains(g)))
        .take(4)
        .map(ProductCardView::from)
        .collect();

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(row),
        related,
        volume_error,
    })
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    load_page(&state, &id, None).await
}

/// Buy now: write the single-item slot and enter buy-now checkout.
///
/// Never touches the cart. An invalid volume selection re-renders the detail
/// page with the picker error inline.
#[instrument(skip(state, session))]
pub async fn buy_now(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<BuyNowForm>,
) -> Result<Response> {
    let snapshot = state
        .backend()
        .product(&ProductId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(id.clone()))?;
    let selection = match (form.volume, form.volume_count) {
        (Some(v), _) => Some(VolumeSelection::Single(v)),
        (None, Some(n)) => Some(VolumeSelection::Range(n)),
        (None, None) => None,
    };
    let item = match selection {
        Some(selection) => match selection.apply(&snapshot) {
            Ok(item) => item,
            Err(e) => {
                return Ok(load_page(&state, &id, Some(e.to_string()))
                    .await?
                    .into_response());
            }
        },
        None => snapshot,
    };

    let mut slot = BuyNowStore::load(SessionKv::new(session), session_keys::BUY_NOW).await;
    slot.set(item, 1).await?;

    Ok(Redirect::to("/checkout?mode=buynow").into_response())
}
