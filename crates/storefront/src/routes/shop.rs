//! Shop listing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::backend::types::ProductRow;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Product card display data for grid pages.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<i64>,
    pub image: String,
    pub rating: String,
    pub is_new: bool,
}

impl From<&ProductRow> for ProductCardView {
    fn from(row: &ProductRow) -> Self {
        let snapshot = row.snapshot();
        let discounted = snapshot.discounted();
        Self {
            id: row.id.clone(),
            title: row.title.clone(),
            author: row.author.clone(),
            price: snapshot.price.to_string(),
            original_price: discounted.then(|| snapshot.original_price.to_string()),
            discount_percent: discounted.then(|| snapshot.discount_percent()),
            image: row.image.clone(),
            rating: format!("{:.1}", row.rating),
            is_new: row.is_new,
        }
    }
}

/// Genre filter query parameters.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub genre: Option<String>,
}

/// Shop listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub products: Vec<ProductCardView>,
    pub genres: Vec<String>,
    pub active_genre: Option<String>,
}

/// Display the shop grid, optionally filtered by genre.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse> {
    let rows = state.backend().catalog().await?;

    let mut genres: Vec<String> = rows
        .iter()
        .flat_map(|row| row.genre.iter().cloned())
        .collect();
    genres.sort();
    genres.dedup();

    let products = rows
        .iter()
        .filter(|row| {
            query
                .genre
                .as_ref()
                .is_none_or(|genre| row.genre.iter().any(|g| g == genre))
        })
        .map(ProductCardView::from)
        .collect();

    Ok(ShopTemplate {
        products,
        genres,
        active_genre: query.genre,
    })
}
