//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::shop::ProductCardView;
use crate::state::AppState;

/// Number of cards in each home page strip.
const STRIP_SIZE: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
    pub new_arrivals: Vec<ProductCardView>,
}

/// Display home page: a featured strip and the latest arrivals.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let rows = state.backend().catalog().await?;

    let featured = rows
        .iter()
        .filter(|row| row.featured)
        .take(STRIP_SIZE)
        .map(ProductCardView::from)
        .collect();
    let new_arrivals = rows
        .iter()
        .filter(|row| row.is_new)
        .take(STRIP_SIZE)
        .map(ProductCardView::from)
        .collect();

    Ok(HomeTemplate {
        featured,
        new_arrivals,
    })
}
