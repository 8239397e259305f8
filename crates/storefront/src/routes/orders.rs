//! My-orders route handler.
//!
//! Orders are keyed by the durable device identity rather than an account,
//! so "my orders" is everything placed from this device.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use kurohana_core::{Order, OrderStatus, resolve_device_id};

use crate::error::Result;
use crate::filters;
use crate::models::session_keys;
use crate::models::session::SessionKv;
use crate::state::AppState;

/// Steps shown on the order progress line, in fulfillment order.
const PROGRESS_STEPS: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

/// One purchased line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub title: String,
    pub author: String,
    pub quantity: u32,
    pub line_price: String,
    pub image: String,
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub short_id: String,
    pub placed_on: String,
    pub status: String,
    /// Index into the progress line; delivered fills it completely.
    pub progress_step: usize,
    pub progress_total: usize,
    pub cancelled: bool,
    pub items: Vec<OrderLineView>,
    pub total: String,
    pub shipping: String,
    pub address: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let cancelled = order.status == OrderStatus::Cancelled;
        Self {
            short_id: order.id.as_str().chars().take(8).collect(),
            placed_on: order.created_at.format("%d %b %Y").to_string(),
            status: order.status.to_string(),
            progress_step: PROGRESS_STEPS
                .iter()
                .position(|s| *s == order.status)
                .unwrap_or(0),
            progress_total: PROGRESS_STEPS.len(),
            cancelled,
            items: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    title: item.title.clone(),
                    author: item.author.clone(),
                    quantity: item.quantity,
                    line_price: item.price.times(item.quantity).to_string(),
                    image: item.image.clone(),
                })
                .collect(),
            total: order.total_price.to_string(),
            shipping: if order.shipping_cost.is_zero() {
                "Free".to_owned()
            } else {
                order.shipping_cost.to_string()
            },
            address: order.customer_address.clone(),
        }
    }
}

/// My-orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
}

/// Display the orders placed from this device, newest first.
#[instrument(skip(state, session))]
pub async fn my_orders(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let kv = SessionKv::new(session);
    let device = resolve_device_id(&kv, session_keys::DEVICE_ID).await?;
    let orders = state.backend().orders_by_device(&device).await?;

    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
