//! Admin order-management routes.
//!
//! Token-gated with a session flag: the panel lists every order with
//! per-status counts and lets staff walk an order through its status
//! transitions. Status updates are the only mutation the panel performs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kurohana_core::{Order, OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::routes::orders::OrderLineView;
use crate::state::AppState;

/// Per-status tally shown at the top of the panel.
#[derive(Clone)]
pub struct StatusCountView {
    pub status: String,
    pub count: usize,
}

/// Order display data for the admin table.
#[derive(Clone)]
pub struct AdminOrderView {
    pub id: String,
    pub short_id: String,
    pub placed_on: String,
    pub status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub address: String,
    pub items: Vec<OrderLineView>,
    pub total: String,
}

impl From<&Order> for AdminOrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_owned(),
            short_id: order.id.as_str().chars().take(8).collect(),
            placed_on: order.created_at.format("%d %b %Y %H:%M").to_string(),
            status: order.status.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            address: order.customer_address.clone(),
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
        }
    }
}

/// Admin login form data.
#[derive(Deserialize)]
pub struct AdminLoginForm {
    pub token: String,
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Admin login template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub error: Option<String>,
}

/// Admin orders dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub orders: Vec<AdminOrderView>,
    pub counts: Vec<StatusCountView>,
    pub statuses: Vec<String>,
}

async fn is_authed(session: &Session) -> bool {
    session
        .get::<bool>(session_keys::ADMIN)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Display the admin panel: login gate or the orders dashboard.
#[instrument(skip(state, session))]
pub async fn panel(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    if !is_authed(&session).await {
        return Ok(AdminLoginTemplate { error: None }.into_response());
    }

    let orders = state.backend().list_all_orders().await?;
    Ok(dashboard(&orders).into_response())
}

fn dashboard(orders: &[Order]) -> AdminOrdersTemplate {
    let counts = OrderStatus::ALL
        .iter()
        .map(|status| StatusCountView {
            status: status.to_string(),
            count: orders.iter().filter(|o| o.status == *status).count(),
        })
        .collect();

    AdminOrdersTemplate {
        orders: orders.iter().map(AdminOrderView::from).collect(),
        counts,
        statuses: OrderStatus::ALL.iter().map(ToString::to_string).collect(),
    }
}

/// Check the access token and open an admin session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    if form.token != state.config().admin_access_token.expose_secret() {
        tracing::warn!("admin login rejected");
        return AdminLoginTemplate {
            error: Some("Invalid access token".to_owned()),
        }
        .into_response();
    }

    if let Err(e) = session.insert(session_keys::ADMIN, true).await {
        tracing::error!("Failed to persist admin session: {e}");
    }
    Redirect::to("/admin").into_response()
}

/// Close the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = session.remove::<bool>(session_keys::ADMIN).await {
        tracing::error!("Failed to clear admin session: {e}");
    }
    Redirect::to("/admin").into_response()
}

/// Update one order's status and return to the dashboard.
#[instrument(skip(state, session))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    if !is_authed(&session).await {
        return Err(AppError::Unauthorized("admin session required".to_owned()));
    }

    let status: OrderStatus = form
        .status
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    state
        .backend()
        .update_order_status(&OrderId::new(id), status)
        .await?;

    Ok(Redirect::to("/admin").into_response())
}
