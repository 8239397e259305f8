//! Checkout route handlers.
//!
//! One page serves both entry paths: `/checkout` reads the cart,
//! `/checkout?mode=buynow` reads the buy-now slot. Submission goes through
//! the core orchestrator, which freezes the active source, validates,
//! submits, and clears exactly what was consumed. Failures re-render the
//! form with every entered field preserved so a retry is one click.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kurohana_core::{
    BuyNowStore, CartLine, CartStore, CheckoutError, CheckoutMode, CheckoutTotals,
    CustomerDetails, OrderDraft, ShippingAddress, place_order, resolve_device_id,
};

use crate::error::Result;
use crate::filters;
use crate::models::session_keys;
use crate::models::session::SessionKv;
use crate::routes::cart::CartItemView;
use crate::state::AppState;

/// Order summary display data.
#[derive(Clone)]
pub struct SummaryView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    /// "Add ₹X more for free shipping" nudge, absent once shipping is free.
    pub free_shipping_hint: Option<String>,
}

impl SummaryView {
    fn for_lines(lines: &[CartLine]) -> Self {
        let totals = CheckoutTotals::for_lines(lines);
        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            subtotal: totals.subtotal.to_string(),
            shipping: if totals.shipping.is_zero() {
                "Free".to_owned()
            } else {
                totals.shipping.to_string()
            },
            total: totals.total.to_string(),
            free_shipping_hint: totals
                .remaining_for_free_shipping()
                .map(|more| format!("Add {more} more for free shipping")),
        }
    }
}

/// Entered form fields, echoed back on re-render so nothing is lost on a
/// validation or backend failure.
#[derive(Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

impl CheckoutForm {
    fn draft(&self) -> OrderDraft {
        OrderDraft {
            customer: CustomerDetails {
                name: self.name.clone(),
                email: self.email.clone(),
                phone: none_if_blank(&self.phone),
            },
            address: ShippingAddress {
                line1: self.address_line1.clone(),
                line2: none_if_blank(&self.address_line2),
                city: self.city.clone(),
                state: self.state.clone(),
                pincode: self.pincode.clone(),
            },
        }
    }
}

fn none_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Checkout mode query parameter.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub mode: Option<String>,
}

fn mode_from(raw: Option<&str>) -> CheckoutMode {
    match raw {
        Some("buynow") => CheckoutMode::BuyNow,
        _ => CheckoutMode::Cart,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub buy_now: bool,
    pub summary: SummaryView,
    pub form: CheckoutForm,
    pub error: Option<String>,
}

/// Empty-checkout state template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/empty.html")]
pub struct CheckoutEmptyTemplate {}

/// Order-placed confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub order_id: String,
    pub total: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Gather the active item lines for a mode without consuming anything.
async fn active_lines(session: &Session, mode: CheckoutMode) -> Vec<CartLine> {
    let kv = SessionKv::new(session.clone());
    match mode {
        CheckoutMode::Cart => {
            let store = CartStore::load(kv, session_keys::CART).await;
            store.cart().lines().to_vec()
        }
        CheckoutMode::BuyNow => {
            let slot = BuyNowStore::load(kv, session_keys::BUY_NOW).await;
            slot.peek().cloned().into_iter().collect()
        }
    }
}

/// Display the checkout page for the active item source.
#[instrument(skip(session))]
pub async fn show(session: Session, Query(query): Query<CheckoutQuery>) -> Response {
    let mode = mode_from(query.mode.as_deref());
    let lines = active_lines(&session, mode).await;

    if lines.is_empty() {
        return CheckoutEmptyTemplate {}.into_response();
    }

    CheckoutTemplate {
        buy_now: mode == CheckoutMode::BuyNow,
        summary: SummaryView::for_lines(&lines),
        form: CheckoutForm {
            mode: mode.as_str().to_owned(),
            ..CheckoutForm::default()
        },
        error: None,
    }
    .into_response()
}

/// Submit the checkout.
///
/// On success the consumed source is cleared and the confirmation renders.
/// Validation and backend failures re-render the page with the entered
/// fields and the still-intact item source.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mode = mode_from(Some(form.mode.as_str()));
    let kv = SessionKv::new(session.clone());

    let device = resolve_device_id(&kv, session_keys::DEVICE_ID).await?;
    let mut cart = CartStore::load(kv.clone(), session_keys::CART).await;
    let mut buy_now = BuyNowStore::load(kv, session_keys::BUY_NOW).await;
    let draft = form.draft();

    let outcome = place_order(
        mode,
        &mut cart,
        &mut buy_now,
        state.backend(),
        &device,
        &draft,
    )
    .await;

    let order = match outcome {
        Ok(order) => order,
        Err(CheckoutError::ClearFailed { order, source }) => {
            // The order went through; losing the clear only risks a stale
            // cart, which the shopper can empty by hand.
            tracing::warn!(order_id = %order.id, error = %source, "order placed but item source not cleared");
            *order
        }
        Err(CheckoutError::EmptyCheckout) => {
            return Ok(CheckoutEmptyTemplate {}.into_response());
        }
        Err(error @ (CheckoutError::Validation(_)
        | CheckoutError::SubmissionInFlight
        | CheckoutError::AlreadyPlaced)) => {
            let lines = active_lines(&session, mode).await;
            return Ok(CheckoutTemplate {
                buy_now: mode == CheckoutMode::BuyNow,
                summary: SummaryView::for_lines(&lines),
                form,
                error: Some(error.to_string()),
            }
            .into_response());
        }
        Err(CheckoutError::Persistence(error)) => {
            tracing::error!("Order submission failed: {error}");
            let lines = active_lines(&session, mode).await;
            return Ok(CheckoutTemplate {
                buy_now: mode == CheckoutMode::BuyNow,
                summary: SummaryView::for_lines(&lines),
                form,
                error: Some("Failed to place order. Please try again.".to_owned()),
            }
            .into_response());
        }
    };

    Ok(CheckoutSuccessTemplate {
        order_id: order.id.as_str().to_owned(),
        total: order.total_price.to_string(),
    }
    .into_response())
}
