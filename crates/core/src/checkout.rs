//! Checkout orchestration.
//!
//! One orchestrator serves both entry paths: the persistent cart and the
//! buy-now slot. Whichever source is active is frozen into a
//! [`CheckoutSession`] when checkout opens; totals, validation, and the
//! submission state machine are identical from there on. After a successful
//! submission exactly the consumed source is cleared - a buy-now purchase
//! leaves the cart untouched.

use serde::{Deserialize, Serialize};

use crate::buy_now::BuyNowStore;
use crate::cart::{Cart, CartLine, CartStore};
use crate::gateway::{GatewayError, OrderGateway};
use crate::kv::{KvError, KvStore};
use crate::order::{NewOrder, Order, OrderItem};
use crate::types::{DeviceId, Rupees};

/// Orders at or above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Rupees = Rupees::new(2000);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Rupees = Rupees::new(150);

/// Which item source feeds this checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Cart,
    BuyNow,
}

impl CheckoutMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::BuyNow => "buynow",
        }
    }
}

impl std::str::FromStr for CheckoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "buynow" => Ok(Self::BuyNow),
            _ => Err(format!("invalid checkout mode: {s}")),
        }
    }
}

/// The chargeable amounts for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Rupees,
    pub shipping: Rupees,
    pub total: Rupees,
}

impl CheckoutTotals {
    /// Compute totals for the given lines. The free-shipping boundary is
    /// inclusive: a subtotal of exactly the threshold ships free.
    #[must_use]
    pub fn for_lines(lines: &[CartLine]) -> Self {
        let subtotal: Rupees = lines.iter().map(CartLine::line_price).sum();
        let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD {
            Rupees::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// How much more to spend for free shipping, if anything.
    #[must_use]
    pub fn remaining_for_free_shipping(&self) -> Option<Rupees> {
        if self.shipping.is_zero() {
            None
        } else {
            Some(FREE_SHIPPING_THRESHOLD.saturating_sub(self.subtotal))
        }
    }
}

/// Shopper contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    /// Optional; stored as entered when present.
    pub phone: Option<String>,
}

/// Shipping address fields, joined into one string at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// The single formatted address string persisted on the order. Empty
    /// parts are skipped.
    #[must_use]
    pub fn formatted(&self) -> String {
        [
            Some(self.line1.as_str()),
            self.line2.as_deref(),
            Some(self.city.as_str()),
            Some(self.state.as_str()),
            Some(self.pincode.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// The contact and address input for one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer: CustomerDetails,
    pub address: ShippingAddress,
}

/// A required checkout field is missing or malformed.
///
/// Validation failures are handled entirely locally - no gateway call is
/// made and the entered fields are preserved for correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("address line 1 is required")]
    MissingAddress,
    #[error("city is required")]
    MissingCity,
    #[error("state is required")]
    MissingState,
    #[error("pincode must be exactly 6 digits")]
    InvalidPincode,
}

impl OrderDraft {
    /// Validate the required fields: name, email, address line 1, city,
    /// state, and a 6-digit pincode. Phone is optional.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !is_plausible_email(self.customer.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.address.line1.trim().is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        if self.address.city.trim().is_empty() {
            return Err(ValidationError::MissingCity);
        }
        if self.address.state.trim().is_empty() {
            return Err(ValidationError::MissingState);
        }
        let pincode = self.address.pincode.trim();
        if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPincode);
        }
        Ok(())
    }
}

/// Structural email check: non-empty local part and domain around a single
/// `@`. Deliverability is the mail provider's problem, not checkout's.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
}

/// Checkout failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A required field is missing or malformed; nothing was submitted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The active item source was empty at submission time.
    #[error("no items to check out")]
    EmptyCheckout,

    /// A submission is already in flight; this attempt was ignored.
    #[error("an order submission is already in progress")]
    SubmissionInFlight,

    /// This session already produced an order.
    #[error("this order has already been placed")]
    AlreadyPlaced,

    /// The persistence backend failed; the session and its sources are
    /// untouched, so the same submission can be retried.
    #[error(transparent)]
    Persistence(#[from] GatewayError),

    /// The order was created, but the consumed source could not be cleared.
    #[error("order {} placed, but clearing the item source failed", order.id)]
    ClearFailed {
        order: Box<Order>,
        #[source]
        source: KvError,
    },
}

/// Submission progress for one checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutPhase {
    /// Waiting for contact/address input.
    PendingInput,
    /// A gateway call is in flight; further submits are rejected.
    Submitting,
    /// Terminal: the order was created.
    Succeeded(Order),
    /// The gateway call failed; lines and input remain valid for retry.
    Failed(String),
}

/// One checkout attempt over a frozen snapshot of the active item source.
///
/// Freezing at open time means later mutations of the cart or slot cannot
/// change what this attempt would submit.
#[derive(Debug)]
pub struct CheckoutSession {
    mode: CheckoutMode,
    lines: Vec<CartLine>,
    phase: CheckoutPhase,
}

impl CheckoutSession {
    /// Open a cart-mode checkout over the cart's current lines.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            mode: CheckoutMode::Cart,
            lines: cart.lines().to_vec(),
            phase: CheckoutPhase::PendingInput,
        }
    }

    /// Open a buy-now checkout. An empty slot opens an empty session (the
    /// caller renders the empty-checkout state rather than crashing).
    #[must_use]
    pub fn from_buy_now(slot: Option<CartLine>) -> Self {
        Self {
            mode: CheckoutMode::BuyNow,
            lines: slot.into_iter().collect(),
            phase: CheckoutPhase::PendingInput,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> CheckoutMode {
        self.mode
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::for_lines(&self.lines)
    }

    /// Submit this checkout.
    ///
    /// Preconditions are checked before any gateway call: no submission in
    /// flight or already succeeded, non-empty lines, valid draft. On gateway
    /// failure the phase moves to [`CheckoutPhase::Failed`] with the lines
    /// preserved; a retry is a plain second call.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. Only [`CheckoutError::Persistence`] indicates
    /// a gateway call was actually made.
    pub async fn submit<G: OrderGateway>(
        &mut self,
        gateway: &G,
        device: &DeviceId,
        draft: &OrderDraft,
    ) -> Result<Order, CheckoutError> {
        match self.phase {
            CheckoutPhase::Submitting => return Err(CheckoutError::SubmissionInFlight),
            CheckoutPhase::Succeeded(_) => return Err(CheckoutError::AlreadyPlaced),
            CheckoutPhase::PendingInput | CheckoutPhase::Failed(_) => {}
        }
        if self.lines.is_empty() {
            return Err(CheckoutError::EmptyCheckout);
        }
        draft.validate()?;

        let totals = self.totals();
        let new_order = NewOrder {
            device_id: device.clone(),
            customer_name: draft.customer.name.trim().to_owned(),
            customer_email: draft.customer.email.trim().to_owned(),
            customer_phone: draft
                .customer
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
            customer_address: draft.address.formatted(),
            items: self.lines.iter().map(OrderItem::from).collect(),
            total_price: totals.total,
            shipping_cost: totals.shipping,
        };

        self.phase = CheckoutPhase::Submitting;
        match gateway.create_order(new_order).await {
            Ok(order) => {
                self.phase = CheckoutPhase::Succeeded(order.clone());
                Ok(order)
            }
            Err(error) => {
                self.phase = CheckoutPhase::Failed(error.to_string());
                Err(CheckoutError::Persistence(error))
            }
        }
    }
}

/// Open, submit, and settle a checkout in one call.
///
/// This is the entry point the web layer uses: it freezes whichever source
/// `mode` selects, submits, and on success clears exactly the consumed
/// source. Any failure before or during submission leaves both sources
/// unmodified.
///
/// # Errors
///
/// [`CheckoutError::ClearFailed`] still carries the created order - the
/// purchase went through even though the source could not be cleared.
pub async fn place_order<C, B, G>(
    mode: CheckoutMode,
    cart: &mut CartStore<C>,
    buy_now: &mut BuyNowStore<B>,
    gateway: &G,
    device: &DeviceId,
    draft: &OrderDraft,
) -> Result<Order, CheckoutError>
where
    C: KvStore,
    B: KvStore,
    G: OrderGateway,
{
    let mut session = match mode {
        CheckoutMode::Cart => CheckoutSession::from_cart(cart.cart()),
        CheckoutMode::BuyNow => CheckoutSession::from_buy_now(buy_now.peek().cloned()),
    };

    let order = session.submit(gateway, device, draft).await?;

    let cleared = match mode {
        CheckoutMode::Cart => cart.clear().await,
        CheckoutMode::BuyNow => buy_now.clear().await,
    };
    if let Err(source) = cleared {
        return Err(CheckoutError::ClearFailed {
            order: Box::new(order),
            source,
        });
    }
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::kv::MemoryStore;
    use crate::types::{ProductId, ProductSnapshot, ProductStatus};

    fn snapshot(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            title: id.to_owned(),
            author: "Author".to_owned(),
            price: Rupees::new(price),
            original_price: Rupees::new(price),
            image: String::new(),
            genre: Vec::new(),
            rating: 0.0,
            volumes: 1,
            status: ProductStatus::Completed,
        }
    }

    fn line(id: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            item: snapshot(id, price),
            quantity,
        }
    }

    fn valid_draft() -> OrderDraft {
        OrderDraft {
            customer: CustomerDetails {
                name: "Asha Rao".to_owned(),
                email: "asha@example.com".to_owned(),
                phone: None,
            },
            address: ShippingAddress {
                line1: "12 MG Road".to_owned(),
                line2: None,
                city: "Bengaluru".to_owned(),
                state: "Karnataka".to_owned(),
                pincode: "560001".to_owned(),
            },
        }
    }

    #[test]
    fn test_free_shipping_boundary_is_inclusive() {
        for (subtotal, shipping) in [(1999, 150), (2000, 0), (2001, 0)] {
            let totals = CheckoutTotals::for_lines(&[line("a", subtotal, 1)]);
            assert_eq!(totals.subtotal, Rupees::new(subtotal));
            assert_eq!(totals.shipping, Rupees::new(shipping));
            assert_eq!(totals.total, Rupees::new(subtotal + shipping));
        }
    }

    #[test]
    fn test_free_shipping_nudge() {
        let below = CheckoutTotals::for_lines(&[line("a", 500, 1)]);
        assert_eq!(below.remaining_for_free_shipping(), Some(Rupees::new(1500)));

        let above = CheckoutTotals::for_lines(&[line("a", 2500, 1)]);
        assert_eq!(above.remaining_for_free_shipping(), None);
    }

    #[test]
    fn test_address_formatting_skips_empty_parts() {
        let mut address = valid_draft().address;
        assert_eq!(
            address.formatted(),
            "12 MG Road, Bengaluru, Karnataka, 560001"
        );
        address.line2 = Some("Near Ulsoor Lake".to_owned());
        assert_eq!(
            address.formatted(),
            "12 MG Road, Near Ulsoor Lake, Bengaluru, Karnataka, 560001"
        );
    }

    #[test]
    fn test_draft_validation() {
        assert!(valid_draft().validate().is_ok());

        let mut draft = valid_draft();
        draft.customer.name = "  ".to_owned();
        assert_eq!(draft.validate(), Err(ValidationError::MissingName));

        let mut draft = valid_draft();
        draft.customer.email = "not-an-email".to_owned();
        assert_eq!(draft.validate(), Err(ValidationError::InvalidEmail));

        let mut draft = valid_draft();
        draft.address.pincode = "5600".to_owned();
        assert_eq!(draft.validate(), Err(ValidationError::InvalidPincode));

        let mut draft = valid_draft();
        draft.address.pincode = "56000a".to_owned();
        assert_eq!(draft.validate(), Err(ValidationError::InvalidPincode));
    }

    #[tokio::test]
    async fn test_empty_checkout_never_reaches_gateway() {
        let gateway = MemoryGateway::new();
        let mut session = CheckoutSession::from_buy_now(None);
        let result = session
            .submit(&gateway, &DeviceId::new("d"), &valid_draft())
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCheckout)));
        assert!(gateway.stored().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_gateway() {
        let gateway = MemoryGateway::new();
        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 1);
        let mut session = CheckoutSession::from_cart(&cart);

        let mut draft = valid_draft();
        draft.address.city = String::new();
        let result = session.submit(&gateway, &DeviceId::new("d"), &draft).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::MissingCity))
        ));
        assert!(gateway.stored().is_empty());
        assert_eq!(*session.phase(), CheckoutPhase::PendingInput);
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_rejected() {
        let gateway = MemoryGateway::new();
        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 1);
        let mut session = CheckoutSession::from_cart(&cart);
        session.phase = CheckoutPhase::Submitting;

        let result = session
            .submit(&gateway, &DeviceId::new("d"), &valid_draft())
            .await;
        assert!(matches!(result, Err(CheckoutError::SubmissionInFlight)));
        assert!(gateway.stored().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_after_success_is_rejected() {
        let gateway = MemoryGateway::new();
        let mut cart = Cart::default();
        cart.add(snapshot("a", 2500), 1);
        let mut session = CheckoutSession::from_cart(&cart);
        let device = DeviceId::new("d");

        session.submit(&gateway, &device, &valid_draft()).await.unwrap();
        let again = session.submit(&gateway, &device, &valid_draft()).await;
        assert!(matches!(again, Err(CheckoutError::AlreadyPlaced)));
        assert_eq!(gateway.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_lines_and_allows_retry() {
        let gateway = MemoryGateway::new();
        gateway.inject_failure(GatewayError::Unavailable("backend down".to_owned()));

        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 1);
        let mut session = CheckoutSession::from_cart(&cart);
        let device = DeviceId::new("d");

        let first = session.submit(&gateway, &device, &valid_draft()).await;
        assert!(matches!(first, Err(CheckoutError::Persistence(_))));
        assert!(matches!(session.phase(), CheckoutPhase::Failed(_)));
        assert_eq!(session.lines().len(), 1);

        let retry = session.submit(&gateway, &device, &valid_draft()).await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn test_order_snapshot_is_immutable_after_creation() {
        let gateway = MemoryGateway::new();
        let kv = MemoryStore::new();
        let mut cart = CartStore::load(kv.clone(), "cart").await;
        cart.add_item(snapshot("a", 1200), 1).await.unwrap();
        let mut buy_now = BuyNowStore::load(kv, "buy_now").await;
        let device = DeviceId::new("d");

        let order = place_order(
            CheckoutMode::Cart,
            &mut cart,
            &mut buy_now,
            &gateway,
            &device,
            &valid_draft(),
        )
        .await
        .unwrap();

        // Later cart activity cannot touch the stored order.
        cart.add_item(snapshot("b", 9999), 3).await.unwrap();
        let stored = gateway.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].items, order.items);
        assert_eq!(stored[0].total_price, order.total_price);
    }

    #[tokio::test]
    async fn test_cart_mode_success_clears_cart_only() {
        let gateway = MemoryGateway::new();
        let kv = MemoryStore::new();
        let mut cart = CartStore::load(kv.clone(), "cart").await;
        cart.add_item(snapshot("a", 1200), 1).await.unwrap();
        cart.add_item(snapshot("b", 900), 2).await.unwrap();
        let mut buy_now = BuyNowStore::load(kv, "buy_now").await;
        let device = DeviceId::new("d");

        let order = place_order(
            CheckoutMode::Cart,
            &mut cart,
            &mut buy_now,
            &gateway,
            &device,
            &valid_draft(),
        )
        .await
        .unwrap();

        assert_eq!(order.total_price, Rupees::new(3000));
        assert_eq!(order.shipping_cost, Rupees::ZERO);
        assert_eq!(order.items.len(), 2);
        assert_eq!(cart.cart().total_items(), 0);
    }

    #[tokio::test]
    async fn test_buy_now_mode_leaves_cart_untouched() {
        let gateway = MemoryGateway::new();
        let kv = MemoryStore::new();
        let mut cart = CartStore::load(kv.clone(), "cart").await;
        for id in ["a", "b", "c"] {
            cart.add_item(snapshot(id, 400), 1).await.unwrap();
        }
        let mut buy_now = BuyNowStore::load(kv, "buy_now").await;
        buy_now.set(snapshot("d", 2000), 1).await.unwrap();
        let device = DeviceId::new("d");

        let order = place_order(
            CheckoutMode::BuyNow,
            &mut cart,
            &mut buy_now,
            &gateway,
            &device,
            &valid_draft(),
        )
        .await
        .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price, Rupees::new(2000));
        assert_eq!(order.shipping_cost, Rupees::ZERO);
        assert!(buy_now.peek().is_none());
        assert_eq!(cart.cart().lines().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_submission_clears_nothing() {
        let gateway = MemoryGateway::new();
        gateway.inject_failure(GatewayError::Rejected("missing column".to_owned()));

        let kv = MemoryStore::new();
        let mut cart = CartStore::load(kv.clone(), "cart").await;
        cart.add_item(snapshot("a", 500), 1).await.unwrap();
        let mut buy_now = BuyNowStore::load(kv, "buy_now").await;
        buy_now.set(snapshot("b", 700), 1).await.unwrap();
        let device = DeviceId::new("d");

        let result = place_order(
            CheckoutMode::Cart,
            &mut cart,
            &mut buy_now,
            &gateway,
            &device,
            &valid_draft(),
        )
        .await;

        assert!(matches!(result, Err(CheckoutError::Persistence(_))));
        assert_eq!(cart.cart().total_items(), 1);
        assert!(buy_now.peek().is_some());
    }

    #[tokio::test]
    async fn test_phone_is_trimmed_and_optional() {
        let gateway = MemoryGateway::new();
        let mut cart = Cart::default();
        cart.add(snapshot("a", 2500), 1);
        let mut session = CheckoutSession::from_cart(&cart);

        let mut draft = valid_draft();
        draft.customer.phone = Some("  ".to_owned());
        let order = session
            .submit(&gateway, &DeviceId::new("d"), &draft)
            .await
            .unwrap();
        assert_eq!(order.customer_phone, None);
    }
}
