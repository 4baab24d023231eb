//! Page-session store: owns the catalog snapshot, the cart, and the
//! checkout attempt state, and talks to the backend and the user only
//! through the injected seams.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, CheckoutRequest, StorefrontApi};
use crate::catalog::CatalogCache;
use crate::checkout::{CheckoutOutcome, CheckoutState};
use crate::domain::cart::{Cart, CartLine};
use crate::domain::product::{leading_integer, ProductId};
use crate::errors::{ApplicationError, InputError};
use crate::notify::Notifier;
use crate::render::{render_cart, CartTable};

pub const DEFAULT_QUANTITY: i64 = 1;
pub const DEFAULT_HISTORY_PATH: &str = "/history";

pub struct StorefrontSession {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    catalog: CatalogCache,
    cart: Cart,
    view: CartTable,
    quantity_input: i64,
    checkout_state: CheckoutState,
    history_path: String,
    location: Option<String>,
}

impl StorefrontSession {
    pub fn new(api: Arc<dyn StorefrontApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            catalog: CatalogCache::default(),
            cart: Cart::default(),
            view: CartTable::default(),
            quantity_input: DEFAULT_QUANTITY,
            checkout_state: CheckoutState::Idle,
            history_path: DEFAULT_HISTORY_PATH.to_owned(),
            location: None,
        }
    }

    pub fn with_history_path(mut self, history_path: impl Into<String>) -> Self {
        self.history_path = history_path.into();
        self
    }

    /// Page-ready hook. A failure is logged by the catalog and leaves it
    /// empty for the rest of the session.
    pub async fn load_catalog(&mut self) -> Result<usize, ApiError> {
        self.catalog.load(self.api.as_ref()).await
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Table as of the last mutation.
    pub fn view(&self) -> &CartTable {
        &self.view
    }

    pub fn quantity_input(&self) -> i64 {
        self.quantity_input
    }

    pub fn set_quantity_input(&mut self, quantity: i64) {
        self.quantity_input = quantity;
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout_state
    }

    /// Where the session navigated after a successful checkout.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn render(&self) -> CartTable {
        render_cart(&self.cart)
    }

    fn refresh(&mut self) {
        self.view = render_cart(&self.cart);
    }

    /// Adds using raw control values: the selected option value and the
    /// quantity field text.
    pub async fn add_selected(
        &mut self,
        raw_selection: &str,
        raw_quantity: &str,
    ) -> Result<(), InputError> {
        let selection = ProductId::parse_selection(raw_selection);
        let quantity = leading_integer(raw_quantity).unwrap_or(0);
        self.add_to_cart(selection, quantity).await
    }

    /// Adds `quantity` units of the selected product.
    ///
    /// Rejections are shown through the notifier and leave the cart and the
    /// quantity field untouched. The stock check runs against the catalog
    /// snapshot and counts what is already in the cart; the backend has the
    /// final say at checkout.
    pub async fn add_to_cart(
        &mut self,
        selection: Option<ProductId>,
        quantity: i64,
    ) -> Result<(), InputError> {
        match self.try_add(selection, quantity) {
            Ok(()) => {
                self.refresh();
                self.quantity_input = DEFAULT_QUANTITY;
                Ok(())
            }
            Err(rejection) => {
                warn!(
                    event_name = "storefront.cart.add_rejected",
                    product_id = ?selection,
                    quantity,
                    reason = %rejection,
                    "cart addition rejected"
                );
                self.notifier.alert(rejection.user_message()).await;
                Err(rejection)
            }
        }
    }

    fn try_add(&mut self, selection: Option<ProductId>, quantity: i64) -> Result<(), InputError> {
        let product_id = selection.ok_or(InputError::NoSelection)?;
        let qty = u32::try_from(quantity)
            .ok()
            .filter(|qty| *qty > 0)
            .ok_or(InputError::InvalidQuantity { quantity })?;

        let product =
            self.catalog.find(product_id).ok_or(InputError::UnknownProduct(product_id))?;

        let requested = u64::from(self.cart.quantity_of(product_id)) + u64::from(qty);
        let available = product.stock;
        if i64::try_from(requested).map(|requested| requested > available).unwrap_or(true) {
            return Err(InputError::InsufficientStock { product_id, requested, available });
        }

        self.cart.merge(product, qty)
    }

    /// Removes the line at `index`; an out-of-range index changes nothing.
    pub fn remove_from_cart(&mut self, index: usize) -> Option<CartLine> {
        let removed = self.cart.remove(index);
        self.refresh();
        removed
    }

    /// Sends the whole cart as one checkout request.
    ///
    /// The cart is cleared only on an explicit backend success. A rejection
    /// or a transport failure leaves it exactly as submitted.
    pub async fn submit_order(&mut self) -> CheckoutOutcome {
        if self.cart.is_empty() {
            self.notifier.alert(&ApplicationError::EmptyCart.user_message()).await;
            return CheckoutOutcome::EmptyCart;
        }

        let correlation_id = Uuid::new_v4().to_string();
        self.advance(CheckoutState::Submitting, &correlation_id);

        let request = CheckoutRequest { cart: self.cart.lines().to_vec() };
        info!(
            event_name = "storefront.checkout.submitting",
            correlation_id = %correlation_id,
            line_count = request.cart.len(),
            total = %self.cart.total(),
            "submitting order"
        );

        match self.api.checkout(&request).await {
            Ok(response) if response.success => {
                self.notifier.alert(&response.message).await;
                self.cart.clear();
                self.refresh();
                self.location = Some(self.history_path.clone());
                self.advance(CheckoutState::Succeeded, &correlation_id);
                info!(
                    event_name = "storefront.checkout.succeeded",
                    correlation_id = %correlation_id,
                    "order accepted"
                );
                CheckoutOutcome::Succeeded {
                    message: response.message,
                    redirect_to: self.history_path.clone(),
                }
            }
            Ok(response) => {
                let rejection = ApplicationError::Rejected(response.message.clone());
                self.notifier.alert(&rejection.user_message()).await;
                self.advance(CheckoutState::Failed, &correlation_id);
                warn!(
                    event_name = "storefront.checkout.rejected",
                    correlation_id = %correlation_id,
                    message = %response.message,
                    "order rejected by backend"
                );
                CheckoutOutcome::Failed { message: response.message }
            }
            Err(err) => {
                self.advance(CheckoutState::TransportError, &correlation_id);
                error!(
                    event_name = "storefront.checkout.transport_error",
                    correlation_id = %correlation_id,
                    error = %err,
                    "checkout request failed"
                );
                CheckoutOutcome::TransportError { error: err.to_string() }
            }
        }
    }

    fn advance(&mut self, next: CheckoutState, correlation_id: &str) {
        if let Err(err) = self.checkout_state.transition_to(next) {
            warn!(
                event_name = "storefront.checkout.invalid_transition",
                correlation_id = %correlation_id,
                error = %err,
                "ignored checkout state transition"
            );
        }
    }
}
