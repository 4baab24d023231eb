use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use storefront_core::{
    ApiError, CheckoutOutcome, CheckoutRequest, CheckoutResponse, CheckoutState, InputError,
    Product, ProductId, RecordingNotifier, StorefrontApi, StorefrontSession,
};

#[derive(Default)]
struct ScriptedApi {
    products: Vec<Product>,
    checkout_reply: Mutex<Option<Result<CheckoutResponse, ApiError>>>,
    checkout_requests: Mutex<Vec<CheckoutRequest>>,
}

impl ScriptedApi {
    fn with_products(products: Vec<Product>) -> Self {
        Self { products, ..Self::default() }
    }

    fn reply(self, reply: Result<CheckoutResponse, ApiError>) -> Self {
        *self.checkout_reply.lock().expect("reply lock") = Some(reply);
        self
    }

    fn requests(&self) -> Vec<CheckoutRequest> {
        self.checkout_requests.lock().expect("request lock").clone()
    }
}

#[async_trait]
impl StorefrontApi for ScriptedApi {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.clone())
    }

    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
        self.checkout_requests.lock().expect("request lock").push(request.clone());
        self.checkout_reply
            .lock()
            .expect("reply lock")
            .clone()
            .unwrap_or_else(|| Ok(CheckoutResponse { success: true, message: "OK".to_owned() }))
    }
}

fn product(id: i64, name: &str, price: i64, stock: i64) -> Product {
    Product { id: ProductId(id), name: name.to_owned(), base_price: Decimal::new(price, 0), stock }
}

fn widget_catalog() -> Vec<Product> {
    vec![product(1, "Widget", 10, 5), product(2, "Gadget", 50, 20), product(3, "Relic", 99, 0)]
}

async fn session_with(api: Arc<ScriptedApi>) -> (StorefrontSession, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let mut session = StorefrontSession::new(api, Arc::new(notifier.clone()));
    session.load_catalog().await.expect("scripted catalog loads");
    (session, notifier)
}

#[tokio::test]
async fn repeated_adds_merge_into_one_line() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()));
    let (mut session, _) = session_with(api).await;

    for qty in [2, 5, 1] {
        session.add_to_cart(Some(ProductId(2)), qty).await.expect("within stock");
    }

    assert_eq!(session.cart().len(), 1);
    assert_eq!(session.cart().quantity_of(ProductId(2)), 8);
    assert_eq!(session.view().total, Decimal::new(400, 0));
}

#[tokio::test]
async fn widget_stock_limit_counts_what_is_already_in_the_cart() {
    let api = Arc::new(ScriptedApi::with_products(vec![product(1, "Widget", 10, 5)]));
    let (mut session, notifier) = session_with(api).await;

    session.add_to_cart(Some(ProductId(1)), 3).await.expect("3 of 5 fits");
    session.set_quantity_input(3);
    let second = session.add_to_cart(Some(ProductId(1)), 3).await;

    assert_eq!(
        second,
        Err(InputError::InsufficientStock { product_id: ProductId(1), requested: 6, available: 5 })
    );
    assert_eq!(session.cart().quantity_of(ProductId(1)), 3);
    assert_eq!(session.quantity_input(), 3, "rejected add keeps the quantity field");
    assert_eq!(notifier.alerts(), vec!["Insufficient stock!".to_owned()]);
}

#[tokio::test]
async fn successful_add_resets_quantity_input() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()));
    let (mut session, _) = session_with(api).await;

    session.set_quantity_input(4);
    session.add_selected("2", "4").await.expect("valid add");

    assert_eq!(session.quantity_input(), 1);
    assert_eq!(session.view().rows.len(), 1);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_a_warning() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()));
    let (mut session, notifier) = session_with(api).await;

    assert_eq!(session.add_selected("", "2").await, Err(InputError::NoSelection));
    assert_eq!(
        session.add_to_cart(Some(ProductId(1)), 0).await,
        Err(InputError::InvalidQuantity { quantity: 0 })
    );
    assert_eq!(
        session.add_selected("1", "abc").await,
        Err(InputError::InvalidQuantity { quantity: 0 })
    );
    assert_eq!(
        session.add_to_cart(Some(ProductId(42)), 1).await,
        Err(InputError::UnknownProduct(ProductId(42)))
    );
    assert!(matches!(
        session.add_to_cart(Some(ProductId(3)), 1).await,
        Err(InputError::InsufficientStock { available: 0, .. })
    ));

    assert!(session.cart().is_empty());
    assert_eq!(notifier.alerts().len(), 5);
}

#[tokio::test]
async fn add_that_would_overflow_the_total_is_rejected() {
    let heirloom = Product { base_price: Decimal::MAX, ..product(9, "Heirloom", 0, 10) };
    let api = Arc::new(ScriptedApi::with_products(vec![heirloom]));
    let (mut session, notifier) = session_with(api).await;

    session.add_to_cart(Some(ProductId(9)), 1).await.expect("one unit fits");
    assert_eq!(
        session.add_to_cart(Some(ProductId(9)), 2).await,
        Err(InputError::TotalTooLarge { product_id: ProductId(9) })
    );

    assert_eq!(session.cart().quantity_of(ProductId(9)), 1);
    assert_eq!(session.view().total, Decimal::MAX);
    assert_eq!(
        notifier.alerts(),
        vec!["Please select a product and enter a valid quantity.".to_owned()]
    );
}

#[tokio::test]
async fn remove_rerenders_without_the_removed_line() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()));
    let (mut session, _) = session_with(api).await;
    session.add_to_cart(Some(ProductId(1)), 1).await.expect("add widget");
    session.add_to_cart(Some(ProductId(2)), 1).await.expect("add gadget");

    let removed = session.remove_from_cart(0).expect("line 0 exists");

    assert_eq!(removed.id, ProductId(1));
    assert!(session.view().rows.iter().all(|row| row.product_id != ProductId(1)));
    assert_eq!(session.view().rows[0].index, 0);

    let before = session.cart().clone();
    assert!(session.remove_from_cart(9).is_none());
    assert_eq!(session.cart(), &before);
    assert_eq!(session.render(), *session.view());
}

#[tokio::test]
async fn empty_cart_checkout_makes_no_request() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()));
    let (mut session, notifier) = session_with(api.clone()).await;

    let outcome = session.submit_order().await;

    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert!(api.requests().is_empty());
    assert!(session.cart().is_empty());
    assert_eq!(session.checkout_state(), CheckoutState::Idle);
    assert_eq!(notifier.alerts(), vec!["Your cart is empty!".to_owned()]);
}

#[tokio::test]
async fn successful_checkout_clears_cart_and_navigates_to_history() {
    let api = Arc::new(
        ScriptedApi::with_products(widget_catalog())
            .reply(Ok(CheckoutResponse { success: true, message: "OK".to_owned() })),
    );
    let (mut session, notifier) = session_with(api.clone()).await;
    session.add_to_cart(Some(ProductId(1)), 2).await.expect("add widget");

    let outcome = session.submit_order().await;

    assert_eq!(
        outcome,
        CheckoutOutcome::Succeeded { message: "OK".to_owned(), redirect_to: "/history".to_owned() }
    );
    assert!(session.cart().is_empty());
    assert!(session.view().is_empty());
    assert_eq!(session.location(), Some("/history"));
    assert_eq!(session.checkout_state(), CheckoutState::Succeeded);
    assert_eq!(notifier.alerts(), vec!["OK".to_owned()]);

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    let body = serde_json::to_value(&requests[0]).expect("request serializes");
    assert_eq!(
        body,
        serde_json::json!({ "cart": [{ "id": 1, "name": "Widget", "price": 10.0, "qty": 2 }] })
    );
}

#[tokio::test]
async fn rejected_checkout_keeps_the_cart_and_shows_the_message() {
    let api = Arc::new(
        ScriptedApi::with_products(widget_catalog())
            .reply(Ok(CheckoutResponse { success: false, message: "Out of stock".to_owned() })),
    );
    let (mut session, notifier) = session_with(api).await;
    session.add_to_cart(Some(ProductId(2)), 1).await.expect("add gadget");

    let outcome = session.submit_order().await;

    assert_eq!(outcome, CheckoutOutcome::Failed { message: "Out of stock".to_owned() });
    assert_eq!(session.cart().len(), 1);
    assert_eq!(session.location(), None);
    assert_eq!(session.checkout_state(), CheckoutState::Failed);
    assert_eq!(notifier.alerts(), vec!["Checkout failed: Out of stock".to_owned()]);
}

#[tokio::test]
async fn transport_failure_keeps_the_cart_and_allows_retry() {
    let api = Arc::new(ScriptedApi::with_products(widget_catalog()).reply(Err(
        ApiError::Transport {
            endpoint: "/api/checkout".to_owned(),
            message: "connection reset".to_owned(),
        },
    )));
    let (mut session, notifier) = session_with(api.clone()).await;
    session.add_to_cart(Some(ProductId(1)), 1).await.expect("add widget");

    let outcome = session.submit_order().await;

    assert!(matches!(outcome, CheckoutOutcome::TransportError { ref error } if error.contains("connection reset")));
    assert_eq!(session.cart().len(), 1);
    assert_eq!(session.checkout_state(), CheckoutState::TransportError);
    assert!(notifier.alerts().is_empty(), "transport errors are logged, not shown");

    let retry = session.submit_order().await;
    assert!(matches!(retry, CheckoutOutcome::TransportError { .. }));
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn failed_catalog_load_refuses_additions() {
    struct DownApi;

    #[async_trait]
    impl StorefrontApi for DownApi {
        async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
            Err(ApiError::Status { endpoint: "/api/products".to_owned(), status: 502 })
        }

        async fn checkout(&self, _request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
            unreachable!("a cart built on an empty catalog is never submitted")
        }
    }

    let notifier = RecordingNotifier::default();
    let mut session = StorefrontSession::new(Arc::new(DownApi), Arc::new(notifier.clone()));

    assert!(session.load_catalog().await.is_err());
    assert!(session.catalog().is_empty());
    assert_eq!(
        session.add_to_cart(Some(ProductId(1)), 1).await,
        Err(InputError::UnknownProduct(ProductId(1)))
    );
    assert_eq!(session.submit_order().await, CheckoutOutcome::EmptyCart);
}
