pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod errors;
pub mod loader;
pub mod notify;
pub mod order_form;
pub mod render;
pub mod session;

pub use api::{ApiError, CheckoutRequest, CheckoutResponse, StorefrontApi};
pub use catalog::{CatalogCache, CatalogState};
pub use checkout::{CheckoutOutcome, CheckoutState};
pub use domain::cart::{Cart, CartLine};
pub use domain::product::{Product, ProductId, ProductOption};
pub use errors::{ApplicationError, ErrorClass, InputError};
pub use notify::{ConfirmOptions, Notifier, RecordingNotifier};
pub use render::{render_cart, CartRow, CartTable};
pub use session::StorefrontSession;
