use serde::Serialize;
use thiserror::Error;

use crate::domain::product::ProductId;

/// Problems with what the shopper asked for. These never reach the backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no product selected")]
    NoSelection,
    #[error("invalid quantity {quantity}")]
    InvalidQuantity { quantity: i64 },
    #[error("product {0} is not in the loaded catalog")]
    UnknownProduct(ProductId),
    #[error("requested {requested} of product {product_id} but only {available} in stock")]
    InsufficientStock { product_id: ProductId, requested: u64, available: i64 },
    #[error("adding product {product_id} would make the cart total too large")]
    TotalTooLarge { product_id: ProductId },
}

impl InputError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoSelection
            | Self::InvalidQuantity { .. }
            | Self::UnknownProduct(_)
            | Self::TotalTooLarge { .. } => {
                "Please select a product and enter a valid quantity."
            }
            Self::InsufficientStock { .. } => "Insufficient stock!",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("the cart is empty")]
    EmptyCart,
    #[error("checkout rejected: {0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    UserInput,
    BusinessRejection,
    Transport,
    ConfigValidation,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::BusinessRejection => "business_rejection",
            Self::Transport => "transport",
            Self::ConfigValidation => "config_validation",
        }
    }
}

impl ApplicationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Input(_) | Self::EmptyCart => ErrorClass::UserInput,
            Self::Rejected(_) => ErrorClass::BusinessRejection,
            Self::Transport(_) => ErrorClass::Transport,
            Self::Configuration(_) => ErrorClass::ConfigValidation,
        }
    }

    /// Text suitable for a dialog. Transport and configuration details stay
    /// in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(error) => error.user_message().to_owned(),
            Self::EmptyCart => "Your cart is empty!".to_owned(),
            Self::Rejected(message) => format!("Checkout failed: {message}"),
            Self::Transport(_) => {
                "The store is temporarily unreachable. Please retry shortly.".to_owned()
            }
            Self::Configuration(_) => "An unexpected internal error occurred.".to_owned(),
        }
    }
}
