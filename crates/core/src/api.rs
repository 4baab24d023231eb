//! Backend seam: the two REST calls a storefront session makes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cart::CartLine;
use crate::domain::product::Product;

pub const PRODUCTS_PATH: &str = "/api/products";
pub const CHECKOUT_PATH: &str = "/api/checkout";

/// Body of `POST /api/checkout`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cart: Vec<CartLine>,
}

/// Backend verdict on a checkout. `success == false` is a business rejection,
/// not a transport failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request to `{endpoint}` failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("`{endpoint}` answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode response from `{endpoint}`: {message}")]
    Decode { endpoint: String, message: String },
}

#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError>;
}
