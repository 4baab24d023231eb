//! HTTP implementation of [`StorefrontApi`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use storefront_core::api::{CHECKOUT_PATH, PRODUCTS_PATH};
use storefront_core::config::ApiConfig;
use storefront_core::{ApiError, CheckoutRequest, CheckoutResponse, Product, StorefrontApi};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url `{0}` (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("could not build http client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct HttpStorefrontApi {
    client: Client,
    base_url: String,
    session_cookie: Option<SecretString>,
}

impl std::fmt::Debug for HttpStorefrontApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStorefrontApi")
            .field("base_url", &self.base_url)
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpStorefrontApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build().map_err(ClientError::Build)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            session_cookie: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut api = Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        api.session_cookie = config.session_cookie.clone();
        Ok(api)
    }

    /// Forwards an existing backend session cookie with every request.
    pub fn with_session_cookie(mut self, cookie: SecretString) -> Self {
        self.session_cookie = Some(cookie);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.expose_secret()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.prepare(request).send().await.map_err(|error| {
            ApiError::Transport { endpoint: endpoint.to_owned(), message: error.to_string() }
        })?;
        decode(endpoint, response).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    debug!(event_name = "storefront.http.response", endpoint, status = status.as_u16());
    if !status.is_success() {
        return Err(ApiError::Status { endpoint: endpoint.to_owned(), status: status.as_u16() });
    }

    let body = response.bytes().await.map_err(|error| ApiError::Transport {
        endpoint: endpoint.to_owned(),
        message: error.to_string(),
    })?;
    serde_json::from_slice(&body).map_err(|error| ApiError::Decode {
        endpoint: endpoint.to_owned(),
        message: error.to_string(),
    })
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.send(PRODUCTS_PATH, self.client.get(self.url(PRODUCTS_PATH))).await
    }

    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
        self.send(CHECKOUT_PATH, self.client.post(self.url(CHECKOUT_PATH)).json(request)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::{ClientError, HttpStorefrontApi};

    #[test]
    fn rejects_non_http_base_url() {
        let result = HttpStorefrontApi::new("shop.local", Duration::from_secs(5));

        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(ref url)) if url == "shop.local"));
    }

    #[test]
    fn trailing_slash_is_trimmed_and_cookie_is_redacted() {
        let api = HttpStorefrontApi::new("http://127.0.0.1:5000/", Duration::from_secs(5))
            .expect("valid url")
            .with_session_cookie(SecretString::from("session=abc123".to_owned()));

        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert_eq!(api.url("/api/products"), "http://127.0.0.1:5000/api/products");
        assert!(!format!("{api:?}").contains("abc123"));
    }
}
