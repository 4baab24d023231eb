use tracing::{error, info};

use crate::api::{ApiError, StorefrontApi};
use crate::domain::product::{Product, ProductId, ProductOption};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogState {
    Unloaded,
    Loaded,
    Failed,
}

/// Product snapshot fetched once per session.
///
/// A failed load leaves the cache empty and marked `Failed`; nothing retries
/// it, so every later lookup misses and cart additions are refused.
#[derive(Debug)]
pub struct CatalogCache {
    products: Vec<Product>,
    state: CatalogState,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self { products: Vec::new(), state: CatalogState::Unloaded }
    }
}

impl CatalogCache {
    pub async fn load(&mut self, api: &dyn StorefrontApi) -> Result<usize, ApiError> {
        if self.state != CatalogState::Unloaded {
            return Ok(self.products.len());
        }

        match api.fetch_products().await {
            Ok(products) => {
                info!(
                    event_name = "storefront.catalog.loaded",
                    product_count = products.len(),
                    "catalog loaded"
                );
                self.products = products;
                self.state = CatalogState::Loaded;
                Ok(self.products.len())
            }
            Err(err) => {
                error!(event_name = "storefront.catalog.load_failed", error = %err, "failed to load products");
                self.products.clear();
                self.state = CatalogState::Failed;
                Err(err)
            }
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    /// Selection control entries in catalog order; out-of-stock products are
    /// listed but disabled.
    pub fn options(&self) -> Vec<ProductOption> {
        self.products.iter().map(ProductOption::from).collect()
    }
}
