//! [`CatalogClient`] over HTTP (`GET {base}/products/{id}`, `GET {base}/products`).
//!
//! The product id always travels as a single percent-encoded path segment, so an id such as
//! `p1/../p2` or `p2?x=1` names a product of that exact id and never another resource.

use super::{CatalogClient, CatalogError};
use crate::model::ProductSnapshot;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Builds a client whose every request is bounded by `timeout`.
    ///
    /// # Errors
    /// Returns [`CatalogError::Unavailable`] if `base_url` is not an absolute http(s) URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| CatalogError::Unavailable(format!("Invalid catalog URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Unavailable(format!(
                "Invalid catalog URL: {base_url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/products` followed by `segments`, each pushed as one encoded path segment.
    fn products_url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Unavailable(format!("Invalid catalog URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("products")
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    #[instrument(skip(self))]
    async fn get_product(&self, product_id: &str) -> Result<ProductSnapshot, CatalogError> {
        // Dot segments would be dropped by the URL encoder and address the list instead.
        if product_id.is_empty() || product_id == "." || product_id == ".." {
            return Err(CatalogError::NotFound(product_id.to_string()));
        }
        let url = self.products_url(&[product_id])?;
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Catalog request failed");
            CatalogError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Catalog answered without product");
            return Err(CatalogError::NotFound(product_id.to_string()));
        }

        response.json::<ProductSnapshot>().await.map_err(|e| {
            warn!(error = %e, "Catalog body could not be decoded");
            CatalogError::Unavailable(format!("undecodable product body: {e}"))
        })
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<ProductSnapshot>, CatalogError> {
        let url = self.products_url(&[])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!(
                "catalog list answered {status}"
            )));
        }

        response
            .json::<Vec<ProductSnapshot>>()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("undecodable product list: {e}")))
    }
}
