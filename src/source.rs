// Remote catalog source: fetch seam, HTTP client and in-memory stand-in

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::record::{CategoryEntry, Product, ProductId, ProductPage, normalize_categories};

/// Default upstream API
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Why a fetch produced no data.
///
/// Every variant is terminal for the attempt that produced it: there are no
/// automatic retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Network failure or client misconfiguration
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Upstream answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body did not have the expected shape
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Fetch interface consumed by the catalog
pub trait CatalogSource {
    /// The full product collection (dates not yet derived)
    fn fetch_products(&self) -> Result<ProductPage, FetchError>;

    /// Unique category slugs in upstream order
    fn fetch_categories(&self) -> Result<Vec<String>, FetchError>;

    /// A single product by id
    fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError>;
}

/// Blocking HTTP source for a DummyJSON-style API
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, &base_url))
    }

    /// Use a preconfigured client (proxies, TLS roots, headers)
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).send().map_err(|e| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        decode(&url, &body)
    }
}

impl CatalogSource for HttpSource {
    fn fetch_products(&self) -> Result<ProductPage, FetchError> {
        // limit=0 asks for the whole collection
        self.get_json("/products?limit=0&skip=0")
    }

    fn fetch_categories(&self) -> Result<Vec<String>, FetchError> {
        let entries: Vec<CategoryEntry> = self.get_json("/products/categories")?;
        Ok(normalize_categories(&entries))
    }

    fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.get_json(&format!("/products/{}", id))
    }
}

/// Decode a JSON body, mapping failures onto [`FetchError::Decode`]
pub fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// In-memory source serving a fixed collection
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    products: Vec<Product>,
    categories: Vec<String>,
    failure: Option<FetchError>,
}

impl StaticSource {
    pub fn new(products: Vec<Product>, categories: Vec<String>) -> Self {
        Self {
            products,
            categories,
            failure: None,
        }
    }

    /// Source whose every request fails with `error`
    pub fn failing(error: FetchError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), FetchError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl CatalogSource for StaticSource {
    fn fetch_products(&self) -> Result<ProductPage, FetchError> {
        self.check()?;
        let total = self.products.len() as u64;
        Ok(ProductPage {
            products: self.products.clone(),
            total,
            skip: 0,
            limit: total,
        })
    }

    fn fetch_categories(&self) -> Result<Vec<String>, FetchError> {
        self.check()?;
        Ok(self.categories.clone())
    }

    fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.check()?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("/products/{}", id),
                status: StatusCode::NOT_FOUND.as_u16(),
            })
    }
}
