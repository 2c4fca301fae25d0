//! Client companion for storefront frontends: typed reads of the public
//! endpoints with the local fallback cache, and the local cart.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Advertisement, Category, HeroSlide, Order, Product, Testimonial};

pub mod cache;
pub mod cart;
pub mod cart_sync;
pub mod defaults;
pub mod local_store;

use cache::{
    ADVERTISEMENTS_KEY, CATEGORIES_KEY, FEATURED_PRODUCTS_KEY, FallbackCache, HERO_SLIDES_KEY,
    Resolved, TESTIMONIALS_KEY,
};
use local_store::LocalStore;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),
}

pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    cache: FallbackCache,
}

impl StorefrontClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn LocalStore>) -> Self {
        Self::with_cache(base_url, FallbackCache::new(store))
    }

    pub fn with_cache(base_url: impl Into<String>, cache: FallbackCache) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &FallbackCache {
        &self.cache
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<Vec<T>, ClientError> {
        let mut request = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn categories(&self) -> Resolved<Vec<Category>> {
        let fetched = self.fetch_list("/api/categories", None).await;
        self.cache.resolve(CATEGORIES_KEY, fetched, defaults::categories)
    }

    pub async fn hero_slides(&self) -> Resolved<Vec<HeroSlide>> {
        let fetched = self.fetch_list("/api/hero-slides?active=true", None).await;
        self.cache.resolve(HERO_SLIDES_KEY, fetched, defaults::hero_slides)
    }

    pub async fn advertisements(&self) -> Resolved<Vec<Advertisement>> {
        let fetched = self.fetch_list("/api/advertisements?active=true", None).await;
        self.cache
            .resolve(ADVERTISEMENTS_KEY, fetched, defaults::advertisements)
    }

    pub async fn featured_products(&self) -> Resolved<Vec<Product>> {
        let fetched = self.fetch_list("/api/products/featured", None).await;
        self.cache
            .resolve(FEATURED_PRODUCTS_KEY, fetched, defaults::featured_products)
    }

    pub async fn testimonials(&self) -> Resolved<Vec<Testimonial>> {
        let fetched = self.fetch_list("/api/testimonials?active=true", None).await;
        self.cache
            .resolve(TESTIMONIALS_KEY, fetched, defaults::testimonials)
    }

    /// Signed-in order history, cached under `orders_<userId>`.
    pub async fn order_history(&self, user_id: &str, token: &SecretString) -> Resolved<Vec<Order>> {
        let fetched = self.fetch_list("/api/orders", Some(token)).await;
        self.cache
            .resolve(&cart::orders_key(Some(user_id)), fetched, Vec::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{cache::DataSource, local_store::MemoryStore};

    fn offline_client(store: Arc<dyn LocalStore>) -> StorefrontClient {
        StorefrontClient::new("http://127.0.0.1:9/", store)
    }

    #[tokio::test]
    async fn unreachable_server_serves_defaults() {
        let client = offline_client(Arc::new(MemoryStore::new()));
        let categories = client.categories().await;
        assert_eq!(categories.source, DataSource::Defaults);
        assert_eq!(categories.value.len(), defaults::categories().len());

        let featured = client.featured_products().await;
        assert_eq!(featured.source, DataSource::Defaults);
        assert!(featured.value.is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_prefers_cache() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let client = offline_client(store);
        let cached = vec![defaults::categories().remove(1)];
        client.cache().put(CATEGORIES_KEY, &cached);

        let categories = client.categories().await;
        assert_eq!(categories.source, DataSource::Cache);
        assert_eq!(categories.value.len(), 1);
        assert_eq!(categories.value[0].name, "Fashion");
    }
}
