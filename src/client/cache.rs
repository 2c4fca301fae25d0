//! Last-known-good copies of server reads.
//!
//! A fetch that succeeds with data refreshes the cache; a fetch that fails
//! or comes back empty is answered from the cache, then from built-in
//! defaults.

use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::client::local_store::{LocalStore, get_json, set_json};

pub const CATEGORIES_KEY: &str = "categories";
pub const HERO_SLIDES_KEY: &str = "heroSlides";
pub const ADVERTISEMENTS_KEY: &str = "advertisements";
pub const FEATURED_PRODUCTS_KEY: &str = "featuredProducts";
pub const TESTIMONIALS_KEY: &str = "testimonials";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxAge {
    #[default]
    Forever,
    Within(Duration),
}

impl MaxAge {
    fn admits(&self, stored_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match (self, stored_at) {
            (MaxAge::Forever, _) => true,
            (MaxAge::Within(age), Some(stored_at)) => now - stored_at <= *age,
            // Entries written without a timestamp have unknown age.
            (MaxAge::Within(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Network,
    Cache,
    Defaults,
}

#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: DataSource,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub stored_at: DateTime<Utc>,
    pub value: T,
}

/// Entries are stored wrapped with their timestamp; bare values written by
/// older clients are still readable.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue<T> {
    Entry(CacheEntry<T>),
    Bare(T),
}

#[derive(Clone)]
pub struct FallbackCache {
    store: Arc<dyn LocalStore>,
    max_age: MaxAge,
}

impl FallbackCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            max_age: MaxAge::Forever,
        }
    }

    pub fn with_max_age(mut self, max_age: MaxAge) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let entry = CacheEntry {
            stored_at: Utc::now(),
            value,
        };
        if let Err(err) = set_json(self.store.as_ref(), key, &entry) {
            tracing::warn!(key, error = %err, "failed to refresh cache");
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let (stored_at, value) = match get_json::<StoredValue<T>>(self.store.as_ref(), key)? {
            StoredValue::Entry(entry) => (Some(entry.stored_at), entry.value),
            StoredValue::Bare(value) => (None, value),
        };
        if !self.max_age.admits(stored_at, now) {
            tracing::debug!(key, "cache entry expired");
            return None;
        }
        Some(value)
    }

    /// Apply the fallback policy to the outcome of a list fetch.
    pub fn resolve<T, E, F>(
        &self,
        key: &str,
        fetched: Result<Vec<T>, E>,
        defaults: F,
    ) -> Resolved<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        E: Display,
        F: FnOnce() -> Vec<T>,
    {
        match fetched {
            Ok(items) if !items.is_empty() => {
                self.put(key, &items);
                return Resolved {
                    value: items,
                    source: DataSource::Network,
                };
            }
            Ok(_) => tracing::debug!(key, "server returned no items"),
            Err(err) => tracing::warn!(key, error = %err, "fetch failed"),
        }

        if let Some(cached) = self.get::<Vec<T>>(key) {
            return Resolved {
                value: cached,
                source: DataSource::Cache,
            };
        }

        Resolved {
            value: defaults(),
            source: DataSource::Defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local_store::MemoryStore;

    fn cache() -> FallbackCache {
        FallbackCache::new(Arc::new(MemoryStore::new()))
    }

    fn defaults() -> Vec<String> {
        vec!["default".to_string()]
    }

    #[test]
    fn network_success_refreshes_cache() {
        let cache = cache();
        let resolved = cache.resolve(
            CATEGORIES_KEY,
            Ok::<_, String>(vec!["fresh".to_string()]),
            defaults,
        );
        assert_eq!(resolved.source, DataSource::Network);
        assert_eq!(cache.get::<Vec<String>>(CATEGORIES_KEY), Some(vec!["fresh".into()]));
    }

    #[test]
    fn failure_and_empty_fall_back_to_cache() {
        let cache = cache();
        cache.put(CATEGORIES_KEY, &vec!["cached".to_string()]);

        let failed = cache.resolve(CATEGORIES_KEY, Err::<Vec<String>, _>("timeout"), defaults);
        assert_eq!(failed.source, DataSource::Cache);
        assert_eq!(failed.value, vec!["cached".to_string()]);

        let empty = cache.resolve(CATEGORIES_KEY, Ok::<_, String>(Vec::new()), defaults);
        assert_eq!(empty.source, DataSource::Cache);
    }

    #[test]
    fn nothing_cached_uses_defaults() {
        let resolved = cache().resolve(TESTIMONIALS_KEY, Err::<Vec<String>, _>("down"), defaults);
        assert_eq!(resolved.source, DataSource::Defaults);
        assert_eq!(resolved.value, defaults());
    }

    #[test]
    fn max_age_expires_entries() {
        let cache = cache().with_max_age(MaxAge::Within(Duration::minutes(5)));
        cache.put(HERO_SLIDES_KEY, &vec![1, 2, 3]);

        let now = Utc::now();
        assert!(cache.get_at::<Vec<i32>>(HERO_SLIDES_KEY, now).is_some());
        assert!(cache
            .get_at::<Vec<i32>>(HERO_SLIDES_KEY, now + Duration::minutes(10))
            .is_none());
    }

    #[test]
    fn bare_values_are_accepted() {
        let cache = cache();
        cache.store().set(ADVERTISEMENTS_KEY, "[\"legacy\"]".into()).unwrap();
        assert_eq!(
            cache.get::<Vec<String>>(ADVERTISEMENTS_KEY),
            Some(vec!["legacy".to_string()])
        );

        let strict = cache.with_max_age(MaxAge::Within(Duration::days(1)));
        assert!(strict.get::<Vec<String>>(ADVERTISEMENTS_KEY).is_none());
    }
}
