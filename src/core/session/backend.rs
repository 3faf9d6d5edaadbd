//! Storage backends behind the session store.
//!
//! Two surfaces: a cookie jar for the credentials and a key-value cache for
//! the profile record. Browser implementations live in `ui::browser`; the
//! in-memory ones here serve native tools and tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::core::error::StorageError;

/// Cookie storage scoped to path `/`
pub trait CookieJar: Send + Sync {
    /// Current value, `None` when unset or expired
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StorageError>;

    /// Removing a missing cookie is a no-op
    fn remove(&self, name: &str);
}

/// Page-local key-value storage
pub trait LocalCache: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is a no-op
    fn remove_item(&self, key: &str);
}

impl<T: CookieJar + ?Sized> CookieJar for Arc<T> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StorageError> {
        (**self).set(name, value, max_age)
    }

    fn remove(&self, name: &str) {
        (**self).remove(name)
    }
}

impl<T: LocalCache + ?Sized> LocalCache for Arc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory cookie jar honouring `max_age`
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: DashMap<String, StoredCookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry of a cookie that is still set
    pub fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.cookies
            .get(name)
            .map(|c| c.expires_at)
            .filter(|at| *at > Utc::now())
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        let cookie = self.cookies.get(name)?.clone();
        if cookie.expires_at > now {
            Some(cookie.value)
        } else {
            self.cookies.remove(name);
            None
        }
    }

    fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StorageError> {
        self.cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at: Utc::now() + max_age,
            },
        );
        Ok(())
    }

    fn remove(&self, name: &str) {
        self.cookies.remove(name);
    }
}

/// In-memory local cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    items: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl LocalCache for MemoryCache {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).map(|v| v.clone())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_roundtrip() {
        let jar = MemoryCookieJar::new();
        jar.set("access_token", "abc", Duration::hours(1)).unwrap();

        assert_eq!(jar.get("access_token"), Some("abc".to_string()));
        assert!(jar.expires_at("access_token").is_some());
    }

    #[test]
    fn test_expired_cookie_reads_as_absent() {
        let jar = MemoryCookieJar::new();
        jar.set("access_token", "abc", Duration::zero()).unwrap();

        assert_eq!(jar.get("access_token"), None);
        assert_eq!(jar.expires_at("access_token"), None);
    }

    #[test]
    fn test_remove_missing_cookie_is_noop() {
        let jar = MemoryCookieJar::new();
        jar.remove("refresh_token");
        assert_eq!(jar.get("refresh_token"), None);
    }

    #[test]
    fn test_cache_roundtrip_and_remove() {
        let cache = MemoryCache::new();
        cache.set_item("user", "{}").unwrap();
        assert_eq!(cache.get_item("user"), Some("{}".to_string()));
        assert_eq!(cache.len(), 1);

        cache.remove_item("user");
        cache.remove_item("user");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_backend_through_arc() {
        let jar = Arc::new(MemoryCookieJar::new());
        let shared: Box<dyn CookieJar> = Box::new(jar.clone());

        shared.set("refresh_token", "r1", Duration::days(7)).unwrap();
        assert_eq!(jar.get("refresh_token"), Some("r1".to_string()));
    }
}
