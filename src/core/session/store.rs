//! Session store: credential cookies plus the cached profile record.
//!
//! All mutations run under one write lock so a clear can never interleave
//! with a write. Reads are lock-free and never fail: anything unset or
//! unparsable reads as absent.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Duration;

use super::backend::{CookieJar, LocalCache, MemoryCache, MemoryCookieJar};
use crate::core::auth::User;
use crate::core::config::Config;
use crate::core::error::StorageError;
use crate::core::logging::session_warn;

/// Cookie holding the short-lived access credential
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie holding the long-lived refresh credential
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cache key of the serialized profile record
pub const PROFILE_KEY: &str = "user";

/// Cache key of the one-time notification prompt flag (not session state)
pub const NOTIFICATION_PROMPT_KEY: &str = "notification_permission_asked";

/// What the profile cache currently holds
#[derive(Debug, Clone, PartialEq)]
pub enum CachedProfile {
    Missing,
    /// Present but not a valid profile record
    Corrupt,
    Present(User),
}

/// Durable, synchronous session persistence
pub struct SessionStore {
    cookies: Box<dyn CookieJar>,
    cache: Box<dyn LocalCache>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

impl SessionStore {
    pub fn new(
        cookies: impl CookieJar + 'static,
        cache: impl LocalCache + 'static,
        config: &Config,
    ) -> Self {
        Self {
            cookies: Box::new(cookies),
            cache: Box::new(cache),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by in-memory cookies and cache
    pub fn in_memory(config: &Config) -> Self {
        Self::new(MemoryCookieJar::new(), MemoryCache::new(), config)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write both credentials and the profile as one logical unit.
    ///
    /// If any write fails the whole session is cleared before the error is
    /// returned, so a half-written credential pair is never left behind.
    pub fn set_session(&self, access: &str, refresh: &str, profile: &User) -> Result<(), StorageError> {
        let profile_json = serialize_profile(profile)?;

        let _guard = self.lock();
        let written = self
            .cookies
            .set(ACCESS_COOKIE, access, self.access_ttl)
            .and_then(|_| self.cookies.set(REFRESH_COOKIE, refresh, self.refresh_ttl))
            .and_then(|_| self.cache.set_item(PROFILE_KEY, &profile_json));

        if let Err(err) = written {
            session_warn!(err, "Session write failed, clearing partial session");
            self.clear_unlocked();
            return Err(err);
        }
        Ok(())
    }

    /// Replace the access credential after a silent refresh.
    ///
    /// Only writes when `refresh_used` is still the stored refresh credential;
    /// returns `false` when the session was cleared or replaced meanwhile.
    pub fn replace_access(&self, refresh_used: &str, access: &str) -> Result<bool, StorageError> {
        let _guard = self.lock();
        if self.cookies.get(REFRESH_COOKIE).as_deref() != Some(refresh_used) {
            return Ok(false);
        }
        self.cookies.set(ACCESS_COOKIE, access, self.access_ttl)?;
        Ok(true)
    }

    /// Overwrite the cached profile of the current session.
    pub fn update_profile(&self, profile: &User) -> Result<(), StorageError> {
        let profile_json = serialize_profile(profile)?;
        let _guard = self.lock();
        self.cache.set_item(PROFILE_KEY, &profile_json)
    }

    /// Delete both credentials and the profile cache. Idempotent.
    pub fn clear_session(&self) {
        let _guard = self.lock();
        self.clear_unlocked();
    }

    fn clear_unlocked(&self) {
        self.cookies.remove(ACCESS_COOKIE);
        self.cookies.remove(REFRESH_COOKIE);
        self.cache.remove_item(PROFILE_KEY);
    }

    pub fn access_token(&self) -> Option<String> {
        self.cookies.get(ACCESS_COOKIE).filter(|v| !v.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.cookies.get(REFRESH_COOKIE).filter(|v| !v.is_empty())
    }

    /// Both credentials present
    pub fn has_credentials(&self) -> bool {
        self.access_token().is_some() && self.refresh_token().is_some()
    }

    /// Cached profile, `None` when missing or unparsable
    pub fn cached_profile(&self) -> Option<User> {
        match self.cached_profile_state() {
            CachedProfile::Present(user) => Some(user),
            CachedProfile::Missing | CachedProfile::Corrupt => None,
        }
    }

    pub fn cached_profile_state(&self) -> CachedProfile {
        match self.cache.get_item(PROFILE_KEY) {
            None => CachedProfile::Missing,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => CachedProfile::Present(user),
                Err(err) => {
                    tracing::debug!(error = %err, "Cached profile is not valid JSON");
                    CachedProfile::Corrupt
                }
            },
        }
    }

    /// Whether the browser-notification prompt was already shown
    pub fn notification_prompt_asked(&self) -> bool {
        self.cache.get_item(NOTIFICATION_PROMPT_KEY).as_deref() == Some("true")
    }

    pub fn mark_notification_prompt_asked(&self) -> Result<(), StorageError> {
        self.cache.set_item(NOTIFICATION_PROMPT_KEY, "true")
    }
}

fn serialize_profile(profile: &User) -> Result<String, StorageError> {
    serde_json::to_string(profile).map_err(|e| StorageError::Serialize {
        key: PROFILE_KEY.to_string(),
        reason: e.to_string(),
    })
}
