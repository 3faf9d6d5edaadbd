//! Auth context: the in-memory view of who is logged in.
//!
//! This is the only writer of the cached profile. It owns the HTTP client and,
//! through it, the session store. Every operation that creates or replaces a
//! session checks a session epoch before writing; logout and session end bump
//! the epoch, so a response that lands afterwards is dropped instead of
//! resurrecting the session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::api;
use super::types::{
    AuthResponse, DashboardData, LoginCredentials, ProfileUpdate, RegisterData, Role,
    ShopkeeperRegisterData, User,
};
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, Transport};
use crate::core::logging::session_warn;
use crate::core::roles::landing_path_for;
use crate::core::session::{CachedProfile, SessionStore};

/// Authentication state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Store not read yet
    #[default]
    Initializing,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self, AuthState::Initializing)
    }
}

pub struct AuthContext<T> {
    client: ApiClient<T>,
    state: RwLock<AuthState>,
    epoch: AtomicU64,
    initialized: AtomicBool,
}

impl<T: Transport> AuthContext<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState::Initializing),
            epoch: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    /// Current state, read against the store.
    ///
    /// `Authenticated` turns into `Anonymous` as soon as the access credential
    /// or the cached profile is gone, e.g. after the pipeline ended the session.
    pub fn state(&self) -> AuthState {
        let state = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match state {
            AuthState::Authenticated(_) if !self.session_is_live() => AuthState::Anonymous,
            state => state,
        }
    }

    fn session_is_live(&self) -> bool {
        let session = self.session();
        session.access_token().is_some() && session.cached_profile().is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), AuthState::Authenticated(_))
    }

    /// Where the current user lands after login
    pub fn landing_path(&self) -> &'static str {
        landing_path_for(self.role())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Restore the session from the store. Runs once; later calls return the
    /// current state without touching the store.
    pub async fn initialize(&self) -> AuthState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.state();
        }
        let epoch = self.current_epoch();
        let session = self.session();

        let user = match session.cached_profile_state() {
            CachedProfile::Present(user) => user,
            CachedProfile::Corrupt => {
                warn!("Cached profile is corrupt, clearing session");
                #[cfg(feature = "hydrate")]
                leptos::logging::warn!("Cached profile is corrupt, clearing session");
                return self.end_session_if_current(epoch);
            }
            CachedProfile::Missing => {
                debug!("No cached profile, starting anonymous");
                return self.settle(epoch, AuthState::Anonymous);
            }
        };

        if session.access_token().is_some() {
            info!(user_id = user.id, role = %user.role(), "Session restored");
            return self.settle(epoch, AuthState::Authenticated(user));
        }

        if session.refresh_token().is_none() {
            debug!("Cached profile without credentials, clearing");
            return self.end_session_if_current(epoch);
        }

        match self.client.refresh_access().await {
            Ok(_) => {
                info!(user_id = user.id, "Session restored after silent refresh");
                self.settle(epoch, AuthState::Authenticated(user))
            }
            Err(err) => {
                session_warn!(err, "Silent refresh failed, clearing session");
                self.end_session_if_current(epoch)
            }
        }
    }

    /// Set the state unless a logout happened meanwhile
    fn settle(&self, epoch: u64, next: AuthState) -> AuthState {
        let mut state = self.write_state();
        if self.current_epoch() == epoch {
            *state = next;
        }
        state.clone()
    }

    fn end_session_if_current(&self, epoch: u64) -> AuthState {
        let mut state = self.write_state();
        if self.current_epoch() == epoch {
            self.session().clear_session();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = AuthState::Anonymous;
        }
        state.clone()
    }

    /// Drop the session: bump the epoch, clear the store, go anonymous
    fn end_session(&self) {
        let mut state = self.write_state();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.session().clear_session();
        *state = AuthState::Anonymous;
    }

    /// Persist a fresh session from an auth response started at `epoch`
    fn establish(&self, epoch: u64, response: AuthResponse) -> Result<User, ApiError> {
        let mut state = self.write_state();
        if self.current_epoch() != epoch {
            debug!("Discarding auth response from a superseded session");
            return Err(ApiError::Superseded);
        }

        let AuthResponse { user, access, refresh, .. } = response;
        if let Err(err) = self.session().set_session(&access, &refresh, &user) {
            *state = AuthState::Anonymous;
            return Err(err.into());
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        info!(user_id = user.id, role = %user.role(), "Session established");
        *state = AuthState::Authenticated(user.clone());
        Ok(user)
    }

    /// Login and store the new session. On failure the state is unchanged.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        let epoch = self.current_epoch();
        let response = api::login(&self.client, credentials).await.inspect_err(|e| {
            debug!(username = %credentials.username, error = %e, "Login rejected");
        })?;
        self.establish(epoch, response)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        let epoch = self.current_epoch();
        let response = api::register(&self.client, data).await?;
        self.establish(epoch, response)
    }

    pub async fn register_shopkeeper(&self, data: &ShopkeeperRegisterData) -> Result<User, ApiError> {
        let epoch = self.current_epoch();
        let response = api::register_shopkeeper(&self.client, data).await?;
        self.establish(epoch, response)
    }

    /// Best-effort server logout, then always clear locally. Idempotent.
    pub async fn logout(&self) {
        if let Some(refresh) = self.session().refresh_token() {
            if let Err(err) = api::logout(&self.client, &refresh).await {
                session_warn!(err, "Server logout failed, clearing local session anyway");
            }
        }
        self.end_session();
        info!("Logged out");
    }

    /// Re-fetch the profile and overwrite the cache.
    ///
    /// Any failure ends the session; the error is still returned.
    pub async fn refresh_profile(&self) -> Result<User, ApiError> {
        let epoch = self.current_epoch();
        let result = api::fetch_profile(&self.client).await;

        let mut state = self.write_state();
        if self.current_epoch() != epoch {
            debug!("Discarding profile from a superseded session");
            return Err(ApiError::Superseded);
        }
        let stored = result.and_then(|user| {
            self.session().update_profile(&user)?;
            Ok(user)
        });
        match stored {
            Ok(user) => {
                *state = AuthState::Authenticated(user.clone());
                Ok(user)
            }
            Err(err) => {
                session_warn!(err, "Profile refresh failed, ending session");
                self.epoch.fetch_add(1, Ordering::SeqCst);
                self.session().clear_session();
                *state = AuthState::Anonymous;
                Err(err)
            }
        }
    }

    /// Partial profile update. On failure the state is unchanged.
    pub async fn update_profile(&self, changes: &ProfileUpdate) -> Result<User, ApiError> {
        let epoch = self.current_epoch();
        let user = api::update_profile(&self.client, changes).await?;

        let mut state = self.write_state();
        if self.current_epoch() != epoch {
            return Err(ApiError::Superseded);
        }
        self.session().update_profile(&user)?;
        *state = AuthState::Authenticated(user.clone());
        Ok(user)
    }

    pub async fn dashboard(&self) -> Result<DashboardData, ApiError> {
        api::fetch_dashboard(&self.client).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::endpoints;
    use crate::core::roles::BROWSE_PATH;
    use crate::core::session::{ACCESS_COOKIE, CookieJar, LocalCache, PROFILE_KEY};
    use crate::core::testing::{Harness, auth_body, sample_user};

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    async fn logged_in(role: Role) -> Harness {
        let h = Harness::new();
        h.transport.push(200, auth_body(role, "a1", "r1"));
        h.context.login(&credentials()).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_login_success_lands_on_role_dashboard() {
        let h = Harness::new();
        h.transport.push(200, auth_body(Role::Shopkeeper, "a1", "r1"));

        let user = h.context.login(&credentials()).await.unwrap();

        assert_eq!(user.role(), Role::Shopkeeper);
        assert!(h.context.is_authenticated());
        assert_eq!(h.context.landing_path(), "/shopkeeper/dashboard");
        assert_eq!(h.store.access_token(), Some("a1".to_string()));
        assert_eq!(h.store.refresh_token(), Some("r1".to_string()));
        assert_eq!(h.store.cached_profile(), Some(user));
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_unchanged() {
        let h = Harness::new();
        h.context.initialize().await;
        h.transport
            .push(400, json!({"non_field_errors": ["Invalid credentials"]}));

        let err = h.context.login(&credentials()).await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert!(!h.store.has_credentials());
        assert!(h.navigator.paths().is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let h = logged_in(Role::Customer).await;
        h.transport.push(401, json!({"detail": "No active account"}));

        assert!(h.context.login(&credentials()).await.is_err());

        assert!(h.context.is_authenticated());
        assert_eq!(h.store.access_token(), Some("a1".to_string()));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = logged_in(Role::Customer).await;
        h.transport.push(200, json!({"message": "Logout successful"}));

        h.context.logout().await;
        h.context.logout().await;

        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert!(!h.context.is_authenticated());
        assert_eq!(h.store.access_token(), None);
        assert_eq!(h.store.refresh_token(), None);
        assert_eq!(h.store.cached_profile(), None);
        // second logout had no refresh credential and sent nothing
        let logouts = h
            .transport
            .requests()
            .iter()
            .filter(|r| r.path == endpoints::LOGOUT)
            .count();
        assert_eq!(logouts, 1);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let h = logged_in(Role::Customer).await;
        h.transport
            .push_error(ApiError::Transport("offline".to_string()));

        h.context.logout().await;

        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert!(!h.store.has_credentials());
    }

    #[tokio::test]
    async fn test_refresh_profile_overwrites_cache() {
        let h = logged_in(Role::Customer).await;
        let mut fresh = sample_user(Role::Customer);
        fresh.is_verified = true;
        h.transport.push(200, serde_json::to_value(&fresh).unwrap());

        let user = h.context.refresh_profile().await.unwrap();

        assert_eq!(user, fresh);
        assert_eq!(h.store.cached_profile(), Some(fresh.clone()));
        assert_eq!(h.context.user(), Some(fresh));
    }

    #[tokio::test]
    async fn test_refresh_profile_failure_ends_session() {
        let h = logged_in(Role::Customer).await;
        h.transport.push(500, json!({"error": "boom"}));

        let err = h.context.refresh_profile().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert!(!h.store.has_credentials());
        assert_eq!(h.store.cached_profile(), None);
    }

    #[tokio::test]
    async fn test_update_profile_failure_keeps_state() {
        let h = logged_in(Role::Customer).await;
        h.transport
            .push(400, json!({"email": ["Enter a valid email address."]}));

        let err = h
            .context
            .update_profile(&ProfileUpdate {
                email: Some("nope".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Enter a valid email address.");
        assert!(h.context.is_authenticated());
        assert_eq!(h.store.cached_profile(), h.context.user());
    }

    #[tokio::test]
    async fn test_update_profile_success_updates_cache() {
        let h = logged_in(Role::Customer).await;
        let mut updated = sample_user(Role::Customer);
        updated.address = Some("5 Elm St".to_string());
        h.transport.push(200, serde_json::to_value(&updated).unwrap());

        h.context
            .update_profile(&ProfileUpdate {
                address: Some("5 Elm St".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(h.store.cached_profile(), Some(updated.clone()));
        assert_eq!(h.context.user(), Some(updated));
    }

    #[tokio::test]
    async fn test_initialize_restores_cached_session() {
        let h = Harness::new();
        let user = sample_user(Role::Admin);
        h.store.set_session("a1", "r1", &user).unwrap();

        let state = h.context.initialize().await;

        assert_eq!(state, AuthState::Authenticated(user));
        assert_eq!(h.context.landing_path(), "/admin");
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_without_profile_is_anonymous() {
        let h = Harness::new();
        assert!(h.context.state().is_initializing());

        let state = h.context.initialize().await;

        assert_eq!(state, AuthState::Anonymous);
        assert_eq!(h.context.landing_path(), BROWSE_PATH);
    }

    #[tokio::test]
    async fn test_initialize_clears_corrupt_profile() {
        let h = Harness::new();
        h.store
            .set_session("a1", "r1", &sample_user(Role::Customer))
            .unwrap();
        h.cache.set_item(PROFILE_KEY, "{broken").unwrap();

        let state = h.context.initialize().await;

        assert_eq!(state, AuthState::Anonymous);
        assert_eq!(h.store.access_token(), None);
        assert_eq!(h.store.refresh_token(), None);
        assert!(h.cache.get_item(PROFILE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_initialize_refreshes_expired_access() {
        let h = Harness::new();
        let user = sample_user(Role::Customer);
        h.store.set_session("a1", "r1", &user).unwrap();
        h.cookies.remove(ACCESS_COOKIE);
        h.transport.push(200, json!({"access": "a2"}));

        let state = h.context.initialize().await;

        assert_eq!(state, AuthState::Authenticated(user));
        assert_eq!(h.store.access_token(), Some("a2".to_string()));
        assert_eq!(h.transport.requests()[0].path, endpoints::TOKEN_REFRESH);
    }

    #[tokio::test]
    async fn test_initialize_failed_refresh_clears_session() {
        let h = Harness::new();
        h.store
            .set_session("a1", "r1", &sample_user(Role::Customer))
            .unwrap();
        h.cookies.remove(ACCESS_COOKIE);
        h.transport.push(401, json!({"detail": "Token is blacklisted"}));

        let state = h.context.initialize().await;

        assert_eq!(state, AuthState::Anonymous);
        assert!(h.store.cached_profile().is_none());
        assert!(h.store.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let h = Harness::new();
        h.context.initialize().await;
        h.store
            .set_session("a1", "r1", &sample_user(Role::Customer))
            .unwrap();

        assert_eq!(h.context.initialize().await, AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_session_expiry_mid_use_redirects_to_login() {
        let h = logged_in(Role::Customer).await;
        h.transport.push(401, json!({"detail": "Token expired"}));
        h.transport.push(401, json!({"detail": "Token is invalid or expired"}));

        let err = h
            .context
            .client()
            .get::<serde_json::Value>("/orders/")
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert!(!h.context.is_authenticated());
        assert_eq!(h.context.user(), None);
        assert_eq!(h.context.landing_path(), BROWSE_PATH);
        assert_eq!(h.navigator.paths(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_state_follows_store_when_profile_removed() {
        let h = logged_in(Role::Customer).await;

        h.cache.remove_item(PROFILE_KEY);

        assert_eq!(h.context.state(), AuthState::Anonymous);
        assert_eq!(h.context.role(), None);
    }

    #[tokio::test]
    async fn test_login_after_forced_end_authenticates() {
        let h = logged_in(Role::Customer).await;
        h.transport.push(401, json!({"detail": "Token expired"}));
        h.transport.push(401, json!({"detail": "Token is invalid or expired"}));
        h.context
            .client()
            .get::<serde_json::Value>("/orders/")
            .await
            .unwrap_err();
        assert_eq!(h.context.state(), AuthState::Anonymous);

        // a new login after the forced end is authenticated again
        h.transport.push(200, auth_body(Role::Admin, "b1", "s1"));
        h.context.login(&credentials()).await.unwrap();

        assert_eq!(h.context.role(), Some(Role::Admin));
        assert_eq!(h.context.landing_path(), "/admin");
    }

    #[tokio::test]
    async fn test_unknown_role_lands_on_browse() {
        let h = Harness::new();
        let mut body = auth_body(Role::Customer, "a1", "r1");
        body["user"]["user_type"] = json!("moderator");
        h.transport.push(200, body);

        h.context.login(&credentials()).await.unwrap();

        assert_eq!(h.context.role(), Some(Role::Unknown));
        assert_eq!(h.context.landing_path(), BROWSE_PATH);
    }

    #[tokio::test]
    async fn test_dashboard_passes_through() {
        let h = logged_in(Role::Shopkeeper).await;
        h.transport.push(
            200,
            json!({"user_type": "shopkeeper", "profile": {"business_name": "Corner Bakery"}}),
        );

        let data = h.context.dashboard().await.unwrap();

        assert_eq!(data.user_type, Role::Shopkeeper);
        assert_eq!(h.transport.requests().last().unwrap().bearer.as_deref(), Some("a1"));
    }
}
