//! Reactive auth context for the component tree
//!
//! This module wraps the core [`AuthContext`](crate::core::auth::AuthContext):
//! - mirrors its state into signals the UI can track
//! - restores the session from cookies after hydration
//! - exposes login, registration, logout and profile actions
//! - keeps the last error message for inline display

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use std::future::Future;
#[cfg(feature = "hydrate")]
use std::sync::Arc;

use crate::core::auth::{
    AuthState, DashboardData, LoginCredentials, ProfileUpdate, RegisterData, Role,
    ShopkeeperRegisterData, User,
};
use crate::core::config::Config;
use crate::core::error::ApiError;
#[cfg(feature = "hydrate")]
use crate::core::{auth::AuthContext, http::GlooTransport};
use crate::core::roles::landing_path_for;

/// Auth handle providing reactive authentication state and actions
#[derive(Clone, Copy)]
pub struct AuthHandle {
    /// Current authentication state
    pub state: RwSignal<AuthState>,
    /// An auth operation is in flight
    pub pending: RwSignal<bool>,
    /// User-facing message from the last failed operation
    pub error: RwSignal<Option<String>>,
    login_path: StoredValue<String>,
    #[cfg(feature = "hydrate")]
    inner: StoredValue<Arc<AuthContext<GlooTransport>>>,
}

impl AuthHandle {
    /// Tracked state, checked against the stored session.
    ///
    /// A session the request pipeline has ended reads as `Anonymous` even
    /// before the signal is synced again.
    pub fn current_state(&self) -> AuthState {
        let state = self.state.get();
        #[cfg(feature = "hydrate")]
        {
            if matches!(state, AuthState::Authenticated(_)) {
                if let Some(live) = self.inner.try_with_value(|ctx| ctx.state()) {
                    return live;
                }
            }
        }
        state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.current_state(), AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<User> {
        self.current_state().user().cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role())
    }

    /// Landing page for the current role
    pub fn landing_path(&self) -> &'static str {
        landing_path_for(self.role())
    }

    pub fn login_path(&self) -> String {
        self.login_path.get_value()
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }
}

#[cfg(feature = "hydrate")]
impl AuthHandle {
    /// Run an operation on the core context and mirror the outcome into signals.
    ///
    /// Uses `try_set` throughout: the owning component may be gone by the
    /// time the request completes.
    async fn run<R, F, Fut>(self, op: F) -> Result<R, ApiError>
    where
        F: FnOnce(Arc<AuthContext<GlooTransport>>) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let ctx = self.inner.try_get_value().ok_or(ApiError::Superseded)?;
        let _ = self.pending.try_set(true);
        let _ = self.error.try_set(None);

        let result = op(ctx.clone()).await;

        let _ = self.pending.try_set(false);
        let _ = self.state.try_set(ctx.state());
        match &result {
            Err(ApiError::Superseded) | Ok(_) => {}
            Err(err) => {
                let _ = self.error.try_set(Some(err.user_message()));
            }
        }
        result
    }

    pub async fn login(self, credentials: LoginCredentials) -> Result<User, ApiError> {
        self.run(|ctx| async move { ctx.login(&credentials).await })
            .await
    }

    pub async fn register(self, data: RegisterData) -> Result<User, ApiError> {
        self.run(|ctx| async move { ctx.register(&data).await }).await
    }

    pub async fn register_shopkeeper(self, data: ShopkeeperRegisterData) -> Result<User, ApiError> {
        self.run(|ctx| async move { ctx.register_shopkeeper(&data).await })
            .await
    }

    pub async fn logout(self) {
        let _ = self
            .run(|ctx| async move {
                ctx.logout().await;
                Ok(())
            })
            .await;
    }

    pub async fn refresh_profile(self) -> Result<User, ApiError> {
        self.run(|ctx| async move { ctx.refresh_profile().await })
            .await
    }

    pub async fn update_profile(self, changes: ProfileUpdate) -> Result<User, ApiError> {
        self.run(|ctx| async move { ctx.update_profile(&changes).await })
            .await
    }

    pub async fn dashboard(self) -> Result<DashboardData, ApiError> {
        self.run(|ctx| async move { ctx.dashboard().await }).await
    }

    pub fn prompt_already_asked(&self) -> bool {
        self.inner
            .try_with_value(|ctx| ctx.session().notification_prompt_asked())
            .unwrap_or(true)
    }

    pub fn mark_prompt_asked(&self) {
        let marked = self
            .inner
            .try_with_value(|ctx| ctx.session().mark_notification_prompt_asked());
        if let Some(Err(err)) = marked {
            leptos::logging::warn!("Failed to remember notification prompt: {err}");
        }
    }
}

/// Server render has no session: every action reports it is unavailable.
#[cfg(not(feature = "hydrate"))]
impl AuthHandle {
    fn unavailable() -> ApiError {
        ApiError::Transport("Authentication is only available in the browser".to_string())
    }

    pub async fn login(self, _credentials: LoginCredentials) -> Result<User, ApiError> {
        Err(Self::unavailable())
    }

    pub async fn register(self, _data: RegisterData) -> Result<User, ApiError> {
        Err(Self::unavailable())
    }

    pub async fn register_shopkeeper(self, _data: ShopkeeperRegisterData) -> Result<User, ApiError> {
        Err(Self::unavailable())
    }

    pub async fn logout(self) {}

    pub async fn refresh_profile(self) -> Result<User, ApiError> {
        Err(Self::unavailable())
    }

    pub async fn update_profile(self, _changes: ProfileUpdate) -> Result<User, ApiError> {
        Err(Self::unavailable())
    }

    pub async fn dashboard(self) -> Result<DashboardData, ApiError> {
        Err(Self::unavailable())
    }

    pub fn prompt_already_asked(&self) -> bool {
        true
    }

    pub fn mark_prompt_asked(&self) {}
}

/// Provide the auth context to the component tree
pub fn provide_auth_context(config: Config) -> AuthHandle {
    // Same initial state on server and client to avoid a hydration mismatch
    let state = RwSignal::new(AuthState::Initializing);
    let pending = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let login_path = StoredValue::new(config.login_path.clone());

    #[cfg(feature = "hydrate")]
    let handle = {
        let ctx = Arc::new(crate::ui::browser::auth_context(&config));
        let inner = StoredValue::new(ctx);

        // Restore the session once hydration is complete
        Effect::new(move |_| {
            let Some(ctx) = inner.try_get_value() else {
                return;
            };
            leptos::task::spawn_local(async move {
                let restored = ctx.initialize().await;
                let _ = state.try_set(restored);
            });
        });

        AuthHandle {
            state,
            pending,
            error,
            login_path,
            inner,
        }
    };

    #[cfg(not(feature = "hydrate"))]
    let handle = AuthHandle {
        state,
        pending,
        error,
        login_path,
    };

    provide_context(handle);
    handle
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthHandle {
    expect_context::<AuthHandle>()
}
