//! Authenticated request pipeline.
//!
//! Every call goes through [`ApiClient::execute`]:
//! - attach the access credential as a bearer token when one is stored
//! - pass successful responses through unchanged
//! - on 401, refresh the access credential once and resubmit once
//! - when the refresh is impossible, end the session and send the user to login
//!
//! Nothing else is retried.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::transport::{HttpRequest, HttpResponse, STATUS_UNAUTHORIZED, Transport};
use crate::core::auth::{RefreshRequest, RefreshResponse};
use crate::core::config::Config;
use crate::core::endpoints;
use crate::core::error::ApiError;
use crate::core::logging::session_warn;
use crate::core::navigation::Navigator;
use crate::core::session::SessionStore;

/// Shared HTTP client wrapping a [`Transport`] with credential handling
pub struct ApiClient<T> {
    transport: T,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(
        transport: T,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            login_path: config.login_path.clone(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Send a request through the full pipeline.
    ///
    /// A 401 triggers at most one refresh and one resubmission. If the refresh
    /// cannot happen, the session is cleared, navigation is forced to the
    /// login path and the first 401 is returned. A refresh overtaken by a newer
    /// session returns the 401 and leaves that session alone.
    pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(access) = self.session.access_token() {
            request.bearer = Some(access);
        }

        let response = self.transport.send(&request).await?;
        if response.status != STATUS_UNAUTHORIZED || request.retried {
            return response.into_result();
        }

        request.retried = true;
        match self.refresh_access().await {
            Ok(access) => {
                debug!(method = %request.method, path = %request.path, "Access token refreshed, resubmitting");
                request.bearer = Some(access);
                self.transport.send(&request).await?.into_result()
            }
            Err(ApiError::Superseded) => {
                debug!(path = %request.path, "Session replaced during refresh, keeping it");
                Err(response.to_error())
            }
            Err(err) => {
                session_warn!(err, path = request.path, "Token refresh failed, ending session");
                self.end_session();
                Err(response.to_error())
            }
        }
    }

    /// Send a request without credentials and without 401 recovery.
    ///
    /// Used by calls that establish a session (login, registration), where a
    /// 401 means rejected credentials rather than an expired session.
    pub async fn execute_public(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.send(&request).await?.into_result()
    }

    /// Mint a new access credential from the stored refresh credential.
    ///
    /// The refresh call is sent directly to the transport, never through
    /// [`execute`](Self::execute), so it cannot recurse.
    pub async fn refresh_access(&self) -> Result<String, ApiError> {
        let refresh = self.session.refresh_token().ok_or(ApiError::SessionExpired)?;

        let request = HttpRequest::post(endpoints::TOKEN_REFRESH, &RefreshRequest { refresh: &refresh })?;
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            debug!(status = response.status, "Refresh endpoint rejected the refresh token");
            return Err(ApiError::SessionExpired);
        }

        let RefreshResponse { access } = response.json()?;
        if !self.session.replace_access(&refresh, &access)? {
            debug!("Session changed during refresh, discarding new access token");
            return Err(ApiError::Superseded);
        }
        Ok(access)
    }

    fn end_session(&self) {
        self.session.clear_session();
        self.navigator.navigate(&self.login_path);
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(HttpRequest::get(path)).await?.json()
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(HttpRequest::post(path, body)?).await?.json()
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(HttpRequest::put(path, body)?).await?.json()
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(HttpRequest::patch(path, body)?).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(HttpRequest::delete(path)).await?;
        Ok(())
    }

    /// POST without credentials or 401 recovery
    pub async fn post_public<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute_public(HttpRequest::post(path, body)?).await?.json()
    }
}
