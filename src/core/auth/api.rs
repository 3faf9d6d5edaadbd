//! Auth endpoint calls
//!
//! Thin wrappers over [`ApiClient`] for the account endpoints:
//! - POST /auth/login/ - Login and get tokens
//! - POST /auth/register/ - Register a customer
//! - POST /auth/register/shopkeeper/ - Register a shopkeeper with a business
//! - POST /auth/logout/ - Invalidate the refresh token
//! - GET/PUT /auth/profile/ - Current user profile
//! - GET /auth/dashboard/ - Role-specific dashboard data
//!
//! None of these touch the session store; that is the auth context's job.

use serde_json::Value;

use super::types::{
    AuthResponse, CustomerRegistration, DashboardData, LoginCredentials, ProfileUpdate,
    RefreshRequest, RegisterData, ShopkeeperRegisterData, User,
};
use crate::core::endpoints;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, Transport};

/// Login with username and password.
///
/// Sent without credentials and without 401 recovery: a rejected login must
/// not disturb whatever session is currently stored.
pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    credentials: &LoginCredentials,
) -> Result<AuthResponse, ApiError> {
    client.post_public(endpoints::LOGIN, credentials).await
}

/// Register a customer account; the role is always sent as `customer`
pub async fn register<T: Transport>(
    client: &ApiClient<T>,
    data: &RegisterData,
) -> Result<AuthResponse, ApiError> {
    data.validate()?;
    client
        .post_public(endpoints::REGISTER, &CustomerRegistration::new(data))
        .await
}

pub async fn register_shopkeeper<T: Transport>(
    client: &ApiClient<T>,
    data: &ShopkeeperRegisterData,
) -> Result<AuthResponse, ApiError> {
    data.validate()?;
    client
        .post_public(endpoints::REGISTER_SHOPKEEPER, data)
        .await
}

/// Ask the server to invalidate a refresh token
pub async fn logout<T: Transport>(client: &ApiClient<T>, refresh: &str) -> Result<(), ApiError> {
    client
        .post::<_, Value>(endpoints::LOGOUT, &RefreshRequest { refresh })
        .await?;
    Ok(())
}

pub async fn fetch_profile<T: Transport>(client: &ApiClient<T>) -> Result<User, ApiError> {
    client.get(endpoints::PROFILE).await
}

/// Partial update of the current profile; returns the updated record
pub async fn update_profile<T: Transport>(
    client: &ApiClient<T>,
    changes: &ProfileUpdate,
) -> Result<User, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::Validation("Nothing to update".to_string()));
    }
    client.put(endpoints::PROFILE, changes).await
}

pub async fn fetch_dashboard<T: Transport>(client: &ApiClient<T>) -> Result<DashboardData, ApiError> {
    client.get(endpoints::DASHBOARD).await
}
