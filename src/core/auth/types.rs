//! Wire types for the auth endpoints and the cached user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::ApiError;

/// Account role as tagged by the server (`user_type`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[display("admin")]
    Admin,
    #[display("shopkeeper")]
    Shopkeeper,
    #[display("customer")]
    Customer,
    /// Any tag this client does not know about
    #[default]
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

/// Denormalized snapshot of the authenticated user.
///
/// Cached next to the session credentials so identity renders without a
/// round trip. It is a cache and can go stale relative to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub user_type: Role,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> Role {
        self.user_type
    }

    /// "First Last", falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Customer registration data
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RegisterData {
    /// Check the fields the server would reject anyway.
    pub fn validate(&self) -> Result<(), ApiError> {
        require("Username", &self.username)?;
        validate_email(&self.email)?;
        require("Password", &self.password)?;
        if self.password != self.password_confirm {
            return Err(ApiError::Validation("Passwords don't match".to_string()));
        }
        Ok(())
    }
}

/// Body actually sent to `/auth/register/`: the role is always forced to customer
#[derive(Debug, Serialize)]
pub(crate) struct CustomerRegistration<'a> {
    #[serde(flatten)]
    pub data: &'a RegisterData,
    pub user_type: Role,
}

impl<'a> CustomerRegistration<'a> {
    pub fn new(data: &'a RegisterData) -> Self {
        Self {
            data,
            user_type: Role::Customer,
        }
    }
}

/// Shopkeeper registration: account fields plus the business
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShopkeeperRegisterData {
    #[serde(flatten)]
    pub account: RegisterData,
    pub business_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_license: Option<String>,
    pub business_address: String,
    pub business_phone: String,
}

impl ShopkeeperRegisterData {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.account.validate()?;
        require("Business name", &self.business_name)?;
        require("Business address", &self.business_address)?;
        require("Business phone", &self.business_phone)?;
        Ok(())
    }
}

/// Response of login and both registration endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the refresh and logout endpoints
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of the token refresh endpoint
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Partial profile update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
    }
}

/// Role-specific dashboard data; the profile shape depends on the role
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub user_type: Role,
    #[serde(default)]
    pub profile: serde_json::Value,
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Basic email shape check: something@something.something
fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::Validation("Enter a valid email address".to_string());

    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.split('.').any(|part| part.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}
