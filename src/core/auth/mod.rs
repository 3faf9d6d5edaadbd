//! Authentication module
//!
//! - Wire types for the account endpoints and the cached profile
//! - Typed calls to those endpoints
//! - The auth context holding the logged-in user

pub mod api;
pub mod context;
pub mod types;

pub use context::{AuthContext, AuthState};
pub use types::{
    AuthResponse, DashboardData, LoginCredentials, ProfileUpdate, RefreshRequest,
    RefreshResponse, RegisterData, Role, ShopkeeperRegisterData, User,
};
