//! Session core: request pipeline, session persistence, auth state and role routing

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub(crate) mod logging;
pub mod navigation;
pub mod roles;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{ApiError, StorageError};
