//! Authentication UI module
//!
//! Reactive auth context and the role guard for protected pages.

mod context;
mod guard;

pub use context::{AuthHandle, provide_auth_context, use_auth_context};
pub use guard::RequireRole;
