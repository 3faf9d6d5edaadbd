pub mod auth;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod notifications;

pub use auth::{AuthHandle, RequireRole, provide_auth_context, use_auth_context};
pub use notifications::{
    NotificationManager, NotificationPrompt, NotificationsContainer, provide_notifications,
    use_notifications,
};
