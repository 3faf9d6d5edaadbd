//! Role-based routing.
//!
//! The single place that maps a role to its landing page and decides whether
//! a role may open a protected page. Real authorization happens on the server;
//! this only drives redirects and the access-denied notice.

use crate::core::auth::Role;

/// Landing page for visitors without a known role
pub const BROWSE_PATH: &str = "/browse";

/// Title of the notice shown when a page is opened with the wrong role
pub const ACCESS_DENIED_TITLE: &str = "Access denied";

/// Where a freshly authenticated user should land.
pub fn landing_path_for(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "/admin",
        Some(Role::Shopkeeper) => "/shopkeeper/dashboard",
        Some(Role::Customer) => "/customer/dashboard",
        Some(Role::Unknown) | None => BROWSE_PATH,
    }
}

/// True iff the current role is exactly the required one.
pub fn is_authorized(current: Option<Role>, required: Role) -> bool {
    current == Some(required)
}

/// Notice shown alongside an access-denied redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessNotice {
    pub title: &'static str,
    pub message: String,
}

/// Outcome of guarding a protected page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Render the page
    Granted,
    /// Nobody is logged in; send the visitor to the login entry point
    Login,
    /// Logged in with another role; send the user to their own landing page
    Redirect {
        to: &'static str,
        notice: AccessNotice,
    },
}

/// Decide what a page requiring `required` should do for `current`.
pub fn guard(current: Option<Role>, required: Role) -> RouteAccess {
    match current {
        None => RouteAccess::Login,
        Some(role) if is_authorized(Some(role), required) => RouteAccess::Granted,
        Some(role) => RouteAccess::Redirect {
            to: landing_path_for(Some(role)),
            notice: AccessNotice {
                title: ACCESS_DENIED_TITLE,
                message: format!("This page is only available to {required} accounts."),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_paths() {
        assert_eq!(landing_path_for(Some(Role::Admin)), "/admin");
        assert_eq!(
            landing_path_for(Some(Role::Shopkeeper)),
            "/shopkeeper/dashboard"
        );
        assert_eq!(
            landing_path_for(Some(Role::Customer)),
            "/customer/dashboard"
        );
        assert_eq!(landing_path_for(None), "/browse");
    }

    #[test]
    fn test_unknown_role_lands_on_browse() {
        assert_eq!(landing_path_for(Some(Role::Unknown)), "/browse");
    }

    #[test]
    fn test_is_authorized_requires_exact_match() {
        assert!(is_authorized(Some(Role::Admin), Role::Admin));
        assert!(!is_authorized(Some(Role::Shopkeeper), Role::Admin));
        assert!(!is_authorized(Some(Role::Customer), Role::Shopkeeper));
        assert!(!is_authorized(None, Role::Customer));
    }

    #[test]
    fn test_guard_grants_matching_role() {
        assert_eq!(guard(Some(Role::Admin), Role::Admin), RouteAccess::Granted);
    }

    #[test]
    fn test_guard_sends_anonymous_to_login() {
        assert_eq!(guard(None, Role::Admin), RouteAccess::Login);
    }

    #[test]
    fn test_guard_redirects_to_own_landing_page() {
        match guard(Some(Role::Customer), Role::Admin) {
            RouteAccess::Redirect { to, notice } => {
                assert_eq!(to, "/customer/dashboard");
                assert_eq!(notice.title, ACCESS_DENIED_TITLE);
                assert!(notice.message.contains("admin"));
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_redirects_unknown_role_to_browse() {
        match guard(Some(Role::Unknown), Role::Shopkeeper) {
            RouteAccess::Redirect { to, .. } => assert_eq!(to, "/browse"),
            other => panic!("expected redirect, got {:?}", other),
        }
    }
}
