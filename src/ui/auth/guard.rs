use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use super::context::use_auth_context;
use crate::core::auth::{AuthState, Role, User};
use crate::core::roles::{RouteAccess, guard};
use crate::ui::notifications::use_notifications;

/// Render `children` only for users holding `required`.
///
/// Visitors without a session go to the login page. Users with another role
/// get an access-denied toast and are sent to their own landing page. Nothing
/// renders while the session is still being restored.
#[component]
pub fn RequireRole(
    /// Role allowed to see the page
    required: Role,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth_context();
    let notifications = use_notifications();
    let navigate = use_navigate();
    let login_path = auth.login_path();

    let access = Memo::new(move |_| match auth.current_state() {
        AuthState::Initializing => None,
        state => Some(guard(state.user().map(User::role), required)),
    });

    Effect::new(move |_| match access.get() {
        Some(RouteAccess::Login) => navigate(&login_path, Default::default()),
        Some(RouteAccess::Redirect { to, notice }) => {
            if let Some(notifications) = notifications {
                notifications.notify(notice.into());
            }
            navigate(to, Default::default());
        }
        Some(RouteAccess::Granted) | None => {}
    });

    move || {
        if access.get() == Some(RouteAccess::Granted) {
            children().into_any()
        } else {
            ().into_any()
        }
    }
}
