//! Warnings that must reach the browser console.
//!
//! The `hydrate` build installs no tracing subscriber, so warnings about a
//! session being dropped or a request failing are mirrored through
//! `leptos::logging` there.

use std::fmt::Display;

/// Console line for a warning and the error behind it
pub(crate) fn console_line(message: &str, error: &dyn Display) -> String {
    format!("{message}: {error}")
}

/// `tracing::warn!` with an `error` field, mirrored to the browser console
/// under `hydrate`. Extra fields are recorded with their `Display` form.
macro_rules! session_warn {
    ($error:expr, $($field:ident = $value:expr,)* $message:literal) => {{
        let error = &$error;
        tracing::warn!($($field = %$value,)* error = %error, $message);
        #[cfg(feature = "hydrate")]
        leptos::logging::warn!("{}", $crate::core::logging::console_line($message, error));
    }};
}

pub(crate) use session_warn;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ApiError;

    #[test]
    fn test_console_line_includes_error() {
        let err = ApiError::SessionExpired;
        assert_eq!(
            console_line("Token refresh failed", &err),
            format!("Token refresh failed: {err}")
        );
    }

    #[test]
    fn test_session_warn_accepts_fields() {
        let err = ApiError::Transport("offline".to_string());
        session_warn!(err, path = "/orders/", "Request failed");
        session_warn!(err, "Server logout failed");
    }
}
