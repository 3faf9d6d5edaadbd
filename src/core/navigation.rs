//! Navigation seam used when the session ends and the user must log in again.

/// Forces the host environment to a new location
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for environments without a page to move (native tools, SSR).
///
/// Only records the redirect in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }
}
