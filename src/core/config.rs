//! Client configuration.
//!
//! Native builds load it with `Config::from_env()` after calling `dotenvy::dotenv()`;
//! the browser build uses `Config::default()` or the builder methods.

use chrono::Duration;

/// Default REST API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default login entry point used for forced redirects
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default access cookie lifetime (1 day)
const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Default refresh cookie lifetime (7 days)
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Default request timeout for the native transport
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL every API path is joined to
    /// Example: http://localhost:8000/api
    pub api_base_url: String,

    /// Where the pipeline sends the user once the session is unrecoverable
    pub login_path: String,

    /// Lifetime of the `access_token` cookie
    pub access_token_ttl: Duration,

    /// Lifetime of the `refresh_token` cookie
    pub refresh_token_ttl: Duration,

    /// Per-request timeout (native transport only)
    pub request_timeout: std::time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            access_token_ttl: Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            refresh_token_ttl: Duration::days(REFRESH_TOKEN_TTL_DAYS),
            request_timeout: std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    #[cfg(feature = "ssr")]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url = std::env::var("LOS_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let login_path = std::env::var("LOS_LOGIN_PATH").unwrap_or(defaults.login_path);

        let access_token_ttl = std::env::var("LOS_ACCESS_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::hours)
            .unwrap_or(defaults.access_token_ttl);

        let refresh_token_ttl = std::env::var("LOS_REFRESH_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::days)
            .unwrap_or(defaults.refresh_token_ttl);

        let request_timeout = std::env::var("LOS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(std::time::Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            api_base_url,
            login_path,
            access_token_ttl,
            refresh_token_ttl,
            request_timeout,
        }
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the login entry point
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set both cookie lifetimes
    pub fn token_ttls(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_ttl = access;
        self.refresh_token_ttl = refresh;
        self
    }
}
