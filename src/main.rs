#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use los::core::auth::{AuthContext, LoginCredentials};
    use los::core::config::Config;
    use los::core::http::{ApiClient, ReqwestTransport};
    use los::core::navigation::LogNavigator;
    use los::core::session::SessionStore;

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(
        api = %config.api_base_url,
        login_path = %config.login_path,
        "Config loaded"
    );

    let transport = match ReqwestTransport::new(&config) {
        Ok(transport) => transport,
        Err(err) => {
            tracing::error!(error = %err, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let store = Arc::new(SessionStore::in_memory(&config));
    let client = ApiClient::new(transport, store, Arc::new(LogNavigator), &config);
    let auth = AuthContext::new(client);

    let state = auth.initialize().await;
    tracing::info!(?state, "Session initialized");

    // Probe a full session only when credentials are supplied
    let (Ok(username), Ok(password)) = (std::env::var("LOS_USERNAME"), std::env::var("LOS_PASSWORD")) else {
        tracing::info!("LOS_USERNAME / LOS_PASSWORD not set, nothing else to do");
        return;
    };

    let user = match auth.login(&LoginCredentials { username, password }).await {
        Ok(user) => user,
        Err(err) => {
            tracing::error!(error = %err, message = %err.user_message(), "Login failed");
            std::process::exit(1);
        }
    };
    tracing::info!(
        user = %user.display_name(),
        role = %user.role(),
        landing = auth.landing_path(),
        "Logged in"
    );

    match auth.refresh_profile().await {
        Ok(profile) => tracing::info!(verified = profile.is_verified, "Profile refreshed"),
        Err(err) => tracing::warn!(error = %err, "Profile refresh failed"),
    }

    auth.logout().await;
    tracing::info!(authenticated = auth.is_authenticated(), "Session probe finished");
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no native entry point in the browser build
    // the UI mounts `los::ui` from the host app instead
}
