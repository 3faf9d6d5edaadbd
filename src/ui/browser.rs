//! Browser backends: `document.cookie`, `localStorage` and `window.location`.

use std::sync::Arc;

use chrono::Duration;
use wasm_bindgen::JsCast;
use web_sys::{HtmlDocument, Storage};

use crate::core::auth::AuthContext;
use crate::core::config::Config;
use crate::core::error::StorageError;
use crate::core::http::{ApiClient, GlooTransport};
use crate::core::navigation::Navigator;
use crate::core::session::{CookieJar, LocalCache, SessionStore};

fn html_document() -> Option<HtmlDocument> {
    web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn js_error(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Write {
        key: key.to_string(),
        reason: format!("{err:?}"),
    }
}

/// Cookies on path `/`, `SameSite=Lax`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCookieJar;

impl BrowserCookieJar {
    fn write(&self, raw: &str, name: &str) -> Result<(), StorageError> {
        let document = html_document().ok_or(StorageError::Unavailable)?;
        document.set_cookie(raw).map_err(|e| js_error(name, e))
    }
}

impl CookieJar for BrowserCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let all = html_document()?.cookie().ok()?;
        all.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key != name {
                return None;
            }
            js_sys::decode_uri_component(value)
                .ok()
                .and_then(|v| v.as_string())
        })
    }

    fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StorageError> {
        let encoded: String = js_sys::encode_uri_component(value).into();
        let raw = format!(
            "{name}={encoded}; path=/; max-age={}; SameSite=Lax",
            max_age.num_seconds()
        );
        self.write(&raw, name)
    }

    fn remove(&self, name: &str) {
        let raw = format!("{name}=; path=/; max-age=0; SameSite=Lax");
        if let Err(err) = self.write(&raw, name) {
            leptos::logging::warn!("Failed to remove cookie {name}: {err}");
        }
    }
}

/// `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocalCache;

impl LocalCache for BrowserLocalCache {
    fn get_item(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| js_error(key, e))
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Full page navigation through `window.location`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().set_href(path) {
            leptos::logging::error!("Navigation to {path} failed: {err:?}");
        }
    }
}

/// Auth context over the browser backends
pub fn auth_context(config: &Config) -> AuthContext<GlooTransport> {
    let store = Arc::new(SessionStore::new(BrowserCookieJar, BrowserLocalCache, config));
    let client = ApiClient::new(
        GlooTransport::new(config),
        store,
        Arc::new(BrowserNavigator),
        config,
    );
    AuthContext::new(client)
}
