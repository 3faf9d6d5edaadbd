//! Test doubles shared by the core unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::core::auth::{AuthContext, Role, User};
use crate::core::config::Config;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, HttpRequest, HttpResponse, Transport};
use crate::core::navigation::Navigator;
use crate::core::session::{MemoryCache, MemoryCookieJar, SessionStore};

/// Transport answering from a queue of canned responses and recording every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, status: u16, body: Value) {
        self.push_raw(status, &body.to_string());
    }

    pub fn push_raw(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_error(&self, err: ApiError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {} {}", request.method, request.path))
    }
}

/// Navigator remembering every forced navigation
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

pub fn sample_user(role: Role) -> User {
    User {
        id: 42,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Baker".to_string(),
        phone_number: None,
        address: Some("12 Market St".to_string()),
        user_type: role,
        profile_picture: None,
        is_verified: false,
        created_at: None,
    }
}

/// Body of a successful login or registration
pub fn auth_body(role: Role, access: &str, refresh: &str) -> Value {
    json!({
        "user": sample_user(role),
        "access": access,
        "refresh": refresh,
        "message": "Login successful",
    })
}

/// Fully wired core over in-memory backends
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub cookies: Arc<MemoryCookieJar>,
    pub cache: Arc<MemoryCache>,
    pub store: Arc<SessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub client: ApiClient<Arc<ScriptedTransport>>,
    pub context: AuthContext<Arc<ScriptedTransport>>,
}

impl Harness {
    pub fn new() -> Self {
        let config = Config::default();
        let transport = Arc::new(ScriptedTransport::default());
        let cookies = Arc::new(MemoryCookieJar::new());
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(SessionStore::new(cookies.clone(), cache.clone(), &config));
        let navigator = Arc::new(RecordingNavigator::default());

        let client = ApiClient::new(transport.clone(), store.clone(), navigator.clone(), &config);
        let context = AuthContext::new(ApiClient::new(
            transport.clone(),
            store.clone(),
            navigator.clone(),
            &config,
        ));

        Self {
            transport,
            cookies,
            cache,
            store,
            navigator,
            client,
            context,
        }
    }
}
