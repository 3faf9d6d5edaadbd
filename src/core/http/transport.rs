//! Transport seam between the request pipeline and the network.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{ApiError, parse_body};

/// HTTP status that triggers the refresh-and-retry path
pub const STATUS_UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Method {
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("PATCH")]
    Patch,
    #[display("DELETE")]
    Delete,
}

/// Outbound request, path relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Bearer credential attached by the pipeline
    pub bearer: Option<String>,
    pub(crate) retried: bool,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::Post, path).with_json(body)
    }

    pub fn put<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::Put, path).with_json(body)
    }

    pub fn patch<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::Patch, path).with_json(body)
    }

    /// Attach a JSON body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Whether the pipeline already resubmitted this request once
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Raw response: status plus the undecoded body text
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Pass success through, turn anything else into [`ApiError::Status`]
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.to_error())
        }
    }

    pub fn to_error(&self) -> ApiError {
        ApiError::from_status(self.status, &self.body)
    }

    /// Decode the body; an empty body decodes as JSON `null`
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, ApiError> {
        let value = match parse_body(&self.body) {
            Value::String(_) if !self.body.trim_start().starts_with('"') => {
                return Err(ApiError::Decode("response body is not JSON".to_string()));
            }
            value => value,
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Implementations must not interpret statuses; only network-level failures
/// are errors here.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>>;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> {
        (**self).send(request)
    }
}

/// Join the API base URL and a request path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
