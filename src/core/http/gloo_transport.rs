//! Browser transport over `gloo-net` fetch.

use gloo_net::http::{Request, RequestBuilder};

use super::transport::{HttpRequest, HttpResponse, Method, Transport, join_url};
use crate::core::config::Config;
use crate::core::error::ApiError;
use crate::core::logging::session_warn;

#[derive(Debug, Clone)]
pub struct GlooTransport {
    base_url: String,
}

impl GlooTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
        }
    }
}

fn transport_error(err: gloo_net::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

impl Transport for GlooTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder: RequestBuilder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Patch => Request::patch(&url),
            Method::Delete => Request::delete(&url),
        };
        builder = builder.header("Content-Type", "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }

        let prepared = match &request.body {
            Some(body) => builder.json(body).map_err(transport_error)?,
            None => builder.build().map_err(transport_error)?,
        };

        let response = prepared.send().await.map_err(|e| {
            session_warn!(e, method = request.method, url = url, "Request failed");
            transport_error(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        Ok(HttpResponse::new(status, body))
    }
}
