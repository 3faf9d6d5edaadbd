//! HTTP request pipeline and its transports.

mod client;
#[cfg(feature = "hydrate")]
mod gloo_transport;
#[cfg(feature = "ssr")]
mod reqwest_transport;
mod transport;

pub use client::ApiClient;
#[cfg(feature = "hydrate")]
pub use gloo_transport::GlooTransport;
#[cfg(feature = "ssr")]
pub use reqwest_transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Method, STATUS_UNAUTHORIZED, Transport, join_url};
