//! Upstream Module
//!
//! Forwards proxied requests to the backend business suite and converts its
//! answers back into axum responses.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, Method},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::{ProxyError, Result};
use crate::middleware::BYPASS_HEADER;

/// Headers that describe one hop and must not be forwarded. `host` and
/// `content-length` are recomputed by the client for the outbound request.
const HOP_BY_HOP: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_forwardable(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(&name.as_str()) && name.as_str() != BYPASS_HEADER
}

/// Header names listed in `Connection`, which are hop-by-hop for this message only.
fn connection_scoped(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Copies the end-to-end headers of one message.
fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let scoped = connection_scoped(headers);

    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if is_forwardable(name) && !scoped.iter().any(|s| s == name.as_str()) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

// == Backend Client ==
/// HTTP client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request upstream and returns the backend's answer as-is.
    ///
    /// Transport failures map to 502, timeouts to 504; backend error statuses are
    /// returned unchanged.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let outbound = end_to_end_headers(headers);

        debug!(%method, %url, "forwarding request upstream");

        let upstream = self
            .http
            .request(method, &url)
            .headers(outbound)
            .body(body)
            .send()
            .await
            .map_err(|e| map_transport_error(&url, e))?;

        let status = upstream.status();
        let response_headers = end_to_end_headers(upstream.headers());

        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| map_transport_error(&url, e))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

fn map_transport_error(url: &str, err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        warn!(%url, error = %err, "upstream request timed out");
        ProxyError::UpstreamTimeout(format!("backend did not respond in time: {}", url))
    } else {
        warn!(%url, error = %err, "upstream request failed");
        ProxyError::Upstream(format!("backend request failed: {}", err))
    }
}
