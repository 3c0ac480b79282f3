//! HTTP transport seam.
//!
//! The simulator never talks to `reqwest` directly: every call goes through a
//! [`Transport`], so workflows can be exercised against an in-memory server in
//! tests and against the real API in production.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::errors::{TransportFailure, TRANSPORT_FAILURE_STATUS};

/// A single request to the target API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,

    /// Absolute URL without query string
    pub url: String,

    pub json_body: Option<Value>,

    /// Query parameters, appended in order
    pub query: Vec<(String, String)>,

    /// Access token sent as `Authorization: Bearer <token>`
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            json_body: None,
            query: Vec::new(),
            bearer: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// Request path plus encoded query, e.g. `/api/hotels/public?city=Toronto`.
    ///
    /// Falls back to the raw URL when it cannot be parsed.
    pub fn path_and_query(&self) -> String {
        match Url::parse_with_params(&self.url, &self.query) {
            Ok(url) => match url.query() {
                Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
                _ => url.path().to_string(),
            },
            Err(_) => self.url.clone(),
        }
    }
}

/// What came back from a call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status, or [`TRANSPORT_FAILURE_STATUS`] when no response arrived
    pub status_code: u16,

    /// Parsed JSON body, `Value::Null` when empty or not JSON
    pub body: Value,

    /// Raw body text (or the transport error message)
    pub text: String,

    /// Path of the issued request, query string included
    pub request_path: String,

    pub failure: Option<TransportFailure>,
}

impl ApiResponse {
    /// Build a response from a status and raw body text.
    pub fn from_text(status_code: u16, text: String, request_path: String) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status_code,
            body,
            text,
            request_path,
            failure: None,
        }
    }

    /// Build a JSON response, mostly useful for in-memory transports.
    pub fn json(status_code: u16, body: Value, request_path: String) -> Self {
        Self {
            status_code,
            text: body.to_string(),
            body,
            request_path,
            failure: None,
        }
    }

    /// Marker response for a call that never produced an HTTP status.
    pub fn transport_failure(
        failure: TransportFailure,
        message: String,
        request_path: String,
    ) -> Self {
        Self {
            status_code: TRANSPORT_FAILURE_STATUS,
            body: Value::Null,
            text: message,
            request_path,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Issues requests against the target API.
///
/// Implementations never return an error: transport problems come back as an
/// [`ApiResponse::transport_failure`] so that every call is observable.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResponse;
}

/// [`Transport`] backed by a `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> ApiResponse {
        let request_path = request.path_and_query();

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request_path, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return ApiResponse::transport_failure(
                    TransportFailure::from_reqwest_error(&e),
                    e.to_string(),
                    request_path,
                )
            }
        };

        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(text) => ApiResponse::from_text(status_code, text, request_path),
            Err(e) => ApiResponse::transport_failure(
                TransportFailure::from_reqwest_error(&e),
                format!("Failed to read response body: {}", e),
                request_path,
            ),
        }
    }
}
