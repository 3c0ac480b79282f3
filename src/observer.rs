//! Response observation.
//!
//! The [`ResponseObserver`] sits between the typed API client and the
//! transport. It appends one [`ResponseRecord`] per call, never mutating or
//! removing earlier records, and mirrors each observation into Prometheus.

use chrono::{DateTime, Utc};
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::StatusBucket;
use crate::metrics::{REQUESTS_TOTAL, REQUEST_DURATION_SECONDS, REQUEST_STATUS_CODES};
use crate::transport::ApiResponse;

/// One observed API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    /// Request path without query string
    pub endpoint: String,

    pub method: String,

    pub status_code: u16,

    /// When the response was observed
    pub timestamp: DateTime<Utc>,

    /// Time spent waiting on the transport
    pub latency: Duration,
}

impl ResponseRecord {
    pub fn bucket(&self) -> StatusBucket {
        StatusBucket::from_status_code(self.status_code)
    }
}

/// Strips the query string from a request path.
///
/// `/api/hotels/public?city=Toronto` and `/api/hotels/public?star_rating=5`
/// aggregate into the same endpoint.
pub fn endpoint_key(request_path: &str) -> &str {
    match request_path.find('?') {
        Some(idx) => &request_path[..idx],
        None => request_path,
    }
}

/// Append-only log of every call made during a run.
#[derive(Debug, Default)]
pub struct ResponseObserver {
    log: Vec<ResponseRecord>,
}

impl ResponseObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response and hand it back unchanged.
    pub fn observe(
        &mut self,
        method: &Method,
        response: ApiResponse,
        latency: Duration,
    ) -> ApiResponse {
        let endpoint = endpoint_key(&response.request_path).to_string();
        let status_code = response.status_code;
        let bucket = StatusBucket::from_status_code(status_code);

        REQUESTS_TOTAL.inc();
        REQUEST_STATUS_CODES
            .with_label_values(&[&endpoint, &status_code.to_string()])
            .inc();
        REQUEST_DURATION_SECONDS
            .with_label_values(&[&endpoint])
            .observe(latency.as_secs_f64());

        if bucket == StatusBucket::Success {
            debug!(
                method = %method,
                endpoint = %endpoint,
                status = status_code,
                latency_ms = latency.as_millis() as u64,
                "Observed response"
            );
        } else {
            warn!(
                method = %method,
                endpoint = %endpoint,
                status = status_code,
                bucket = %bucket,
                failure = ?response.failure,
                body = %truncate(&response.text, 200),
                "Non-success response"
            );
        }

        self.log.push(ResponseRecord {
            endpoint,
            method: method.to_string(),
            status_code,
            timestamp: Utc::now(),
            latency,
        });

        response
    }

    /// All records in call order.
    pub fn records(&self) -> &[ResponseRecord] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
