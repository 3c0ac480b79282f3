//! Outcome classification for simulated traffic.
//!
//! Every response the simulator observes lands in exactly one [`StatusBucket`].
//! Calls that never produced an HTTP status (connection refused, timeouts,
//! undecodable bodies) are recorded with status `0` and carry a
//! [`TransportFailure`] describing what went wrong.

use serde::Serialize;
use std::fmt;

/// Status code recorded for calls that never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Status-code classes used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// HTTP 2xx
    Success,

    /// HTTP 3xx
    Redirection,

    /// HTTP 4xx
    ClientError,

    /// HTTP 5xx
    ServerError,

    /// Anything else, including transport failures and 1xx
    Other,
}

impl StatusBucket {
    /// Classify a status code.
    ///
    /// Only the four named HTTP classes get their own bucket; informational
    /// codes, out-of-range codes and the transport-failure marker all fall
    /// into [`StatusBucket::Other`].
    pub fn from_status_code(status_code: u16) -> Self {
        match status_code {
            200..=299 => StatusBucket::Success,
            300..=399 => StatusBucket::Redirection,
            400..=499 => StatusBucket::ClientError,
            500..=599 => StatusBucket::ServerError,
            _ => StatusBucket::Other,
        }
    }

    /// Label used for Prometheus and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            StatusBucket::Success => "success",
            StatusBucket::Redirection => "redirection",
            StatusBucket::ClientError => "client_error",
            StatusBucket::ServerError => "server_error",
            StatusBucket::Other => "other",
        }
    }

    /// Human-readable description for the text report.
    pub fn description(&self) -> &'static str {
        match self {
            StatusBucket::Success => "Success",
            StatusBucket::Redirection => "Redirection",
            StatusBucket::ClientError => "Client Error",
            StatusBucket::ServerError => "Server Error",
            StatusBucket::Other => "Other",
        }
    }

    /// All buckets in report order.
    pub fn all() -> [StatusBucket; 5] {
        [
            StatusBucket::Success,
            StatusBucket::Redirection,
            StatusBucket::ClientError,
            StatusBucket::ServerError,
            StatusBucket::Other,
        ]
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Why a call produced no HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    /// The request timed out
    Timeout,

    /// DNS, connection refused, connection reset
    Network,

    /// Certificate or handshake problems
    Tls,

    /// The response arrived but its body could not be read
    Body,

    /// The request could not be built (bad URL, bad header)
    Request,

    /// Anything else
    Other,
}

impl TransportFailure {
    /// Categorize a reqwest error.
    pub fn from_reqwest_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportFailure::Timeout
        } else if error.is_connect() {
            TransportFailure::Network
        } else if error.is_builder() {
            TransportFailure::Request
        } else if error.is_body() || error.is_decode() {
            TransportFailure::Body
        } else {
            let error_msg = error.to_string().to_lowercase();

            if error_msg.contains("certificate")
                || error_msg.contains("tls")
                || error_msg.contains("ssl")
            {
                TransportFailure::Tls
            } else if error_msg.contains("dns")
                || error_msg.contains("resolve")
                || error_msg.contains("connection")
            {
                TransportFailure::Network
            } else {
                TransportFailure::Other
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportFailure::Timeout => "timeout",
            TransportFailure::Network => "network",
            TransportFailure::Tls => "tls",
            TransportFailure::Body => "body",
            TransportFailure::Request => "request",
            TransportFailure::Other => "other",
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reason phrase for a status code, e.g. `404 -> "Not Found"`.
pub fn reason_phrase(status_code: u16) -> &'static str {
    if status_code == TRANSPORT_FAILURE_STATUS {
        return "Transport Failure";
    }
    reqwest::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown Status")
}
