//! Response distribution report.
//!
//! [`generate`] makes one read-only pass over the observer log and produces a
//! [`ResponseReport`]: totals, a histogram by status class, counts per status
//! code, and the same breakdown per endpoint with latency percentiles. Keys are
//! sorted, so the same log always renders to the same bytes.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use crate::errors::{reason_phrase, StatusBucket};
use crate::observer::ResponseRecord;
use crate::percentiles::{latency_summary, LatencyStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: StatusBucket,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status_code: u16,
    pub reason: &'static str,
    pub bucket: StatusBucket,
    pub count: usize,
    pub percentage: f64,
}

/// Counts for one slice of the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub total: usize,

    /// Every bucket, in report order, including empty ones
    pub buckets: Vec<BucketCount>,

    /// Observed status codes, ascending
    pub status_codes: Vec<StatusCount>,
}

impl Breakdown {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a ResponseRecord>) -> Self {
        let mut by_code: BTreeMap<u16, usize> = BTreeMap::new();
        let mut total = 0;
        for record in records {
            *by_code.entry(record.status_code).or_insert(0) += 1;
            total += 1;
        }

        let buckets = StatusBucket::all()
            .into_iter()
            .map(|bucket| {
                let count = by_code
                    .iter()
                    .filter(|(code, _)| StatusBucket::from_status_code(**code) == bucket)
                    .map(|(_, count)| *count)
                    .sum();
                BucketCount {
                    bucket,
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect();

        let status_codes = by_code
            .into_iter()
            .map(|(status_code, count)| StatusCount {
                status_code,
                reason: reason_phrase(status_code),
                bucket: StatusBucket::from_status_code(status_code),
                count,
                percentage: percentage(count, total),
            })
            .collect();

        Self {
            total,
            buckets,
            status_codes,
        }
    }

    pub fn bucket_count(&self, bucket: StatusBucket) -> usize {
        self.buckets
            .iter()
            .find(|entry| entry.bucket == bucket)
            .map_or(0, |entry| entry.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointReport {
    pub endpoint: String,

    #[serde(flatten)]
    pub breakdown: Breakdown,

    pub latency: Option<LatencyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseReport {
    pub total_calls: usize,
    pub overall: Breakdown,

    /// Sorted by endpoint path
    pub endpoints: Vec<EndpointReport>,
}

/// Build the report for a log.
pub fn generate(records: &[ResponseRecord]) -> ResponseReport {
    let mut by_endpoint: BTreeMap<&str, Vec<&ResponseRecord>> = BTreeMap::new();
    for record in records {
        by_endpoint
            .entry(record.endpoint.as_str())
            .or_default()
            .push(record);
    }

    let endpoints = by_endpoint
        .into_iter()
        .map(|(endpoint, endpoint_records)| {
            let latencies: Vec<Duration> = endpoint_records.iter().map(|r| r.latency).collect();
            EndpointReport {
                endpoint: endpoint.to_string(),
                breakdown: Breakdown::from_records(endpoint_records.iter().copied()),
                latency: latency_summary(&latencies),
            }
        })
        .collect();

    ResponseReport {
        total_calls: records.len(),
        overall: Breakdown::from_records(records),
        endpoints,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

impl ResponseReport {
    pub fn endpoint(&self, endpoint: &str) -> Option<&EndpointReport> {
        self.endpoints.iter().find(|entry| entry.endpoint == endpoint)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "========== API RESPONSE CODE REPORT ==========");
        let _ = writeln!(out);
        let _ = writeln!(out, "Total API requests made: {}", self.total_calls);

        let _ = writeln!(out);
        let _ = writeln!(out, "Status class distribution:");
        for entry in &self.overall.buckets {
            let _ = writeln!(
                out,
                "  {:<13} {:>6} ({:.1}%)",
                entry.bucket.description(),
                entry.count,
                entry.percentage
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Response code distribution:");
        write_status_codes(&mut out, &self.overall.status_codes, "  ");

        let _ = writeln!(out);
        let _ = writeln!(out, "Response codes by endpoint:");
        for entry in &self.endpoints {
            let _ = writeln!(out);
            let _ = writeln!(out, "  {}:", entry.endpoint);
            let _ = writeln!(out, "    Total requests: {}", entry.breakdown.total);
            let classes: Vec<String> = entry
                .breakdown
                .buckets
                .iter()
                .filter(|b| b.count > 0)
                .map(|b| format!("{} {} ({:.1}%)", b.bucket.description(), b.count, b.percentage))
                .collect();
            let _ = writeln!(out, "    Classes: {}", classes.join(", "));
            write_status_codes(&mut out, &entry.breakdown.status_codes, "    - ");
            if let Some(latency) = &entry.latency {
                let _ = writeln!(
                    out,
                    "    Latency: p50={:.2}ms p95={:.2}ms max={:.2}ms",
                    latency.p50_ms, latency.p95_ms, latency.max_ms
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "==============================================");
        out
    }
}

fn write_status_codes(out: &mut String, codes: &[StatusCount], prefix: &str) {
    for entry in codes {
        let _ = writeln!(
            out,
            "{}{} {} ({}): {} occurrences ({:.1}%)",
            prefix,
            entry.status_code,
            entry.reason,
            entry.bucket.description(),
            entry.count,
            entry.percentage
        );
    }
}
