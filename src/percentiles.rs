//! Latency percentiles using HDR Histogram.
//!
//! Latencies are recorded in microseconds, clamped to 1μs..=60s, with three
//! significant digits of precision.

use hdrhistogram::Histogram;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

const MAX_TRACKABLE_US: u64 = 60_000_000;

/// Percentile statistics for a set of latency measurements, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
}

pub struct LatencyHistogram {
    histogram: Option<Histogram<u64>>,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        let histogram = match Histogram::new_with_bounds(1, MAX_TRACKABLE_US, 3) {
            Ok(histogram) => Some(histogram),
            Err(e) => {
                warn!(error = %e, "Failed to create latency histogram");
                None
            }
        };
        Self { histogram }
    }

    pub fn record(&mut self, latency: Duration) {
        let Some(histogram) = self.histogram.as_mut() else {
            return;
        };
        let latency_us = (latency.as_micros() as u64).clamp(1, MAX_TRACKABLE_US);
        if let Err(e) = histogram.record(latency_us) {
            warn!(latency_us, error = %e, "Failed to record latency in histogram");
        }
    }

    /// `None` until at least one sample has been recorded.
    pub fn stats(&self) -> Option<LatencyStats> {
        let histogram = self.histogram.as_ref()?;
        if histogram.is_empty() {
            return None;
        }

        let ms = |us: u64| us as f64 / 1000.0;
        Some(LatencyStats {
            count: histogram.len(),
            min_ms: ms(histogram.min()),
            max_ms: ms(histogram.max()),
            mean_ms: histogram.mean() / 1000.0,
            p50_ms: ms(histogram.value_at_quantile(0.50)),
            p95_ms: ms(histogram.value_at_quantile(0.95)),
        })
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarize a set of latencies.
pub fn latency_summary<'a>(
    latencies: impl IntoIterator<Item = &'a Duration>,
) -> Option<LatencyStats> {
    let mut histogram = LatencyHistogram::new();
    for latency in latencies {
        histogram.record(*latency);
    }
    histogram.stats()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_stats() {
        assert!(LatencyHistogram::new().stats().is_none());
        assert!(latency_summary(&[]).is_none());
    }

    #[test]
    fn test_basic_percentiles() {
        let latencies: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        let stats = latency_summary(&latencies).unwrap();

        assert_eq!(stats.count, 100);
        assert!((stats.p50_ms - 50.0).abs() < 1.0, "p50 was {}", stats.p50_ms);
        assert!((stats.p95_ms - 95.0).abs() < 1.0, "p95 was {}", stats.p95_ms);
        assert!(stats.min_ms <= 1.01);
        assert!(stats.max_ms >= 99.9);
    }

    #[test]
    fn test_zero_latency_clamped() {
        let stats = latency_summary(&[Duration::ZERO]).unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.max_ms > 0.0);
    }

    #[test]
    fn test_huge_latency_clamped() {
        let stats = latency_summary(&[Duration::from_secs(3600)]).unwrap();
        assert!(stats.max_ms <= 60_100.0);
    }
}
