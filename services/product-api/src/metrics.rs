//! Request counters for the product service.
//!
//! Every recording goes both to the `metrics` recorder (scraped at
//! `/metrics`) and to local atomics served as JSON at `/api/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::Serialize;

#[derive(Debug)]
pub struct MetricsCollector {
    pub product_requests: AtomicU64,
    pub product_errors: AtomicU64,
    pub empty_selections: AtomicU64,
    pub frames_served: AtomicU64,
    pub xsection_requests: AtomicU64,
    pub xsection_timeouts: AtomicU64,
    start_time: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub product_requests: u64,
    pub product_errors: u64,
    pub empty_selections: u64,
    pub frames_served: u64,
    pub xsection_requests: u64,
    pub xsection_timeouts: u64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            product_requests: AtomicU64::new(0),
            product_errors: AtomicU64::new(0),
            empty_selections: AtomicU64::new(0),
            frames_served: AtomicU64::new(0),
            xsection_requests: AtomicU64::new(0),
            xsection_timeouts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful product description.
    pub fn record_product(&self, frames: usize, elapsed: Duration) {
        self.product_requests.fetch_add(1, Ordering::Relaxed);
        self.frames_served.fetch_add(frames as u64, Ordering::Relaxed);
        if frames == 0 {
            self.empty_selections.fetch_add(1, Ordering::Relaxed);
            counter!("product_empty_selections_total").increment(1);
        }
        counter!("product_requests_total").increment(1);
        histogram!("product_frames").record(frames as f64);
        histogram!("product_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_product_error(&self, code: &'static str) {
        self.product_requests.fetch_add(1, Ordering::Relaxed);
        self.product_errors.fetch_add(1, Ordering::Relaxed);
        counter!("product_requests_total").increment(1);
        counter!("product_errors_total", "code" => code).increment(1);
    }

    pub fn record_xsection(&self, timed_out: bool, elapsed: Duration) {
        self.xsection_requests.fetch_add(1, Ordering::Relaxed);
        counter!("xsection_requests_total").increment(1);
        if timed_out {
            self.xsection_timeouts.fetch_add(1, Ordering::Relaxed);
            counter!("xsection_timeouts_total").increment(1);
        } else {
            histogram!("xsection_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            product_requests: self.product_requests.load(Ordering::Relaxed),
            product_errors: self.product_errors.load(Ordering::Relaxed),
            empty_selections: self.empty_selections.load(Ordering::Relaxed),
            frames_served: self.frames_served.load(Ordering::Relaxed),
            xsection_requests: self.xsection_requests.load(Ordering::Relaxed),
            xsection_timeouts: self.xsection_timeouts.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = MetricsCollector::new();
        metrics.record_product(4, Duration::from_millis(3));
        metrics.record_product(0, Duration::from_millis(1));
        metrics.record_product_error("InvalidParameterValue");
        metrics.record_xsection(true, Duration::from_secs(12));

        let snap = metrics.snapshot();
        assert_eq!(snap.product_requests, 3);
        assert_eq!(snap.product_errors, 1);
        assert_eq!(snap.empty_selections, 1);
        assert_eq!(snap.frames_served, 4);
        assert_eq!(snap.xsection_requests, 1);
        assert_eq!(snap.xsection_timeouts, 1);
    }
}
