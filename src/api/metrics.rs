//! Request metrics for backend calls
//!
//! # Metrics
//!
//! - `sheetchat_requests_total`: Counter of requests by endpoint
//! - `sheetchat_request_errors_total`: Counter of failed requests by endpoint and kind
//! - `sheetchat_request_duration_seconds`: Histogram of request latency by endpoint
//!
//! No recorder is installed by this crate; without one the macros are no-ops.

use metrics::{histogram, increment_counter};
use std::time::Instant;

/// Timing and outcome tracking for one backend request
#[derive(Debug)]
pub struct RequestMetrics {
    endpoint: &'static str,
    start: Instant,
}

impl RequestMetrics {
    /// Start tracking a request to `endpoint`
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::api::metrics::RequestMetrics;
    ///
    /// let metrics = RequestMetrics::start("query");
    /// assert_eq!(metrics.endpoint(), "query");
    /// metrics.record_success();
    /// ```
    pub fn start(endpoint: &'static str) -> Self {
        increment_counter!("sheetchat_requests_total", "endpoint" => endpoint);
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    /// Endpoint label for this request
    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Record a successful response
    pub fn record_success(self) {
        self.record_duration();
    }

    /// Record a failure of the given kind (`transport`, `status`, `decode`)
    pub fn record_error(self, kind: &'static str) {
        increment_counter!(
            "sheetchat_request_errors_total",
            "endpoint" => self.endpoint,
            "kind" => kind
        );
        self.record_duration();
    }

    fn record_duration(&self) {
        histogram!(
            "sheetchat_request_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "endpoint" => self.endpoint
        );
    }
}
