//! Dispatch metrics
//!
//! OpenTelemetry instruments a `Router` records into when metrics are
//! attached with `Router::with_metrics`. Instruments are prefixed with
//! `rpclite.server.*` and exported through whatever meter provider
//! `init_observability` installed (a no-op provider otherwise).
//!
//! # Metrics Collected
//!
//! - **requests_total**: Dispatch calls, by service and outcome (counter)
//! - **request_duration**: Dispatch latency in seconds (histogram)
//! - **batch_size**: Requests per batch (histogram)
//! - **errors_total**: Error responses, by JSON-RPC code (counter)
//!
//! # Examples
//!
//! ```rust,no_run
//! use rpclite_server::ServerMetrics;
//!
//! let metrics = ServerMetrics::new("calc-service");
//! metrics.record_dispatch("ITest", "success", 0.002);
//! metrics.record_error(-32601);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Instruments recorded by the dispatcher
pub struct ServerMetrics {
    /// Total number of dispatch calls
    pub requests_total: Counter<u64>,
    /// Dispatch duration in seconds
    pub request_duration: Histogram<f64>,
    /// Batch size distribution
    pub batch_size: Histogram<u64>,
    /// Total number of error responses
    pub errors_total: Counter<u64>,
}

impl ServerMetrics {
    /// Create instruments on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create instruments on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("rpclite.server.requests.total")
                .with_description("Total number of dispatch calls")
                .build(),
            request_duration: meter
                .f64_histogram("rpclite.server.request.duration")
                .with_description("Dispatch duration in seconds")
                .build(),
            batch_size: meter
                .u64_histogram("rpclite.server.batch.size")
                .with_description("Number of requests in batch calls")
                .build(),
            errors_total: meter
                .u64_counter("rpclite.server.errors.total")
                .with_description("Total number of JSON-RPC error responses")
                .build(),
        }
    }

    /// Record one dispatch call
    ///
    /// `outcome` is "success", "error_response" or "service_not_found".
    pub fn record_dispatch(&self, service: &str, outcome: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("service", service.to_string()),
            KeyValue::new("outcome", outcome.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record the size of a decoded batch
    pub fn record_batch(&self, service: &str, size: u64) {
        let attributes = &[KeyValue::new("service", service.to_string())];
        self.batch_size.record(size, attributes);
    }

    /// Record an error response by its JSON-RPC code
    pub fn record_error(&self, code: i32) {
        let attributes = &[KeyValue::new("code", i64::from(code))];
        self.errors_total.add(1, attributes);
    }
}
