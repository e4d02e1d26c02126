//! Observability utilities: word-vector request metrics

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, TextEncoder};

static REQUESTS: Lazy<IntCounter> = Lazy::new(|| prometheus::register_int_counter!("w2v_client_requests_total", "Word-vector requests sent").unwrap());
static WORDS_SENT: Lazy<IntCounter> = Lazy::new(|| prometheus::register_int_counter!("w2v_client_words_total", "Words carried in request payloads").unwrap());
static ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec!(Opts::new("w2v_client_errors_total", "Failed word-vector requests by kind"), &["kind"]).unwrap()
});
static LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let opts = HistogramOpts::new("w2v_client_request_seconds", "Round-trip latency of word-vector requests")
        .buckets(prometheus::exponential_buckets(0.0001, 2.0, 18).unwrap());
    prometheus::register_histogram!(opts).unwrap()
});

static ENCODER: Lazy<TextEncoder> = Lazy::new(TextEncoder::new);

pub fn init() {
    // Register up front so /metrics lists the series before the first request.
    let _ = &*REQUESTS;
    let _ = &*WORDS_SENT;
    let _ = &*ERRORS;
    let _ = &*LATENCY;
}

pub fn record_request(words: usize, elapsed: Duration) {
    REQUESTS.inc();
    WORDS_SENT.inc_by(words as u64);
    LATENCY.observe(elapsed.as_secs_f64());
}

pub fn record_error(kind: &str) {
    ERRORS.with_label_values(&[kind]).inc();
}

pub fn requests_total() -> u64 { REQUESTS.get() }

pub fn errors_total(kind: &str) -> u64 { ERRORS.with_label_values(&[kind]).get() }

/// Default registry in Prometheus text exposition format.
pub fn gather_text() -> (String, Vec<u8>) {
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = ENCODER.encode(&families, &mut buffer) {
        tracing::warn!(target: "obs", error = %e, "failed to encode metrics");
        buffer.clear();
    }
    (ENCODER.format_type().to_string(), buffer)
}
