//! Metrics module
//!
//! Prometheus counters and histograms for editor uploads.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref UPLOADS_TOTAL: CounterVec = register_counter_vec!(
        "editor_uploads_total",
        "Total number of uploads",
        &["mode", "status"]
    ).unwrap();

    pub static ref UPLOAD_BYTES_TOTAL: Counter = register_counter!(
        "editor_upload_bytes_total",
        "Total bytes written to disk"
    ).unwrap();

    pub static ref UPLOAD_DURATION: HistogramVec = register_histogram_vec!(
        "editor_upload_duration_seconds",
        "Upload duration in seconds",
        &["mode"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    ).unwrap();

    pub static ref ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "editor_upload_errors_total",
        "Total upload errors by kind",
        &["kind"]
    ).unwrap();
}

/// Record a successful upload
pub fn record_upload_success(mode: &str, bytes: u64) {
    UPLOADS_TOTAL.with_label_values(&[mode, "success"]).inc();
    UPLOAD_BYTES_TOTAL.inc_by(bytes as f64);
}

/// Record a failed upload
pub fn record_upload_failure(mode: &str, kind: &str) {
    UPLOADS_TOTAL.with_label_values(&[mode, "failure"]).inc();
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Record upload duration
pub fn record_upload_duration(mode: &str, duration_secs: f64) {
    UPLOAD_DURATION
        .with_label_values(&[mode])
        .observe(duration_secs);
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
