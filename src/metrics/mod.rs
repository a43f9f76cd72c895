// Metrics module - Prometheus-compatible counters for the transformation middleware
// Exported as plain text by the /metrics endpoint

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Metrics tracks transformation counters for Prometheus export
/// Thread-safe via atomic operations and mutexes
pub struct Metrics {
    // Requests seen by the transformation middleware
    request_count: AtomicU64,

    // Outcome counters
    transformed: AtomicU64,
    not_modified: AtomicU64,

    // Pass-through counters by reason (not_image, no_params, too_large, failed, ...)
    passthrough_reasons: Mutex<HashMap<String, u64>>,

    // Transformation failures by pipeline stage (decode, resize, encode, cancelled)
    failures: Mutex<HashMap<String, u64>>,

    // Origin bytes fed into transformations / transformed bytes sent out
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,

    // Cumulative time spent on worker threads (microseconds)
    transform_duration_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Metrics {
            request_count: AtomicU64::new(0),
            transformed: AtomicU64::new(0),
            not_modified: AtomicU64::new(0),
            passthrough_reasons: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            bytes_in: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            transform_duration_us: AtomicU64::new(0),
        }
    }

    pub fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful transformation and its byte counts
    pub fn record_transformed(&self, bytes_in: usize, bytes_out: usize, duration_ms: f64) {
        self.transformed.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes_in as u64, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes_out as u64, Ordering::Relaxed);
        self.transform_duration_us
            .fetch_add((duration_ms * 1000.0) as u64, Ordering::Relaxed);
    }

    pub fn increment_not_modified(&self) {
        self.not_modified.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response served unchanged, keyed by why
    pub fn increment_passthrough(&self, reason: &str) {
        if let Ok(mut counts) = self.passthrough_reasons.lock() {
            *counts.entry(reason.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a failed transformation, keyed by pipeline stage
    pub fn increment_failure(&self, stage: &str) {
        if let Ok(mut counts) = self.failures.lock() {
            *counts.entry(stage.to_string()).or_insert(0) += 1;
        }
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn transformed_count(&self) -> u64 {
        self.transformed.load(Ordering::Relaxed)
    }

    pub fn not_modified_count(&self) -> u64 {
        self.not_modified.load(Ordering::Relaxed)
    }

    pub fn passthrough_count(&self, reason: &str) -> u64 {
        self.passthrough_reasons
            .lock()
            .ok()
            .and_then(|counts| counts.get(reason).copied())
            .unwrap_or(0)
    }

    pub fn failure_count(&self, stage: &str) -> u64 {
        self.failures
            .lock()
            .ok()
            .and_then(|counts| counts.get(stage).copied())
            .unwrap_or(0)
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(
            "# HELP image_requests_total Requests seen by the image transformation middleware\n",
        );
        output.push_str("# TYPE image_requests_total counter\n");
        output.push_str(&format!(
            "image_requests_total {}\n",
            self.request_count.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP image_transformed_total Responses replaced by a transformed image\n");
        output.push_str("# TYPE image_transformed_total counter\n");
        output.push_str(&format!(
            "image_transformed_total {}\n",
            self.transformed.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP image_not_modified_total Conditional requests answered with 304\n");
        output.push_str("# TYPE image_not_modified_total counter\n");
        output.push_str(&format!(
            "image_not_modified_total {}\n",
            self.not_modified.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP image_passthrough_total Responses served unchanged by reason\n");
        output.push_str("# TYPE image_passthrough_total counter\n");
        if let Ok(counts) = self.passthrough_reasons.lock() {
            let mut sorted: Vec<_> = counts.iter().collect();
            sorted.sort();
            for (reason, count) in sorted {
                output.push_str(&format!(
                    "image_passthrough_total{{reason=\"{}\"}} {}\n",
                    reason, count
                ));
            }
        }

        output.push_str("\n# HELP image_transform_failures_total Failed transformations by stage\n");
        output.push_str("# TYPE image_transform_failures_total counter\n");
        if let Ok(counts) = self.failures.lock() {
            let mut sorted: Vec<_> = counts.iter().collect();
            sorted.sort();
            for (stage, count) in sorted {
                output.push_str(&format!(
                    "image_transform_failures_total{{stage=\"{}\"}} {}\n",
                    stage, count
                ));
            }
        }

        output.push_str("\n# HELP image_bytes_in_total Source bytes of transformed images\n");
        output.push_str("# TYPE image_bytes_in_total counter\n");
        output.push_str(&format!(
            "image_bytes_in_total {}\n",
            self.bytes_in.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP image_bytes_out_total Bytes of transformed images sent\n");
        output.push_str("# TYPE image_bytes_out_total counter\n");
        output.push_str(&format!(
            "image_bytes_out_total {}\n",
            self.bytes_out.load(Ordering::Relaxed)
        ));

        output.push_str(
            "\n# HELP image_transform_duration_seconds_total Time spent transforming images\n",
        );
        output.push_str("# TYPE image_transform_duration_seconds_total counter\n");
        output.push_str(&format!(
            "image_transform_duration_seconds_total {:.6}\n",
            self.transform_duration_us.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));

        output
    }
}
