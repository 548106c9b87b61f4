// Cache adapter Prometheus metrics
//
// Provides metrics for adapter operations, including:
// - Operation counters by type (exists, get, set, remove, expire)
// - Hit/miss counters for reads
// - Error counter
// - Operation latency histogram

use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Histogram,
    HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;

/// Global metrics registry for the cache adapter
pub struct CacheMetrics {
    /// Total number of operations by type
    pub operations: IntCounterVec,

    /// Total number of reads that found a value
    pub hits: IntCounter,

    /// Total number of reads that found nothing
    pub misses: IntCounter,

    /// Total number of failed operations
    pub errors: IntCounter,

    /// Operation duration histogram (in seconds)
    pub operation_duration: HistogramVec,
}

static METRICS: OnceLock<CacheMetrics> = OnceLock::new();

impl CacheMetrics {
    /// Initialize and return the global metrics instance
    ///
    /// Registration happens on first use against the default Prometheus
    /// registry. Subsequent calls return the same instance.
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let operations = register_int_counter_vec!(
                "redis_json_cache_operations_total",
                "Total number of cache adapter operations by type",
                &["operation"]
            )
            .expect("Failed to register redis_json_cache_operations_total metric");

            let hits = register_int_counter!(
                "redis_json_cache_hits_total",
                "Total number of reads that found a cached value"
            )
            .expect("Failed to register redis_json_cache_hits_total metric");

            let misses = register_int_counter!(
                "redis_json_cache_misses_total",
                "Total number of reads that found no cached value"
            )
            .expect("Failed to register redis_json_cache_misses_total metric");

            let errors = register_int_counter!(
                "redis_json_cache_errors_total",
                "Total number of failed cache adapter operations"
            )
            .expect("Failed to register redis_json_cache_errors_total metric");

            let operation_duration = register_histogram_vec!(
                "redis_json_cache_operation_duration_seconds",
                "Duration of cache adapter operations in seconds",
                &["operation"],
                vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0] // 0.1ms to 1s
            )
            .expect("Failed to register redis_json_cache_operation_duration_seconds metric");

            CacheMetrics {
                operations,
                hits,
                misses,
                errors,
                operation_duration,
            }
        })
    }

    /// Count an operation and start timing it
    ///
    /// The returned timer records the duration when dropped.
    pub fn start_operation(&self, operation: &str) -> HistogramTimer {
        self.operations.with_label_values(&[operation]).inc();
        HistogramTimer {
            histogram: self.operation_duration.with_label_values(&[operation]),
            start: std::time::Instant::now(),
        }
    }

    /// Record whether a read found a value
    pub fn record_lookup(&self, found: bool) {
        if found {
            self.hits.inc();
        } else {
            self.misses.inc();
        }
    }
}

/// RAII timer for histogram metrics
///
/// Automatically records duration when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
