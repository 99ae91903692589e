use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

pub static COMPILATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "filter_compilations_total",
        "Filter compilations by target",
        &["target"]
    )
    .unwrap()
});

pub static COMPILE_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "filter_compile_errors_total",
        "Failed filter compilations by rule",
        &["rule"]
    )
    .unwrap()
});

pub static COMPILE_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "filter_compile_seconds",
        "Filter compilation latency",
        &["target"],
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]
    )
    .unwrap()
});

/// Counts one compilation for `target` and times it until the guard drops.
pub fn observe(target: &str) -> prometheus::HistogramTimer {
    COMPILATIONS_TOTAL.with_label_values(&[target]).inc();
    COMPILE_SECONDS.with_label_values(&[target]).start_timer()
}
