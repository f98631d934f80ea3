//! Prometheus metrics for the market-maker bot.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means duplicate
//! metric names, which is a programming error and only surfaces during lazy
//! static initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, HistogramVec, IntCounter, IntGauge, TextEncoder,
};

/// Poll cycles by outcome (ok / idle / strategy_error / pipeline_error / observed).
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "maker_cycles_total",
        "Total polling cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Actions received from the strategy.
pub static ACTIONS_RECEIVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "maker_actions_received_total",
        "Total actions returned by the strategy"
    )
    .unwrap()
});

/// Executed actions by kind, chain and outcome (confirmed / failed / skipped).
pub static ACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "maker_actions_total",
        "Total executed actions",
        &["kind", "chain", "outcome"]
    )
    .unwrap()
});

/// Submit-to-confirmation latency in seconds.
pub static ACTION_LATENCY_SECS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "maker_action_latency_seconds",
        "Time from submission to on-chain confirmation in seconds",
        &["kind"],
        vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]
    )
    .unwrap()
});

/// 1 while a cycle is running, 0 while idle.
pub static LOOP_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "maker_loop_running",
        "Polling loop state (1=running, 0=idle)"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a finished poll cycle.
    pub fn cycle_completed(outcome: &str) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record the size of a strategy batch.
    pub fn actions_received(count: usize) {
        ACTIONS_RECEIVED_TOTAL.inc_by(count as u64);
    }

    /// Record one action's execution result.
    pub fn action_executed(kind: &str, chain: &str, outcome: &str) {
        ACTIONS_TOTAL
            .with_label_values(&[kind, chain, outcome])
            .inc();
    }

    /// Record how long an action took to confirm.
    pub fn action_latency(kind: &str, secs: f64) {
        ACTION_LATENCY_SECS.with_label_values(&[kind]).observe(secs);
    }

    /// Set the polling loop state gauge.
    pub fn loop_running(running: bool) {
        LOOP_RUNNING.set(i64::from(running));
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
