//! Prometheus metrics for flashcard-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] runs, so library users
//! and tests need no setup.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static FLASHCARD_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static FLASHCARD_CARDS_GENERATED_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize all metrics. Later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "flashcard_requests_total",
            "Flashcard generation requests by outcome",
        ),
        &["outcome"],
    )?;

    let cards_generated = IntCounter::new(
        "flashcard_cards_generated_total",
        "Flashcards returned to callers",
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "Latency of generative provider calls",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["model"],
    )?;

    let tokens_total = IntCounterVec::new(
        Opts::new("genai_tokens_total", "Tokens consumed by provider calls"),
        &["model", "type"], // type: input, output
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(cards_generated.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(tokens_total.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = FLASHCARD_REQUESTS_TOTAL.set(requests_total);
    let _ = FLASHCARD_CARDS_GENERATED_TOTAL.set(cards_generated);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_TOKENS_TOTAL.set(tokens_total);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => return "# Metrics registry not initialized\n".to_string(),
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

/// Record a finished generation request. `outcome` is `ok` or an error kind.
pub fn record_request(outcome: &str) {
    if let Some(counter) = FLASHCARD_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_cards(count: usize) {
    if let Some(counter) = FLASHCARD_CARDS_GENERATED_TOTAL.get() {
        counter.inc_by(count as u64);
    }
}

pub fn record_provider_latency(model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[model]).observe(duration_secs);
    }
}

pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = GENAI_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}
