use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::{LazyLock, Once};

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Relay outcomes per route: ok, not_found, client_error, backend_error, render_error
pub static RELAY_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("lnproxy_relay_requests_total", "Relay requests by outcome"),
        &["route", "outcome"],
    )
    .unwrap()
});

pub static BACKEND_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "lnproxy_backend_latency_seconds",
            "Latency of calls to the wrapping backend",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

pub static REDIRECTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "lnproxy_redirects_total",
        "Form submissions redirected to a wrap route",
    )
    .unwrap()
});

static REGISTER: Once = Once::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(RELAY_REQUESTS_TOTAL.clone()))
            .unwrap();
        REGISTRY.register(Box::new(BACKEND_LATENCY.clone())).unwrap();
        REGISTRY.register(Box::new(REDIRECTS_TOTAL.clone())).unwrap();
    });
}

/// Count one relay outcome.
pub fn record_relay(route: &str, outcome: &str) {
    RELAY_REQUESTS_TOTAL
        .with_label_values(&[route, outcome])
        .inc();
}
