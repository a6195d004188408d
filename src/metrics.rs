//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reelgraph_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "reelgraph_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Graph Metrics
    pub static ref EDGE_TRANSITIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reelgraph_edge_transitions_total", "Follow and favorite transitions by outcome"),
        &["edge", "action", "outcome"]
    ).expect("metric can be created");

    // Content Metrics
    pub static ref COMMENTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reelgraph_comments_total", "Comments posted and deleted"),
        &["action"]
    ).expect("metric can be created");
    pub static ref VIDEOS_PUBLISHED_TOTAL: IntCounter = IntCounter::new(
        "reelgraph_videos_published_total",
        "Total number of published videos"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reelgraph_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("HTTP_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(EDGE_TRANSITIONS_TOTAL.clone()))
        .expect("EDGE_TRANSITIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(COMMENTS_TOTAL.clone()))
        .expect("COMMENTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(VIDEOS_PUBLISHED_TOTAL.clone()))
        .expect("VIDEOS_PUBLISHED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
