//! API layer
//!
//! HTTP handlers for:
//! - Douyin-style client endpoints under `/douyin`
//! - Metrics (Prometheus)

mod douyin;
mod dto;
pub mod metrics;

pub use dto::*;

pub use douyin::douyin_router;
pub use metrics::metrics_router;
