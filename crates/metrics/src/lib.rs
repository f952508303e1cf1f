//! Metrics collection and export for signalrt.
//!
//! This crate provides a unified metrics interface using the `metrics` crate facade.
//! When the `prometheus` feature is enabled, metrics are exported in Prometheus format.
//! When the `tracing` feature is enabled, span context is propagated to metrics labels.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signalrt_metrics::{counter, gauge, histogram};
//!
//! counter!("signalrt_http_requests_total", "endpoint" => "/v2/send").increment(1);
//! gauge!("signalrt_worker_queue_depth").set(42.0);
//! histogram!("signalrt_http_request_duration_seconds").record(0.123);
//! ```
//!
//! # Features
//!
//! - `prometheus`: Enable Prometheus metrics export via a handle that renders text format.
//! - `tracing`: Enable tracing span context propagation to metrics labels.

mod definitions;
mod error;
mod recorder;
pub mod tracing_integration;

pub use definitions::*;
pub use error::{Error, Result};
pub use recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
