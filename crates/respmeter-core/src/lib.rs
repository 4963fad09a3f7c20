//! respmeter core: transport-agnostic request/response accounting.
//!
//! This crate owns the metric primitives (meters, timers, ratio gauges), the
//! explicit registry they live in, and the recorder that maps an intercepted
//! request/response pair onto them. It carries no HTTP or runtime
//! dependencies so the same recorder can sit behind any server integration.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! The request path is made of total functions; only lifecycle calls
//! (`init`) can fail, and they surface as `RespMeterError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod admin;
pub mod capture;
pub mod classify;
pub mod config;
pub mod error;
pub mod metric;
pub mod name;
pub mod recorder;

/// Shared result type.
pub use error::{Result, RespMeterError};

pub use capture::StatusCapture;
pub use classify::{RequestMethod, ResponseBucket};
pub use config::FilterConfig;
pub use metric::MetricRegistry;
pub use name::{MetricKind, MetricName, MetricNamer};
pub use recorder::{AsyncListener, InFlight, MetricsListener, ResponseCodeMetrics};
