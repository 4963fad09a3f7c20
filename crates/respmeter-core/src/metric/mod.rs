//! In-process metric primitives and the registry that owns them.
//!
//! Meters and timers are plain atomics; gauges are computed on read. All of
//! them are safe for concurrent increment from any number of threads without
//! external locking. Names are structured (`MetricName`) rather than flat
//! strings so that two filter instances never collide.

pub mod clock;
pub mod gauge;
pub mod meter;
pub mod registry;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gauge::{Gauge, RateWindow, RatioGauge};
pub use meter::Meter;
pub use registry::{Metric, MetricRegistry, MetricSnapshot, MetricValue};
pub use timer::{Timer, TimerContext};
