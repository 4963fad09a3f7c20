//! Timer: a meter plus a latency distribution.
//!
//! Latencies are bucketed in microseconds with fixed upper bounds to keep the
//! hot path to a handful of relaxed atomic adds. Percentiles are therefore
//! approximate: they report the upper bound of the bucket the rank falls in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::clock::Clock;
use super::meter::{Meter, MeterSnapshot};

// Fixed bucket upper bounds in microseconds (µs)
// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s
const BUCKETS_MICROS: [u64; 11] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
];

struct AtomicHistogram {
    sum: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
    // One extra slot for observations above the last bound.
    buckets: [AtomicU64; 12],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            sum: AtomicU64::new(0),
            min: AtomicU64::new(u64::MAX),
            max: AtomicU64::new(0),
            buckets: Default::default(),
        }
    }
}

impl AtomicHistogram {
    fn observe(&self, micros: u64) {
        self.sum.fetch_add(micros, Ordering::Relaxed);
        self.min.fetch_min(micros, Ordering::Relaxed);
        self.max.fetch_max(micros, Ordering::Relaxed);
        let idx = BUCKETS_MICROS
            .iter()
            .position(|&b| micros <= b)
            .unwrap_or(BUCKETS_MICROS.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    fn percentile(&self, counts: &[u64; 12], total: u64, q: f64) -> u64 {
        if total == 0 {
            return 0;
        }
        let rank = ((q * total as f64).ceil() as u64).clamp(1, total);
        let mut seen = 0;
        for (i, c) in counts.iter().enumerate() {
            seen += c;
            if seen >= rank {
                return BUCKETS_MICROS
                    .get(i)
                    .copied()
                    .unwrap_or_else(|| self.max.load(Ordering::Relaxed));
            }
        }
        self.max.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a timer. Durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub rate: MeterSnapshot,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

pub struct Timer {
    meter: Meter,
    histogram: AtomicHistogram,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            meter: Meter::new(clock),
            histogram: AtomicHistogram::default(),
        }
    }

    /// Start timing one observation.
    pub fn time(self: &Arc<Self>) -> TimerContext {
        TimerContext {
            timer: Arc::clone(self),
            start_nanos: self.meter.clock().now_nanos(),
        }
    }

    /// Record an externally measured duration.
    pub fn update(&self, elapsed: Duration) {
        self.histogram.observe(elapsed.as_micros() as u64);
        self.meter.mark();
    }

    pub fn count(&self) -> u64 {
        self.meter.count()
    }

    /// Rates of this timer's observations.
    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let counts: [u64; 12] =
            std::array::from_fn(|i| self.histogram.buckets[i].load(Ordering::Relaxed));
        let total: u64 = counts.iter().sum();
        let ms = |micros: u64| micros as f64 / 1_000.0;
        let (min, mean) = if total == 0 {
            (0, 0.0)
        } else {
            let sum = self.histogram.sum.load(Ordering::Relaxed);
            (
                self.histogram.min.load(Ordering::Relaxed),
                sum as f64 / total as f64 / 1_000.0,
            )
        };
        TimerSnapshot {
            rate: self.meter.snapshot(),
            min_ms: ms(min),
            max_ms: ms(self.histogram.max.load(Ordering::Relaxed)),
            mean_ms: mean,
            p50_ms: ms(self.histogram.percentile(&counts, total, 0.50)),
            p95_ms: ms(self.histogram.percentile(&counts, total, 0.95)),
            p99_ms: ms(self.histogram.percentile(&counts, total, 0.99)),
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer").field("count", &self.count()).finish()
    }
}

/// A started observation. `stop` records it; dropping without `stop` records
/// nothing.
#[derive(Debug)]
pub struct TimerContext {
    timer: Arc<Timer>,
    start_nanos: u64,
}

impl TimerContext {
    /// Record the elapsed time and return it.
    pub fn stop(self) -> Duration {
        let now = self.timer.meter.clock().now_nanos();
        let elapsed = Duration::from_nanos(now.saturating_sub(self.start_nanos));
        self.timer.update(elapsed);
        elapsed
    }
}
