//! Meter: a counter with exponentially weighted moving-average rates.
//!
//! Rates are ticked lazily: every `mark` or rate read first folds in any
//! whole 5 second intervals that elapsed since the last tick. Only the thread
//! that wins the `last_tick` CAS performs the fold, so the EWMA state itself
//! needs no lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::clock::Clock;

const TICK_INTERVAL_NANOS: u64 = 5_000_000_000;
const TICK_INTERVAL_SECS: f64 = 5.0;

/// One exponentially weighted moving average, stored as per-second rate.
struct Ewma {
    alpha: f64,
    uncounted: AtomicU64,
    rate_bits: AtomicU64,
    initialized: AtomicBool,
}

impl Ewma {
    fn over_minutes(minutes: f64) -> Self {
        let alpha = 1.0 - (-TICK_INTERVAL_SECS / 60.0 / minutes).exp();
        Self {
            alpha,
            uncounted: AtomicU64::new(0),
            rate_bits: AtomicU64::new(0f64.to_bits()),
            initialized: AtomicBool::new(false),
        }
    }

    fn update(&self, n: u64) {
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    fn tick(&self) {
        let count = self.uncounted.swap(0, Ordering::Relaxed);
        let instant_rate = count as f64 / TICK_INTERVAL_SECS;
        if self.initialized.swap(true, Ordering::AcqRel) {
            let rate = self.rate();
            self.set_rate(rate + self.alpha * (instant_rate - rate));
        } else {
            self.set_rate(instant_rate);
        }
    }

    fn rate(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Acquire))
    }

    fn set_rate(&self, rate: f64) {
        self.rate_bits.store(rate.to_bits(), Ordering::Release);
    }
}

/// Point-in-time view of a meter. Rates are events per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean_rate: f64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
}

pub struct Meter {
    count: AtomicU64,
    start_nanos: u64,
    last_tick: AtomicU64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    clock: Arc<dyn Clock>,
}

impl Meter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_nanos();
        Self {
            count: AtomicU64::new(0),
            start_nanos: now,
            last_tick: AtomicU64::new(now),
            m1: Ewma::over_minutes(1.0),
            m5: Ewma::over_minutes(5.0),
            m15: Ewma::over_minutes(15.0),
            clock,
        }
    }

    /// Record one event.
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Record `n` events.
    pub fn mark_n(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        self.m1.update(n);
        self.m5.update(n);
        self.m15.update(n);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Events per second since the meter was created.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self.clock.now_nanos().saturating_sub(self.start_nanos);
        if elapsed == 0 {
            return 0.0;
        }
        count as f64 / (elapsed as f64 / 1e9)
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m1.rate()
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m5.rate()
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m15.rate()
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count(),
            mean_rate: self.mean_rate(),
            m1_rate: self.one_minute_rate(),
            m5_rate: self.five_minute_rate(),
            m15_rate: self.fifteen_minute_rate(),
        }
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn tick_if_necessary(&self) {
        let old = self.last_tick.load(Ordering::Acquire);
        let now = self.clock.now_nanos();
        let age = now.saturating_sub(old);
        if age <= TICK_INTERVAL_NANOS {
            return;
        }
        let new_interval_start = now - age % TICK_INTERVAL_NANOS;
        if self
            .last_tick
            .compare_exchange(old, new_interval_start, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let required_ticks = age / TICK_INTERVAL_NANOS;
            for _ in 0..required_ticks {
                self.m1.tick();
                self.m5.tick();
                self.m15.tick();
            }
        }
    }
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter").field("count", &self.count()).finish()
    }
}
