//! Explicit metric registry.
//!
//! Metrics are keyed by structured `MetricName` in a `DashMap`, so
//! create-or-fetch and remove are safe from any thread. The registry is an
//! ordinary value: each recorder is handed its own `Arc<MetricRegistry>`, and
//! independent instances (one per test, say) never see each other.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::{RespMeterError, Result};
use crate::name::MetricName;

use super::clock::{Clock, MonotonicClock};
use super::gauge::Gauge;
use super::meter::{Meter, MeterSnapshot};
use super::timer::{Timer, TimerSnapshot};

#[derive(Clone)]
pub enum Metric {
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
    Gauge(Arc<dyn Gauge>),
}

impl Metric {
    fn value(&self) -> MetricValue {
        match self {
            Metric::Meter(m) => MetricValue::Meter(m.snapshot()),
            Metric::Timer(t) => MetricValue::Timer(t.snapshot()),
            Metric::Gauge(g) => MetricValue::Gauge { value: g.value() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValue {
    Meter(MeterSnapshot),
    Timer(TimerSnapshot),
    Gauge { value: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub name: MetricName,
    #[serde(flatten)]
    pub value: MetricValue,
}

pub struct MetricRegistry {
    metrics: DashMap<MetricName, Metric>,
    clock: Arc<dyn Clock>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    /// Registry whose meters and timers read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            metrics: DashMap::new(),
            clock,
        }
    }

    /// Create-or-fetch a meter.
    pub fn meter(&self, name: &MetricName) -> Result<Arc<Meter>> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => match e.get() {
                Metric::Meter(m) => Ok(Arc::clone(m)),
                _ => Err(mismatch(name)),
            },
            Entry::Vacant(e) => {
                let meter = Arc::new(Meter::new(Arc::clone(&self.clock)));
                e.insert(Metric::Meter(Arc::clone(&meter)));
                Ok(meter)
            }
        }
    }

    /// Create-or-fetch a timer.
    pub fn timer(&self, name: &MetricName) -> Result<Arc<Timer>> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => match e.get() {
                Metric::Timer(t) => Ok(Arc::clone(t)),
                _ => Err(mismatch(name)),
            },
            Entry::Vacant(e) => {
                let timer = Arc::new(Timer::new(Arc::clone(&self.clock)));
                e.insert(Metric::Timer(Arc::clone(&timer)));
                Ok(timer)
            }
        }
    }

    /// Register `gauge` under `name`, or return the gauge already there.
    pub fn gauge(&self, name: &MetricName, gauge: Arc<dyn Gauge>) -> Result<Arc<dyn Gauge>> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => match e.get() {
                Metric::Gauge(g) => Ok(Arc::clone(g)),
                _ => Err(mismatch(name)),
            },
            Entry::Vacant(e) => {
                e.insert(Metric::Gauge(Arc::clone(&gauge)));
                Ok(gauge)
            }
        }
    }

    /// Create a meter under a name nobody holds yet.
    pub fn register_meter(&self, name: &MetricName) -> Result<Arc<Meter>> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => Err(match e.get() {
                Metric::Meter(_) => taken(name),
                _ => mismatch(name),
            }),
            Entry::Vacant(e) => {
                let meter = Arc::new(Meter::new(Arc::clone(&self.clock)));
                e.insert(Metric::Meter(Arc::clone(&meter)));
                Ok(meter)
            }
        }
    }

    /// Create a timer under a name nobody holds yet.
    pub fn register_timer(&self, name: &MetricName) -> Result<Arc<Timer>> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => Err(match e.get() {
                Metric::Timer(_) => taken(name),
                _ => mismatch(name),
            }),
            Entry::Vacant(e) => {
                let timer = Arc::new(Timer::new(Arc::clone(&self.clock)));
                e.insert(Metric::Timer(Arc::clone(&timer)));
                Ok(timer)
            }
        }
    }

    /// Register `gauge` under a name nobody holds yet.
    pub fn register_gauge(&self, name: &MetricName, gauge: Arc<dyn Gauge>) -> Result<()> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => Err(match e.get() {
                Metric::Gauge(_) => taken(name),
                _ => mismatch(name),
            }),
            Entry::Vacant(e) => {
                e.insert(Metric::Gauge(gauge));
                Ok(())
            }
        }
    }

    /// Deregister `name`. Returns whether anything was removed.
    pub fn remove(&self, name: &MetricName) -> bool {
        self.metrics.remove(name).is_some()
    }

    pub fn get(&self, name: &MetricName) -> Option<Metric> {
        self.metrics.get(name).map(|r| r.value().clone())
    }

    pub fn contains(&self, name: &MetricName) -> bool {
        self.metrics.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<MetricName> {
        let mut names: Vec<MetricName> = self.metrics.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Read every metric, sorted by name. Gauges are evaluated here.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        // Clone out first so gauge evaluation never runs under a shard lock.
        let mut entries: Vec<(MetricName, Metric)> = self
            .metrics
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|(name, metric)| MetricSnapshot {
                value: metric.value(),
                name,
            })
            .collect()
    }
}

fn mismatch(name: &MetricName) -> RespMeterError {
    RespMeterError::MetricTypeMismatch {
        name: name.to_string(),
    }
}

fn taken(name: &MetricName) -> RespMeterError {
    RespMeterError::MetricAlreadyRegistered {
        name: name.to_string(),
    }
}
