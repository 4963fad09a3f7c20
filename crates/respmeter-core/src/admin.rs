//! Admin endpoint matching.
//!
//! A handful of operational paths (ping, metrics, health, threads) get their
//! own hit meter so monitoring traffic can be told apart from real load.
//! Matching is exact equality on the routing path; query strings never reach
//! here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metric::Meter;
use crate::name::labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminRole {
    Ping,
    Metrics,
    Health,
    Threads,
}

impl AdminRole {
    pub const ALL: [AdminRole; 4] = [
        AdminRole::Ping,
        AdminRole::Metrics,
        AdminRole::Health,
        AdminRole::Threads,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdminRole::Ping => "ping",
            AdminRole::Metrics => "metrics",
            AdminRole::Health => "health",
            AdminRole::Threads => "threads",
        }
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            AdminRole::Ping => labels::PING_MONITORING_REQUESTS,
            AdminRole::Metrics => labels::METRICS_MONITORING_REQUESTS,
            AdminRole::Health => labels::HEALTH_MONITORING_REQUESTS,
            AdminRole::Threads => labels::THREADS_MONITORING_REQUESTS,
        }
    }
}

/// Path -> hit meter. Built once at init, read-only afterwards.
#[derive(Debug, Default)]
pub struct AdminEndpoints {
    meters: HashMap<String, (AdminRole, Arc<Meter>)>,
}

impl AdminEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: &str, role: AdminRole, meter: Arc<Meter>) {
        self.meters.insert(path.to_string(), (role, meter));
    }

    /// Mark the meter for `path` if it is an admin path. Returns the role hit.
    pub fn check_and_mark(&self, path: &str) -> Option<AdminRole> {
        let (role, meter) = self.meters.get(path)?;
        meter.mark();
        Some(*role)
    }

    pub fn meter(&self, role: AdminRole) -> Option<&Arc<Meter>> {
        self.meters
            .values()
            .find(|(r, _)| *r == role)
            .map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}
