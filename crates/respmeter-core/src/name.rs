//! Structured metric names and the namer that derives them.
//!
//! A name is `(group, type, name, scope)`. The scope carries the filter
//! instance plus a fixed `requests`/`responses` suffix, which is what keeps
//! two instances (or a request metric and a response metric with the same
//! label) from colliding in one registry.

use std::fmt;

use serde::Serialize;

use crate::config::FilterConfig;

/// Labels of the metrics the recorder registers.
pub mod labels {
    pub const REQUESTS_PER_SECOND: &str = "requestsPerSecond";

    pub const PING_MONITORING_REQUESTS: &str = "pingMonitoringRequests";
    pub const METRICS_MONITORING_REQUESTS: &str = "metricsMonitoringRequests";
    pub const HEALTH_MONITORING_REQUESTS: &str = "healthMonitoringRequests";
    pub const THREADS_MONITORING_REQUESTS: &str = "threadsMonitoringRequests";
}

/// Scope suffix of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Requests,
    Responses,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Requests => "requests",
            MetricKind::Responses => "responses",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricName {
    group: String,
    #[serde(rename = "type")]
    type_name: String,
    name: String,
    scope: String,
}

impl MetricName {
    pub fn new(
        group: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            type_name: type_name.into(),
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:type={}", self.group, self.type_name)?;
        if !self.scope.is_empty() {
            write!(f, ",scope={}", self.scope)?;
        }
        write!(f, ",name={}", self.name)
    }
}

/// Derives names for one filter instance.
#[derive(Debug, Clone)]
pub struct MetricNamer {
    group: String,
    type_name: String,
    instance: String,
}

impl MetricNamer {
    pub fn new(
        group: impl Into<String>,
        type_name: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            type_name: type_name.into(),
            instance: instance.into(),
        }
    }

    pub fn from_config(cfg: &FilterConfig) -> Self {
        Self::new(
            cfg.group_name(),
            cfg.type_name(),
            cfg.filter_instance_name(),
        )
    }

    pub fn name(&self, label: &str, kind: MetricKind) -> MetricName {
        let scope = if self.instance.is_empty() {
            kind.as_str().to_string()
        } else {
            format!("{}.{}", self.instance, kind.as_str())
        };
        MetricName::new(&self.group, &self.type_name, label, scope)
    }

    pub fn requests(&self, label: &str) -> MetricName {
        self.name(label, MetricKind::Requests)
    }

    pub fn responses(&self, label: &str) -> MetricName {
        self.name(label, MetricKind::Responses)
    }
}
