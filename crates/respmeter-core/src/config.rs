//! Resolved filter configuration.
//!
//! Every field falls back to its default when unset or empty; resolving a
//! config never fails. The only invalid shape is two admin roles sharing a
//! path, which `validate` rejects.

use crate::admin::AdminRole;
use crate::error::{RespMeterError, Result};
use crate::recorder::{DEFAULT_GROUP_NAME, DEFAULT_TYPE_NAME};

pub const DEFAULT_FILTER_INSTANCE_NAME: &str = "response-code-filter";

pub const DEFAULT_PING_ENDPOINT: &str = "/ping";
pub const DEFAULT_METRICS_ENDPOINT: &str = "/metrics";
pub const DEFAULT_HEALTH_ENDPOINT: &str = "/healthcheck";
pub const DEFAULT_THREADS_ENDPOINT: &str = "/threads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    group_name: String,
    type_name: String,
    filter_instance_name: String,
    ping_endpoint: String,
    metrics_endpoint: String,
    health_endpoint: String,
    threads_endpoint: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            group_name: DEFAULT_GROUP_NAME.to_string(),
            type_name: DEFAULT_TYPE_NAME.to_string(),
            filter_instance_name: DEFAULT_FILTER_INSTANCE_NAME.to_string(),
            ping_endpoint: DEFAULT_PING_ENDPOINT.to_string(),
            metrics_endpoint: DEFAULT_METRICS_ENDPOINT.to_string(),
            health_endpoint: DEFAULT_HEALTH_ENDPOINT.to_string(),
            threads_endpoint: DEFAULT_THREADS_ENDPOINT.to_string(),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

impl FilterConfig {
    pub fn with_group_name(mut self, v: Option<String>) -> Self {
        self.group_name = or_default(v, DEFAULT_GROUP_NAME);
        self
    }

    pub fn with_type_name(mut self, v: Option<String>) -> Self {
        self.type_name = or_default(v, DEFAULT_TYPE_NAME);
        self
    }

    pub fn with_filter_instance_name(mut self, v: Option<String>) -> Self {
        self.filter_instance_name = or_default(v, DEFAULT_FILTER_INSTANCE_NAME);
        self
    }

    /// Set the path for one admin role.
    pub fn with_endpoint(mut self, role: AdminRole, v: Option<String>) -> Self {
        let (slot, default) = match role {
            AdminRole::Ping => (&mut self.ping_endpoint, DEFAULT_PING_ENDPOINT),
            AdminRole::Metrics => (&mut self.metrics_endpoint, DEFAULT_METRICS_ENDPOINT),
            AdminRole::Health => (&mut self.health_endpoint, DEFAULT_HEALTH_ENDPOINT),
            AdminRole::Threads => (&mut self.threads_endpoint, DEFAULT_THREADS_ENDPOINT),
        };
        *slot = or_default(v, default);
        self
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn filter_instance_name(&self) -> &str {
        &self.filter_instance_name
    }

    pub fn endpoint(&self, role: AdminRole) -> &str {
        match role {
            AdminRole::Ping => &self.ping_endpoint,
            AdminRole::Metrics => &self.metrics_endpoint,
            AdminRole::Health => &self.health_endpoint,
            AdminRole::Threads => &self.threads_endpoint,
        }
    }

    /// Reject admin roles that share a path; the meter a hit should land on
    /// would otherwise be ambiguous.
    pub fn validate(&self) -> Result<()> {
        for (i, first) in AdminRole::ALL.iter().enumerate() {
            for second in &AdminRole::ALL[i + 1..] {
                if self.endpoint(*first) == self.endpoint(*second) {
                    return Err(RespMeterError::AdminPathCollision {
                        path: self.endpoint(*first).to_string(),
                        first: first.as_str(),
                        second: second.as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}
