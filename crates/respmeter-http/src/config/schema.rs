use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use respmeter_core::admin::AdminRole;
use respmeter_core::error::{RespMeterError, Result};
use respmeter_core::FilterConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub filter: FilterSection,
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RespMeterError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}

/// How the middleware learns that a request finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    /// Await the handler in place.
    #[default]
    Inline,
    /// Run the handler on its own task and wait for a completion, error or
    /// timeout notification.
    Deferred,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub completion: CompletionMode,

    #[serde(default = "default_deferred_timeout_ms")]
    pub deferred_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            completion: CompletionMode::default(),
            deferred_timeout_ms: default_deferred_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=600_000).contains(&self.deferred_timeout_ms) {
            return Err(RespMeterError::Config(
                "server.deferred-timeout-ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            RespMeterError::Config(format!("server.listen {:?} is not a socket address: {e}", self.listen))
        })
    }

    pub fn deferred_timeout(&self) -> Duration {
        Duration::from_millis(self.deferred_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_deferred_timeout_ms() -> u64 {
    30_000
}

/// Recorder options. Every key is optional; missing or empty values fall back
/// to the recorder defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilterSection {
    pub filter_instance_name: Option<String>,
    pub monitoring_group_name: Option<String>,
    pub monitoring_type_name: Option<String>,
    pub ping_endpoint: Option<String>,
    pub metric_endpoint: Option<String>,
    pub health_endpoint: Option<String>,
    pub threads_endpoint: Option<String>,
}

impl FilterSection {
    pub fn validate(&self) -> Result<()> {
        let cfg = self.to_filter_config();
        for role in AdminRole::ALL {
            let path = cfg.endpoint(role);
            if !path.starts_with('/') {
                return Err(RespMeterError::Config(format!(
                    "filter {} endpoint {path:?} must start with '/'",
                    role.as_str()
                )));
            }
        }
        cfg.validate()
    }

    pub fn to_filter_config(&self) -> FilterConfig {
        FilterConfig::default()
            .with_filter_instance_name(self.filter_instance_name.clone())
            .with_group_name(self.monitoring_group_name.clone())
            .with_type_name(self.monitoring_type_name.clone())
            .with_endpoint(AdminRole::Ping, self.ping_endpoint.clone())
            .with_endpoint(AdminRole::Metrics, self.metric_endpoint.clone())
            .with_endpoint(AdminRole::Health, self.health_endpoint.clone())
            .with_endpoint(AdminRole::Threads, self.threads_endpoint.clone())
    }
}
