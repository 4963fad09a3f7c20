//! Shared error type across respmeter crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, RespMeterError>;

/// Unified error type used by core and the HTTP integration.
///
/// Nothing on the request path returns this; it only comes out of lifecycle
/// and configuration calls.
#[derive(Debug, Error)]
pub enum RespMeterError {
    #[error("metrics already initialized; destroy before re-initializing")]
    AlreadyInitialized,
    #[error("admin path {path:?} configured for both {first} and {second}")]
    AdminPathCollision {
        path: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("metric {name} is already registered with a different type")]
    MetricTypeMismatch { name: String },
    #[error("metric {name} is already registered")]
    MetricAlreadyRegistered { name: String },
    #[error("config: {0}")]
    Config(String),
}
