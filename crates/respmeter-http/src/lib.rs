//! respmeter HTTP integration.
//!
//! This crate puts the core recorder in front of an axum router: config
//! loading, the interception middleware with its inline and deferred
//! completion strategies, and the operational endpoints the admin meters
//! watch. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod middleware;
pub mod ops;
pub mod router;
