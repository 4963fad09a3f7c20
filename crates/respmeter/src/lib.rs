//! Top-level facade crate for respmeter.
//!
//! Re-exports the core recorder and the axum integration so users can depend on a single crate.

pub mod core {
    pub use respmeter_core::*;
}

pub mod http {
    pub use respmeter_http::*;
}
