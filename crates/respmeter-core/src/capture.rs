//! Response status capture.
//!
//! The interception layer needs to see the status a downstream handler
//! settled on, even when completion is reported by some other task. A
//! `StatusCapture` is shared between the two: whoever produces the response
//! records its status here, and completion reads it back.

use std::sync::atomic::{AtomicI32, Ordering};

/// Status reported when nothing ever set one.
pub const DEFAULT_STATUS: i32 = 200;

#[derive(Debug)]
pub struct StatusCapture {
    status: AtomicI32,
}

impl Default for StatusCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCapture {
    pub fn new() -> Self {
        Self {
            status: AtomicI32::new(DEFAULT_STATUS),
        }
    }

    pub fn set_status(&self, status: i32) {
        self.status.store(status, Ordering::Release);
    }

    pub fn captured_status(&self) -> i32 {
        self.status.load(Ordering::Acquire)
    }
}
