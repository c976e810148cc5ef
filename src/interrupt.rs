//! Ctrl-C handling for streamed runs.
//!
//! The handler only raises a flag; the streaming relay notices it between
//! events and shuts the child down itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use tracing::debug;

static ARMED: Once = Once::new();

/// Install a process-wide Ctrl-C handler that raises `flag`.
///
/// Only the first call installs anything; later calls are no-ops.
pub fn arm(flag: &Arc<AtomicBool>) {
    let flag = Arc::clone(flag);
    ARMED.call_once(move || {
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            debug!(error = %e, "could not install Ctrl-C handler");
        }
    });
}
