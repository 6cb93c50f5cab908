//! Console logging helpers backing the `info!`, `err!` and `pt!` macros.

use std::sync::atomic::{AtomicBool, Ordering};

mod macros;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Silences (or re-enables) all console output from the logging macros.
/// Useful for embedders that render their own log panel.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_print() -> bool {
    !QUIET.load(Ordering::Relaxed)
}
