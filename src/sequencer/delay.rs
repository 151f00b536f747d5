//! Settle delays between sequencing steps.

use std::time::Duration;

/// Blocks the calling sequence for at least the requested duration.
///
/// Implementations may overshoot, but the sequencer only relies on waits landing
/// in `[delay, 2 * delay]`.
pub trait SettleDelay: Send {
    /// Wait for `delay` before the next rail is touched.
    fn settle(&mut self, delay: Duration);
}

/// Sleeps the current thread. Never returns early.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl SettleDelay for ThreadSleep {
    fn settle(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
