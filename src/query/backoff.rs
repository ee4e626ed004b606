//! Backoff delays and the sleeping seam used between attempts.

use std::time::Duration;

/// Blocks the current thread between retry attempts.
///
/// The production implementation is `ThreadSleeper`; tests substitute a recorder so
/// retry schedules can be checked without waiting.
pub trait Sleeper: Send + Sync {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration);
}

/// `Sleeper` backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Delay before the attempt following `attempt` (zero-based): `base * 2^attempt`.
///
/// Uncapped and without jitter; saturates instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
