//! Platform abstraction layer for host-provided services.
//!
//! The only service the registry needs from its environment is a monotonic
//! clock for hit timestamps. Hosts install one with [`register_clock_hook`];
//! without a hook a settable mock clock is used, which keeps tests
//! deterministic.

use core::sync::atomic::{AtomicU64, Ordering};
use spin::RwLock;

/// Clock hook signature: current monotonic time in nanoseconds.
pub type ClockHook = fn() -> u64;

static CLOCK_HOOK: RwLock<Option<ClockHook>> = RwLock::new(None);

/// Mock time value for testing.
static MOCK_TIME_NS: AtomicU64 = AtomicU64::new(1_000_000_000); // 1 second

/// Install the host clock.
pub fn register_clock_hook(hook: ClockHook) {
    *CLOCK_HOOK.write() = Some(hook);
    log::debug!("probe: clock hook registered");
}

/// Remove the host clock and fall back to the mock clock.
pub fn clear_clock_hook() {
    *CLOCK_HOOK.write() = None;
}

/// Set mock time for testing.
pub fn set_mock_time(ns: u64) {
    MOCK_TIME_NS.store(ns, Ordering::Relaxed);
}

/// Advance mock time by given nanoseconds.
pub fn advance_mock_time(ns: u64) {
    MOCK_TIME_NS.fetch_add(ns, Ordering::Relaxed);
}

/// Get current time in nanoseconds.
#[inline]
pub fn time_ns() -> u64 {
    match *CLOCK_HOOK.read() {
        Some(hook) => hook(),
        None => MOCK_TIME_NS.load(Ordering::Relaxed),
    }
}
