//! Probe hit output formatting.
//!
//! Per-hit log lines are off by default; sampling probes can fire at a high
//! rate and the counters in the callback table are usually enough.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::context::ProbeHit;

/// Global verbose mode switch for per-hit output
static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable verbose mode
pub fn set_verbose(enabled: bool) {
    VERBOSE_MODE.store(enabled, Ordering::SeqCst);
    log::info!(
        "probe verbose mode: {}",
        if enabled { "enabled" } else { "disabled" }
    );
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE_MODE.load(Ordering::SeqCst)
}

/// Print one structured hit line.
///
/// Output format: [probe] cb=NAME inst=ID addr=ADDR tid=TID ts_ns=TIMESTAMP
pub fn print_hit(callback_name: &str, hit: &ProbeHit) {
    log::info!(
        "[probe] cb={} inst={} addr={:#x} tid={} ts_ns={}",
        callback_name,
        hit.instance.as_u32(),
        hit.address,
        hit.thread_id,
        hit.timestamp_ns
    );
}

/// Print a hit line if verbose mode is enabled.
pub fn print_hit_if_verbose(callback_name: &str, hit: &ProbeHit) {
    if is_verbose() {
        print_hit(callback_name, hit);
    }
}
