//! Hit context passed to probe callbacks.

use crate::callback::CallbackId;
use crate::platform;
use crate::probe::InstanceId;

/// Describes one probe hit.
///
/// Constructed by the host binding when execution reaches a probe and passed
/// to the callback alongside the call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeHit {
    /// Probe instance that fired
    pub instance: InstanceId,
    /// Callback bound to the instance
    pub callback: CallbackId,
    /// Address of the resolved location that was reached
    pub address: u64,
    /// Host thread id (0 means unknown)
    pub thread_id: u64,
    /// Hit timestamp (nanoseconds)
    pub timestamp_ns: u64,
}

impl ProbeHit {
    /// Create a new hit context stamped with the current time.
    pub fn new(instance: InstanceId, callback: CallbackId, address: u64) -> Self {
        Self {
            instance,
            callback,
            address,
            thread_id: 0,
            timestamp_ns: platform::time_ns(),
        }
    }

    /// Set the host thread that hit the probe.
    pub fn with_thread(mut self, thread_id: u64) -> Self {
        self.thread_id = thread_id;
        self
    }
}
