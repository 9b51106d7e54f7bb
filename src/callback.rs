//! Named callback table and hit dispatch.
//!
//! Callbacks are plain functions registered under a name before any probe
//! spec refers to them. Registering a spec resolves the name once into a
//! [`CallbackRef`]; the host binding later dispatches hits by [`CallbackId`]
//! without any name lookup on the hot path.
//!
//! The table is immutable once handed to a registry (it is shared through an
//! `Arc`), so target threads may dispatch concurrently. Hit statistics are
//! kept in atomics.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::context::ProbeHit;
use crate::error::Error;
use crate::frame::CallFrame;
use crate::output;

/// Callback signature.
///
/// Runs synchronously on the thread that hit the probe; execution resumes
/// once it returns.
pub type CallbackFn = fn(&mut dyn CallFrame, &ProbeHit);

/// Index of a callback in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(u32);

impl CallbackId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Resolved reference to a callback, stored in probe specs and handed to the
/// host when a probe is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRef {
    /// Table index used for dispatch
    pub id: CallbackId,
    /// Name the callback was defined under
    pub name: String,
}

/// Hit counters for one callback.
#[derive(Debug)]
struct CallbackStats {
    hits: AtomicU64,
    last_timestamp: AtomicU64,
}

impl CallbackStats {
    const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            last_timestamp: AtomicU64::new(0),
        }
    }

    fn record_hit(&self, timestamp: u64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.last_timestamp.store(timestamp, Ordering::Relaxed);
    }
}

struct CallbackEntry {
    name: String,
    func: CallbackFn,
    stats: CallbackStats,
}

/// Point-in-time copy of a callback's hit counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSnapshot {
    pub name: String,
    pub hits: u64,
    pub last_timestamp: u64,
}

/// Table of named callbacks.
#[derive(Default)]
pub struct CallbackTable {
    entries: Vec<CallbackEntry>,
    name_map: BTreeMap<String, CallbackId>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a callback under `name`.
    pub fn define(&mut self, name: &str, func: CallbackFn) -> Result<CallbackId, Error> {
        if self.name_map.contains_key(name) {
            return Err(Error::DuplicateCallback(String::from(name)));
        }

        let id = CallbackId(self.entries.len() as u32);
        self.entries.push(CallbackEntry {
            name: String::from(name),
            func,
            stats: CallbackStats::new(),
        });
        self.name_map.insert(String::from(name), id);

        log::debug!("probe: defined callback {} (id={})", name, id.0);
        Ok(id)
    }

    /// Resolve a callback name into a reference.
    pub fn resolve(&self, name: &str) -> Option<CallbackRef> {
        self.name_map.get(name).map(|id| CallbackRef {
            id: *id,
            name: String::from(name),
        })
    }

    /// Look up a callback name by id.
    pub fn name(&self, id: CallbackId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the callback for a probe hit and record the hit.
    pub fn dispatch(
        &self,
        id: CallbackId,
        frame: &mut dyn CallFrame,
        hit: &ProbeHit,
    ) -> Result<(), Error> {
        let entry = self
            .entries
            .get(id.0 as usize)
            .ok_or(Error::CallbackNotFound(id))?;

        entry.stats.record_hit(hit.timestamp_ns);
        output::print_hit_if_verbose(&entry.name, hit);

        (entry.func)(frame, hit);
        Ok(())
    }

    /// Hit counters for one callback.
    pub fn snapshot(&self, id: CallbackId) -> Option<CallbackSnapshot> {
        self.entries.get(id.0 as usize).map(Self::snapshot_entry)
    }

    /// Hit counters for every callback, in definition order.
    pub fn stats(&self) -> Vec<CallbackSnapshot> {
        self.entries.iter().map(Self::snapshot_entry).collect()
    }

    /// Reset all hit counters.
    pub fn reset_stats(&self) {
        for entry in &self.entries {
            entry.stats.hits.store(0, Ordering::Relaxed);
            entry.stats.last_timestamp.store(0, Ordering::Relaxed);
        }
    }

    fn snapshot_entry(entry: &CallbackEntry) -> CallbackSnapshot {
        CallbackSnapshot {
            name: entry.name.clone(),
            hits: entry.stats.hits.load(Ordering::Relaxed),
            last_timestamp: entry.stats.last_timestamp.load(Ordering::Relaxed),
        }
    }
}

impl core::fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackTable")
            .field("callbacks", &self.name_map)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::RawValue;
    use crate::probe::InstanceId;
    use axerrno::AxResult;

    struct NullFrame;

    impl CallFrame for NullFrame {
        fn evaluate(&mut self, _expression: &str) -> AxResult<RawValue> {
            axerrno::ax_err!(Unsupported, "null frame")
        }
    }

    fn noop(_frame: &mut dyn CallFrame, _hit: &ProbeHit) {}

    #[test]
    fn test_define_and_resolve() {
        let mut table = CallbackTable::new();
        let a = table.define("on_malloc", noop).unwrap();
        let b = table.define("on_free", noop).unwrap();

        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("on_free").map(|r| r.id), Some(b));
        assert_eq!(table.name(a), Some("on_malloc"));
        assert!(table.resolve("on_realloc").is_none());
    }

    #[test]
    fn test_define_duplicate() {
        let mut table = CallbackTable::new();
        table.define("on_malloc", noop).unwrap();
        let err = table.define("on_malloc", noop).unwrap_err();
        assert!(matches!(err, Error::DuplicateCallback(name) if name == "on_malloc"));
    }

    #[test]
    fn test_dispatch_counts_hits() {
        let mut table = CallbackTable::new();
        let id = table.define("on_malloc", noop).unwrap();
        let hit = ProbeHit::new(InstanceId(1), id, 0x1000);

        table.dispatch(id, &mut NullFrame, &hit).unwrap();
        table.dispatch(id, &mut NullFrame, &hit).unwrap();
        assert_eq!(table.snapshot(id).unwrap().hits, 2);

        table.reset_stats();
        assert_eq!(table.snapshot(id).unwrap().hits, 0);
    }

    #[test]
    fn test_dispatch_unknown_id() {
        let table = CallbackTable::new();
        let id = CallbackId(7);
        let hit = ProbeHit::new(InstanceId(1), id, 0x1000);
        let err = table.dispatch(id, &mut NullFrame, &hit).unwrap_err();
        assert!(matches!(err, Error::CallbackNotFound(c) if c == id));
    }
}
