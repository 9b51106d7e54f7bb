//! Lock-guarded registry for multi-threaded hosts.
//!
//! [`ProbeRegistry`] relies on `&mut self` to serialize mutations, which is
//! enough when the host drives it from a single dispatch thread. Hosts that
//! attach and detach targets from several threads share a [`SharedRegistry`]
//! instead, so `set`, `unset` and `update` never interleave.

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::callback::CallbackTable;
use crate::error::Error;
use crate::host::HostEngine;
use crate::probe::InstanceId;
use crate::registry::{ArmOutcome, ProbeRegistry};

pub struct SharedRegistry<H: HostEngine> {
    inner: Mutex<ProbeRegistry<H>>,
}

impl<H: HostEngine> SharedRegistry<H> {
    pub fn new(registry: ProbeRegistry<H>) -> Self {
        Self {
            inner: Mutex::new(registry),
        }
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut ProbeRegistry<H>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn register_by_name(&self, name: &str, callback: &str) -> Result<(), Error> {
        self.inner.lock().register_by_name(name, callback)
    }

    pub fn register_by_regex(&self, regex: &str, callback: &str) -> Result<(), Error> {
        self.inner.lock().register_by_regex(regex, callback)
    }

    pub fn set(&self, host: &mut H, target: &H::Target) -> Result<ArmOutcome, Error> {
        self.inner.lock().set(host, target)
    }

    pub fn unset(&self, host: &mut H, target: &H::Target) -> bool {
        self.inner.lock().unset(host, target)
    }

    pub fn update(&self, host: &H) -> usize {
        self.inner.lock().update(host)
    }

    pub fn teardown(&self, host: &mut H) -> usize {
        self.inner.lock().teardown(host)
    }

    pub fn is_armed(&self, target: &H::Target) -> bool {
        self.inner.lock().is_armed(target)
    }

    /// Copy of an armed target's instances.
    pub fn instances(&self, target: &H::Target) -> Option<Vec<InstanceId>> {
        self.inner.lock().instances(target).map(<[InstanceId]>::to_vec)
    }

    pub fn armed_count(&self) -> usize {
        self.inner.lock().armed_count()
    }

    pub fn callbacks(&self) -> Arc<CallbackTable> {
        self.inner.lock().callbacks().clone()
    }

    pub fn into_inner(self) -> ProbeRegistry<H> {
        self.inner.into_inner()
    }
}

impl<H: HostEngine> From<ProbeRegistry<H>> for SharedRegistry<H> {
    fn from(registry: ProbeRegistry<H>) -> Self {
        Self::new(registry)
    }
}
