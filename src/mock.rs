//! In-memory host engine and call frame.
//!
//! `MockHost` stands in for a debugger: targets are integer ids, symbols are
//! plain name → address tables and regex patterns resolve through an explicit
//! match table, since evaluating regular expressions is the host's business.
//! Every create/destroy is recorded so tests can check for leaked probes.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use axerrno::AxResult;

use crate::callback::{CallbackRef, CallbackTable};
use crate::context::ProbeHit;
use crate::error::Error;
use crate::frame::{CallFrame, RawValue};
use crate::host::HostEngine;
use crate::probe::{InstanceId, MatchMode};

/// Target handle used by [`MockHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MockTarget(pub u32);

/// A probe created by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProbe {
    pub target: MockTarget,
    pub addresses: Vec<u64>,
    pub callback: CallbackRef,
    pub auto_continue: bool,
}

/// In-memory [`HostEngine`].
#[derive(Debug, Default)]
pub struct MockHost {
    /// Per-target symbol tables
    symbols: BTreeMap<MockTarget, BTreeMap<String, u64>>,
    /// Per-target regex resolutions
    regex_matches: BTreeMap<(MockTarget, String), Vec<u64>>,
    /// Attached targets
    live: BTreeSet<MockTarget>,
    /// Probes currently alive
    probes: BTreeMap<InstanceId, MockProbe>,
    /// Callback names whose probe creation fails
    fail_on_create: BTreeSet<String>,
    next_id: u32,
    created: usize,
    destroyed: Vec<InstanceId>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Mark a target live.
    pub fn attach(&mut self, target: MockTarget) {
        self.live.insert(target);
    }

    /// Mark a target dead and drop its probes, as a real detach would.
    pub fn detach(&mut self, target: MockTarget) {
        self.live.remove(&target);
        self.probes.retain(|_, probe| probe.target != target);
    }

    pub fn add_symbol(&mut self, target: MockTarget, name: &str, addr: u64) {
        self.symbols
            .entry(target)
            .or_default()
            .insert(String::from(name), addr);
    }

    /// Make `regex` resolve to `addrs` in `target`.
    pub fn add_regex_match(&mut self, target: MockTarget, regex: &str, addrs: &[u64]) {
        self.regex_matches
            .insert((target, String::from(regex)), addrs.to_vec());
    }

    /// Make probe creation fail for probes bound to `callback`.
    pub fn fail_create_for(&mut self, callback: &str) {
        self.fail_on_create.insert(String::from(callback));
    }

    pub fn probe(&self, id: InstanceId) -> Option<&MockProbe> {
        self.probes.get(&id)
    }

    pub fn live_probe_count(&self, target: &MockTarget) -> usize {
        self.probes.values().filter(|p| p.target == *target).count()
    }

    /// Total probes ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total destroy calls issued.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }

    /// Instance ids passed to `destroy_probe`, in call order.
    pub fn destroyed(&self) -> &[InstanceId] {
        &self.destroyed
    }

    /// Simulate execution reaching the first location of probe `id`.
    pub fn fire(
        &self,
        callbacks: &CallbackTable,
        id: InstanceId,
        frame: &mut dyn CallFrame,
    ) -> AxResult<()> {
        let probe = self
            .probes
            .get(&id)
            .ok_or_else(|| axerrno::ax_err_type!(NotFound, "mock probe missing"))?;
        let address = probe.addresses.first().copied().unwrap_or(0);
        let hit = ProbeHit::new(id, probe.callback.id, address);

        callbacks.dispatch(probe.callback.id, frame, &hit).map_err(|e| match e {
            Error::CallbackNotFound(_) => axerrno::ax_err_type!(NotFound, "callback missing"),
            _ => axerrno::ax_err_type!(BadState, "dispatch failed"),
        })
    }
}

impl HostEngine for MockHost {
    type Target = MockTarget;
    type Location = u64;

    fn resolve(&self, target: &MockTarget, pattern: &str, mode: MatchMode) -> Vec<u64> {
        match mode {
            MatchMode::ByName => self
                .symbols
                .get(target)
                .and_then(|table| table.get(pattern))
                .map(|addr| alloc::vec![*addr])
                .unwrap_or_default(),
            MatchMode::ByRegex => self
                .regex_matches
                .get(&(*target, String::from(pattern)))
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn create_probe(
        &mut self,
        target: &MockTarget,
        locations: &[u64],
        callback: &CallbackRef,
    ) -> AxResult<InstanceId> {
        if self.fail_on_create.contains(&callback.name) {
            return axerrno::ax_err!(ResourceBusy, "mock create failure");
        }

        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.probes.insert(
            id,
            MockProbe {
                target: *target,
                addresses: locations.to_vec(),
                callback: callback.clone(),
                auto_continue: true,
            },
        );
        Ok(id)
    }

    fn destroy_probe(&mut self, _target: &MockTarget, instance: InstanceId) {
        self.probes.remove(&instance);
        self.destroyed.push(instance);
    }

    fn is_target_live(&self, target: &MockTarget) -> bool {
        self.live.contains(target)
    }
}

/// In-memory [`CallFrame`]: fixed arguments plus named expressions.
#[derive(Debug, Clone, Default)]
pub struct MockFrame {
    args: Vec<RawValue>,
    expressions: BTreeMap<String, RawValue>,
}

impl MockFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call argument (`$arg1`, `$arg2`, ... in order).
    pub fn with_arg(mut self, value: RawValue) -> Self {
        self.args.push(value);
        self
    }

    pub fn with_expression(mut self, expression: &str, value: RawValue) -> Self {
        self.expressions.insert(String::from(expression), value);
        self
    }
}

impl CallFrame for MockFrame {
    fn evaluate(&mut self, expression: &str) -> AxResult<RawValue> {
        if let Some(value) = self.expressions.get(expression) {
            return Ok(*value);
        }

        let arg = expression
            .strip_prefix("$arg")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .and_then(|n| self.args.get(n - 1));
        match arg {
            Some(value) => Ok(*value),
            None => axerrno::ax_err!(NotFound, "mock expression not found"),
        }
    }
}
