//! Host engine interface.
//!
//! The registry never talks to a debugger directly. Everything it needs from
//! the host (pattern resolution, probe creation and destruction, target
//! liveness) goes through [`HostEngine`], which keeps the activation protocol
//! testable in user space with [`crate::mock::MockHost`].

use alloc::vec::Vec;
use core::hash::Hash;

use axerrno::AxResult;

use crate::callback::CallbackRef;
use crate::probe::{InstanceId, MatchMode};

/// Operations the registry consumes from the host debugging engine.
pub trait HostEngine {
    /// Handle to an attached target.
    ///
    /// Must have stable equality and hashing. Hosts whose handles only
    /// support identity comparison should use an integer id here.
    type Target: Clone + Eq + Hash + core::fmt::Debug;

    /// One resolved instrumentation point.
    type Location;

    /// Resolve `pattern` into zero or more locations in `target`.
    ///
    /// An empty result means the pattern is unsatisfiable for this target.
    fn resolve(&self, target: &Self::Target, pattern: &str, mode: MatchMode)
    -> Vec<Self::Location>;

    /// Create one probe covering `locations`, bound to `callback`.
    ///
    /// The probe must auto-resume: once the callback returns, execution
    /// continues without manual intervention.
    fn create_probe(
        &mut self,
        target: &Self::Target,
        locations: &[Self::Location],
        callback: &CallbackRef,
    ) -> AxResult<InstanceId>;

    /// Destroy a probe previously returned by `create_probe`.
    fn destroy_probe(&mut self, target: &Self::Target, instance: InstanceId);

    /// Whether the target is still attached.
    fn is_target_live(&self, target: &Self::Target) -> bool;
}
