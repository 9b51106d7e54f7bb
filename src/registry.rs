//! Probe registry and activation protocol.
//!
//! Holds the ordered list of probe specs and, per attached target, the probe
//! instances created for it. Arming a target is all-or-nothing: either every
//! spec resolves and gets a probe, or every probe created during the attempt
//! is destroyed again and the target stays unarmed.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::callback::CallbackTable;
use crate::error::{Error, SpecFault};
use crate::host::HostEngine;
use crate::probe::{InstanceId, MatchMode, ProbeSpec};

/// Result of [`ProbeRegistry::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmOutcome {
    /// Target was already armed; nothing changed.
    AlreadyArmed,
    /// Every spec resolved; the target is now armed.
    Armed { instances: usize },
    /// `pattern` resolved to no locations; the attempt was rolled back.
    Unsatisfied { pattern: String },
}

impl ArmOutcome {
    /// Whether the call did any work (including a rolled-back attempt).
    pub fn changed(&self) -> bool {
        !matches!(self, ArmOutcome::AlreadyArmed)
    }

    /// First pattern in registration order that failed to resolve.
    pub fn failed_pattern(&self) -> Option<&str> {
        match self {
            ArmOutcome::Unsatisfied { pattern } => Some(pattern),
            _ => None,
        }
    }

    /// Whether the target is armed after the call.
    ///
    /// True for [`ArmOutcome::AlreadyArmed`] as well as a fresh arm.
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmOutcome::Unsatisfied { .. })
    }

    /// Turn an unsatisfied pattern into [`Error::UnsatisfiedPattern`].
    ///
    /// Returns whether anything changed otherwise.
    pub fn into_result(self) -> Result<bool, Error> {
        match self {
            ArmOutcome::AlreadyArmed => Ok(false),
            ArmOutcome::Armed { .. } => Ok(true),
            ArmOutcome::Unsatisfied { pattern } => Err(Error::UnsatisfiedPattern(pattern)),
        }
    }
}

/// Probe registry for one instrumentation session.
pub struct ProbeRegistry<H: HostEngine> {
    /// Callbacks that specs may refer to
    callbacks: Arc<CallbackTable>,
    /// Registered specs, in registration order
    specs: Vec<ProbeSpec>,
    /// Armed targets and their instances, in spec order
    active: HashMap<H::Target, Vec<InstanceId>>,
    /// Set on the first activation attempt
    frozen: bool,
}

impl<H: HostEngine> ProbeRegistry<H> {
    /// Create a registry whose specs resolve callbacks from `callbacks`.
    pub fn new(callbacks: Arc<CallbackTable>) -> Self {
        Self {
            callbacks,
            specs: Vec::new(),
            active: HashMap::new(),
            frozen: false,
        }
    }

    /// Register a probe on the symbol `name`.
    pub fn register_by_name(&mut self, name: &str, callback: &str) -> Result<(), Error> {
        self.register(name, MatchMode::ByName, callback)
    }

    /// Register a probe on every symbol matching `regex`.
    pub fn register_by_regex(&mut self, regex: &str, callback: &str) -> Result<(), Error> {
        self.register(regex, MatchMode::ByRegex, callback)
    }

    fn register(&mut self, pattern: &str, mode: MatchMode, callback: &str) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        let invalid = |fault| Error::InvalidSpec {
            pattern: String::from(pattern),
            fault,
        };
        let callback_ref = self
            .callbacks
            .resolve(callback)
            .ok_or_else(|| invalid(SpecFault::UnknownCallback(String::from(callback))))?;
        let spec = ProbeSpec::new(pattern, mode, callback_ref).map_err(invalid)?;

        log::info!(
            "probe: registered {} '{}' -> {}",
            mode.label(),
            pattern,
            callback
        );
        self.specs.push(spec);
        Ok(())
    }

    /// Arm every registered spec on `target`.
    ///
    /// Idempotent per target. On the first spec that resolves to no
    /// locations, every probe created by this call is destroyed and the
    /// offending pattern is reported. A host failure while creating a probe
    /// rolls back the same way and is returned as [`Error::Host`].
    pub fn set(&mut self, host: &mut H, target: &H::Target) -> Result<ArmOutcome, Error> {
        if self.active.contains_key(target) {
            return Ok(ArmOutcome::AlreadyArmed);
        }
        self.frozen = true;

        let mut created = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let locations = host.resolve(target, spec.pattern(), spec.mode());
            if locations.is_empty() {
                log::warn!(
                    "probe: {} '{}' unsatisfiable for {:?}, rolling back {} probe(s)",
                    spec.mode().label(),
                    spec.pattern(),
                    target,
                    created.len()
                );
                Self::rollback(host, target, &created);
                return Ok(ArmOutcome::Unsatisfied {
                    pattern: String::from(spec.pattern()),
                });
            }

            match host.create_probe(target, &locations, spec.callback()) {
                Ok(id) => {
                    log::debug!(
                        "probe: created instance {} for '{}' ({} location(s))",
                        id.as_u32(),
                        spec.pattern(),
                        locations.len()
                    );
                    created.push(id);
                }
                Err(source) => {
                    log::warn!(
                        "probe: host failed to create probe for '{}' on {:?}: {:?}",
                        spec.pattern(),
                        target,
                        source
                    );
                    Self::rollback(host, target, &created);
                    return Err(Error::Host {
                        pattern: String::from(spec.pattern()),
                        source,
                    });
                }
            }
        }

        let instances = created.len();
        self.active.insert(target.clone(), created);
        log::info!("probe: armed {:?} with {} probe(s)", target, instances);
        Ok(ArmOutcome::Armed { instances })
    }

    fn rollback(host: &mut H, target: &H::Target, created: &[InstanceId]) {
        for id in created {
            host.destroy_probe(target, *id);
        }
    }

    /// Destroy every probe of `target` and forget it.
    ///
    /// Returns `false` without side effects if the target is not armed.
    pub fn unset(&mut self, host: &mut H, target: &H::Target) -> bool {
        let Some(instances) = self.active.get(target) else {
            return false;
        };

        for id in instances {
            host.destroy_probe(target, *id);
        }
        let count = instances.len();
        self.active.remove(target);

        log::info!("probe: disarmed {:?} ({} probe(s) destroyed)", target, count);
        true
    }

    /// Drop bookkeeping for targets the host no longer considers live.
    ///
    /// Does not destroy probes: a dead target released them when it went
    /// away. Returns the number of targets pruned.
    pub fn update(&mut self, host: &H) -> usize {
        let before = self.active.len();
        self.active.retain(|target, _| {
            let live = host.is_target_live(target);
            if !live {
                log::debug!("probe: pruned stale target {:?}", target);
            }
            live
        });
        before - self.active.len()
    }

    /// Unset every armed target. Returns the number of targets disarmed.
    pub fn teardown(&mut self, host: &mut H) -> usize {
        let targets: Vec<H::Target> = self.active.keys().cloned().collect();
        targets
            .iter()
            .filter(|target| self.unset(host, target))
            .count()
    }

    pub fn specs(&self) -> &[ProbeSpec] {
        &self.specs
    }

    pub fn callbacks(&self) -> &Arc<CallbackTable> {
        &self.callbacks
    }

    pub fn is_armed(&self, target: &H::Target) -> bool {
        self.active.contains_key(target)
    }

    /// Instances of an armed target, in spec order.
    pub fn instances(&self, target: &H::Target) -> Option<&[InstanceId]> {
        self.active.get(target).map(Vec::as_slice)
    }

    pub fn armed_count(&self) -> usize {
        self.active.len()
    }

    /// Armed targets, in no particular order.
    pub fn armed_targets(&self) -> impl Iterator<Item = &H::Target> {
        self.active.keys()
    }

    /// Whether registration is closed.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl<H: HostEngine> core::fmt::Debug for ProbeRegistry<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("specs", &self.specs)
            .field("armed", &self.active.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}
