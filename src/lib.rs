//! Breakpoint-driven probe registry
//!
//! Turns a debugger's breakpoint mechanism into a sampling and tracing
//! primitive: probes are registered once by symbol name or regular
//! expression, then armed on every target the host engine attaches to. Each
//! probe runs its callback and resumes execution automatically.
//!
//! # Features
//!
//! - `mock-host` - In-memory host engine and call frame (enabled for the test suite)
//!
//! # Quick Start
//!
//! ```ignore
//! use alloc::sync::Arc;
//! use probereg::{CallbackTable, ProbeRegistry};
//!
//! // Define callbacks and register probes once, before any target attaches
//! let mut callbacks = CallbackTable::new();
//! callbacks.define("on_malloc", on_malloc)?;
//! let mut registry = ProbeRegistry::new(Arc::new(callbacks));
//! registry.register_by_name("malloc", "on_malloc")?;
//!
//! // Arm each target as it attaches
//! let outcome = registry.set(&mut host, &target)?;
//! if let Some(pattern) = outcome.failed_pattern() {
//!     warn!("'{}' not found, target left unarmed", pattern);
//! }
//!
//! // Disarm on detach, and prune targets that went away on their own
//! registry.unset(&mut host, &target);
//! registry.update(&host);
//! ```

#![no_std]

extern crate alloc;

pub mod platform;

pub mod callback;
pub mod context;
pub mod error;
pub mod frame;
pub mod host;
pub mod output;
pub mod probe;
pub mod registry;
pub mod shared;

#[cfg(any(test, feature = "mock-host"))]
pub mod mock;

pub use callback::{CallbackFn, CallbackId, CallbackRef, CallbackSnapshot, CallbackTable};
pub use context::ProbeHit;
pub use error::{Error, SpecFault};
pub use frame::{ArgValue, CallFrame, RawValue, Signedness};
pub use host::HostEngine;
pub use output::{is_verbose, set_verbose};
pub use probe::{InstanceId, MatchMode, ProbeSpec};
pub use registry::{ArmOutcome, ProbeRegistry};
pub use shared::SharedRegistry;
