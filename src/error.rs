//! Error types for probe registration, activation and dispatch.

use alloc::string::String;
use axerrno::AxError;

use crate::callback::CallbackId;

/// Why a probe registration was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecFault {
    /// Pattern is empty or whitespace only.
    EmptyPattern,
    /// Pattern contains a NUL byte.
    InteriorNul,
    /// Callback name is not defined in the callback table.
    UnknownCallback(String),
}

impl core::fmt::Display for SpecFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "empty pattern"),
            Self::InteriorNul => write!(f, "pattern contains NUL"),
            Self::UnknownCallback(name) => write!(f, "unknown callback '{}'", name),
        }
    }
}

/// Error types for registry operations.
#[derive(Debug)]
pub enum Error {
    /// Registration input is structurally invalid.
    InvalidSpec { pattern: String, fault: SpecFault },
    /// Registration attempted after the first activation.
    Frozen,
    /// A pattern resolved to zero locations for a target.
    UnsatisfiedPattern(String),
    /// The host engine failed to create a probe; the attempt was rolled back.
    Host { pattern: String, source: AxError },
    /// A callback with this name is already defined.
    DuplicateCallback(String),
    /// No callback with this id exists.
    CallbackNotFound(CallbackId),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSpec { pattern, fault } => {
                write!(f, "Invalid probe spec '{}': {}", pattern, fault)
            }
            Self::Frozen => write!(f, "Probe specs are frozen after first activation"),
            Self::UnsatisfiedPattern(pattern) => {
                write!(f, "Pattern resolved to no locations: {}", pattern)
            }
            Self::Host { pattern, source } => {
                write!(f, "Host failed to create probe for '{}': {:?}", pattern, source)
            }
            Self::DuplicateCallback(name) => write!(f, "Callback already defined: {}", name),
            Self::CallbackNotFound(id) => write!(f, "Callback not found: {}", id.as_u32()),
        }
    }
}

impl core::error::Error for Error {}
