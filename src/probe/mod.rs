//! Probe specifications and instance identifiers.
//!
//! A [`ProbeSpec`] says *what* to instrument (a symbol name or a regular
//! expression) and *which* callback runs when it is hit. The host engine turns
//! a spec into a concrete probe per target and hands back an [`InstanceId`].

use alloc::string::String;

use crate::callback::CallbackRef;
use crate::error::SpecFault;

/// How the host engine interprets a probe pattern.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Pattern is a literal symbol name.
    ByName = 0,
    /// Pattern is a regular expression over symbol names.
    ByRegex = 1,
}

impl MatchMode {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            MatchMode::ByName => "name",
            MatchMode::ByRegex => "regex",
        }
    }
}

/// Host-assigned identifier of one active probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);

impl InstanceId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// One registered probe: pattern, matching mode and callback.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    pattern: String,
    mode: MatchMode,
    callback: CallbackRef,
}

impl ProbeSpec {
    /// Build a spec after structural validation of the pattern.
    pub(crate) fn new(
        pattern: &str,
        mode: MatchMode,
        callback: CallbackRef,
    ) -> Result<Self, SpecFault> {
        validate_pattern(pattern)?;
        Ok(Self {
            pattern: String::from(pattern),
            mode,
            callback,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn callback(&self) -> &CallbackRef {
        &self.callback
    }
}

/// Structural checks only; whether the pattern resolves is decided per target.
pub(crate) fn validate_pattern(pattern: &str) -> Result<(), SpecFault> {
    if pattern.trim().is_empty() {
        return Err(SpecFault::EmptyPattern);
    }
    if pattern.contains('\0') {
        return Err(SpecFault::InteriorNul);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pattern() {
        assert_eq!(validate_pattern("malloc"), Ok(()));
        assert_eq!(validate_pattern("^mem.*$"), Ok(()));
        assert_eq!(validate_pattern(""), Err(SpecFault::EmptyPattern));
        assert_eq!(validate_pattern("  \t"), Err(SpecFault::EmptyPattern));
        assert_eq!(validate_pattern("mal\0loc"), Err(SpecFault::InteriorNul));
    }

    #[test]
    fn test_match_mode_label() {
        assert_eq!(MatchMode::ByName.label(), "name");
        assert_eq!(MatchMode::ByRegex.label(), "regex");
    }
}
