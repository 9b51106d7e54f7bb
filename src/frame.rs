//! Value extraction helpers for use inside probe callbacks.
//!
//! The host engine implements [`CallFrame`] for whatever it passes to a
//! callback while the target is stopped at a probe. The helpers here only
//! reinterpret the raw values the host returns; they keep no state.

use alloc::format;
use alloc::vec::Vec;
use axerrno::AxResult;

/// Raw value returned by the host for an expression.
///
/// `size` is the width of the value in bytes (1..=8). Bits above the width
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue {
    bits: u64,
    size: u8,
}

impl RawValue {
    /// Create a value of `size` bytes. Sizes outside 1..=8 are clamped.
    pub fn new(bits: u64, size: u8) -> Self {
        Self {
            bits,
            size: size.clamp(1, 8),
        }
    }

    /// A full 64-bit value.
    pub fn from_u64(bits: u64) -> Self {
        Self::new(bits, 8)
    }

    /// A full 64-bit value from a signed integer.
    pub fn from_i64(value: i64) -> Self {
        Self::new(value as u64, 8)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Zero-extended value.
    pub fn as_unsigned(&self) -> u64 {
        let width = u32::from(self.size) * 8;
        if width >= 64 {
            self.bits
        } else {
            self.bits & ((1u64 << width) - 1)
        }
    }

    /// Sign-extended value.
    pub fn as_signed(&self) -> i64 {
        let shift = 64 - u32::from(self.size) * 8;
        ((self.as_unsigned() << shift) as i64) >> shift
    }
}

/// Frame of a target stopped at a probe.
pub trait CallFrame {
    /// Evaluate an expression in the context of this frame.
    fn evaluate(&mut self, expression: &str) -> AxResult<RawValue>;

    /// Read the call argument at `index` (0-based).
    ///
    /// The default goes through the host's `$argN` convenience variable,
    /// which is 1-based.
    fn argument(&mut self, index: usize) -> AxResult<RawValue> {
        self.evaluate(&format!("$arg{}", index + 1))
    }
}

/// How to interpret an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Argument value as requested by a [`Signedness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    Signed(i64),
    Unsigned(u64),
}

impl ArgValue {
    fn from_raw(raw: RawValue, sign: Signedness) -> Self {
        match sign {
            Signedness::Signed => ArgValue::Signed(raw.as_signed()),
            Signedness::Unsigned => ArgValue::Unsigned(raw.as_unsigned()),
        }
    }
}

pub fn evaluate_unsigned(frame: &mut dyn CallFrame, expression: &str) -> AxResult<u64> {
    Ok(frame.evaluate(expression)?.as_unsigned())
}

pub fn evaluate_signed(frame: &mut dyn CallFrame, expression: &str) -> AxResult<i64> {
    Ok(frame.evaluate(expression)?.as_signed())
}

pub fn argument_unsigned(frame: &mut dyn CallFrame, index: usize) -> AxResult<u64> {
    Ok(frame.argument(index)?.as_unsigned())
}

pub fn argument_signed(frame: &mut dyn CallFrame, index: usize) -> AxResult<i64> {
    Ok(frame.argument(index)?.as_signed())
}

/// Read the leading call arguments, one per entry of `layout`.
///
/// `layout[i]` selects how argument `i` is interpreted.
pub fn function_parameters(
    frame: &mut dyn CallFrame,
    layout: &[Signedness],
) -> AxResult<Vec<ArgValue>> {
    layout
        .iter()
        .enumerate()
        .map(|(index, sign)| -> AxResult<ArgValue> {
            Ok(ArgValue::from_raw(frame.argument(index)?, *sign))
        })
        .collect()
}
