//! Error types for operand construction.

use core::fmt;

use crate::register::Register;

/// Operand construction failure.
///
/// Both variants are caller contract violations: no valid instruction can
/// be built from the rejected arguments, so there is nothing to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandError {
    /// Scale factor outside `{0, 1, 2, 4, 8}`.
    InvalidScale {
        /// The rejected scale factor.
        scale: u8,
    },

    /// Scale factor 0 was paired with an index other than the stack pointer.
    ///
    /// Scale 0 is reserved to mean "SIB byte with no index register", which
    /// the hardware spells as index = 100b.
    ScaleZeroRequiresStackPointer {
        /// The index register that was passed.
        index: Register,
    },
}

impl fmt::Display for OperandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandError::InvalidScale { scale } => {
                write!(f, "invalid scale factor {} (expected 1, 2, 4 or 8)", scale)
            }
            OperandError::ScaleZeroRequiresStackPointer { index } => {
                write!(
                    f,
                    "scale 0 can only be applied to the stack pointer, got index '{}'",
                    index
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OperandError {}

/// Returned by [`Register::from_str`](core::str::FromStr::from_str) for a
/// name that is not in the register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRegisterError;

impl fmt::Display for ParseRegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown register name")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseRegisterError {}
