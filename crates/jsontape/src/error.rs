use thiserror::Error;

use crate::tape::Type;

/// Errors produced while reading or building a tape.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeError {
    /// The element does not have the type the caller asked for.
    #[error("unable to convert {found} to {wanted}")]
    TypeMismatch {
        /// The type the caller requested.
        wanted: Type,
        /// The type actually found on the tape.
        found: Type,
    },
    /// A numeric conversion would overflow or underflow the target type.
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
    /// The tape does not satisfy the encoding's structural invariants.
    #[error("corrupt tape: {0}")]
    Corrupt(&'static str),
    /// Non-finite floats have no JSON representation.
    #[error("non-finite float cannot be rendered as JSON")]
    NonFinite,
}
