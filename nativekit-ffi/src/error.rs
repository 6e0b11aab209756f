//! Internal error type and the result codes it is translated into at the boundary.

use crate::handle::{Kind, NkHandle};

/// Convenience alias used by every fallible operation inside the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Result codes returned by the `nk_safe_*` entry points. `0` is success,
/// every failure is negative.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NkResultCode {
    Success = 0,
    NullPointer = -1,
    OutOfBounds = -2,
    InvalidOperation = -3,
    MemoryError = -4,
    UnknownError = -5,
}

impl NkResultCode {
    /// Convert from a raw `i32`. Returns `None` for unknown values.
    #[must_use]
    pub fn from_raw(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Success),
            -1 => Some(Self::NullPointer),
            -2 => Some(Self::OutOfBounds),
            -3 => Some(Self::InvalidOperation),
            -4 => Some(Self::MemoryError),
            -5 => Some(Self::UnknownError),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Everything that can go wrong behind the boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The null handle was passed to an operation. Tolerated misuse: it maps to
    /// a sentinel or `NULL_POINTER` and is never written to the error channel.
    #[error("null handle")]
    NullHandle,

    /// A required pointer argument was null.
    #[error("null {0} pointer")]
    NullArgument(&'static str),

    /// The handle names a slot that has since been released or reused, or a
    /// resource of a different kind.
    #[error("stale or foreign {kind} handle {handle:#018x}")]
    StaleHandle { kind: Kind, handle: NkHandle },

    #[error("{0}")]
    OutOfBounds(String),

    #[error("{0}")]
    InvalidOperation(String),

    /// An allocation could not be satisfied.
    #[error("allocation failed: {0}")]
    Memory(String),

    /// A panic caught at the boundary, or anything not covered above.
    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// The result code this error is reported as.
    #[must_use]
    pub fn code(&self) -> NkResultCode {
        match self {
            Self::NullHandle | Self::NullArgument(_) | Self::StaleHandle { .. } => {
                NkResultCode::NullPointer
            }
            Self::OutOfBounds(_) => NkResultCode::OutOfBounds,
            Self::InvalidOperation(_) => NkResultCode::InvalidOperation,
            Self::Memory(_) => NkResultCode::MemoryError,
            Self::Unknown(_) => NkResultCode::UnknownError,
        }
    }

    /// Whether the error is recorded in the last-error channel.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Self::NullHandle)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        Self::Memory(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(Error::NullHandle.code(), NkResultCode::NullPointer);
        assert_eq!(Error::NullArgument("output").code(), NkResultCode::NullPointer);
        assert_eq!(
            Error::OutOfBounds("x".into()).code(),
            NkResultCode::OutOfBounds
        );
        assert_eq!(
            Error::InvalidOperation("x".into()).code(),
            NkResultCode::InvalidOperation
        );
        assert_eq!(Error::Memory("x".into()).code(), NkResultCode::MemoryError);
        assert_eq!(Error::Unknown("x".into()).code(), NkResultCode::UnknownError);
        assert_eq!(NkResultCode::InvalidOperation as i32, -3);
    }

    #[test]
    fn null_handle_is_not_recorded() {
        assert!(!Error::NullHandle.is_recorded());
        assert!(Error::NullArgument("output").is_recorded());
    }

    #[test]
    fn raw_codes_round_trip() {
        for code in [0, -1, -2, -3, -4, -5] {
            assert_eq!(NkResultCode::from_raw(code).map(|c| c as i32), Some(code));
        }
        assert_eq!(NkResultCode::from_raw(-6), None);
    }
}
