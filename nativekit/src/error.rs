#![allow(unsafe_code)]
//! Unified error type for the nativekit SDK.

use std::ffi::CStr;

use nativekit_ffi::{NkBasicResult, NkResultCode};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the nativekit SDK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A failure reported by the native library, with the message it recorded.
    #[error("nativekit ({code:?}): {message}")]
    Native {
        /// Result code returned by the failing call.
        code: NkResultCode,
        /// Message read from the error channel.
        message: String,
    },

    /// A call that returns a handle or string produced null instead.
    #[error("unexpected null from native call: {0}")]
    Null(String),

    /// A plain helper returned a non-success code.
    #[error("nativekit helper failed: {0:?}")]
    Basic(NkBasicResult),

    /// A string received from the library contained invalid UTF-8.
    #[error("invalid UTF-8 in native string")]
    InvalidUtf8,

    /// An argument passed to the SDK was invalid.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    /// Result code of a native failure, if this is one.
    #[must_use]
    pub const fn code(&self) -> Option<NkResultCode> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Read the calling thread's last error message from the library.
pub(crate) fn last_native_message() -> String {
    let len = nativekit_ffi::nk_last_error_length();
    if len <= 0 {
        return "unknown native error".into();
    }
    let mut buf = vec![0u8; len.unsigned_abs() as usize];
    let written = unsafe { nativekit_ffi::nk_last_error_copy(buf.as_mut_ptr().cast(), len) };
    if written < 0 {
        return "failed to read native error".into();
    }
    CStr::from_bytes_until_nul(&buf).map_or_else(
        |_| String::from_utf8_lossy(&buf[..written.unsigned_abs() as usize]).into_owned(),
        |cstr| cstr.to_string_lossy().into_owned(),
    )
}

/// Build an [`Error::Native`] for `code` from the error channel.
pub(crate) fn native(code: NkResultCode) -> Error {
    Error::Native {
        code,
        message: last_native_message(),
    }
}

/// Build an [`Error::Null`] from the error channel.
pub(crate) fn null() -> Error {
    Error::Null(last_native_message())
}

/// Check a result code from an `nk_safe_*` call.
#[inline]
pub(crate) fn check(rc: NkResultCode) -> Result<()> {
    if rc.is_success() {
        Ok(())
    } else {
        Err(native(rc))
    }
}

/// Check a result code from a plain helper.
#[inline]
pub(crate) fn check_basic(rc: NkBasicResult) -> Result<()> {
    match rc {
        NkBasicResult::Success => Ok(()),
        other => Err(Error::Basic(other)),
    }
}

/// Convert a Rust length or index to the `i32` the ABI takes.
pub(crate) fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidArgument(format!("{what} {value} exceeds i32")))
}
