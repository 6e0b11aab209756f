#![allow(unsafe_code)]
//! Internal FFI utilities: RAII handle wrapper + C string helpers.

use std::ffi::{CStr, CString, c_char};
use std::num::NonZeroU64;

use nativekit_ffi::NkHandle;

use crate::error::{self, Error, Result};

/// RAII wrapper for a live arena handle. Calls `free` on drop.
pub(crate) struct OwnedHandle {
    handle: NonZeroU64,
    free: extern "C" fn(NkHandle),
}

impl OwnedHandle {
    /// Wrap a freshly created handle. The null handle means creation failed;
    /// the reason is read from the error channel.
    pub(crate) fn new(handle: NkHandle, free: extern "C" fn(NkHandle)) -> Result<Self> {
        NonZeroU64::new(handle)
            .map(|handle| Self { handle, free })
            .ok_or_else(error::null)
    }

    /// Raw token for FFI calls.
    #[inline]
    pub(crate) const fn raw(&self) -> NkHandle {
        self.handle.get()
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        (self.free)(self.handle.get());
    }
}

impl std::fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("handle", &format_args!("{:#018x}", self.handle.get()))
            .finish()
    }
}

/// Take ownership of a library-allocated string, convert to `String`, then free
/// it via `nk_free_string`.
pub(crate) unsafe fn take_c_string(ptr: *mut c_char) -> Result<String> {
    if ptr.is_null() {
        return Err(error::null());
    }
    let s = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(String::from)
        .map_err(|_| Error::InvalidUtf8);
    unsafe { nativekit_ffi::nk_free_string(ptr) };
    s
}

/// Copy a borrowed C string view. Does NOT free anything.
pub(crate) unsafe fn read_borrowed(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Err(error::null());
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(String::from)
        .map_err(|_| Error::InvalidUtf8)
}

/// Convert `&str` to `CString` for FFI.
pub(crate) fn to_c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::InvalidArgument("string contains NUL".into()))
}
