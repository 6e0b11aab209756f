//! Mutable text buffers (`nk_string_*`).

use std::ffi::c_char;

use crate::error::Result;
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};

pub(crate) static TEXTS: Registry<Text> = Registry::new(Kind::Text);

/// An owned byte string kept NUL-terminated so its contents can be lent out
/// as a C string without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    // Always ends with exactly one 0 byte; no interior NULs.
    bytes: Vec<u8>,
}

impl Default for Text {
    fn default() -> Self {
        Self { bytes: vec![0] }
    }
}

impl Text {
    /// Create from raw bytes, stopping at the first NUL if there is one.
    pub fn from_bytes(initial: &[u8]) -> Result<Self> {
        let initial = initial.split(|&b| b == 0).next().unwrap_or_default();
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(initial.len() + 1)?;
        bytes.extend_from_slice(initial);
        bytes.push(0);
        Ok(Self { bytes })
    }

    /// Contents without the terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    fn as_mut_bytes(&mut self) -> &mut [u8] {
        let end = self.bytes.len() - 1;
        &mut self.bytes[..end]
    }

    /// Contents as a NUL-terminated C string.
    #[must_use]
    pub fn as_c_ptr(&self) -> *const c_char {
        self.bytes.as_ptr().cast()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append(&mut self, text: &[u8]) -> Result<()> {
        let text = Self::from_bytes(text)?;
        self.bytes.try_reserve(text.len())?;
        self.bytes.pop();
        self.bytes.extend_from_slice(&text.bytes);
        Ok(())
    }

    pub fn prepend(&mut self, text: &[u8]) -> Result<()> {
        let mut joined = Self::from_bytes(text)?;
        joined.bytes.try_reserve(self.len())?;
        joined.bytes.pop();
        joined.bytes.extend_from_slice(&self.bytes);
        *self = joined;
        Ok(())
    }

    pub fn reverse(&mut self) {
        self.as_mut_bytes().reverse();
    }

    pub fn to_upper(&mut self) {
        self.as_mut_bytes().make_ascii_uppercase();
    }

    pub fn to_lower(&mut self) {
        self.as_mut_bytes().make_ascii_lowercase();
    }
}

/// Create a string from `initial_value` (null means empty).
/// Caller must free with [`nk_string_destroy`].
///
/// # Safety
///
/// If non-null, `initial_value` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_string_create(initial_value: *const c_char) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || {
        let initial = unsafe { c_str_bytes(initial_value) }.unwrap_or_default();
        TEXTS.insert(Text::from_bytes(initial)?)
    })
}

/// Destroy a string. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_destroy(handle: NkHandle) {
    catch_or((), || TEXTS.remove(handle).map(drop));
}

/// Borrow the current contents. The view is valid until the next mutation or
/// destruction of this string. Returns "" for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_get_cstr(handle: NkHandle) -> *const c_char {
    catch_or(c"".as_ptr(), || TEXTS.with(handle, |t| Ok(t.as_c_ptr())))
}

/// Append `text`. A null `text` is ignored.
///
/// # Safety
///
/// If non-null, `text` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_string_append(handle: NkHandle, text: *const c_char) {
    let Some(text) = (unsafe { c_str_bytes(text) }) else {
        return;
    };
    catch_or((), || TEXTS.with_mut(handle, |t| t.append(text)));
}

/// Prepend `text`. A null `text` is ignored.
///
/// # Safety
///
/// If non-null, `text` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_string_prepend(handle: NkHandle, text: *const c_char) {
    let Some(text) = (unsafe { c_str_bytes(text) }) else {
        return;
    };
    catch_or((), || TEXTS.with_mut(handle, |t| t.prepend(text)));
}

/// Length in bytes, 0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_length(handle: NkHandle) -> i32 {
    catch_or(0, || TEXTS.with(handle, |t| Ok(len_to_i32(t.len()))))
}

/// Reverse the bytes in place.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_reverse(handle: NkHandle) {
    catch_or((), || {
        TEXTS.with_mut(handle, |t| {
            t.reverse();
            Ok(())
        })
    });
}

/// ASCII upper-case in place.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_to_upper(handle: NkHandle) {
    catch_or((), || {
        TEXTS.with_mut(handle, |t| {
            t.to_upper();
            Ok(())
        })
    });
}

/// ASCII lower-case in place.
#[unsafe(no_mangle)]
pub extern "C" fn nk_string_to_lower(handle: NkHandle) {
    catch_or((), || {
        TEXTS.with_mut(handle, |t| {
            t.to_lower();
            Ok(())
        })
    });
}
