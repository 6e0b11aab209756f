//! Mutable byte strings.

use std::fmt;

use nativekit_ffi as sys;

use crate::error::Result;
use crate::ffi::{OwnedHandle, read_borrowed, to_c_string};

/// An owned native string. Destroyed on drop.
#[derive(Debug)]
pub struct NativeString {
    handle: OwnedHandle,
}

impl NativeString {
    /// Create a string holding a copy of `value`.
    pub fn new(value: &str) -> Result<Self> {
        let c = to_c_string(value)?;
        Ok(Self {
            handle: OwnedHandle::new(
                unsafe { sys::nk_string_create(c.as_ptr()) },
                sys::nk_string_destroy,
            )?,
        })
    }

    /// Append `text` at the end.
    pub fn append(&mut self, text: &str) -> Result<()> {
        let c = to_c_string(text)?;
        unsafe { sys::nk_string_append(self.handle.raw(), c.as_ptr()) };
        Ok(())
    }

    /// Insert `text` at the front.
    pub fn prepend(&mut self, text: &str) -> Result<()> {
        let c = to_c_string(text)?;
        unsafe { sys::nk_string_prepend(self.handle.raw(), c.as_ptr()) };
        Ok(())
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        sys::nk_string_length(self.handle.raw()).unsigned_abs() as usize
    }

    /// Whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reverse the bytes in place.
    pub fn reverse(&mut self) {
        sys::nk_string_reverse(self.handle.raw());
    }

    /// ASCII upper-case in place.
    pub fn make_upper(&mut self) {
        sys::nk_string_to_upper(self.handle.raw());
    }

    /// ASCII lower-case in place.
    pub fn make_lower(&mut self) {
        sys::nk_string_to_lower(self.handle.raw());
    }

    /// Copy the current contents. Fails if a byte reversal left invalid UTF-8.
    pub fn to_string_checked(&self) -> Result<String> {
        unsafe { read_borrowed(sys::nk_string_get_cstr(self.handle.raw())) }
    }
}

impl fmt::Display for NativeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.to_string_checked().map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}
