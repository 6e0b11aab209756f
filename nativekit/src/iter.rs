//! Snapshot iterators.

use nativekit_ffi as sys;

use crate::error::{Result, to_i32};
use crate::ffi::OwnedHandle;

/// A native cursor over a private copy of some integers. Destroyed on drop.
#[derive(Debug)]
pub struct Iter {
    handle: OwnedHandle,
}

impl Iter {
    pub(crate) fn from_handle(raw: sys::NkHandle) -> Result<Self> {
        Ok(Self {
            handle: OwnedHandle::new(raw, sys::nk_iterator_destroy)?,
        })
    }

    /// Iterate over a copy of `values`.
    pub fn new(values: &[i32]) -> Result<Self> {
        let len = to_i32(values.len(), "length")?;
        Self::from_handle(unsafe { sys::nk_iterator_create(values.as_ptr(), len) })
    }

    /// Rewind to the first element.
    pub fn reset(&mut self) {
        sys::nk_iterator_reset(self.handle.raw());
    }

    /// Skip past the first element equal to `value`, so the next call to
    /// [`Iterator::next`] yields the element after it. The position is
    /// unchanged if `value` is absent.
    pub fn seek(&mut self, value: i32) -> bool {
        sys::nk_iterator_find(self.handle.raw(), value) == 1
    }
}

impl Iterator for Iter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let raw = self.handle.raw();
        (sys::nk_iterator_has_next(raw) == 1).then(|| sys::nk_iterator_next(raw))
    }
}
