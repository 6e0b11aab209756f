//! Fixed-size `f64` buffers.

use nativekit_ffi as sys;

use crate::error::{Result, to_i32};
use crate::ffi::OwnedHandle;

/// An owned native buffer. Destroyed on drop.
///
/// Out-of-range reads return 0.0 and out-of-range writes are ignored.
#[derive(Debug)]
pub struct Buffer {
    handle: OwnedHandle,
}

impl Buffer {
    /// Zero-filled buffer of `size` elements.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            handle: OwnedHandle::new(
                sys::nk_buffer_create(to_i32(size, "size")?),
                sys::nk_buffer_destroy,
            )?,
        })
    }

    /// Value at `index`, 0.0 if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        i32::try_from(index).map_or(0.0, |i| sys::nk_buffer_get(self.handle.raw(), i))
    }

    /// Store `value` at `index`; ignored if out of range.
    pub fn set(&mut self, index: usize, value: f64) {
        if let Ok(i) = i32::try_from(index) {
            sys::nk_buffer_set(self.handle.raw(), i, value);
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        sys::nk_buffer_size(self.handle.raw()).unsigned_abs() as usize
    }

    /// Whether the buffer has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
