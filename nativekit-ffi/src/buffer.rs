//! Fixed-size `f64` buffers (`nk_buffer_*`).
//!
//! Unlike matrices, buffers silently ignore out-of-range indices: `get`
//! returns 0.0 and `set` does nothing, and neither touches the error channel.

use crate::error::Result;
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};

pub(crate) static BUFFERS: Registry<Buffer> = Registry::new(Kind::Buffer);

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    data: Box<[f64]>,
}

impl Buffer {
    /// A zero-filled buffer of `size` elements.
    pub fn zeroed(size: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)?;
        data.resize(size, 0.0);
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    fn slot(index: i32) -> Option<usize> {
        usize::try_from(index).ok()
    }

    #[must_use]
    pub fn get(&self, index: i32) -> f64 {
        Self::slot(index)
            .and_then(|i| self.data.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, index: i32, value: f64) {
        if let Some(cell) = Self::slot(index).and_then(|i| self.data.get_mut(i)) {
            *cell = value;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Create a zero-filled buffer of `size` elements. Returns the null handle for a
/// negative size or a failed allocation. Caller must free with [`nk_buffer_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_buffer_create(size: i32) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || {
        BUFFERS.insert(Buffer::zeroed(to_len(size, "buffer size")?)?)
    })
}

/// Destroy a buffer. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_buffer_destroy(handle: NkHandle) {
    catch_or((), || BUFFERS.remove(handle).map(drop));
}

/// Store `value` at `index`; out-of-range indices are ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_buffer_set(handle: NkHandle, index: i32, value: f64) {
    catch_or((), || {
        BUFFERS.with_mut(handle, |b| {
            b.set(index, value);
            Ok(())
        })
    });
}

/// Value at `index`, or 0.0 if out of range.
#[unsafe(no_mangle)]
pub extern "C" fn nk_buffer_get(handle: NkHandle, index: i32) -> f64 {
    catch_or(0.0, || BUFFERS.with(handle, |b| Ok(b.get(index))))
}

/// Number of elements, 0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_buffer_size(handle: NkHandle) -> i32 {
    catch_or(0, || BUFFERS.with(handle, |b| Ok(len_to_i32(b.len()))))
}
