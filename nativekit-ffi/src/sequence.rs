//! Growable integer sequences (`nk_vector_*`).

use crate::error::{Error, NkResultCode, Result};
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};

pub(crate) static SEQUENCES: Registry<Sequence> = Registry::new(Kind::Sequence);

/// An append-only list of `i32` with positional reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    items: Vec<i32>,
}

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: i32) -> Result<()> {
        self.items.try_reserve(1)?;
        self.items.push(value);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<i32> {
        self.items.get(index).copied().ok_or_else(|| {
            Error::OutOfBounds(format!(
                "vector index {index} out of range for length {}",
                self.items.len()
            ))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all elements, wrapping on overflow.
    #[must_use]
    pub fn sum(&self) -> i32 {
        self.items.iter().fold(0_i32, |acc, &v| acc.wrapping_add(v))
    }

    pub fn sort(&mut self) {
        self.items.sort_unstable();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.items
    }
}

/// Create an empty vector. Caller must free with [`nk_vector_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_create() -> NkHandle {
    catch_or(NK_NULL_HANDLE, || SEQUENCES.insert(Sequence::new()))
}

/// Destroy a vector. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_destroy(handle: NkHandle) {
    catch_or((), || SEQUENCES.remove(handle).map(drop));
}

/// Append `value`.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_add(handle: NkHandle, value: i32) {
    catch_or((), || SEQUENCES.with_mut(handle, |v| v.push(value)));
}

/// Element at `index`, or 0 when the index is out of range (the error is recorded).
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_get(handle: NkHandle, index: i32) -> i32 {
    catch_or(0, || {
        SEQUENCES.with(handle, |v| v.get(to_index(index, "vector index")?))
    })
}

/// Number of elements, 0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_size(handle: NkHandle) -> i32 {
    catch_or(0, || SEQUENCES.with(handle, |v| Ok(len_to_i32(v.len()))))
}

/// Remove every element.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_clear(handle: NkHandle) {
    catch_or((), || {
        SEQUENCES.with_mut(handle, |v| {
            v.clear();
            Ok(())
        })
    });
}

/// Wrapping sum of all elements.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_sum(handle: NkHandle) -> i32 {
    catch_or(0, || SEQUENCES.with(handle, |v| Ok(v.sum())))
}

/// Sort ascending in place.
#[unsafe(no_mangle)]
pub extern "C" fn nk_vector_sort(handle: NkHandle) {
    catch_or((), || {
        SEQUENCES.with_mut(handle, |v| {
            v.sort();
            Ok(())
        })
    });
}

/// Read element `index` into `result`. `result` is written only on success.
///
/// # Safety
///
/// If non-null, `result` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_vector_get(
    handle: NkHandle,
    index: i32,
    result: *mut i32,
) -> NkResultCode {
    catch(|| {
        let value = SEQUENCES.with(handle, |v| v.get(to_index(index, "vector index")?))?;
        unsafe { write_out(result, value) }
    })
}
