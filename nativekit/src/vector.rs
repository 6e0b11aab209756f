//! Growable `i32` sequence.

use nativekit_ffi as sys;

use crate::error::{self, Result, to_i32};
use crate::ffi::OwnedHandle;
use crate::iter::Iter;

/// An owned native integer vector. Destroyed on drop.
#[derive(Debug)]
pub struct Vector {
    handle: OwnedHandle,
}

impl Vector {
    /// Create an empty vector.
    pub fn new() -> Result<Self> {
        Ok(Self {
            handle: OwnedHandle::new(sys::nk_vector_create(), sys::nk_vector_destroy)?,
        })
    }

    /// Create a vector holding `values` in order.
    pub fn from_slice(values: &[i32]) -> Result<Self> {
        let v = Self::new()?;
        for &x in values {
            v.push(x);
        }
        Ok(v)
    }

    /// Append a value.
    pub fn push(&self, value: i32) {
        sys::nk_vector_add(self.handle.raw(), value);
    }

    /// Element at `index`, or an `OutOfBounds` error.
    pub fn get(&self, index: usize) -> Result<i32> {
        let mut out = 0;
        error::check(unsafe {
            sys::nk_safe_vector_get(self.handle.raw(), to_i32(index, "index")?, &mut out)
        })?;
        Ok(out)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        sys::nk_vector_size(self.handle.raw()).unsigned_abs() as usize
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every element.
    pub fn clear(&self) {
        sys::nk_vector_clear(self.handle.raw());
    }

    /// Wrapping sum of the elements.
    #[must_use]
    pub fn sum(&self) -> i32 {
        sys::nk_vector_sum(self.handle.raw())
    }

    /// Sort ascending in place.
    pub fn sort(&self) {
        sys::nk_vector_sort(self.handle.raw());
    }

    /// Iterate over a snapshot of the current elements.
    pub fn snapshot(&self) -> Result<Iter> {
        Iter::from_handle(sys::nk_iterator_from_vector(self.handle.raw()))
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Result<Vec<i32>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}
