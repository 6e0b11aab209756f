//! Snapshot iterators over integer sequences (`nk_iterator_*`).

use crate::error::{Error, Result};
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};
use crate::sequence::SEQUENCES;

pub(crate) static ITERATORS: Registry<Cursor> = Registry::new(Kind::Iterator);

/// A private copy of a sequence plus a forward-only read position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    items: Vec<i32>,
    position: usize,
}

impl Cursor {
    /// Snapshot `items`; later changes to the source are not observed.
    pub fn snapshot(items: &[i32]) -> Result<Self> {
        let mut copy = Vec::new();
        copy.try_reserve_exact(items.len())?;
        copy.extend_from_slice(items);
        Ok(Self {
            items: copy,
            position: 0,
        })
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.items.len()
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Consume up to and including the first element equal to `value`, so the
    /// next read yields the element after it. The cursor is left where it was
    /// when there is no match.
    pub fn find(&mut self, value: i32) -> bool {
        match self.items.iter().position(|&v| v == value) {
            Some(i) => {
                self.position = i + 1;
                true
            }
            None => false,
        }
    }
}

impl Iterator for Cursor {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let v = self.items.get(self.position).copied()?;
        self.position += 1;
        Some(v)
    }
}

/// Create an iterator over a copy of `array[0..size]`. A null `array` is
/// accepted only with `size == 0`. Caller must free with [`nk_iterator_destroy`].
///
/// # Safety
///
/// If non-null, `array` must point to `size` readable `i32` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_iterator_create(array: *const i32, size: i32) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || {
        let len = to_len(size, "iterator size")?;
        if array.is_null() && len > 0 {
            return Err(Error::NullArgument("array"));
        }
        let items = unsafe { slice_from(array, size) };
        ITERATORS.insert(Cursor::snapshot(items)?)
    })
}

/// Create an iterator over a snapshot of a live vector.
/// Caller must free with [`nk_iterator_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_from_vector(vector: NkHandle) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || {
        let cursor = SEQUENCES.with(vector, |v| Cursor::snapshot(v.as_slice()))?;
        ITERATORS.insert(cursor)
    })
}

/// Destroy an iterator. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_destroy(handle: NkHandle) {
    catch_or((), || ITERATORS.remove(handle).map(drop));
}

/// 1 if another element is available, 0 otherwise or for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_has_next(handle: NkHandle) -> i32 {
    catch_or(0, || ITERATORS.with(handle, |it| Ok(i32::from(it.has_next()))))
}

/// Next element, or 0 once exhausted.
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_next(handle: NkHandle) -> i32 {
    catch_or(0, || ITERATORS.with_mut(handle, |it| Ok(it.next().unwrap_or(0))))
}

/// Rewind to the first element.
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_reset(handle: NkHandle) {
    catch_or((), || {
        ITERATORS.with_mut(handle, |it| {
            it.reset();
            Ok(())
        })
    });
}

/// Skip past the first element equal to `value`; 1 if found, 0 otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn nk_iterator_find(handle: NkHandle, value: i32) -> i32 {
    catch_or(0, || {
        ITERATORS.with_mut(handle, |it| Ok(i32::from(it.find(value))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_in_order_then_stops() {
        let mut it = Cursor::snapshot(&[5, 7, 9]).unwrap();
        assert_eq!(it.by_ref().collect::<Vec<_>>(), vec![5, 7, 9]);
        assert!(!it.has_next());
        assert_eq!(it.next(), None);
    }

    #[test]
    fn find_consumes_the_match() {
        let mut it = Cursor::snapshot(&[5, 7, 9, 7]).unwrap();
        assert!(it.find(7));
        assert_eq!(it.next(), Some(9));
        assert!(it.find(7));
        assert_eq!(it.next(), Some(9));
    }

    #[test]
    fn failed_find_keeps_position() {
        let mut it = Cursor::snapshot(&[1, 2, 3]).unwrap();
        it.next();
        assert!(!it.find(42));
        assert_eq!(it.next(), Some(2));
        it.reset();
        assert_eq!(it.next(), Some(1));
    }
}
