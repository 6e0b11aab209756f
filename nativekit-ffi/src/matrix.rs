//! Dense `f64` matrices and the shape-checked algebra on them (`nk_matrix_*`).
//!
//! Every operation that produces a matrix returns a **new** handle owned by the
//! caller; operands are never consumed. Indices are checked on every access
//! and out-of-range cells are reported, never clamped.

use std::ffi::c_char;
use std::fmt;

use crate::error::{Error, NkResultCode, Result};
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};

pub(crate) static MATRICES: Registry<Matrix> = Registry::new(Kind::Matrix);

/// A row-major `rows × cols` grid of `f64` with fixed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// A zero-filled matrix. Fails if the cell count overflows or cannot be allocated.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let len = rows.checked_mul(cols).ok_or_else(|| {
            Error::Memory(format!("{rows}x{cols} matrix exceeds addressable size"))
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0.0);
        Ok(Self { data, rows, cols })
    }

    /// Build from row-major data. `data.len()` must equal `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> Result<Self> {
        let mut m = Self::zeros(rows, cols)?;
        if data.len() != m.data.len() {
            return Err(Error::InvalidOperation(format!(
                "{} values cannot fill a {rows}x{cols} matrix",
                data.len()
            )));
        }
        m.data.copy_from_slice(data);
        Ok(m)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major view of the cells.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(Error::OutOfBounds(format!(
                "matrix index ({row}, {col}) out of range for {}x{} matrix",
                self.rows, self.cols
            )))
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Matrix product `self × other`. Shapes are checked before anything is allocated.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::InvalidOperation(format!(
                "matrix dimensions don't match for multiplication: {}x{} * {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut result = Self::zeros(self.rows, other.cols)?;
        for i in 0..self.rows {
            let lhs = &self.data[i * self.cols..(i + 1) * self.cols];
            for j in 0..other.cols {
                result.data[i * other.cols + j] = lhs
                    .iter()
                    .enumerate()
                    .map(|(k, &a)| a * other.data[k * other.cols + j])
                    .fold(0.0, |acc, x| acc + x);
            }
        }
        Ok(result)
    }

    pub fn transpose(&self) -> Result<Self> {
        let mut result = Self::zeros(self.cols, self.rows)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Ok(result)
    }
}

/// One row per line, cells separated by a single space.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cols == 0 {
            return (0..self.rows).try_for_each(|_| writeln!(f));
        }
        for row in self.data.chunks(self.cols) {
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Create a zero-filled `rows × cols` matrix. Returns the null handle if either
/// dimension is negative or the allocation fails.
/// Caller must free with [`nk_matrix_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_create(rows: i32, cols: i32) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || {
        let m = Matrix::zeros(to_len(rows, "matrix rows")?, to_len(cols, "matrix cols")?)?;
        MATRICES.insert(m)
    })
}

/// Destroy a matrix. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_destroy(handle: NkHandle) {
    catch_or((), || MATRICES.remove(handle).map(drop));
}

// ---------------------------------------------------------------------------
// Cell access
// ---------------------------------------------------------------------------

fn cell(row: i32, col: i32) -> Result<(usize, usize)> {
    Ok((to_index(row, "matrix row")?, to_index(col, "matrix col")?))
}

/// Set cell `(row, col)`. Out-of-range indices are recorded and leave the matrix unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_set(handle: NkHandle, row: i32, col: i32, value: f64) {
    catch_or((), || {
        let (r, c) = cell(row, col)?;
        MATRICES.with_mut(handle, |m| m.set(r, c, value))
    });
}

/// Cell `(row, col)`, or 0.0 when out of range (the error is recorded).
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_get(handle: NkHandle, row: i32, col: i32) -> f64 {
    catch_or(0.0, || {
        let (r, c) = cell(row, col)?;
        MATRICES.with(handle, |m| m.get(r, c))
    })
}

/// Number of rows, 0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_rows(handle: NkHandle) -> i32 {
    catch_or(0, || MATRICES.with(handle, |m| Ok(len_to_i32(m.rows()))))
}

/// Number of columns, 0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_cols(handle: NkHandle) -> i32 {
    catch_or(0, || MATRICES.with(handle, |m| Ok(len_to_i32(m.cols()))))
}

// ---------------------------------------------------------------------------
// Algebra
// ---------------------------------------------------------------------------

fn multiply(a: NkHandle, b: NkHandle) -> Result<NkHandle> {
    let product = {
        let arena = MATRICES.lock();
        arena.get(a)?.multiply(arena.get(b)?)?
    };
    MATRICES.insert(product)
}

fn transpose(handle: NkHandle) -> Result<NkHandle> {
    let transposed = MATRICES.with(handle, Matrix::transpose)?;
    MATRICES.insert(transposed)
}

/// Product `a × b` as a new matrix. Returns the null handle if either operand
/// is null or the shapes are incompatible (`a.cols != b.rows`, recorded).
/// Caller must free the result with [`nk_matrix_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_multiply(a: NkHandle, b: NkHandle) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || multiply(a, b))
}

/// Transpose as a new matrix. Caller must free the result with [`nk_matrix_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_transpose(handle: NkHandle) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || transpose(handle))
}

// ---------------------------------------------------------------------------
// Result-code variants
// ---------------------------------------------------------------------------

/// Product `a × b`, written to `result` only on success.
///
/// # Safety
///
/// If non-null, `result` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_matrix_multiply(
    a: NkHandle,
    b: NkHandle,
    result: *mut NkHandle,
) -> NkResultCode {
    catch(|| {
        if result.is_null() {
            return Err(Error::NullArgument("output"));
        }
        let product = multiply(a, b)?;
        unsafe { write_out(result, product) }
    })
}

/// Transpose, written to `result` only on success.
///
/// # Safety
///
/// If non-null, `result` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_matrix_transpose(
    handle: NkHandle,
    result: *mut NkHandle,
) -> NkResultCode {
    catch(|| {
        if result.is_null() {
            return Err(Error::NullArgument("output"));
        }
        let transposed = transpose(handle)?;
        unsafe { write_out(result, transposed) }
    })
}

/// Cell `(row, col)`, written to `result` only on success.
///
/// # Safety
///
/// If non-null, `result` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_matrix_get(
    handle: NkHandle,
    row: i32,
    col: i32,
    result: *mut f64,
) -> NkResultCode {
    catch(|| {
        let (r, c) = cell(row, col)?;
        let value = MATRICES.with(handle, |m| m.get(r, c))?;
        unsafe { write_out(result, value) }
    })
}

/// Set cell `(row, col)`, reporting out-of-range indices as `OUT_OF_BOUNDS`.
#[unsafe(no_mangle)]
pub extern "C" fn nk_safe_matrix_set(
    handle: NkHandle,
    row: i32,
    col: i32,
    value: f64,
) -> NkResultCode {
    catch(|| {
        let (r, c) = cell(row, col)?;
        MATRICES.with_mut(handle, |m| m.set(r, c, value))
    })
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render the matrix as text. Caller must free with [`nk_free_string`].
/// Returns null for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_matrix_to_string(handle: NkHandle) -> *mut c_char {
    catch_or(std::ptr::null_mut(), || {
        MATRICES.with(handle, |m| Ok(to_c_string(&m.to_string())))
    })
}

/// Print the matrix to stdout.
#[unsafe(no_mangle)]
#[allow(clippy::print_stdout)]
pub extern "C" fn nk_matrix_print(handle: NkHandle) {
    catch_or((), || {
        MATRICES.with(handle, |m| {
            print!("{m}");
            Ok(())
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, data: &[f64]) -> Matrix {
        Matrix::from_row_major(rows, cols, data).unwrap()
    }

    #[test]
    fn multiply_2x3_by_3x2() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = a.multiply(&b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn multiply_rejects_shape_mismatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        let b = Matrix::zeros(2, 3).unwrap();
        assert!(matches!(a.multiply(&b), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose().unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose().unwrap(), a);
    }

    #[test]
    fn empty_shapes_are_valid() {
        let a = Matrix::zeros(0, 3).unwrap();
        let b = Matrix::zeros(3, 0).unwrap();
        assert_eq!(a.multiply(&b).unwrap().shape(), (0, 0));
        assert_eq!(b.multiply(&a).unwrap().shape(), (3, 3));
        assert_eq!(a.transpose().unwrap().shape(), (3, 0));
    }

    #[test]
    fn out_of_range_access_is_reported() {
        let mut a = Matrix::zeros(2, 2).unwrap();
        assert!(matches!(a.get(2, 0), Err(Error::OutOfBounds(_))));
        assert!(matches!(a.set(0, 2, 1.0), Err(Error::OutOfBounds(_))));
        assert_eq!(a, Matrix::zeros(2, 2).unwrap());
    }

    #[test]
    fn oversized_allocation_is_a_memory_error() {
        assert!(matches!(
            Matrix::zeros(usize::MAX, 2),
            Err(Error::Memory(_))
        ));
    }

    #[test]
    fn display_matches_print_format() {
        let a = m(2, 2, &[1.0, 2.5, -3.0, 0.0]);
        assert_eq!(a.to_string(), "1 2.5\n-3 0\n");
    }
}
