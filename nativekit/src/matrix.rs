//! Dense row-major `f64` matrices.

use std::fmt;

use nativekit_ffi as sys;

use crate::error::{self, Error, Result, to_i32};
use crate::ffi::{OwnedHandle, take_c_string};

/// An owned native matrix. Destroyed on drop.
#[derive(Debug)]
pub struct Matrix {
    handle: OwnedHandle,
}

impl Matrix {
    fn from_handle(raw: sys::NkHandle) -> Result<Self> {
        Ok(Self {
            handle: OwnedHandle::new(raw, sys::nk_matrix_destroy)?,
        })
    }

    /// Zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::from_handle(sys::nk_matrix_create(
            to_i32(rows, "rows")?,
            to_i32(cols, "cols")?,
        ))
    }

    /// Build a matrix from equally long rows.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the rows are ragged.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return Err(Error::InvalidArgument("rows differ in length".into()));
        }
        let mut m = Self::zeros(rows.len(), cols)?;
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v)?;
            }
        }
        Ok(m)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        sys::nk_matrix_rows(self.handle.raw()).unsigned_abs() as usize
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        sys::nk_matrix_cols(self.handle.raw()).unsigned_abs() as usize
    }

    /// Cell `(row, col)`, or an `OutOfBounds` error.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let mut out = 0.0;
        error::check(unsafe {
            sys::nk_safe_matrix_get(
                self.handle.raw(),
                to_i32(row, "row")?,
                to_i32(col, "col")?,
                &mut out,
            )
        })?;
        Ok(out)
    }

    /// Store `value` at `(row, col)`, or return an `OutOfBounds` error.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        error::check(sys::nk_safe_matrix_set(
            self.handle.raw(),
            to_i32(row, "row")?,
            to_i32(col, "col")?,
            value,
        ))
    }

    /// Product `self × other` as a new matrix.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        let mut out = sys::NK_NULL_HANDLE;
        error::check(unsafe {
            sys::nk_safe_matrix_multiply(self.handle.raw(), other.handle.raw(), &mut out)
        })?;
        Self::from_handle(out)
    }

    /// Transpose as a new matrix.
    pub fn transpose(&self) -> Result<Self> {
        let mut out = sys::NK_NULL_HANDLE;
        error::check(unsafe { sys::nk_safe_matrix_transpose(self.handle.raw(), &mut out) })?;
        Self::from_handle(out)
    }

    /// Copy the cells out, row by row.
    pub fn to_rows(&self) -> Result<Vec<Vec<f64>>> {
        (0..self.rows())
            .map(|i| (0..self.cols()).map(|j| self.get(i, j)).collect())
            .collect()
    }
}

/// One row per line, cells separated by a single space.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = unsafe { take_c_string(sys::nk_matrix_to_string(self.handle.raw())) }
            .map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}
