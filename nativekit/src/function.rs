//! Bound binary operations.

use nativekit_ffi as sys;

pub use nativekit_ffi::NkBinaryOp as BinaryOp;

use crate::error::Result;
use crate::ffi::OwnedHandle;

/// An owned native function object. Destroyed on drop.
#[derive(Debug)]
pub struct Function {
    handle: OwnedHandle,
    op: BinaryOp,
}

impl Function {
    /// Bind `op`.
    pub fn new(op: BinaryOp) -> Result<Self> {
        Ok(Self {
            handle: OwnedHandle::new(sys::nk_function_create(op as i32), sys::nk_function_destroy)?,
            op,
        })
    }

    /// `a + b`.
    pub fn add() -> Result<Self> {
        Self::new(BinaryOp::Add)
    }

    /// `a * b`.
    pub fn multiply() -> Result<Self> {
        Self::new(BinaryOp::Multiply)
    }

    /// `a ^ b`.
    pub fn power() -> Result<Self> {
        Self::new(BinaryOp::Power)
    }

    /// The bound operation.
    #[must_use]
    pub const fn op(&self) -> BinaryOp {
        self.op
    }

    /// Apply the bound operation.
    #[must_use]
    pub fn call(&self, a: f64, b: f64) -> f64 {
        sys::nk_function_call(self.handle.raw(), a, b)
    }
}
