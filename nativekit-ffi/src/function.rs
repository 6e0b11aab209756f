//! Bound binary numeric operations (`nk_function_*`).

use crate::error::{Error, Result};
use crate::ffi::*;
use crate::handle::{Kind, NK_NULL_HANDLE, NkHandle, Registry};

pub(crate) static FUNCTIONS: Registry<NkBinaryOp> = Registry::new(Kind::Function);

/// The operation a function handle is bound to.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NkBinaryOp {
    Add = 0,
    Multiply = 1,
    Power = 2,
}

impl NkBinaryOp {
    pub fn from_raw(v: i32) -> Result<Self> {
        match v {
            0 => Ok(Self::Add),
            1 => Ok(Self::Multiply),
            2 => Ok(Self::Power),
            _ => Err(Error::InvalidOperation(format!("unknown binary operation {v}"))),
        }
    }

    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Multiply => a * b,
            Self::Power => a.powf(b),
        }
    }
}

fn create(op: NkBinaryOp) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || FUNCTIONS.insert(op))
}

/// Bind `a + b`. Caller must free with [`nk_function_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_create_add() -> NkHandle {
    create(NkBinaryOp::Add)
}

/// Bind `a * b`. Caller must free with [`nk_function_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_create_multiply() -> NkHandle {
    create(NkBinaryOp::Multiply)
}

/// Bind `a ^ b`. Caller must free with [`nk_function_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_create_power() -> NkHandle {
    create(NkBinaryOp::Power)
}

/// Bind the operation named by an [`NkBinaryOp`] value. Returns the null handle
/// for an unknown value. Caller must free with [`nk_function_destroy`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_create(op: i32) -> NkHandle {
    catch_or(NK_NULL_HANDLE, || FUNCTIONS.insert(NkBinaryOp::from_raw(op)?))
}

/// Destroy a function. The null handle is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_destroy(handle: NkHandle) {
    catch_or((), || FUNCTIONS.remove(handle).map(drop));
}

/// Apply the bound operation. Returns 0.0 for the null handle.
#[unsafe(no_mangle)]
pub extern "C" fn nk_function_call(handle: NkHandle, a: f64, b: f64) -> f64 {
    catch_or(0.0, || FUNCTIONS.with(handle, |op| Ok(op.apply(a, b))))
}
