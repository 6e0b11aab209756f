#![doc = include_str!("../README.md")]
#![allow(unsafe_code)]

pub mod basic;
pub mod buffer;
pub mod error;
pub mod function;
pub mod iter;
pub mod matrix;
pub mod text;
pub mod vector;

mod ffi;

use std::ffi::CStr;
use std::ptr;

// Re-export core public API at crate root.
pub use buffer::Buffer;
pub use error::{Error, Result};
pub use function::{BinaryOp, Function};
pub use iter::Iter;
pub use matrix::Matrix;
pub use nativekit_ffi::NkResultCode as ResultCode;
pub use nativekit_ffi::stats::{Sample, mean, standard_deviation, variance};
pub use text::NativeString;
pub use vector::Vector;

/// Initialize the native tracing logger. `level` is a filter directive such as
/// `"debug"` or `"nativekit_ffi=trace"`; `None` reads `NATIVEKIT_LOG`.
/// Only the first call has an effect.
pub fn init_logger(level: Option<&str>) -> Result<()> {
    let c = level.map(ffi::to_c_string).transpose()?;
    error::check(unsafe {
        nativekit_ffi::nk_init_logger(c.as_ref().map_or(ptr::null(), |s| s.as_ptr()))
    })
}

/// Version of the native library.
#[must_use]
pub fn version() -> &'static str {
    unsafe { CStr::from_ptr(nativekit_ffi::nk_version()) }
        .to_str()
        .unwrap_or_default()
}
