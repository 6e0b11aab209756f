//! Safe front ends for the plain C helpers.

use std::ffi::{CStr, c_char};

use nativekit_ffi as sys;

pub use nativekit_ffi::{NkPoint as Point, NkRectangle as Rectangle};

use crate::error::{self, Error, Result, to_i32};
use crate::ffi::to_c_string;

/// `a / b`.
///
/// # Errors
///
/// [`Error::Basic`] with `InvalidParameter` for a zero divisor.
pub fn safe_divide(a: f64, b: f64) -> Result<f64> {
    let mut out = 0.0;
    error::check_basic(unsafe { sys::nk_safe_divide(a, b, &mut out) })?;
    Ok(out)
}

/// Greeting for `name`, or for a stranger.
pub fn greeting(name: Option<&str>) -> Result<String> {
    let c = name.map(to_c_string).transpose()?;
    let ptr = unsafe { sys::nk_get_greeting(c.as_ref().map_or(std::ptr::null(), |s| s.as_ptr())) };
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(String::from)
        .map_err(|_| Error::InvalidUtf8)
}

/// Byte-wise reversal of `input` through the native helper.
///
/// Multi-byte characters are reversed byte by byte, so non-ASCII input may
/// not come back as valid UTF-8.
pub fn reverse(input: &str) -> Result<String> {
    let c = to_c_string(input)?;
    let mut buf = vec![0u8; input.len() + 1];
    let size = to_i32(buf.len(), "length")?;
    error::check_basic(unsafe {
        sys::nk_safe_reverse_string(c.as_ptr(), buf.as_mut_ptr().cast::<c_char>(), size)
    })?;
    buf.pop();
    String::from_utf8(buf).map_err(|_| Error::InvalidUtf8)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f32 {
    sys::nk_calculate_distance(a, b)
}

/// Run the progress demo, reporting 0, 10, …, 100 to `callback`.
pub fn simulate_work(duration_ms: u32, callback: extern "C" fn(i32)) {
    let duration = i32::try_from(duration_ms).unwrap_or(i32::MAX);
    let callback: unsafe extern "C" fn(i32) = callback;
    unsafe { sys::nk_simulate_work(duration, Some(callback)) };
}
