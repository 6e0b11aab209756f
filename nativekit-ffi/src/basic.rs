//! Plain C helpers: primitive arithmetic, byte strings, geometry, arrays and a
//! progress callback demo. None of these own resources; failures are reported
//! through [`NkBasicResult`] codes or fixed return values.

use std::cell::RefCell;
use std::ffi::c_char;
use std::thread;
use std::time::Duration;

use crate::ffi::*;

/// Result codes of the plain helpers. Shares `0` and `-1` with the handle
/// family; `-3` means something different here.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NkBasicResult {
    Success = 0,
    NullPointer = -1,
    InvalidParameter = -2,
    BufferTooSmall = -3,
}

/// Integer point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NkPoint {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned rectangle size.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NkRectangle {
    pub width: f32,
    pub height: f32,
}

/// Progress callback invoked with a percentage in `0..=100`.
pub type NkProgressCallback = Option<unsafe extern "C" fn(progress: i32)>;

const GREETING_CAPACITY: usize = 256;
const PROGRESS_STEPS: i32 = 10;

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

/// `a + b`, wrapping on overflow.
#[unsafe(no_mangle)]
pub extern "C" fn nk_add_integers(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

#[unsafe(no_mangle)]
pub extern "C" fn nk_multiply_floats(a: f32, b: f32) -> f32 {
    a * b
}

/// IEEE division: a zero divisor yields an infinity or NaN.
#[unsafe(no_mangle)]
pub extern "C" fn nk_divide_doubles(a: f64, b: f64) -> f64 {
    a / b
}

/// 1 if `number` is even, 0 otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn nk_is_even(number: i32) -> i32 {
    i32::from(number % 2 == 0)
}

/// `a / b` into `result`. `INVALID_PARAMETER` for a zero divisor.
///
/// # Safety
///
/// If non-null, `result` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_divide(a: f64, b: f64, result: *mut f64) -> NkBasicResult {
    if result.is_null() {
        return NkBasicResult::NullPointer;
    }
    if b == 0.0 {
        return NkBasicResult::InvalidParameter;
    }
    unsafe { result.write(a / b) };
    NkBasicResult::Success
}

// ---------------------------------------------------------------------------
// Byte strings
// ---------------------------------------------------------------------------

/// Length of a C string in bytes, or -1 for null.
///
/// # Safety
///
/// If non-null, `s` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_cstr_length(s: *const c_char) -> i32 {
    unsafe { c_str_bytes(s) }.map_or(-1, |b| len_to_i32(b.len()))
}

/// Copy at most `max_length - 1` bytes of `source` into `destination` and
/// NUL-terminate. Does nothing on null pointers or `max_length <= 0`.
///
/// # Safety
///
/// `source` must be NUL-terminated and `destination` writable for `max_length` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_copy_string(
    source: *const c_char,
    destination: *mut c_char,
    max_length: i32,
) {
    let Some(src) = (unsafe { c_str_bytes(source) }) else {
        return;
    };
    let dst = unsafe { slice_from_mut(destination.cast::<u8>(), max_length) };
    let Some((last, body)) = dst.split_last_mut() else {
        return;
    };
    let n = src.len().min(body.len());
    body[..n].copy_from_slice(&src[..n]);
    if n < body.len() {
        body[n] = 0;
    }
    *last = 0;
}

thread_local! {
    static GREETING: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// `"Hello, <name>!"`, or `"Hello, stranger!"` for a null name, truncated to
/// 255 bytes. The view is owned by the calling thread and valid until its next
/// call to this function.
///
/// # Safety
///
/// If non-null, `name` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_get_greeting(name: *const c_char) -> *const c_char {
    let name = unsafe { c_str_bytes(name) };
    GREETING.with(|g| {
        let mut g = g.borrow_mut();
        g.clear();
        match name {
            Some(name) => {
                g.extend_from_slice(b"Hello, ");
                g.extend_from_slice(name);
                g.push(b'!');
            }
            None => g.extend_from_slice(b"Hello, stranger!"),
        }
        g.truncate(GREETING_CAPACITY - 1);
        g.push(0);
        g.as_ptr().cast()
    })
}

/// Reverse `input` into `output`, truncating to `buffer_size - 1` bytes.
/// Does nothing on null pointers or `buffer_size <= 0`.
///
/// # Safety
///
/// `input` must be NUL-terminated and `output` writable for `buffer_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_reverse_string(
    input: *const c_char,
    output: *mut c_char,
    buffer_size: i32,
) {
    let Some(src) = (unsafe { c_str_bytes(input) }) else {
        return;
    };
    let dst = unsafe { slice_from_mut(output.cast::<u8>(), buffer_size) };
    if dst.is_empty() {
        return;
    }
    let n = src.len().min(dst.len() - 1);
    for (d, s) in dst.iter_mut().zip(src.iter().rev().take(n)) {
        *d = *s;
    }
    dst[n] = 0;
}

/// Like [`nk_reverse_string`] but refuses to truncate: `BUFFER_TOO_SMALL` when
/// `buffer_size` cannot hold the reversed string and its terminator.
///
/// # Safety
///
/// `input` must be NUL-terminated and `output` writable for `buffer_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_safe_reverse_string(
    input: *const c_char,
    output: *mut c_char,
    buffer_size: i32,
) -> NkBasicResult {
    let Some(src) = (unsafe { c_str_bytes(input) }) else {
        return NkBasicResult::NullPointer;
    };
    if output.is_null() {
        return NkBasicResult::NullPointer;
    }
    if buffer_size <= 0 {
        return NkBasicResult::InvalidParameter;
    }
    if src.len() >= buffer_size as usize {
        return NkBasicResult::BufferTooSmall;
    }
    unsafe { nk_reverse_string(input, output, buffer_size) };
    NkBasicResult::Success
}

/// Allocate a zeroed buffer of `length` bytes, or null for `length <= 0`.
/// Caller must free with [`nk_free_string`].
#[unsafe(no_mangle)]
pub extern "C" fn nk_allocate_string(length: i32) -> *mut c_char {
    match usize::try_from(length) {
        Ok(n) if n > 0 => {
            let mut bytes = Vec::new();
            if bytes.try_reserve_exact(n).is_err() {
                set_last_error(format!("cannot allocate {n} bytes"));
                return std::ptr::null_mut();
            }
            bytes.resize(n, 0);
            alloc_owned(bytes)
        }
        _ => std::ptr::null_mut(),
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn nk_create_point(x: i32, y: i32) -> NkPoint {
    NkPoint { x, y }
}

/// Euclidean distance between two points.
#[unsafe(no_mangle)]
pub extern "C" fn nk_calculate_distance(p1: NkPoint, p2: NkPoint) -> f32 {
    let dx = f64::from(p2.x) - f64::from(p1.x);
    let dy = f64::from(p2.y) - f64::from(p1.y);
    dx.hypot(dy) as f32
}

#[unsafe(no_mangle)]
pub extern "C" fn nk_create_rectangle(width: f32, height: f32) -> NkRectangle {
    NkRectangle { width, height }
}

#[unsafe(no_mangle)]
pub extern "C" fn nk_rectangle_area(rect: NkRectangle) -> f32 {
    rect.width * rect.height
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

/// Set every element of `array[0..size]` to `value`.
///
/// # Safety
///
/// If non-null, `array` must be writable for `size` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_fill_array(array: *mut i32, size: i32, value: i32) {
    unsafe { slice_from_mut(array, size) }.fill(value);
}

/// Wrapping sum of `array[0..size]`; 0 for null or non-positive size.
///
/// # Safety
///
/// If non-null, `array` must point to `size` readable values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_sum_array(array: *const i32, size: i32) -> i32 {
    unsafe { slice_from(array, size) }
        .iter()
        .fold(0_i32, |acc, &v| acc.wrapping_add(v))
}

/// Sort `array[0..size]` ascending in place.
///
/// # Safety
///
/// If non-null, `array` must be writable for `size` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_sort_array(array: *mut i32, size: i32) {
    unsafe { slice_from_mut(array, size) }.sort_unstable();
}

/// `NULL_POINTER` for a null array, `INVALID_PARAMETER` for `size <= 0`.
#[unsafe(no_mangle)]
pub extern "C" fn nk_validate_array(array: *const i32, size: i32) -> NkBasicResult {
    if array.is_null() {
        NkBasicResult::NullPointer
    } else if size <= 0 {
        NkBasicResult::InvalidParameter
    } else {
        NkBasicResult::Success
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Report progress 0, 10, …, 100 to `callback`, sleeping `duration_ms / 10`
/// milliseconds after each report. Does nothing without a callback.
///
/// # Safety
///
/// `callback` must be safe to call with any value in `0..=100`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_simulate_work(duration_ms: i32, callback: NkProgressCallback) {
    let Some(callback) = callback else {
        return;
    };
    let step = Duration::from_millis(u64::try_from(duration_ms / PROGRESS_STEPS).unwrap_or(0));
    for i in 0..=PROGRESS_STEPS {
        unsafe { callback(i * 100 / PROGRESS_STEPS) };
        thread::sleep(step);
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicI32, Ordering};

    use super::*;

    #[test]
    fn cstr_length() {
        assert_eq!(unsafe { nk_cstr_length(c"hello".as_ptr()) }, 5);
        assert_eq!(unsafe { nk_cstr_length(std::ptr::null()) }, -1);
    }

    #[test]
    fn copy_string_always_terminates() {
        let mut buf = [0x7f_u8; 4];
        unsafe { nk_copy_string(c"hello".as_ptr(), buf.as_mut_ptr().cast(), 4) };
        assert_eq!(&buf, b"hel\0");

        let mut buf = [0x7f_u8; 8];
        unsafe { nk_copy_string(c"hi".as_ptr(), buf.as_mut_ptr().cast(), 8) };
        assert_eq!(&buf[..3], b"hi\0");
    }

    #[test]
    fn greeting_formats() {
        let hello = unsafe { CStr::from_ptr(nk_get_greeting(c"Ada".as_ptr())) };
        assert_eq!(hello.to_bytes(), b"Hello, Ada!");
        let stranger = unsafe { CStr::from_ptr(nk_get_greeting(std::ptr::null())) };
        assert_eq!(stranger.to_bytes(), b"Hello, stranger!");
    }

    #[test]
    fn greeting_is_truncated() {
        let long = std::ffi::CString::new(vec![b'a'; 400]).unwrap();
        let g = unsafe { CStr::from_ptr(nk_get_greeting(long.as_ptr())) };
        assert_eq!(g.to_bytes().len(), GREETING_CAPACITY - 1);
    }

    #[test]
    fn reverse_truncates_or_refuses() {
        let mut buf = [0_u8; 4];
        unsafe { nk_reverse_string(c"abcdef".as_ptr(), buf.as_mut_ptr().cast(), 4) };
        assert_eq!(&buf, b"fed\0");

        let mut buf = [0_u8; 4];
        let rc =
            unsafe { nk_safe_reverse_string(c"abcd".as_ptr(), buf.as_mut_ptr().cast(), 4) };
        assert_eq!(rc, NkBasicResult::BufferTooSmall);
        let rc = unsafe { nk_safe_reverse_string(c"abc".as_ptr(), buf.as_mut_ptr().cast(), 4) };
        assert_eq!(rc, NkBasicResult::Success);
        assert_eq!(&buf, b"cba\0");
    }

    #[test]
    fn safe_divide_codes() {
        let mut out = 0.0;
        assert_eq!(unsafe { nk_safe_divide(1.0, 0.0, &mut out) }, NkBasicResult::InvalidParameter);
        assert_eq!(unsafe { nk_safe_divide(1.0, 4.0, &mut out) }, NkBasicResult::Success);
        assert_eq!(out, 0.25);
        assert_eq!(
            unsafe { nk_safe_divide(1.0, 4.0, std::ptr::null_mut()) },
            NkBasicResult::NullPointer
        );
    }

    #[test]
    fn arrays() {
        let mut a = [5, -1, 3];
        unsafe {
            assert_eq!(nk_sum_array(a.as_ptr(), 3), 7);
            nk_sort_array(a.as_mut_ptr(), 3);
            assert_eq!(a, [-1, 3, 5]);
            nk_fill_array(a.as_mut_ptr(), 2, 9);
        }
        assert_eq!(a, [9, 9, 5]);
        assert_eq!(nk_validate_array(a.as_ptr(), 0), NkBasicResult::InvalidParameter);
        assert_eq!(nk_validate_array(std::ptr::null(), 3), NkBasicResult::NullPointer);
    }

    #[test]
    fn geometry() {
        let d = nk_calculate_distance(nk_create_point(0, 0), nk_create_point(3, 4));
        assert_eq!(d, 5.0);
        assert_eq!(nk_rectangle_area(nk_create_rectangle(2.0, 1.5)), 3.0);
        assert_eq!(nk_is_even(-4), 1);
        assert_eq!(nk_is_even(7), 0);
        assert_eq!(nk_add_integers(i32::MAX, 1), i32::MIN);
    }

    static LAST_PROGRESS: AtomicI32 = AtomicI32::new(-1);
    static PROGRESS_CALLS: AtomicI32 = AtomicI32::new(0);

    unsafe extern "C" fn record(progress: i32) {
        LAST_PROGRESS.store(progress, Ordering::SeqCst);
        PROGRESS_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn simulate_work_reports_every_step() {
        unsafe { nk_simulate_work(0, Some(record)) };
        assert_eq!(PROGRESS_CALLS.load(Ordering::SeqCst), 11);
        assert_eq!(LAST_PROGRESS.load(Ordering::SeqCst), 100);
        unsafe { nk_simulate_work(0, None) };
    }

    #[test]
    fn allocated_strings_are_zeroed() {
        let p = nk_allocate_string(3);
        assert!(!p.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(p.cast::<u8>(), 3) };
        assert_eq!(bytes, &[0, 0, 0]);
        unsafe { nk_free_string(p) };
        assert!(nk_allocate_string(0).is_null());
    }
}
