//! Core FFI infrastructure: error channel, panic-safe call wrappers, memory helpers.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::error::{Error, NkResultCode, Result};

// ---------------------------------------------------------------------------
// Thread-local error
// ---------------------------------------------------------------------------

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

/// Store an error message for later retrieval on this thread.
pub(crate) fn set_last_error(msg: impl Into<String>) {
    let mut msg = msg.into();
    msg.retain(|c| c != '\0');
    tracing::warn!(error = %msg, "nativekit call failed");
    let msg = CString::new(msg).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = msg);
}

/// Record `e` if it belongs in the channel and return its result code.
pub(crate) fn report(e: &Error) -> NkResultCode {
    if e.is_recorded() {
        set_last_error(e.to_string());
    }
    e.code()
}

/// The last error message recorded on the calling thread, or an empty string.
///
/// The returned view stays valid until the next failing call on this thread.
#[unsafe(no_mangle)]
pub extern "C" fn nk_last_error_message() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().as_ptr())
}

/// Get the length of the last error message (including NUL terminator).
/// Returns 0 if no error.
#[unsafe(no_mangle)]
pub extern "C" fn nk_last_error_length() -> i32 {
    LAST_ERROR.with(|e| {
        let s = e.borrow();
        let len = s.as_bytes().len();
        if len == 0 {
            0
        } else {
            i32::try_from(len + 1).unwrap_or(i32::MAX)
        }
    })
}

/// Copy the last error message into `buf`. Returns bytes written (excluding NUL),
/// or -1 if `buf` is null or `buf_len` is not positive. Longer messages are truncated.
///
/// # Safety
///
/// `buf` must be valid for writes of `buf_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_last_error_copy(buf: *mut c_char, buf_len: i32) -> i32 {
    if buf.is_null() || buf_len <= 0 {
        return -1;
    }
    LAST_ERROR.with(|e| {
        let s = e.borrow();
        let bytes = s.as_bytes();
        let copy_len = bytes.len().min((buf_len - 1) as usize);
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), copy_len);
            *buf.add(copy_len) = 0;
        }
        copy_len as i32
    })
}

// ---------------------------------------------------------------------------
// Error-catching wrappers
// ---------------------------------------------------------------------------

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

/// Run `f`, turning a panic into [`Error::Unknown`].
fn run<R>(f: impl FnOnce() -> Result<R>) -> Result<R> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(Error::Unknown(format!(
            "internal panic: {}",
            panic_message(&*payload)
        )))
    })
}

/// Execute a closure, record the error on failure, return the result code.
pub(crate) fn catch(f: impl FnOnce() -> Result<()>) -> NkResultCode {
    match run(f) {
        Ok(()) => NkResultCode::Success,
        Err(e) => report(&e),
    }
}

/// Execute a closure, record the error on failure and return `sentinel` instead.
pub(crate) fn catch_or<R>(sentinel: R, f: impl FnOnce() -> Result<R>) -> R {
    run(f).unwrap_or_else(|e| {
        report(&e);
        sentinel
    })
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Convert a caller-supplied index, rejecting negative values.
pub(crate) fn to_index(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::OutOfBounds(format!("negative {what} {value}")))
}

/// Convert a caller-supplied size or dimension, rejecting negative values.
pub(crate) fn to_len(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::InvalidOperation(format!("negative {what} {value}")))
}

/// Report a length back across the boundary.
pub(crate) fn len_to_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Borrow a caller-supplied array. A null pointer or non-positive count yields
/// the empty slice.
///
/// # Safety
///
/// If non-null, `ptr` must point to `count` initialised values that outlive `'a`.
pub(crate) unsafe fn slice_from<'a, T>(ptr: *const T, count: i32) -> &'a [T] {
    match usize::try_from(count) {
        Ok(n) if n > 0 && !ptr.is_null() => unsafe { std::slice::from_raw_parts(ptr, n) },
        _ => &[],
    }
}

/// Mutable counterpart of [`slice_from`].
///
/// # Safety
///
/// If non-null, `ptr` must point to `count` initialised values, exclusively
/// borrowed for `'a`.
pub(crate) unsafe fn slice_from_mut<'a, T>(ptr: *mut T, count: i32) -> &'a mut [T] {
    match usize::try_from(count) {
        Ok(n) if n > 0 && !ptr.is_null() => unsafe { std::slice::from_raw_parts_mut(ptr, n) },
        _ => &mut [],
    }
}

/// Borrow the bytes of a nullable C string.
///
/// # Safety
///
/// If non-null, `s` must point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn c_str_bytes<'a>(s: *const c_char) -> Option<&'a [u8]> {
    if s.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(s) }.to_bytes())
    }
}

/// Write a value into an output parameter.
///
/// # Safety
///
/// If non-null, `out` must be valid for writes.
pub(crate) unsafe fn write_out<T>(out: *mut T, val: T) -> Result<()> {
    if out.is_null() {
        return Err(Error::NullArgument("output"));
    }
    unsafe { out.write(val) };
    Ok(())
}

// ---------------------------------------------------------------------------
// Owned strings
// ---------------------------------------------------------------------------

/// Live strings handed to the caller, keyed by address, valued by allocation size.
static OWNED_STRINGS: Mutex<BTreeMap<usize, usize>> = Mutex::new(BTreeMap::new());

/// Hand `bytes` to the caller as a heap allocation released with [`nk_free_string`].
pub(crate) fn alloc_owned(bytes: Vec<u8>) -> *mut c_char {
    let len = bytes.len();
    let ptr = Box::into_raw(bytes.into_boxed_slice()).cast::<u8>();
    OWNED_STRINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(ptr as usize, len);
    ptr.cast()
}

/// Allocate a NUL-terminated copy of `s`. Caller must free with [`nk_free_string`].
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    let mut bytes: Vec<u8> = s.bytes().filter(|&b| b != 0).collect();
    bytes.push(0);
    alloc_owned(bytes)
}

/// Free a string previously returned by this library. Null is ignored; a
/// pointer this library did not hand out is reported and left alone.
///
/// # Safety
///
/// `s` must not be used after this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    let len = OWNED_STRINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(s as usize));
    match len {
        Some(len) => drop(unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(s.cast::<u8>(), len))
        }),
        None => set_last_error(format!("{s:p} was not allocated by nativekit")),
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Library version as a static NUL-terminated string. Do not free.
#[unsafe(no_mangle)]
pub extern "C" fn nk_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}

// ---------------------------------------------------------------------------
// Logger initialization
// ---------------------------------------------------------------------------

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Initialize the tracing logger. `level` is a filter directive such as
/// "debug", "info", "warn", "error", "off" or "nativekit_ffi=trace". Pass null
/// to read `NATIVEKIT_LOG`, falling back to "info". Only the first call has an
/// effect. Returns 0 on success.
///
/// # Safety
///
/// If non-null, `level` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_init_logger(level: *const c_char) -> NkResultCode {
    catch(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        let filter_str = match unsafe { c_str_bytes(level) } {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => std::env::var("NATIVEKIT_LOG").unwrap_or_else(|_| "info".to_owned()),
        };
        LOGGER_INIT.get_or_init(|| {
            let filter = EnvFilter::builder().parse_lossy(&filter_str);
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init();
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_error() -> String {
        unsafe { CStr::from_ptr(nk_last_error_message()) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn panics_become_unknown_errors() {
        let code = catch(|| panic!("boom"));
        assert_eq!(code, NkResultCode::UnknownError);
        assert_eq!(last_error(), "internal panic: boom");
    }

    #[test]
    fn success_leaves_channel_untouched() {
        set_last_error("earlier failure");
        assert_eq!(catch(|| Ok(())), NkResultCode::Success);
        assert_eq!(catch_or(0, || Ok(5)), 5);
        assert_eq!(last_error(), "earlier failure");
    }

    #[test]
    fn null_handle_errors_are_silent() {
        set_last_error("untouched");
        assert_eq!(catch_or(-1, || Err(Error::NullHandle)), -1);
        assert_eq!(last_error(), "untouched");
    }

    #[test]
    fn copy_truncates_to_buffer() {
        set_last_error("abcdef");
        assert_eq!(nk_last_error_length(), 7);
        let mut buf = [1 as c_char; 4];
        let written = unsafe { nk_last_error_copy(buf.as_mut_ptr(), 4) };
        assert_eq!(written, 3);
        assert_eq!(unsafe { CStr::from_ptr(buf.as_ptr()) }.to_bytes(), b"abc");
        assert_eq!(unsafe { nk_last_error_copy(std::ptr::null_mut(), 4) }, -1);
    }

    #[test]
    fn owned_strings_are_tracked() {
        let s = to_c_string("hello");
        assert_eq!(unsafe { CStr::from_ptr(s) }.to_bytes(), b"hello");
        unsafe { nk_free_string(s) };
        assert!(
            !OWNED_STRINGS
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&(s as usize))
        );

        let mut local = *b"x\0";
        unsafe { nk_free_string(local.as_mut_ptr().cast()) };
        assert!(last_error().contains("was not allocated by nativekit"));
    }

    #[test]
    fn negative_arguments_are_rejected() {
        assert!(matches!(to_index(-1, "index"), Err(Error::OutOfBounds(_))));
        assert!(matches!(to_len(-1, "size"), Err(Error::InvalidOperation(_))));
        assert_eq!(to_index(3, "index"), Ok(3));
        assert!(unsafe { slice_from::<i32>(std::ptr::null(), 4) }.is_empty());
    }

    #[test]
    fn version_is_nul_terminated() {
        let v = unsafe { CStr::from_ptr(nk_version()) };
        assert_eq!(v.to_str(), Ok(env!("CARGO_PKG_VERSION")));
    }
}
