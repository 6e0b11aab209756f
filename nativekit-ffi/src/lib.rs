//! `nativekit-ffi`: C ABI for handle-managed numeric and text resources.
//!
//! Design principles:
//! - Resources live in process-wide arenas and are named by generation-checked
//!   [`NkHandle`] tokens. `0` is the null handle; a destroyed or foreign handle
//!   is detected instead of dereferenced.
//! - Plain accessors return a sentinel (0, 0.0, an empty string, the null
//!   handle) on failure. The `nk_safe_*` variants return an [`NkResultCode`]
//!   and write their value through an out-parameter only on success.
//! - Failures are described in a thread-local message, retrieved via
//!   [`nk_last_error_message`]. Success never clears it, and the null handle is
//!   tolerated silently.
//! - Panics never cross the boundary; they are reported as `UNKNOWN_ERROR`.
//! - Strings returned as `*mut c_char` are owned by the caller and released
//!   with [`nk_free_string`].

#![allow(unsafe_code)]

mod ffi;

pub mod basic;
pub mod buffer;
pub mod error;
pub mod function;
pub mod handle;
pub mod iterator;
pub mod matrix;
pub mod sequence;
pub mod stats;
pub mod text;

pub use basic::*;
pub use buffer::*;
pub use error::{Error, NkResultCode, Result};
pub use ffi::{
    nk_free_string, nk_init_logger, nk_last_error_copy, nk_last_error_length,
    nk_last_error_message, nk_version,
};
pub use function::*;
pub use handle::{Kind, NK_NULL_HANDLE, NkHandle};
pub use iterator::*;
pub use matrix::*;
pub use sequence::*;
pub use stats::*;
pub use text::*;

/// 1 if `handle` names a live resource of any kind, 0 otherwise. Never touches
/// the error channel.
#[unsafe(no_mangle)]
pub extern "C" fn nk_handle_is_valid(handle: NkHandle) -> i32 {
    let live = match Kind::of(handle) {
        Some(Kind::Sequence) => sequence::SEQUENCES.contains(handle),
        Some(Kind::Text) => text::TEXTS.contains(handle),
        Some(Kind::Matrix) => matrix::MATRICES.contains(handle),
        Some(Kind::Buffer) => buffer::BUFFERS.contains(handle),
        Some(Kind::Function) => function::FUNCTIONS.contains(handle),
        Some(Kind::Iterator) => iterator::ITERATORS.contains(handle),
        None => false,
    };
    i32::from(live)
}
