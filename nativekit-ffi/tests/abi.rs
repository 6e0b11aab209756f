//! End-to-end checks through the exported C entry points.

#![allow(unsafe_code)]

use std::ffi::{CStr, c_char};

use nativekit_ffi::*;
use proptest::prelude::*;

fn last_error() -> String {
    unsafe { CStr::from_ptr(nk_last_error_message()) }
        .to_string_lossy()
        .into_owned()
}

fn cstr<'a>(p: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(p) }.to_str().unwrap()
}

fn matrix_from(rows: usize, cols: usize, cells: &[f64]) -> NkHandle {
    let m = nk_matrix_create(rows as i32, cols as i32);
    assert_ne!(m, NK_NULL_HANDLE);
    for (i, &v) in cells.iter().enumerate() {
        nk_matrix_set(m, (i / cols) as i32, (i % cols) as i32, v);
    }
    m
}

fn matrix_cells(m: NkHandle) -> Vec<f64> {
    let (rows, cols) = (nk_matrix_rows(m), nk_matrix_cols(m));
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| nk_matrix_get(m, r, c)))
        .collect()
}

#[test]
fn vector_sort_and_sum() {
    let v = nk_vector_create();
    for x in [3, 1, 2] {
        nk_vector_add(v, x);
    }
    nk_vector_sort(v);
    assert_eq!((0..3).map(|i| nk_vector_get(v, i)).collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(nk_vector_sum(v), 6);
    assert_eq!(nk_vector_size(v), 3);
    nk_vector_clear(v);
    assert_eq!(nk_vector_size(v), 0);
    nk_vector_destroy(v);
}

#[test]
fn iterator_walks_and_finds() {
    let data = [5, 7, 9];
    let it = unsafe { nk_iterator_create(data.as_ptr(), 3) };
    let mut seen = Vec::new();
    while nk_iterator_has_next(it) == 1 {
        seen.push(nk_iterator_next(it));
    }
    assert_eq!(seen, [5, 7, 9]);
    assert_eq!(nk_iterator_next(it), 0);

    nk_iterator_reset(it);
    assert_eq!(nk_iterator_find(it, 7), 1);
    assert_eq!(nk_iterator_next(it), 9);
    nk_iterator_reset(it);
    assert_eq!(nk_iterator_next(it), 5);
    assert_eq!(nk_iterator_find(it, 42), 0);
    assert_eq!(nk_iterator_next(it), 7);
    nk_iterator_destroy(it);
}

#[test]
fn iterator_snapshot_ignores_later_vector_changes() {
    let v = nk_vector_create();
    nk_vector_add(v, 1);
    let it = nk_iterator_from_vector(v);
    nk_vector_add(v, 2);
    assert_eq!(nk_iterator_next(it), 1);
    assert_eq!(nk_iterator_has_next(it), 0);
    nk_iterator_destroy(it);
    nk_vector_destroy(v);
}

#[test]
fn safe_get_out_of_bounds_leaves_output_alone() {
    let v = nk_vector_create();
    nk_vector_add(v, 10);
    let mut out = -99;
    let rc = unsafe { nk_safe_vector_get(v, 5, &mut out) };
    assert_eq!(rc, NkResultCode::OutOfBounds);
    assert_eq!(out, -99);
    assert!(last_error().contains("out of range"));
    assert!(nk_last_error_length() > 0);

    let rc = unsafe { nk_safe_vector_get(v, 0, &mut out) };
    assert_eq!(rc, NkResultCode::Success);
    assert_eq!(out, 10);
    // Success does not clear the previous message.
    assert!(last_error().contains("out of range"));
    nk_vector_destroy(v);
}

#[test]
fn null_handle_is_silent() {
    let v = nk_vector_create();
    assert_eq!(nk_vector_get(v, 3), 0);
    let before = last_error();
    assert!(!before.is_empty());

    assert_eq!(nk_vector_get(NK_NULL_HANDLE, 0), 0);
    assert_eq!(nk_vector_size(NK_NULL_HANDLE), 0);
    assert_eq!(nk_matrix_get(NK_NULL_HANDLE, 0, 0), 0.0);
    assert_eq!(nk_buffer_get(NK_NULL_HANDLE, 0), 0.0);
    assert_eq!(nk_function_call(NK_NULL_HANDLE, 1.0, 2.0), 0.0);
    assert_eq!(cstr(nk_string_get_cstr(NK_NULL_HANDLE)), "");
    nk_vector_destroy(NK_NULL_HANDLE);

    let mut out = 0;
    let rc = unsafe { nk_safe_vector_get(NK_NULL_HANDLE, 0, &mut out) };
    assert_eq!(rc, NkResultCode::NullPointer);
    assert_eq!(last_error(), before);
    nk_vector_destroy(v);
}

#[test]
fn destroyed_handle_is_detected() {
    let v = nk_vector_create();
    nk_vector_destroy(v);
    assert_eq!(nk_vector_size(v), 0);
    assert!(last_error().contains("stale"));
    assert_eq!(nk_handle_is_valid(v), 0);

    // A handle of another kind is rejected the same way.
    let s = unsafe { nk_string_create(c"x".as_ptr()) };
    assert_eq!(nk_vector_size(s), 0);
    assert!(last_error().contains("vector"));
    nk_string_destroy(s);
}

#[test]
fn multiply_shape_mismatch() {
    let a = matrix_from(2, 3, &[1.0; 6]);
    let b = matrix_from(2, 3, &[1.0; 6]);
    assert_eq!(nk_matrix_multiply(a, b), NK_NULL_HANDLE);
    assert!(last_error().contains("don't match"));

    let mut out = NK_NULL_HANDLE;
    let rc = unsafe { nk_safe_matrix_multiply(a, b, &mut out) };
    assert_eq!(rc, NkResultCode::InvalidOperation);
    assert_eq!(out, NK_NULL_HANDLE);
    nk_matrix_destroy(a);
    nk_matrix_destroy(b);
}

#[test]
fn matrix_product_and_text() {
    let a = matrix_from(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = matrix_from(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
    let mut c = NK_NULL_HANDLE;
    assert_eq!(unsafe { nk_safe_matrix_multiply(a, b, &mut c) }, NkResultCode::Success);
    assert_eq!(matrix_cells(c), [58.0, 64.0, 139.0, 154.0]);

    let text = nk_matrix_to_string(c);
    assert_eq!(cstr(text), "58 64\n139 154\n");
    unsafe { nk_free_string(text) };

    assert_eq!(nk_safe_matrix_set(c, 2, 0, 1.0), NkResultCode::OutOfBounds);
    let mut cell = 0.0;
    assert_eq!(unsafe { nk_safe_matrix_get(c, 1, 1, &mut cell) }, NkResultCode::Success);
    assert_eq!(cell, 154.0);
    for m in [a, b, c] {
        nk_matrix_destroy(m);
    }
}

#[test]
fn string_views_follow_mutation() {
    let s = unsafe { nk_string_create(c"World".as_ptr()) };
    unsafe {
        nk_string_prepend(s, c"Hello, ".as_ptr());
        nk_string_append(s, c"!".as_ptr());
        nk_string_append(s, std::ptr::null());
    }
    assert_eq!(cstr(nk_string_get_cstr(s)), "Hello, World!");
    assert_eq!(nk_string_length(s), 13);
    nk_string_to_upper(s);
    assert_eq!(cstr(nk_string_get_cstr(s)), "HELLO, WORLD!");
    nk_string_reverse(s);
    assert_eq!(cstr(nk_string_get_cstr(s)), "!DLROW ,OLLEH");
    nk_string_destroy(s);

    let empty = unsafe { nk_string_create(std::ptr::null()) };
    assert_eq!(nk_string_length(empty), 0);
    nk_string_destroy(empty);
}

#[test]
fn buffer_ignores_out_of_range() {
    let b = nk_buffer_create(4);
    assert_eq!(nk_buffer_size(b), 4);
    nk_buffer_set(b, 1, 2.5);
    nk_buffer_set(b, 4, 9.0);
    nk_buffer_set(b, -1, 9.0);
    assert_eq!(nk_buffer_get(b, 1), 2.5);
    assert_eq!(nk_buffer_get(b, 4), 0.0);
    assert_eq!(nk_buffer_get(b, 0), 0.0);
    nk_buffer_destroy(b);
    assert_eq!(nk_buffer_create(-1), NK_NULL_HANDLE);
}

#[test]
fn functions_apply_their_operation() {
    let add = nk_function_create_add();
    let mul = nk_function_create_multiply();
    let pow = nk_function_create_power();
    assert_eq!(nk_function_call(add, 2.0, 3.0), 5.0);
    assert_eq!(nk_function_call(mul, 2.0, 3.0), 6.0);
    assert_eq!(nk_function_call(pow, 2.0, 10.0), 1024.0);
    assert_eq!(nk_function_create(7), NK_NULL_HANDLE);
    for f in [add, mul, pow] {
        nk_function_destroy(f);
    }
}

#[test]
fn handles_cross_threads() {
    let v = nk_vector_create();
    std::thread::spawn(move || nk_vector_add(v, 41)).join().unwrap();
    assert_eq!(nk_vector_get(v, 0), 41);
    nk_vector_destroy(v);
}

#[test]
fn error_copy_into_small_buffer() {
    let _ = nk_vector_get(NK_NULL_HANDLE.wrapping_add(1), 0);
    let full = last_error();
    assert!(!full.is_empty());
    let mut buf = [0x7f as c_char; 5];
    let written = unsafe { nk_last_error_copy(buf.as_mut_ptr(), 5) };
    assert_eq!(written, 4);
    assert_eq!(cstr(buf.as_ptr()), &full[..4]);
}

fn dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..5, 1usize..5, 1usize..5)
}

proptest! {
    #[test]
    fn multiply_matches_dot_products(
        (n, k, m) in dims(),
        seed in proptest::collection::vec(-100i32..100, 32),
    ) {
        let a_cells: Vec<f64> = (0..n * k).map(|i| f64::from(seed[i % seed.len()])).collect();
        let b_cells: Vec<f64> = (0..k * m).map(|i| f64::from(seed[(i + 7) % seed.len()])).collect();
        let a = matrix_from(n, k, &a_cells);
        let b = matrix_from(k, m, &b_cells);
        let c = nk_matrix_multiply(a, b);
        prop_assert_eq!(nk_matrix_rows(c), n as i32);
        prop_assert_eq!(nk_matrix_cols(c), m as i32);
        for i in 0..n {
            for j in 0..m {
                let expected: f64 = (0..k).map(|t| a_cells[i * k + t] * b_cells[t * m + j]).sum();
                prop_assert_eq!(nk_matrix_get(c, i as i32, j as i32), expected);
            }
        }
        for h in [a, b, c] {
            nk_matrix_destroy(h);
        }
    }

    #[test]
    fn transpose_twice_is_identity(
        rows in 1usize..6,
        cols in 1usize..6,
        cells in proptest::collection::vec(-1.0e6f64..1.0e6, 36),
    ) {
        let a = matrix_from(rows, cols, &cells[..rows * cols]);
        let t = nk_matrix_transpose(a);
        prop_assert_eq!(nk_matrix_rows(t), cols as i32);
        let tt = nk_matrix_transpose(t);
        prop_assert_eq!(matrix_cells(tt), matrix_cells(a));
        for h in [a, t, tt] {
            nk_matrix_destroy(h);
        }
    }

    #[test]
    fn sorted_vector_is_ordered(values in proptest::collection::vec(any::<i32>(), 0..64)) {
        let v = nk_vector_create();
        for &x in &values {
            nk_vector_add(v, x);
        }
        nk_vector_sort(v);
        let got: Vec<i32> = (0..nk_vector_size(v)).map(|i| nk_vector_get(v, i)).collect();
        let mut expected = values.clone();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
        nk_vector_destroy(v);
    }

    #[test]
    fn statistics_are_bounded(values in proptest::collection::vec(-1.0e3f64..1.0e3, 1..64)) {
        let n = values.len() as i32;
        let (mean, var, sd) = unsafe {
            (
                nk_calculate_mean_double(values.as_ptr(), n),
                nk_calculate_variance(values.as_ptr(), n),
                nk_calculate_standard_deviation(values.as_ptr(), n),
            )
        };
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(mean >= lo - 1e-9 && mean <= hi + 1e-9);
        prop_assert!(var >= 0.0);
        prop_assert!((sd * sd - var).abs() <= 1e-6 * var.max(1.0));
    }
}
