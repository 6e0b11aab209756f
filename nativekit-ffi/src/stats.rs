//! Descriptive statistics, written once over [`Sample`] and exported for
//! `f64` and `f32`.

use std::ops::{Add, Div, Mul, Sub};

use crate::ffi::{catch_or, slice_from};

/// Floating-point element type the reducers work on.
pub trait Sample:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;

    /// `n` converted to `Self`, used to divide by the element count.
    fn from_count(n: usize) -> Self;

    fn sqrt(self) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                const ZERO: Self = 0.0;

                #[inline]
                fn from_count(n: usize) -> Self {
                    n as $t
                }

                #[inline]
                fn sqrt(self) -> Self {
                    <$t>::sqrt(self)
                }
            }
        )*
    };
}

impl_sample!(f32, f64);

fn sum<T: Sample>(values: &[T]) -> T {
    values.iter().fold(T::ZERO, |acc, &v| acc + v)
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean<T: Sample>(values: &[T]) -> T {
    if values.is_empty() {
        return T::ZERO;
    }
    sum(values) / T::from_count(values.len())
}

/// Population variance (mean squared deviation); zero for an empty slice.
pub fn variance<T: Sample>(values: &[T]) -> T {
    if values.is_empty() {
        return T::ZERO;
    }
    let m = mean(values);
    let squared = values.iter().fold(T::ZERO, |acc, &v| {
        let d = v - m;
        acc + d * d
    });
    squared / T::from_count(values.len())
}

pub fn standard_deviation<T: Sample>(values: &[T]) -> T {
    variance(values).sqrt()
}

/// Mean of `values[0..count]`; 0 for a null pointer or non-positive count.
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_mean_double(values: *const f64, count: i32) -> f64 {
    catch_or(0.0, || Ok(mean(unsafe { slice_from(values, count) })))
}

/// Single-precision [`nk_calculate_mean_double`].
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_mean_float(values: *const f32, count: i32) -> f32 {
    catch_or(0.0, || Ok(mean(unsafe { slice_from(values, count) })))
}

/// Population variance of `values[0..count]`.
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_variance(values: *const f64, count: i32) -> f64 {
    catch_or(0.0, || Ok(variance(unsafe { slice_from(values, count) })))
}

/// Single-precision [`nk_calculate_variance`].
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_variance_float(values: *const f32, count: i32) -> f32 {
    catch_or(0.0, || Ok(variance(unsafe { slice_from(values, count) })))
}

/// Population standard deviation of `values[0..count]`.
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_standard_deviation(values: *const f64, count: i32) -> f64 {
    catch_or(0.0, || {
        Ok(standard_deviation(unsafe { slice_from(values, count) }))
    })
}

/// Single-precision [`nk_calculate_standard_deviation`].
///
/// # Safety
///
/// If non-null, `values` must point to `count` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_calculate_standard_deviation_float(
    values: *const f32,
    count: i32,
) -> f32 {
    catch_or(0.0, || {
        Ok(standard_deviation(unsafe { slice_from(values, count) }))
    })
}
