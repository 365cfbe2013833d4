//! Types and traits for real numbers
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// Floating point type, used throughout this crate for field arithmetic
/// (`f32` for stored fields, `f64` for coordinates and time)
pub trait FloatNum:
    Float + FromPrimitive + Debug + Send + Sync + SubAssign + AddAssign + MulAssign + DivAssign + 'static
{
}

impl<T> FloatNum for T where
    T: Float
        + FromPrimitive
        + Debug
        + Send
        + Sync
        + SubAssign
        + AddAssign
        + MulAssign
        + DivAssign
        + 'static
{
}

/// Seconds per day
pub const DAY: f64 = 86400.;

/// Evenly spaced samples over `[start, stop]` (both inclusive),
/// single precision like the stored coordinate axes.
///
/// A single sample returns `[start]`.
#[allow(clippy::cast_precision_loss)]
pub fn linspace_f32(start: f64, stop: f64, n: usize) -> ndarray::Array1<f32> {
    if n == 1 {
        return ndarray::Array1::from_elem(1, start as f32);
    }
    let step = (stop - start) / (n - 1) as f64;
    ndarray::Array1::from_shape_fn(n, |i| (start + step * i as f64) as f32)
}
