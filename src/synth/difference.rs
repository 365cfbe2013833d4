//! Central-difference gradient of a 2-dimensional scalar field
use crate::error::{Error, Result};
use crate::types::FloatNum;
use ndarray::{Array2, Array3, ArrayBase, Axis, Data, Ix2, Slice, Zip};

/// Derivative of `field` along `axis` by second order central differences
/// $$
/// out\[k\] = (f\[k+1\] - f\[k-1\]) / (2 h)
/// $$
/// The first and last index along `axis` have no centred stencil and
/// are left at exactly zero.
///
/// # Errors
/// Fewer than 3 samples along `axis`, or `h` not finite and positive.
///
/// # Example
/// ```
/// use driftgrid::synth::central_difference;
/// use ndarray::{array, Axis};
/// let f = array![[0., 0.], [1., 2.], [4., 8.], [9., 18.]];
/// let dfdx = central_difference(&f, Axis(0), 1.).unwrap();
/// assert_eq!(dfdx, array![[0., 0.], [2., 4.], [4., 8.], [0., 0.]]);
/// ```
pub fn central_difference<A, S>(field: &ArrayBase<S, Ix2>, axis: Axis, h: A) -> Result<Array2<A>>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let n = field.len_of(axis);
    if n < 3 {
        return Err(Error::invalid(
            "field",
            format!(
                "central difference along axis {} needs at least 3 points, got {}",
                axis.index(),
                n
            ),
        ));
    }
    if !(h.is_finite() && h > A::zero()) {
        return Err(Error::invalid(
            "h",
            format!("grid spacing must be finite and positive, got {:?}", h),
        ));
    }

    let two_h = h + h;
    let mut out = Array2::<A>::zeros(field.raw_dim());
    Zip::from(out.slice_axis_mut(axis, Slice::from(1..n - 1)))
        .and(field.slice_axis(axis, Slice::from(2..n)))
        .and(field.slice_axis(axis, Slice::from(..n - 2)))
        .par_for_each(|o, &fwd, &bwd| *o = (fwd - bwd) / two_h);
    Ok(out)
}

/// Replicate a steady 2-dimensional field along a trailing time axis
pub fn broadcast_time<A, S>(field: &ArrayBase<S, Ix2>, tdim: usize) -> Array3<A>
where
    A: Clone,
    S: Data<Elem = A>,
{
    let (nx, ny) = field.dim();
    Array3::from_shape_fn((nx, ny, tdim), |(i, j, _)| field[[i, j]].clone())
}
