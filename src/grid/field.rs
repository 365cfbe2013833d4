//! Named scalar field on the grid, with interpolation
use super::Grid;
use crate::error::{Error, Result};
use ndarray::{Array1, Array3};

/// Single precision field indexed `(lon, lat, time)`
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: String,
    data: Array3<f32>,
}

impl Field {
    /// Wrap data under a name. Shape checks happen in [`Grid::from_data`].
    pub(crate) fn new(name: String, data: Array3<f32>) -> Self {
        Self { name, data }
    }

    /// Field name, e.g. `"U"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw values
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Value at `(time, lon, lat)`.
    ///
    /// Bilinear in space and linear in time. A grid with a single
    /// time sample is treated as steady at that sample only.
    ///
    /// # Errors
    /// Position outside the lon/lat axes ([`Error::OutOfBounds`]) or
    /// time outside the time axis ([`Error::TimeOutOfRange`]).
    pub fn interpolate(&self, grid: &Grid, time: f64, lon: f64, lat: f64) -> Result<f64> {
        let (i, wx) = locate(grid.lon(), lon).ok_or(Error::OutOfBounds { lon, lat })?;
        let (j, wy) = locate(grid.lat(), lat).ok_or(Error::OutOfBounds { lon, lat })?;
        let (t, wt) = locate(grid.time(), time).ok_or(Error::TimeOutOfRange(time))?;
        let i1 = usize::min(i + 1, grid.lon().len() - 1);
        let j1 = usize::min(j + 1, grid.lat().len() - 1);
        let t1 = usize::min(t + 1, grid.time().len() - 1);

        let bilinear = |t: usize| {
            let d = |a: usize, b: usize| f64::from(self.data[[a, b, t]]);
            (1. - wx) * (1. - wy) * d(i, j)
                + wx * (1. - wy) * d(i1, j)
                + (1. - wx) * wy * d(i, j1)
                + wx * wy * d(i1, j1)
        };
        if wt == 0. {
            return Ok(bilinear(t));
        }
        Ok((1. - wt) * bilinear(t) + wt * bilinear(t1))
    }
}

/// Lower cell index and fractional offset of `x` on a strictly
/// increasing axis, `None` outside the axis
pub(crate) fn locate<A: Copy + Into<f64>>(axis: &Array1<A>, x: f64) -> Option<(usize, f64)> {
    let n = axis.len();
    if n == 0 {
        return None;
    }
    let first: f64 = axis[0].into();
    let last: f64 = axis[n - 1].into();
    if !(x >= first && x <= last) {
        return None;
    }
    if n == 1 {
        return Some((0, 0.));
    }
    // axis[lo] <= x <= axis[hi]
    let (mut lo, mut hi) = (0, n - 1);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        let xm: f64 = axis[mid].into();
        if xm <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let x0: f64 = axis[lo].into();
    let x1: f64 = axis[hi].into();
    Some((lo, (x - x0) / (x1 - x0)))
}
