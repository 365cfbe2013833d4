//! Uniform zonal flow which accelerates with time.
//!
//! Each day is one time slice, which makes the grid a convenient
//! fixture for multi-file loading: write one grid per day and
//! reload them into a single continuous time axis.
use super::check_dim;
use crate::error::{Error, Result};
use crate::grid::{Grid, Mesh, P};
use crate::types::{linspace_f32, DAY};
use ndarray::{Array1, Array3, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters of the accelerating zonal flow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleGrid {
    /// Number of longitudes in \[0, 4\]
    pub xdim: usize,
    /// Number of latitudes in \[45, 52\]
    pub ydim: usize,
    /// Number of daily time samples
    pub ndays: usize,
    /// Day offset of the first time sample
    pub startday: i64,
}

impl Default for SimpleGrid {
    fn default() -> Self {
        Self {
            xdim: 200,
            ydim: 350,
            ndays: 25,
            startday: 0,
        }
    }
}

impl SimpleGrid {
    /// Daily time axis in seconds, starting at `startday`
    ///
    /// # Errors
    /// Day numbers overflow `i64`
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> Result<Array1<f64>> {
        (0..self.ndays)
            .map(|t| {
                i64::try_from(t)
                    .ok()
                    .and_then(|t| self.startday.checked_add(t))
                    .map(|day| day as f64 * DAY)
                    .ok_or_else(|| {
                        Error::invalid(
                            "startday",
                            format!("day {} + {} overflows", self.startday, t),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

/// Generate the accelerating zonal flow
///
/// `U[:, :, t] = time[t] / 86400`, `V` and `P` are zero.
///
/// # Errors
/// `xdim`, `ydim` or `ndays` is zero, or the day numbers overflow.
///
/// # Example
/// ```
/// use driftgrid::synth::{simple_grid, SimpleGrid};
/// let params = SimpleGrid { xdim: 4, ydim: 5, ndays: 3, startday: 2 };
/// let grid = simple_grid(&params).unwrap();
/// assert_eq!(grid.time().to_vec(), vec![2. * 86400., 3. * 86400., 4. * 86400.]);
/// assert_eq!(grid.u().data()[[1, 2, 0]], 2.);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn simple_grid(params: &SimpleGrid) -> Result<Grid> {
    check_dim("xdim", params.xdim, 1)?;
    check_dim("ydim", params.ydim, 1)?;
    check_dim("ndays", params.ndays, 1)?;

    let depth = Array1::<f32>::zeros(1);
    let time = params.time()?;

    // Coordinates of the test grid (on A-grid in deg)
    let lon = linspace_f32(0., 4., params.xdim);
    let lat = linspace_f32(45., 52., params.ydim);

    let shape = (lon.len(), lat.len(), time.len());
    let mut u = Array3::<f32>::zeros(shape);
    let v = Array3::<f32>::zeros(shape);
    let p = Array3::<f32>::zeros(shape);

    Zip::indexed(&mut u).par_for_each(|(_, _, t), u| *u = (time[t] / DAY) as f32);

    let mut field_data = BTreeMap::new();
    field_data.insert(P.to_owned(), p);
    Grid::from_data(u, v, lon, lat, depth, time, field_data, Mesh::Spherical)
}
