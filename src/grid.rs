//! # Rectangular A-grid with named velocity fields
//!
//! All physical variables live on the same (lon, lat) points. Every field
//! of a grid shares the grid's coordinate axes and has shape
//! `(xdim, ydim, tdim)`. A grid is built once, either from raw arrays
//! ([`Grid::from_data`]) or from files ([`Grid::from_netcdf`],
//! [`Grid::from_nemo`]), and is not mutated afterwards.
pub mod field;
pub mod filenames;
pub mod io;
pub use field::Field;
pub use io::{Dimensions, NEMO_U, NEMO_V};

use crate::error::{Error, Result};
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Zonal velocity
pub const U: &str = "U";
/// Meridional velocity
pub const V: &str = "V";
/// Pressure / sea surface height
pub const P: &str = "P";

/// Metres per degree latitude (one nautical mile per arc minute)
const METERS_PER_DEGREE: f64 = 1852. * 60.;

/// Interpretation of the coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mesh {
    /// Longitude/latitude in degrees, velocities in m/s
    #[default]
    Spherical,
    /// Cartesian coordinates in metres, velocities in m/s
    Flat,
}

/// Grid of velocity (and optional auxiliary) fields
#[derive(Clone, Debug)]
pub struct Grid {
    lon: Array1<f32>,
    lat: Array1<f32>,
    depth: Array1<f32>,
    time: Array1<f64>,
    fields: BTreeMap<String, Field>,
    mesh: Mesh,
}

impl Grid {
    /// Construct grid from raw arrays.
    ///
    /// `u`, `v` and every entry of `field_data` are indexed
    /// `(lon, lat, time)`.
    ///
    /// # Errors
    /// Empty or non-increasing axes, or any field whose shape
    /// differs from `(lon.len(), lat.len(), time.len())`.
    ///
    /// # Example
    /// ```
    /// use driftgrid::grid::{Grid, Mesh};
    /// use ndarray::{array, Array3};
    /// use std::collections::BTreeMap;
    /// let u = Array3::<f32>::ones((3, 2, 1));
    /// let v = Array3::<f32>::zeros((3, 2, 1));
    /// let grid = Grid::from_data(
    ///     u, v, array![0., 1., 2.], array![10., 11.], array![0.], array![0.],
    ///     BTreeMap::new(), Mesh::Flat,
    /// ).unwrap();
    /// assert_eq!(grid.shape(), [3, 2, 1]);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn from_data(
        u: Array3<f32>,
        v: Array3<f32>,
        lon: Array1<f32>,
        lat: Array1<f32>,
        depth: Array1<f32>,
        time: Array1<f64>,
        field_data: BTreeMap<String, Array3<f32>>,
        mesh: Mesh,
    ) -> Result<Self> {
        check_axis("lon", lon.iter().map(|x| f64::from(*x)))?;
        check_axis("lat", lat.iter().map(|x| f64::from(*x)))?;
        check_axis("time", time.iter().copied())?;
        if depth.is_empty() {
            return Err(Error::invalid("depth", "axis is empty"));
        }

        let expected = [lon.len(), lat.len(), time.len()];
        let mut fields = BTreeMap::new();
        for (name, data) in [(U.to_owned(), u), (V.to_owned(), v)]
            .into_iter()
            .chain(field_data)
        {
            if data.shape() != expected {
                return Err(Error::ShapeMismatch {
                    field: name,
                    expected: expected.to_vec(),
                    got: data.shape().to_vec(),
                });
            }
            if fields.contains_key(&name) {
                return Err(Error::invalid(
                    "field_data",
                    format!("field `{}` given twice", name),
                ));
            }
            fields.insert(name.clone(), Field::new(name, data));
        }

        Ok(Self {
            lon,
            lat,
            depth,
            time,
            fields,
            mesh,
        })
    }

    /// Longitudes (degrees or metres)
    pub fn lon(&self) -> &Array1<f32> {
        &self.lon
    }

    /// Latitudes (degrees or metres)
    pub fn lat(&self) -> &Array1<f32> {
        &self.lat
    }

    /// Depth levels
    pub fn depth(&self) -> &Array1<f32> {
        &self.depth
    }

    /// Time samples in seconds
    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    /// Coordinate interpretation
    pub fn mesh(&self) -> Mesh {
        self.mesh
    }

    /// `[xdim, ydim, tdim]`
    pub fn shape(&self) -> [usize; 3] {
        [self.lon.len(), self.lat.len(), self.time.len()]
    }

    /// Field by name
    ///
    /// # Errors
    /// No field of that name
    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::MissingField(name.to_owned()))
    }

    /// Iterate over all fields, ordered by name
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Zonal velocity field
    pub fn u(&self) -> &Field {
        &self.fields[U]
    }

    /// Meridional velocity field
    pub fn v(&self) -> &Field {
        &self.fields[V]
    }

    /// Velocity at a position, in coordinate units per second.
    ///
    /// On a spherical mesh the stored m/s are converted to degrees/s.
    ///
    /// # Errors
    /// Position or time outside the grid
    pub fn velocity(&self, time: f64, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let u = self.u().interpolate(self, time, lon, lat)?;
        let v = self.v().interpolate(self, time, lon, lat)?;
        match self.mesh {
            Mesh::Flat => Ok((u, v)),
            Mesh::Spherical => Ok((
                u / (METERS_PER_DEGREE * lat.to_radians().cos()),
                v / METERS_PER_DEGREE,
            )),
        }
    }
}

/// Axis must be non-empty, finite and strictly increasing
fn check_axis<I: Iterator<Item = f64>>(name: &'static str, mut axis: I) -> Result<()> {
    let mut prev = match axis.next() {
        Some(x) => x,
        None => return Err(Error::invalid(name, "axis is empty")),
    };
    if !prev.is_finite() {
        return Err(Error::invalid(name, "axis contains non-finite values"));
    }
    for x in axis {
        if !x.is_finite() || x <= prev {
            if name == "time" {
                return Err(Error::NonMonotonicTime(x));
            }
            return Err(Error::invalid(
                name,
                format!("axis must be strictly increasing, found {} after {}", x, prev),
            ));
        }
        prev = x;
    }
    Ok(())
}
