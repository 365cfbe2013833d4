//! Steady western boundary current of the Stommel gyre.
//!
//! The test case is described in: N. Fabbroni, 2009,
//! Numerical Simulation of Passive tracers dispersion in the sea,
//! Ph.D. dissertation, University of Bologna
//! <http://amsdottorato.unibo.it/1733/1/Fabbroni_Nicoletta_Tesi.pdf>
use super::difference::{broadcast_time, central_difference};
use super::{check_dim, check_positive};
use crate::error::{Error, Result};
use crate::grid::{Grid, Mesh, P};
use crate::types::{linspace_f32, DAY};
use ndarray::{array, Array1, Array2, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Both fixtures are steady, two time samples spanning 100000 days
fn steady_time() -> Array1<f64> {
    array![0., 100_000. * DAY]
}

/// Exponential boundary layer form, coordinates in degrees
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StommelExponential {
    /// Number of longitudes in \[0, extent\]
    pub xdim: usize,
    /// Number of latitudes in \[0, extent\]
    pub ydim: usize,
    /// Size of the square domain in degrees
    pub extent: f64,
    /// Friction time scale in days
    pub day: f64,
    /// Meridional gradient of the Coriolis parameter
    pub beta: f64,
    /// Basin length scale in metres
    pub a: f64,
}

impl Default for StommelExponential {
    fn default() -> Self {
        Self {
            xdim: 200,
            ydim: 200,
            extent: 60.,
            day: 11.6,
            beta: 2e-11,
            a: 2_000_000.,
        }
    }
}

impl StommelExponential {
    fn validate(&self) -> Result<()> {
        check_dim("xdim", self.xdim, 1)?;
        check_dim("ydim", self.ydim, 1)?;
        check_positive("extent", self.extent)?;
        check_positive("day", self.day)?;
        check_positive("beta", self.beta)?;
        check_positive("a", self.a)?;
        Ok(())
    }

    /// Boundary layer parameter
    /// $$
    /// \epsilon_s = r / (\beta a), \quad r = 1 / (day \cdot 86400)
    /// $$
    pub fn boundary_layer(&self) -> f64 {
        let r = 1. / (self.day * DAY);
        r / (self.beta * self.a)
    }

    /// Zonal and meridional velocity at (lon, lat) in degrees
    pub fn velocity(&self, lon: f64, lat: f64) -> (f64, f64) {
        let e_s = self.boundary_layer();
        let x = lon * PI / 180.;
        let decay = (-x / e_s).exp();
        let arg = PI.powi(2) * lat / 180.;
        let u = -(1. - decay - x) * PI.powi(2) * arg.cos();
        let v = (decay / e_s - 1.) * PI * arg.sin();
        (u, v)
    }

    /// Streamfunction of the flow, reference for trajectories
    /// (particles follow its isolines)
    pub fn streamfunction(&self, lon: f64, lat: f64) -> f64 {
        let e_s = self.boundary_layer();
        let x = lon * PI / 180.;
        (1. - (-x / e_s).exp() - x) * PI * (PI.powi(2) * lat / 180.).sin()
    }
}

/// Simulate a current along a western boundary, with significantly
/// larger velocities along the western edge than the rest of the region.
///
/// Velocities are constant across the two time samples.
///
/// # Errors
/// Zero dimensions or non-positive physical constants.
#[allow(clippy::cast_possible_truncation)]
pub fn stommel_exponential_grid(params: &StommelExponential) -> Result<Grid> {
    params.validate()?;
    let depth = Array1::<f32>::zeros(1);
    let time = steady_time();

    // Coordinates of the test grid (on A-grid in deg)
    let lon = linspace_f32(0., params.extent, params.xdim);
    let lat = linspace_f32(0., params.extent, params.ydim);

    let mut u = Array2::<f32>::zeros((lon.len(), lat.len()));
    let mut v = Array2::<f32>::zeros((lon.len(), lat.len()));
    Zip::indexed(&mut u)
        .and(&mut v)
        .par_for_each(|(i, j), u, v| {
            let (ui, vi) = params.velocity(f64::from(lon[i]), f64::from(lat[j]));
            *u = ui as f32;
            *v = vi as f32;
        });

    let tdim = time.len();
    Grid::from_data(
        broadcast_time(&u, tdim),
        broadcast_time(&v, tdim),
        lon,
        lat,
        depth,
        time,
        BTreeMap::new(),
        Mesh::Spherical,
    )
}

/// Reference streamfunction of [`stommel_exponential_grid`] with default
/// constants, trajectories stay on its isolines
///
/// # Example
/// ```
/// use driftgrid::synth::stommel_exponential_streamfunction;
/// assert_eq!(stommel_exponential_streamfunction(0., 30.), 0.);
/// ```
pub fn stommel_exponential_streamfunction(lon: f64, lat: f64) -> f64 {
    StommelExponential::default().streamfunction(lon, lat)
}

/// Closed-form streamfunction form, coordinates in metres
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StommelStreamfunction {
    /// Number of x samples in \[0, a\]
    pub xdim: usize,
    /// Number of y samples in \[0, b\]
    pub ydim: usize,
    /// Zonal extent
    pub a: f64,
    /// Meridional extent
    pub b: f64,
    /// Dissipation
    pub eps: f64,
    /// Amplitude of the pressure field
    pub amplitude: f64,
}

impl Default for StommelStreamfunction {
    fn default() -> Self {
        Self {
            xdim: 200,
            ydim: 200,
            a: 10000.,
            b: 10000.,
            eps: 0.05,
            amplitude: 100.,
        }
    }
}

impl StommelStreamfunction {
    fn validate(&self) -> Result<()> {
        check_dim("xdim", self.xdim, 3)?;
        check_dim("ydim", self.ydim, 3)?;
        check_positive("a", self.a)?;
        check_positive("b", self.b)?;
        check_positive("eps", self.eps)?;
        if !self.amplitude.is_finite() {
            return Err(Error::invalid("amplitude", "must be finite"));
        }
        Ok(())
    }

    /// Decay rates `(l1, l2)`, roots of
    /// $$
    /// \epsilon \lambda^2 + \lambda - \pi^2 \epsilon = 0
    /// $$
    ///
    /// # Errors
    /// Non-positive `eps`, or roots which are not finite.
    pub fn decay_rates(&self) -> Result<(f64, f64)> {
        check_positive("eps", self.eps)?;
        let root = (1. + 4. * PI.powi(2) * self.eps.powi(2)).sqrt();
        let l1 = (-1. + root) / (2. * self.eps);
        let l2 = (-1. - root) / (2. * self.eps);
        if !(l1.is_finite() && l2.is_finite()) {
            return Err(Error::invalid(
                "eps",
                format!("decay rates are not finite (l1 = {}, l2 = {})", l1, l2),
            ));
        }
        Ok((l1, l2))
    }

    /// Normalization constants `(c1, c2)`, chosen such that the
    /// pressure vanishes at the western and eastern boundary
    ///
    /// # Errors
    /// Decay rates whose exponentials overflow or coincide.
    pub fn coefficients(&self) -> Result<(f64, f64)> {
        let (l1, l2) = self.decay_rates()?;
        let (e1, e2) = (l1.exp(), l2.exp());
        let c1 = (1. - e2) / (e2 - e1);
        let c2 = -(1. + c1);
        if !(e1.is_finite() && e2.is_finite() && c1.is_finite() && c2.is_finite()) {
            return Err(Error::invalid(
                "eps",
                format!("degenerate decay rates l1 = {}, l2 = {}", l1, l2),
            ));
        }
        Ok((c1, c2))
    }

    /// Pressure on the (lon, lat) mesh
    ///
    /// # Errors
    /// Invalid parameters
    #[allow(clippy::cast_possible_truncation)]
    pub fn pressure(&self, lon: &Array1<f32>, lat: &Array1<f32>) -> Result<Array2<f32>> {
        let (l1, l2) = self.decay_rates()?;
        let (c1, c2) = self.coefficients()?;
        let mut p = Array2::<f32>::zeros((lon.len(), lat.len()));
        Zip::indexed(&mut p).par_for_each(|(i, j), p| {
            let xi = f64::from(lon[i]) / self.a;
            let yi = f64::from(lat[j]) / self.b;
            *p = (self.amplitude
                * (c1 * (l1 * xi).exp() + c2 * (l2 * xi).exp() + 1.)
                * (PI * yi).sin()) as f32;
        });
        Ok(p)
    }
}

/// Stommel gyre from a closed-form pressure field.
///
/// Velocities follow by central differences of the pressure,
/// `V = dP/dx` and `U = -dP/dy`, with a spacing of `a/xdim` and `b/ydim`.
/// The outermost columns of `V` and rows of `U` stay zero.
///
/// # Errors
/// `xdim` or `ydim` below 3, non-positive extents or `eps`.
///
/// # Example
/// ```
/// use driftgrid::synth::{stommel_streamfunction_grid, StommelStreamfunction};
/// let params = StommelStreamfunction { xdim: 20, ydim: 30, ..Default::default() };
/// let grid = stommel_streamfunction_grid(&params).unwrap();
/// assert!(grid.field("P").is_ok());
/// assert_eq!(grid.v().data()[[0, 15, 0]], 0.);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn stommel_streamfunction_grid(params: &StommelStreamfunction) -> Result<Grid> {
    params.validate()?;
    let depth = Array1::<f32>::zeros(1);
    let time = steady_time();

    let lon = linspace_f32(0., params.a, params.xdim);
    let lat = linspace_f32(0., params.b, params.ydim);

    let p = params.pressure(&lon, &lat)?;
    let p64 = p.mapv(f64::from);
    let dpdx = central_difference(&p64, Axis(0), params.a / params.xdim as f64)?;
    let dpdy = central_difference(&p64, Axis(1), params.b / params.ydim as f64)?;
    let u = dpdy.mapv(|x| (-x) as f32);
    let v = dpdx.mapv(|x| x as f32);

    let tdim = time.len();
    let mut field_data = BTreeMap::new();
    field_data.insert(P.to_owned(), broadcast_time(&p, tdim));
    Grid::from_data(
        broadcast_time(&u, tdim),
        broadcast_time(&v, tdim),
        lon,
        lat,
        depth,
        time,
        field_data,
        Mesh::Flat,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::s;

    #[test]
    fn test_boundary_layer_parameter() {
        let params = StommelExponential::default();
        let r = 1. / (11.6 * 86400.);
        assert_relative_eq!(params.boundary_layer(), r / (2e-11 * 2e6), max_relative = 1e-12);
    }

    #[test]
    fn test_exponential_grid_matches_closed_form() {
        let params = StommelExponential {
            xdim: 31,
            ydim: 21,
            ..StommelExponential::default()
        };
        let grid = stommel_exponential_grid(&params).unwrap();
        assert_eq!(grid.mesh(), Mesh::Spherical);
        assert_eq!(grid.time().to_vec(), vec![0., 100_000. * DAY]);
        assert!(grid.field(P).is_err());
        for (i, j) in [(0, 0), (3, 7), (30, 20), (12, 11)] {
            let lon = f64::from(grid.lon()[i]);
            let lat = f64::from(grid.lat()[j]);
            let (u, v) = params.velocity(lon, lat);
            for t in 0..2 {
                assert_relative_eq!(
                    f64::from(grid.u().data()[[i, j, t]]),
                    u,
                    max_relative = 1e-6,
                    epsilon = 1e-5
                );
                assert_relative_eq!(
                    f64::from(grid.v().data()[[i, j, t]]),
                    v,
                    max_relative = 1e-6,
                    epsilon = 1e-5
                );
            }
        }
    }

    #[test]
    fn test_western_intensification() {
        let params = StommelExponential::default();
        let (_, v_west) = params.velocity(0.1, 10.);
        let (_, v_east) = params.velocity(50., 10.);
        assert!(v_west.abs() > 10. * v_east.abs());
    }

    #[test]
    fn test_streamfunction_zero_on_western_boundary() {
        let params = StommelExponential::default();
        for lat in [0., 10., 33.3, 60.] {
            assert_relative_eq!(params.streamfunction(0., lat), 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn test_decay_rates_solve_characteristic_equation() {
        let params = StommelStreamfunction::default();
        let (l1, l2) = params.decay_rates().unwrap();
        for l in [l1, l2] {
            let res = params.eps * l * l + l - PI.powi(2) * params.eps;
            assert_relative_eq!(res, 0., epsilon = 1e-9);
        }
        assert!(l1 > 0. && l2 < 0.);
    }

    #[test]
    fn test_pressure_vanishes_on_boundary() {
        let params = StommelStreamfunction {
            xdim: 41,
            ydim: 33,
            ..StommelStreamfunction::default()
        };
        let grid = stommel_streamfunction_grid(&params).unwrap();
        let p = grid.field(P).unwrap().data().slice(s![.., .., 0]).to_owned();
        let scale = params.amplitude as f32 * 1e-5;
        for v in p.row(0).iter().chain(p.row(40).iter()) {
            assert!(v.abs() < scale, "{}", v);
        }
        for v in p.column(0).iter().chain(p.column(32).iter()) {
            assert!(v.abs() < scale, "{}", v);
        }
        assert!(p[[20, 16]].abs() > 1.);
    }

    #[test]
    fn test_velocity_boundaries_are_zero() {
        for (xdim, ydim) in [(3, 3), (3, 10), (17, 4), (50, 60)] {
            let params = StommelStreamfunction {
                xdim,
                ydim,
                ..StommelStreamfunction::default()
            };
            let grid = stommel_streamfunction_grid(&params).unwrap();
            assert_eq!(grid.mesh(), Mesh::Flat);
            let u = grid.u().data();
            let v = grid.v().data();
            assert!(u.slice(s![.., 0, ..]).iter().all(|x| *x == 0.));
            assert!(u.slice(s![.., ydim - 1, ..]).iter().all(|x| *x == 0.));
            assert!(v.slice(s![0, .., ..]).iter().all(|x| *x == 0.));
            assert!(v.slice(s![xdim - 1, .., ..]).iter().all(|x| *x == 0.));
        }
    }

    #[test]
    fn test_velocity_is_centred_difference_of_pressure() {
        let params = StommelStreamfunction {
            xdim: 25,
            ydim: 25,
            ..StommelStreamfunction::default()
        };
        let grid = stommel_streamfunction_grid(&params).unwrap();
        let p = grid.field(P).unwrap().data();
        let (i, j) = (7, 11);
        let v = (f64::from(p[[i + 2, j, 1]]) - f64::from(p[[i, j, 1]])) / (2. * params.a / 25.);
        let u = -(f64::from(p[[i, j + 2, 1]]) - f64::from(p[[i, j, 1]])) / (2. * params.b / 25.);
        assert_relative_eq!(f64::from(grid.v().data()[[i + 1, j, 1]]), v, max_relative = 1e-5);
        assert_relative_eq!(f64::from(grid.u().data()[[i, j + 1, 1]]), u, max_relative = 1e-5);
    }

    #[test]
    fn test_invalid_streamfunction_parameters() {
        let too_small = StommelStreamfunction {
            xdim: 2,
            ..StommelStreamfunction::default()
        };
        assert!(matches!(
            stommel_streamfunction_grid(&too_small),
            Err(Error::InvalidParameter { name: "xdim", .. })
        ));
        let no_eps = StommelStreamfunction {
            eps: 0.,
            ..StommelStreamfunction::default()
        };
        assert!(stommel_streamfunction_grid(&no_eps).is_err());
        assert!(no_eps.decay_rates().is_err());
        let bad_extent = StommelExponential {
            beta: -1.,
            ..StommelExponential::default()
        };
        assert!(stommel_exponential_grid(&bad_extent).is_err());
    }

    #[test]
    fn test_overflowing_eps_is_rejected() {
        let huge_eps = StommelStreamfunction {
            xdim: 5,
            ydim: 5,
            eps: 1e200,
            ..StommelStreamfunction::default()
        };
        assert!(matches!(
            huge_eps.decay_rates(),
            Err(Error::InvalidParameter { name: "eps", .. })
        ));
        assert!(huge_eps.coefficients().is_err());
        assert!(stommel_streamfunction_grid(&huge_eps).is_err());

        // Large but representable eps still gives a finite field
        let large_eps = StommelStreamfunction {
            eps: 1e100,
            ..huge_eps
        };
        let grid = stommel_streamfunction_grid(&large_eps).unwrap();
        for field in grid.fields() {
            assert!(field.data().iter().all(|x| x.is_finite()), "{}", field.name());
        }
    }
}
