//! # Advection kernels
//!
//! Each kernel moves a particle by one time step through the velocity
//! field of a [`Grid`]. A kernel either commits the full step or leaves
//! the particle untouched and returns the error.
use super::Particle;
use crate::error::{Error, Result};
use crate::grid::Grid;
use std::str::FromStr;

/// Move a particle through the grid velocity
#[enum_dispatch]
pub trait Advect {
    /// Advance `particle` from `particle.time` to `particle.time + dt`
    ///
    /// # Errors
    /// Velocity sampled outside the grid
    fn advect(&self, grid: &Grid, particle: &mut Particle, dt: f64) -> Result<()>;
}

/// Integration method, dispatching to the kernels
#[enum_dispatch(Advect)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Method {
    /// Explicit Euler
    AdvectionEE,
    /// Classical Runge-Kutta 4
    AdvectionRK4,
    /// Adaptive Cash-Karp Runge-Kutta 4(5)
    AdvectionRK45,
}

impl Method {
    /// Method from its short name (`EE`, `RK4`, `RK45`), case insensitive
    ///
    /// # Errors
    /// Unknown name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "EE" => Ok(AdvectionEE.into()),
            "RK4" => Ok(AdvectionRK4.into()),
            "RK45" => Ok(AdvectionRK45::default().into()),
            _ => Err(Error::UnknownMethod(name.to_owned())),
        }
    }

    /// Short name
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdvectionEE(_) => "EE",
            Self::AdvectionRK4(_) => "RK4",
            Self::AdvectionRK45(_) => "RK45",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Explicit Euler
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdvectionEE;

impl Advect for AdvectionEE {
    fn advect(&self, grid: &Grid, particle: &mut Particle, dt: f64) -> Result<()> {
        let (u, v) = grid.velocity(particle.time, particle.lon, particle.lat)?;
        particle.lon += u * dt;
        particle.lat += v * dt;
        particle.time += dt;
        Ok(())
    }
}

/// Classical fourth order Runge-Kutta
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdvectionRK4;

impl Advect for AdvectionRK4 {
    fn advect(&self, grid: &Grid, particle: &mut Particle, dt: f64) -> Result<()> {
        let (lon, lat, t) = (particle.lon, particle.lat, particle.time);
        let (u1, v1) = grid.velocity(t, lon, lat)?;
        let (lon1, lat1) = (lon + u1 * 0.5 * dt, lat + v1 * 0.5 * dt);
        let (u2, v2) = grid.velocity(t + 0.5 * dt, lon1, lat1)?;
        let (lon2, lat2) = (lon + u2 * 0.5 * dt, lat + v2 * 0.5 * dt);
        let (u3, v3) = grid.velocity(t + 0.5 * dt, lon2, lat2)?;
        let (lon3, lat3) = (lon + u3 * dt, lat + v3 * dt);
        let (u4, v4) = grid.velocity(t + dt, lon3, lat3)?;
        particle.lon += (u1 + 2. * u2 + 2. * u3 + u4) / 6. * dt;
        particle.lat += (v1 + 2. * v2 + 2. * v3 + v4) / 6. * dt;
        particle.time += dt;
        Ok(())
    }
}

/// Cash-Karp Runge-Kutta 4(5) with step size control.
///
/// One outer step `dt` is covered by sub-steps, halved while the
/// embedded error estimate exceeds `tolerance` (coordinate units),
/// doubled again when it falls below a tenth of it. Sub-steps never
/// shrink below `dt / 1024`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvectionRK45 {
    /// Accepted error per sub-step
    pub tolerance: f64,
}

impl Default for AdvectionRK45 {
    fn default() -> Self {
        Self { tolerance: 1e-5 }
    }
}

const CK_C: [f64; 6] = [0., 1. / 5., 3. / 10., 3. / 5., 1., 7. / 8.];
const CK_A: [[f64; 5]; 6] = [
    [0., 0., 0., 0., 0.],
    [1. / 5., 0., 0., 0., 0.],
    [3. / 40., 9. / 40., 0., 0., 0.],
    [3. / 10., -9. / 10., 6. / 5., 0., 0.],
    [-11. / 54., 5. / 2., -70. / 27., 35. / 27., 0.],
    [
        1631. / 55296.,
        175. / 512.,
        575. / 13824.,
        44275. / 110_592.,
        253. / 4096.,
    ],
];
const CK_B5: [f64; 6] = [37. / 378., 0., 250. / 621., 125. / 594., 0., 512. / 1771.];
const CK_B4: [f64; 6] = [
    2825. / 27648.,
    0.,
    18575. / 48384.,
    13525. / 55296.,
    277. / 14336.,
    1. / 4.,
];

impl AdvectionRK45 {
    /// Fifth order position and embedded error estimate of one sub-step
    #[allow(clippy::needless_range_loop)]
    fn cash_karp(grid: &Grid, t: f64, lon: f64, lat: f64, h: f64) -> Result<(f64, f64, f64)> {
        let mut k = [(0., 0.); 6];
        for s in 0..6 {
            let (mut x, mut y) = (lon, lat);
            for r in 0..s {
                x += h * CK_A[s][r] * k[r].0;
                y += h * CK_A[s][r] * k[r].1;
            }
            k[s] = grid.velocity(t + CK_C[s] * h, x, y)?;
        }
        let (mut x5, mut y5, mut x4, mut y4) = (lon, lat, lon, lat);
        for s in 0..6 {
            x5 += h * CK_B5[s] * k[s].0;
            y5 += h * CK_B5[s] * k[s].1;
            x4 += h * CK_B4[s] * k[s].0;
            y4 += h * CK_B4[s] * k[s].1;
        }
        Ok((x5, y5, f64::max((x5 - x4).abs(), (y5 - y4).abs())))
    }

    /// Advance `particle` by `dt`, returns the number of accepted sub-steps
    fn adaptive_step(&self, grid: &Grid, particle: &mut Particle, dt: f64) -> Result<usize> {
        let h_min = dt / 1024.;
        let (mut lon, mut lat, mut t) = (particle.lon, particle.lat, particle.time);
        let mut remaining = dt;
        let mut h = dt;
        let mut accepted = 0;
        while remaining > 0. {
            h = h.min(remaining);
            let (x, y, err) = Self::cash_karp(grid, t, lon, lat, h)?;
            if err <= self.tolerance || h <= h_min {
                lon = x;
                lat = y;
                t += h;
                remaining -= h;
                accepted += 1;
                if err < self.tolerance / 10. {
                    h *= 2.;
                }
            } else {
                h = f64::max(h / 2., h_min);
            }
        }
        particle.lon = lon;
        particle.lat = lat;
        particle.time += dt;
        Ok(accepted)
    }
}

impl Advect for AdvectionRK45 {
    fn advect(&self, grid: &Grid, particle: &mut Particle, dt: f64) -> Result<()> {
        self.adaptive_step(grid, particle, dt).map(|_| ())
    }
}
