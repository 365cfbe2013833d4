//! # Lagrangian particles
//!
//! A [`ParticleSet`] is released on a grid and stepped through its
//! velocity field with one of the [`Method`]s. Positions can be written
//! to a [`ParticleFile`] at fixed output intervals.
//!
//! # Example
//! ```
//! use driftgrid::particles::{AdvectionRK4, ParticleSet};
//! use driftgrid::synth::{stommel_streamfunction_grid, StommelStreamfunction};
//! let grid = stommel_streamfunction_grid(&StommelStreamfunction {
//!     xdim: 50,
//!     ydim: 50,
//!     ..Default::default()
//! })
//! .unwrap();
//! let mut pset = ParticleSet::from_line(1, (100., 5000.), (100., 5000.)).unwrap();
//! pset.execute(&grid, AdvectionRK4.into(), 3600., 300., None, None).unwrap();
//! assert_eq!(pset[0].time, 3600.);
//! ```
pub mod kernels;
pub mod particle_file;
pub use kernels::{Advect, AdvectionEE, AdvectionRK4, AdvectionRK45, Method};
pub use particle_file::ParticleFile;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::Integrate;
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::fmt;
use std::ops::Index;
use tracing::{info, warn};

/// Life cycle of a particle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Advected every step
    Alive,
    /// Left the grid, frozen at its last position
    OutOfBounds,
}

/// Single particle
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Index within its set
    pub id: u32,
    /// Longitude / x
    pub lon: f64,
    /// Latitude / y
    pub lat: f64,
    /// Time in seconds
    pub time: f64,
    /// Alive or frozen
    pub state: State,
}

impl Particle {
    fn new(id: u32, lon: f64, lat: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            time: 0.,
            state: State::Alive,
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({:.6}, {:.6})[{:.1}]", self.lon, self.lat, self.time)
    }
}

/// Collection of particles
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    /// `size` particles evenly spaced on the line from `start` to
    /// `finish` (both included). A single particle sits at `start`.
    ///
    /// # Errors
    /// `size` is zero
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_line(size: usize, start: (f64, f64), finish: (f64, f64)) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid("size", "particle set must not be empty"));
        }
        let step = |a: f64, b: f64, i: usize| {
            if size == 1 {
                a
            } else {
                a + (b - a) * i as f64 / (size - 1) as f64
            }
        };
        let particles = (0..size)
            .map(|i| Particle::new(i as u32, step(start.0, finish.0, i), step(start.1, finish.1, i)))
            .collect();
        Ok(Self { particles })
    }

    /// `size` particles uniformly distributed in the box
    /// `lon_range` x `lat_range`
    ///
    /// # Errors
    /// `size` is zero or a range is empty
    #[allow(clippy::cast_possible_truncation)]
    pub fn random(size: usize, lon_range: (f64, f64), lat_range: (f64, f64)) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid("size", "particle set must not be empty"));
        }
        for (name, (lo, hi)) in [("lon_range", lon_range), ("lat_range", lat_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(Error::invalid(
                    name,
                    format!("expected finite lower < upper, got ({}, {})", lo, hi),
                ));
            }
        }
        let lon: Array1<f64> = Array1::random(size, Uniform::new(lon_range.0, lon_range.1));
        let lat: Array1<f64> = Array1::random(size, Uniform::new(lat_range.0, lat_range.1));
        let particles = lon
            .iter()
            .zip(lat.iter())
            .enumerate()
            .map(|(i, (x, y))| Particle::new(i as u32, *x, *y))
            .collect();
        Ok(Self { particles })
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Never true for sets built by the constructors
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Iterate over particles
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Number of particles still advected
    pub fn alive(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.state == State::Alive)
            .count()
    }

    /// Advect all alive particles with `method` from their current time up
    /// to `endtime`, in steps of `dt` (seconds).
    ///
    /// The run starts at the earliest time of an alive particle. Particles
    /// ahead of that time wait until the run catches up with them. The last
    /// step is shortened so that no particle passes `endtime`.
    ///
    /// Initial positions and positions every `interval` after the start
    /// are recorded to `output`. Particles leaving the grid are frozen,
    /// see [`State`].
    ///
    /// # Errors
    /// Non-positive `dt` or `interval`, `endtime` not after the start,
    /// or a failing output.
    pub fn execute(
        &mut self,
        grid: &Grid,
        method: Method,
        endtime: f64,
        dt: f64,
        interval: Option<f64>,
        mut output: Option<&mut ParticleFile>,
    ) -> Result<()> {
        if !(dt.is_finite() && dt > 0.) {
            return Err(Error::invalid("dt", format!("must be positive, got {}", dt)));
        }
        if let Some(interval) = interval {
            if !(interval.is_finite() && interval > 0.) {
                return Err(Error::invalid(
                    "interval",
                    format!("must be positive, got {}", interval),
                ));
            }
        }
        if self.alive() == 0 {
            info!("No alive particles, nothing to advect");
            return Ok(());
        }
        let start = self
            .particles
            .iter()
            .filter(|p| p.state == State::Alive)
            .map(|p| p.time)
            .fold(f64::INFINITY, f64::min);
        if endtime.is_nan() || endtime <= start {
            return Err(Error::invalid(
                "endtime",
                format!("must lie after the start time {}, got {}", start, endtime),
            ));
        }

        info!(
            "Advecting {} particles with {} until t = {} s (dt = {} s)",
            self.len(),
            method.name(),
            endtime,
            dt
        );
        if let Some(out) = output.as_deref_mut() {
            out.record(self, start)?;
        }
        let mut execution = Execution {
            pset: self,
            grid,
            method,
            time: start,
            dt,
            output,
        };
        crate::integrate(&mut execution, endtime, interval)
    }
}

impl Index<usize> for ParticleSet {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.particles[index]
    }
}

impl fmt::Display for ParticleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.particles {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}

/// Running advection, stepped by [`crate::integrate`]
struct Execution<'a, 'o> {
    pset: &'a mut ParticleSet,
    grid: &'a Grid,
    method: Method,
    time: f64,
    dt: f64,
    output: Option<&'o mut ParticleFile>,
}

impl Integrate for Execution<'_, '_> {
    fn update(&mut self, until: f64) -> Result<()> {
        let target = f64::min(self.time + self.dt, until);
        for p in self.pset.particles.iter_mut() {
            // Frozen, or ahead of the run
            if p.state != State::Alive || p.time >= target {
                continue;
            }
            match self.method.advect(self.grid, p, target - p.time) {
                Ok(()) => p.time = target,
                Err(e) if e.is_out_of_domain() => {
                    warn!("Particle {} stopped at {}: {}", p.id, p, e);
                    p.state = State::OutOfBounds;
                }
                Err(e) => return Err(e),
            }
        }
        self.time = target;
        Ok(())
    }

    fn get_time(&self) -> f64 {
        self.time
    }

    fn get_dt(&self) -> f64 {
        self.dt
    }

    fn callback(&mut self) -> Result<()> {
        if let Some(out) = self.output.as_deref_mut() {
            out.record(self.pset, self.time)?;
        }
        Ok(())
    }

    fn exit(&mut self) -> bool {
        self.pset.alive() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Mesh;
    use crate::synth::{stommel_exponential_grid, StommelExponential};
    use crate::types::{linspace_f32, DAY};
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};
    use std::collections::BTreeMap;

    /// Flat grid on [0, 4] x [45, 52] with U = t / 86400, V = 0
    fn accelerating_flat_grid() -> Grid {
        let time = array![0., DAY];
        let u = Array3::from_shape_fn((5, 8, 2), |(_, _, t)| t as f32);
        Grid::from_data(
            u,
            Array3::zeros((5, 8, 2)),
            linspace_f32(0., 4., 5),
            linspace_f32(45., 52., 8),
            array![0.],
            time,
            BTreeMap::new(),
            Mesh::Flat,
        )
        .unwrap()
    }

    fn uniform_grid(mesh: Mesh, lon: (f64, f64), lat: (f64, f64)) -> Grid {
        Grid::from_data(
            Array3::from_elem((3, 3, 2), 1.),
            Array3::zeros((3, 3, 2)),
            linspace_f32(lon.0, lon.1, 3),
            linspace_f32(lat.0, lat.1, 3),
            array![0.],
            array![0., DAY],
            BTreeMap::new(),
            mesh,
        )
        .unwrap()
    }

    #[test]
    fn test_from_line() {
        let pset = ParticleSet::from_line(3, (10., 50.), (7., 30.)).unwrap();
        let pos: Vec<(f64, f64)> = pset.iter().map(|p| (p.lon, p.lat)).collect();
        assert_eq!(pos, vec![(10., 50.), (8.5, 40.), (7., 30.)]);
        let ids: Vec<u32> = pset.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let single = ParticleSet::from_line(1, (100., 5000.), (200., 6000.)).unwrap();
        assert_eq!((single[0].lon, single[0].lat), (100., 5000.));
        assert!(ParticleSet::from_line(0, (0., 0.), (1., 1.)).is_err());
    }

    #[test]
    fn test_random_inside_box() {
        let pset = ParticleSet::random(50, (1., 2.), (45., 46.)).unwrap();
        assert_eq!(pset.len(), 50);
        assert!(pset
            .iter()
            .all(|p| (1. ..2.).contains(&p.lon) && (45. ..46.).contains(&p.lat)));
        assert!(ParticleSet::random(5, (2., 1.), (45., 46.)).is_err());
    }

    #[test]
    fn test_rk4_exact_for_linear_in_time_flow() {
        let grid = accelerating_flat_grid();
        for method in [Method::from(AdvectionRK4), AdvectionRK45::default().into()] {
            let mut pset = ParticleSet::from_line(1, (1., 48.), (1., 48.)).unwrap();
            pset.execute(&grid, method, 600., 60., None, None).unwrap();
            // x(t) = x0 + t^2 / (2 * 86400)
            assert_relative_eq!(pset[0].lon, 1. + 600f64.powi(2) / (2. * DAY), epsilon = 1e-9);
            assert_relative_eq!(pset[0].lat, 48., epsilon = 1e-12);
            assert_relative_eq!(pset[0].time, 600., epsilon = 1e-9);
        }
    }

    #[test]
    fn test_euler_lags_behind() {
        let grid = accelerating_flat_grid();
        let mut pset = ParticleSet::from_line(1, (1., 48.), (1., 48.)).unwrap();
        pset.execute(&grid, AdvectionEE.into(), 600., 60., None, None)
            .unwrap();
        // sum_{k<10} (k dt) dt / 86400
        assert_relative_eq!(pset[0].lon, 1. + 60f64.powi(2) * 45. / DAY, epsilon = 1e-9);
    }

    #[test]
    fn test_spherical_unit_conversion() {
        let grid = uniform_grid(Mesh::Spherical, (0., 10.), (-5., 5.));
        let mut pset = ParticleSet::from_line(1, (1., 0.), (1., 0.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 3600., 600., None, None)
            .unwrap();
        assert_relative_eq!(pset[0].lon, 1. + 3600. / (1852. * 60.), epsilon = 1e-9);
    }

    #[test]
    fn test_particle_leaving_grid_is_frozen() {
        let grid = uniform_grid(Mesh::Flat, (0., 10.), (0., 10.));
        let mut pset = ParticleSet::from_line(2, (8.5, 5.), (1., 5.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 5., 1., None, None)
            .unwrap();
        // 8.5 -> 9.5, the next step would sample x = 10.5
        assert_eq!(pset[0].state, State::OutOfBounds);
        assert_relative_eq!(pset[0].lon, 9.5, epsilon = 1e-12);
        assert_eq!(pset[1].state, State::Alive);
        assert_relative_eq!(pset[1].lon, 6., epsilon = 1e-12);
        assert_eq!(pset.alive(), 1);
    }

    #[test]
    fn test_output_intervals() {
        let dir = tempfile::tempdir().unwrap();
        let grid = accelerating_flat_grid();
        let mut pset = ParticleSet::from_line(2, (1., 46.), (1., 50.)).unwrap();
        let mut output = ParticleFile::new(dir.path().join("out"));
        pset.execute(&grid, AdvectionRK4.into(), 600., 60., Some(120.), Some(&mut output))
            .unwrap();
        assert_eq!(output.times(), &[0., 120., 240., 360., 480., 600.]);
        let path = output.close().unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_endtime_between_steps() {
        let grid = accelerating_flat_grid();
        let mut pset = ParticleSet::from_line(1, (1., 48.), (1., 48.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 500., 300., None, None)
            .unwrap();
        assert_eq!(pset[0].time, 500.);
        assert_relative_eq!(pset[0].lon, 1. + 500f64.powi(2) / (2. * DAY), epsilon = 1e-9);

        let grid = stommel_exponential_grid(&StommelExponential::default()).unwrap();
        let mut pset = ParticleSet::from_line(2, (10., 50.), (7., 30.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 500., 300., None, None)
            .unwrap();
        assert!(pset.iter().all(|p| p.time == 500.));
    }

    #[test]
    fn test_execute_again_after_freezing() {
        let grid = uniform_grid(Mesh::Flat, (0., 10.), (0., 10.));
        let mut pset = ParticleSet::from_line(2, (8.5, 5.), (1., 5.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 5., 1., None, None)
            .unwrap();
        assert_eq!(pset[0].state, State::OutOfBounds);
        assert_eq!(pset[0].time, 1.);

        pset.execute(&grid, AdvectionRK4.into(), 7., 1., None, None)
            .unwrap();
        assert_eq!(pset[1].time, 7.);
        assert_relative_eq!(pset[1].lon, 8., epsilon = 1e-12);
        // Frozen particle is left alone
        assert_eq!(pset[0].time, 1.);
        assert_relative_eq!(pset[0].lon, 9.5, epsilon = 1e-12);
    }

    #[test]
    fn test_particles_ahead_wait_for_the_run() {
        let grid = uniform_grid(Mesh::Flat, (0., 10.), (0., 10.));
        let mut pset = ParticleSet::from_line(2, (1., 5.), (1., 3.)).unwrap();
        pset.particles[1].time = 2.5;
        pset.execute(&grid, AdvectionRK4.into(), 4., 1., None, None)
            .unwrap();
        for p in pset.iter() {
            assert_eq!(p.time, 4.);
        }
        assert_relative_eq!(pset[0].lon, 5., epsilon = 1e-12);
        assert_relative_eq!(pset[1].lon, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_output_interval_not_multiple_of_dt() {
        let dir = tempfile::tempdir().unwrap();
        let grid = accelerating_flat_grid();
        let mut pset = ParticleSet::from_line(1, (1., 48.), (1., 48.)).unwrap();
        let mut output = ParticleFile::new(dir.path().join("out"));
        pset.execute(&grid, AdvectionRK4.into(), 3600., 300., Some(700.), Some(&mut output))
            .unwrap();
        assert_eq!(output.times(), &[0., 700., 1400., 2100., 2800., 3500.]);
        assert_eq!(pset[0].time, 3600.);

        // Intervals count from the start of the run
        let mut output = ParticleFile::new(dir.path().join("late"));
        pset.execute(&grid, AdvectionRK4.into(), 4000., 300., Some(150.), Some(&mut output))
            .unwrap();
        assert_eq!(output.times(), &[3600., 3750., 3900.]);
    }

    #[test]
    fn test_invalid_execute_arguments() {
        let grid = accelerating_flat_grid();
        let mut pset = ParticleSet::from_line(1, (1., 48.), (1., 48.)).unwrap();
        let rk4 = Method::from(AdvectionRK4);
        assert!(pset.execute(&grid, rk4, 600., 0., None, None).is_err());
        assert!(pset.execute(&grid, rk4, 0., 60., None, None).is_err());
        assert!(pset.execute(&grid, rk4, 600., 60., Some(-1.), None).is_err());
    }

    #[test]
    fn test_display() {
        let pset = ParticleSet::from_line(1, (10., 50.), (10., 50.)).unwrap();
        assert_eq!(pset.to_string(), "P(10.000000, 50.000000)[0.0]\n");
    }

    #[test]
    #[ignore = "Stommel trajectory criteria not yet adjusted"]
    fn test_stommel_trajectories() {
        let grid = stommel_exponential_grid(&StommelExponential::default()).unwrap();
        let mut pset = ParticleSet::from_line(3, (10., 50.), (7., 30.)).unwrap();
        pset.execute(&grid, AdvectionRK4.into(), 25. * DAY, 300., Some(12. * 3600.), None)
            .unwrap();
        assert!(3. < pset[0].lon && pset[0].lon < 3.5 && 4.75 < pset[0].lat && pset[0].lat < 5.25);
        assert!(7.4 < pset[1].lon && pset[1].lon < 8. && 40. < pset[1].lat && pset[1].lat < 40.6);
        assert!(4. < pset[2].lon && pset[2].lon < 4.3 && 26.7 < pset[2].lat && pset[2].lat < 27.);
    }
}
