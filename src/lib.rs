//! # `driftgrid`: Analytic ocean grids and Lagrangian particle advection
//!
//! # Dependencies
//! - cargo >= v1.70
//! - `hdf5` (sudo apt-get install -y libhdf5-dev)
//!
//! # Details
//!
//! This library generates velocity fields from closed-form expressions
//! and advects particles through them. The grids serve as regression
//! fixtures for particle tracking: a known flow, a known set of start
//! positions, and trajectories which can be checked against the
//! analytic streamfunction.
//!
//! Currently `driftgrid` implements the following grids, see [`synth`]:
//! - Accelerating zonal flow, see [`synth::simple_grid()`]
//! - Stommel gyre with exponential boundary layer, see
//!   [`synth::stommel_exponential_grid()`]
//! - Stommel gyre from a closed-form streamfunction, see
//!   [`synth::stommel_streamfunction_grid()`]
//!
//! Grids are written to and read from `hdf5` containers with NEMO
//! variable names, see [`grid::Grid::write`] and [`grid::Grid::from_nemo`].
//!
//! ## Particle advection
//!
//! - Explicit Euler, see [`particles::AdvectionEE`]
//! - Runge-Kutta 4, see [`particles::AdvectionRK4`]
//! - Adaptive Runge-Kutta (Cash-Karp), see [`particles::AdvectionRK45`]
//!
//! # Example
//! Advect particles in the Stommel gyre
//! ```no_run
//! use driftgrid::particles::{Method, ParticleFile, ParticleSet};
//! use driftgrid::synth::{stommel_exponential_grid, StommelExponential};
//! use driftgrid::types::DAY;
//!
//! fn main() -> driftgrid::Result<()> {
//!     let grid = stommel_exponential_grid(&StommelExponential::default())?;
//!     let mut pset = ParticleSet::from_line(3, (10., 50.), (7., 30.))?;
//!     let mut output = ParticleFile::new("StommelParticle");
//!     pset.execute(&grid, Method::from_name("RK4")?, 25. * DAY, 300., Some(43200.), Some(&mut output))?;
//!     output.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example datasets
//!
//! Datasets used by the examples are listed in a manifest, see [`fetch`].
//! A sync only touches files which are not present yet.
#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate enum_dispatch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod io;
pub mod particles;
pub mod synth;
pub mod types;
pub use error::{Error, Result};

const MAX_TIMESTEP: usize = 10_000_000;

/// Integrate trait, step forward in time, and write results
pub trait Integrate {
    /// Step forward by at most [`Integrate::get_dt`], never beyond `until`
    ///
    /// # Errors
    /// Stepping failed
    fn update(&mut self, until: f64) -> Result<()>;
    /// Receive current time
    fn get_time(&self) -> f64;
    /// Get timestep
    fn get_dt(&self) -> f64;
    /// Callback function (can be used for i/o)
    ///
    /// # Errors
    /// Output failed
    fn callback(&mut self) -> Result<()>;
    /// Additional break criteria
    fn exit(&mut self) -> bool;
}

/// Integrate model, that implements the Integrate trait.
///
/// Specify `save_intervall` to call `callback` every `save_intervall`
/// after the start time. Steps are shortened to hit output times and
/// `max_time` exactly.
///
/// Stop Criteria:
/// 1. Timestep limit
/// 2. Time limit
/// 3. `exit()` of the model
///
/// # Errors
/// First error of `update` or `callback`
pub fn integrate<T: Integrate>(pde: &mut T, max_time: f64, save_intervall: Option<f64>) -> Result<()> {
    let mut timestep: usize = 0;
    let eps_dt = pde.get_dt() * 1e-4;
    let start = pde.get_time();
    let mut nsave = 1.;
    loop {
        // Update
        let next_save = save_intervall.map(|dt_save| start + nsave * dt_save);
        let until = next_save.map_or(max_time, |t| t.min(max_time));
        pde.update(until)?;
        timestep += 1;

        // Save
        if let Some(t_save) = next_save {
            if pde.get_time() + eps_dt >= t_save {
                tracing::debug!("Save at time: {:4.3}", pde.get_time());
                pde.callback()?;
                nsave += 1.;
            }
        }

        // Break
        if pde.get_time() + eps_dt >= max_time {
            tracing::info!("time limit reached: {:?}", pde.get_time());
            break;
        }
        if timestep >= MAX_TIMESTEP {
            tracing::info!("timestep limit reached: {:?}", timestep);
            break;
        }
        if pde.exit() {
            tracing::info!("break criteria triggered");
            break;
        }
    }
    Ok(())
}
