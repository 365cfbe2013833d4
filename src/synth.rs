//! # Analytic grid synthesizer
//!
//! Builds velocity (and pressure) fields on a rectangular A-grid from
//! closed-form expressions. The resulting [`Grid`](crate::grid::Grid)s are
//! regression fixtures for particle advection and grid persistence.
//!
//! Scenarios
//! - [`simple_grid`]: uniform zonal flow accelerating linearly in time
//! - [`stommel_exponential_grid`]: western boundary current with an
//!   exponential boundary layer (degrees, spherical mesh)
//! - [`stommel_streamfunction_grid`]: Stommel gyre from a closed-form
//!   pressure field, velocities by central differences (metres, flat mesh)
//!
//! The two Stommel fixtures use incompatible parameterizations and
//! coordinate units, they are kept apart on purpose.
pub mod difference;
pub mod simple;
pub mod stommel;
pub use difference::{broadcast_time, central_difference};
pub use simple::{simple_grid, SimpleGrid};
pub use stommel::{
    stommel_exponential_grid, stommel_exponential_streamfunction, stommel_streamfunction_grid,
};
pub use stommel::{StommelExponential, StommelStreamfunction};

use crate::error::{Error, Result};

/// Reject zero sized dimensions
pub(crate) fn check_dim(name: &'static str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(Error::invalid(
            name,
            format!("must be at least {}, got {}", min, value),
        ));
    }
    Ok(())
}

/// Reject non-finite or non-positive constants
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.) {
        return Err(Error::invalid(
            name,
            format!("must be finite and positive, got {}", value),
        ));
    }
    Ok(())
}
