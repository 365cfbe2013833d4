//! Crate wide error type
use thiserror::Error;

/// Errors raised while synthesising, storing or advecting on grids
#[derive(Debug, Error)]
pub enum Error {
    /// A constructor or operator received an argument it cannot work with
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A field does not match the grid's `(xdim, ydim, tdim)`
    #[error("shape mismatch for field `{field}`: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Field name
        field: String,
        /// Shape dictated by the grid axes
        expected: Vec<usize>,
        /// Shape that was supplied
        got: Vec<usize>,
    },

    /// A field was requested or required but is not present
    #[error("missing field `{0}`")]
    MissingField(String),

    /// A file pattern expanded to nothing
    #[error("no files match pattern `{0}`")]
    NoMatchingFiles(String),

    /// Coordinate axes disagree between files or fields
    #[error("axis `{axis}` in {file} does not match previously loaded data")]
    AxisMismatch {
        /// Axis name (lon, lat, depth or time)
        axis: &'static str,
        /// Offending file
        file: String,
    },

    /// The combined time axis is not strictly increasing
    #[error("time axis is not strictly increasing at t = {0}")]
    NonMonotonicTime(f64),

    /// Position outside the spatial domain of the grid
    #[error("position (lon {lon}, lat {lat}) is outside the grid")]
    OutOfBounds {
        /// Longitude / x
        lon: f64,
        /// Latitude / y
        lat: f64,
    },

    /// Time outside the time axis of the grid
    #[error("time {0} s lies outside the grid time axis")]
    TimeOutOfRange(f64),

    /// Integration method name not recognised
    #[error("unknown integration method `{0}` (expected EE, RK4 or RK45)")]
    UnknownMethod(String),

    /// Dataset name not listed in the manifest
    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),

    /// Hdf5 backend
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),

    /// Array shapes that can not be combined
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// File system
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration and manifest files
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type of this crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::InvalidParameter`]
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Errors a particle can run into by leaving the grid.
    /// These freeze the particle instead of aborting the run.
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::TimeOutOfRange(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid("xdim", "must be at least 3, got 2");
        assert_eq!(
            err.to_string(),
            "invalid parameter `xdim`: must be at least 3, got 2"
        );
        assert!(Error::OutOfBounds { lon: 1., lat: 2. }.is_out_of_domain());
        assert!(!Error::MissingField("U".to_owned()).is_out_of_domain());
    }
}
