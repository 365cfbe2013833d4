//! # Read and write ndarrays to `hdf5` containers
//!
//! Grid files (`<basename><VAR>.nc`) and particle trajectory files
//! are plain hdf5 containers, one dataset per variable or axis.
pub mod read_write_hdf5;
pub mod traits;
pub use hdf5::H5Type;
pub use read_write_hdf5::{has_dataset, read_from_hdf5, write_to_hdf5};
pub use traits::ReadWrite;

/// Result of the low level hdf5 routines
pub type Result<T> = hdf5::Result<T>;
