//! `ReadWrite` trait
use super::read_write_hdf5::{read_from_hdf5, write_to_hdf5};
use super::Result;
use hdf5::Error;
use ndarray::{ArrayBase, Data, DataMut, Dimension};
use std::path::Path;

/// Read and write arrays (hdf5)
pub trait ReadWrite<A> {
    /// Read array data from hdf5 file into `self`
    ///
    /// # Errors
    /// Can't read file, or stored shape differs from `self`
    fn read<P: AsRef<Path>>(&mut self, filename: P, varname: &str) -> Result<()>;

    /// Write array data to hdf5 file
    ///
    /// # Errors
    /// Can't write file
    fn write<P: AsRef<Path>>(&self, filename: P, varname: &str) -> Result<()>;
}

/// Implement on real type arrays
macro_rules! impl_read_write_real {
    ($a: ty) => {
        impl<S, D> ReadWrite<$a> for ArrayBase<S, D>
        where
            S: Data<Elem = $a> + DataMut,
            D: Dimension,
        {
            fn read<P: AsRef<Path>>(&mut self, filename: P, varname: &str) -> Result<()> {
                let data = read_from_hdf5::<$a, D, _>(&filename, varname)?;
                if data.shape() == self.shape() {
                    self.assign(&data);
                    tracing::debug!(
                        "Read {} from {:?}",
                        varname,
                        filename.as_ref()
                    );
                    Ok(())
                } else {
                    Err(Error::Internal(format!(
                        "Shape mismatch while reading {}: stored {:?}, expected {:?}.",
                        varname,
                        data.shape(),
                        self.shape()
                    )))
                }
            }

            fn write<P: AsRef<Path>>(&self, filename: P, varname: &str) -> Result<()> {
                write_to_hdf5(filename, varname, self)?;
                Ok(())
            }
        }
    };
}

impl_read_write_real!(f32);
impl_read_write_real!(f64);
impl_read_write_real!(u32);
