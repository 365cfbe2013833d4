//! `Hdf5` functions to read and write ndarrays
use super::H5Type;
use super::Result;
use ndarray::{Array, ArrayBase, ArrayD, Dimension};
use std::path::Path;

/// Check whether a dataset of given name exists in an hdf5 file
///
/// # Errors
/// When the file does not exist or is not an hdf5 file.
pub fn has_dataset<P: AsRef<Path>>(filename: P, name: &str) -> Result<bool> {
    let file = hdf5::File::open(filename)?;
    Ok(file.dataset(name).is_ok())
}

/// Read ndarray from hdf5 file
///
/// # Errors
/// Errors when file/variable does not exist and
/// when the stored dimensionality differs from `D`.
pub fn read_from_hdf5<A, D, P>(filename: P, varname: &str) -> Result<Array<A, D>>
where
    A: H5Type,
    D: Dimension,
    P: AsRef<Path>,
{
    // Open file
    let file = hdf5::File::open(filename)?;

    //Read dataset
    let data = file.dataset(varname)?;
    let y: ArrayD<A> = data.read_dyn::<A>()?;

    // Dyn to static
    y.into_dimensionality::<D>().map_err(|e| {
        hdf5::Error::Internal(format!("Dataset {} has wrong dimensionality: {}", varname, e))
    })
}

/// Write ndarray to hdf5 file
///
/// Appends to an existing file, creates it otherwise.
///
/// # Errors
/// When file can not be created or when file and
/// variable exists, but variable has different
/// shape than input array (assign new value will fail).
pub fn write_to_hdf5<A, S, D, P>(filename: P, varname: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    A: H5Type + Clone,
    S: ndarray::Data<Elem = A>,
    D: ndarray::Dimension,
    P: AsRef<Path>,
{
    // Open file
    let file = if filename.as_ref().exists() {
        hdf5::File::append(&filename)?
    } else {
        hdf5::File::create(&filename)?
    };

    //Write dataset
    let dset = match file.dataset(varname) {
        Ok(dset) => {
            // Overwrite
            dset
        }
        Err(..) => {
            // Create new dataset
            file.new_dataset::<A>()
                .no_chunk()
                .shape(array.shape())
                .create(varname)?
        }
    };
    dset.write(&array.as_standard_layout())?;
    Ok(())
}
