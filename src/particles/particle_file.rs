//! Trajectory output
use super::ParticleSet;
use crate::error::{Error, Result};
use crate::io::ReadWrite;
use ndarray::{Array1, Array2};
use std::path::{Path, PathBuf};
use tracing::info;

/// Collects particle positions at observation times and writes them to
/// `<name>.h5` on [`ParticleFile::close`].
///
/// Stored datasets:
/// - `lon`, `lat`: `(nobs, npart)`
/// - `time`: `(nobs)`, seconds
/// - `id`: `(npart)`
#[derive(Clone, Debug)]
pub struct ParticleFile {
    path: PathBuf,
    ids: Vec<u32>,
    time: Vec<f64>,
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl ParticleFile {
    /// Output to `<name>.h5`
    pub fn new<P: AsRef<Path>>(name: P) -> Self {
        let mut path = name.as_ref().as_os_str().to_owned();
        path.push(".h5");
        Self {
            path: PathBuf::from(path),
            ids: Vec::new(),
            time: Vec::new(),
            lon: Vec::new(),
            lat: Vec::new(),
        }
    }

    /// Target file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// No observation recorded yet
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Observation times
    pub fn times(&self) -> &[f64] {
        &self.time
    }

    /// Append the current positions of `pset` as observation at `time`
    ///
    /// # Errors
    /// `pset` has a different number of particles than earlier observations
    pub fn record(&mut self, pset: &ParticleSet, time: f64) -> Result<()> {
        if self.is_empty() {
            self.ids = pset.iter().map(|p| p.id).collect();
        } else if pset.len() != self.ids.len() {
            return Err(Error::ShapeMismatch {
                field: "particles".to_owned(),
                expected: vec![self.ids.len()],
                got: vec![pset.len()],
            });
        }
        self.time.push(time);
        self.lon.extend(pset.iter().map(|p| p.lon));
        self.lat.extend(pset.iter().map(|p| p.lat));
        Ok(())
    }

    /// Write all observations, replacing an existing file
    ///
    /// # Errors
    /// File can not be written
    pub fn close(&self) -> Result<PathBuf> {
        let shape = (self.len(), self.ids.len());
        hdf5::File::create(&self.path)?;
        Array2::from_shape_vec(shape, self.lon.clone())?.write(&self.path, "lon")?;
        Array2::from_shape_vec(shape, self.lat.clone())?.write(&self.path, "lat")?;
        Array1::from(self.time.clone()).write(&self.path, "time")?;
        Array1::from(self.ids.clone()).write(&self.path, "id")?;
        info!(
            "{} observations of {} particles written to {:?}",
            shape.0, shape.1, self.path
        );
        Ok(self.path.clone())
    }
}
