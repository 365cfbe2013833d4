//! Implement io routines for `Grid`
//!
//! One file per field, named `<basename><FIELD>.nc`. Each file holds
//! the coordinate axes and the field variable stored `(time, y, x)`
//! under NEMO names.
use super::filenames::expand;
use super::{Grid, Mesh, P, U, V};
use crate::error::{Error, Result};
use crate::io::{has_dataset, read_from_hdf5, write_to_hdf5, ReadWrite};
use ndarray::{concatenate, Array1, Array3, Axis, Ix1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk name of the zonal velocity
pub const NEMO_U: &str = "vozocrtx";
/// On-disk name of the meridional velocity
pub const NEMO_V: &str = "vomecrty";

/// On-disk name of the depth axis
const DEPTH: &str = "depth";

/// On-disk names of the coordinate axes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Longitude / x
    pub lon: String,
    /// Latitude / y
    pub lat: String,
    /// Time in seconds
    pub time: String,
    /// Depth, read when present, defaults to a single level at 0
    pub depth: Option<String>,
}

impl Default for Dimensions {
    /// NEMO convention
    fn default() -> Self {
        Self {
            lon: "x".to_owned(),
            lat: "y".to_owned(),
            time: "time_counter".to_owned(),
            depth: Some(DEPTH.to_owned()),
        }
    }
}

/// On-disk variable name of a field
pub fn variable_name(field: &str) -> &str {
    match field {
        U => NEMO_U,
        V => NEMO_V,
        other => other,
    }
}

/// `<basename><field>.nc`
pub fn field_filename<P: AsRef<Path>>(basename: P, field: &str) -> PathBuf {
    let mut name: OsString = basename.as_ref().as_os_str().to_owned();
    name.push(field);
    name.push(".nc");
    PathBuf::from(name)
}

/// Content of a single file
struct Slab {
    path: PathBuf,
    lon: Array1<f32>,
    lat: Array1<f32>,
    depth: Array1<f32>,
    time: Array1<f64>,
    /// (lon, lat, time)
    data: Array3<f32>,
}

impl Slab {
    fn read(path: &Path, varname: &str, dims: &Dimensions) -> Result<Self> {
        let lon = read_from_hdf5::<f32, Ix1, _>(path, &dims.lon)?;
        let lat = read_from_hdf5::<f32, Ix1, _>(path, &dims.lat)?;
        let time = read_from_hdf5::<f64, Ix1, _>(path, &dims.time)?;
        let mut depth = Array1::zeros(1);
        if let Some(name) = &dims.depth {
            if has_dataset(path, name)? {
                depth = read_from_hdf5::<f32, Ix1, _>(path, name)?;
            }
        }
        if time.is_empty() {
            return Err(Error::invalid("time", format!("{} has no time samples", path.display())));
        }
        // Stored (time, y, x), shape dictated by the axes
        let mut raw = Array3::<f32>::zeros((time.len(), lat.len(), lon.len()));
        raw.read(path, varname)?;
        let data = raw.permuted_axes([2, 1, 0]).as_standard_layout().into_owned();
        debug!("Read {} ({} time samples) from {:?}", varname, time.len(), path);
        Ok(Self {
            path: path.to_path_buf(),
            lon,
            lat,
            depth,
            time,
            data,
        })
    }
}

/// Field loaded from one or more files, time axis concatenated
struct Loaded {
    source: String,
    lon: Array1<f32>,
    lat: Array1<f32>,
    depth: Array1<f32>,
    time: Array1<f64>,
    data: Array3<f32>,
}

fn load_field(pattern: &str, varname: &str, dims: &Dimensions) -> Result<Loaded> {
    let mut slabs = expand(pattern)?
        .iter()
        .map(|path| Slab::read(path, varname, dims))
        .collect::<Result<Vec<_>>>()?;
    slabs.sort_by(|a, b| a.time[0].total_cmp(&b.time[0]));

    let first = &slabs[0];
    for slab in &slabs[1..] {
        if slab.lon != first.lon {
            return Err(Error::AxisMismatch {
                axis: "lon",
                file: slab.path.display().to_string(),
            });
        }
        if slab.lat != first.lat {
            return Err(Error::AxisMismatch {
                axis: "lat",
                file: slab.path.display().to_string(),
            });
        }
    }

    let times: Vec<_> = slabs.iter().map(|s| s.time.view()).collect();
    let data: Vec<_> = slabs.iter().map(|s| s.data.view()).collect();
    let time = concatenate(Axis(0), &times)?;
    if let Some((_, t)) = time.iter().zip(time.iter().skip(1)).find(|(a, b)| b <= a) {
        return Err(Error::NonMonotonicTime(*t));
    }
    let data = concatenate(Axis(2), &data)?;
    info!(
        "Loaded {} from {} file(s) matching {:?}, {} time samples",
        varname,
        slabs.len(),
        pattern,
        time.len()
    );
    Ok(Loaded {
        source: pattern.to_owned(),
        lon: first.lon.clone(),
        lat: first.lat.clone(),
        depth: first.depth.clone(),
        time,
        data,
    })
}

impl Grid {
    /// Write every field to `<basename><NAME>.nc`, replacing existing files.
    ///
    /// Returns the written paths.
    ///
    /// # Errors
    /// Files can not be created or written.
    pub fn write<Q: AsRef<Path>>(&self, basename: Q) -> Result<Vec<PathBuf>> {
        let dims = Dimensions::default();
        let mut written = Vec::new();
        for field in self.fields() {
            let path = field_filename(&basename, field.name());
            // Start from an empty container
            hdf5::File::create(&path)?;
            self.lon.write(&path, &dims.lon)?;
            self.lat.write(&path, &dims.lat)?;
            self.depth.write(&path, DEPTH)?;
            self.time.write(&path, &dims.time)?;
            write_to_hdf5(
                &path,
                variable_name(field.name()),
                &field.data().view().permuted_axes([2, 1, 0]),
            )?;
            debug!("Wrote field {} to {:?}", field.name(), path);
            written.push(path);
        }
        info!(
            "Grid {:?} written to {} file(s)",
            basename.as_ref(),
            written.len()
        );
        Ok(written)
    }

    /// Load grid from sets of files.
    ///
    /// `filenames` maps field name to a file pattern (`*`, `?` allowed in
    /// the file name), `variables` field name to on-disk variable name.
    /// Files of one field are ordered by their first time sample and
    /// concatenated along time.
    ///
    /// # Errors
    /// `U` or `V` missing, patterns without matches, axes that differ
    /// between files or fields, and a combined time axis that is not
    /// strictly increasing.
    pub fn from_netcdf(
        filenames: &BTreeMap<String, String>,
        variables: &BTreeMap<String, String>,
        dimensions: &Dimensions,
        mesh: Mesh,
    ) -> Result<Self> {
        for required in [U, V] {
            if !filenames.contains_key(required) {
                return Err(Error::MissingField(required.to_owned()));
            }
        }

        let mut loaded = BTreeMap::new();
        for (name, pattern) in filenames {
            let varname = variables
                .get(name)
                .map_or_else(|| variable_name(name), String::as_str);
            loaded.insert(name.clone(), load_field(pattern, varname, dimensions)?);
        }

        let reference = &loaded[U];
        for field in loaded.values() {
            let mismatch = if field.lon != reference.lon {
                Some("lon")
            } else if field.lat != reference.lat {
                Some("lat")
            } else if field.time != reference.time {
                Some("time")
            } else {
                None
            };
            if let Some(axis) = mismatch {
                return Err(Error::AxisMismatch {
                    axis,
                    file: field.source.clone(),
                });
            }
        }

        let lon = reference.lon.clone();
        let lat = reference.lat.clone();
        let depth = reference.depth.clone();
        let time = reference.time.clone();
        let mut data: BTreeMap<String, Array3<f32>> = loaded
            .into_iter()
            .map(|(name, field)| (name, field.data))
            .collect();
        let u = data.remove(U).ok_or_else(|| Error::MissingField(U.to_owned()))?;
        let v = data.remove(V).ok_or_else(|| Error::MissingField(V.to_owned()))?;
        Self::from_data(u, v, lon, lat, depth, time, data, mesh)
    }

    /// Load grid written by [`Grid::write`] (NEMO names).
    ///
    /// `<basename>P.nc` is picked up when present.
    ///
    /// # Errors
    /// See [`Grid::from_netcdf`].
    pub fn from_nemo<Q: AsRef<Path>>(basename: Q, mesh: Mesh) -> Result<Self> {
        let mut filenames = BTreeMap::new();
        let mut variables = BTreeMap::new();
        for name in [U, V, P] {
            let path = field_filename(&basename, name);
            if name == P && !path.is_file() {
                continue;
            }
            filenames.insert(name.to_owned(), path.to_string_lossy().into_owned());
            variables.insert(name.to_owned(), variable_name(name).to_owned());
        }
        Self::from_netcdf(&filenames, &variables, &Dimensions::default(), mesh)
    }
}
