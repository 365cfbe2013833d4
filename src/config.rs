//! Run configuration, read from `driftgrid.yaml`
//!
//! Every section and value is optional, missing entries fall back to
//! their defaults.
//!
//! ```yaml
//! advection:
//!   endtime_days: 25
//!   dt_minutes: 5
//!   interval_hours: 12
//! output:
//!   directory: out
//!   particle_file: StommelParticle
//! datasets:
//!   root: examples-data
//! ```
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "driftgrid.yaml";

/// Run configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time stepping
    pub advection: AdvectionConfig,
    /// Output location
    pub output: OutputConfig,
    /// Example datasets
    pub datasets: DatasetsConfig,
}

/// Time stepping of particle runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvectionConfig {
    /// Run length in days, scenario default when unset
    pub endtime_days: Option<f64>,
    /// Time step in minutes
    pub dt_minutes: f64,
    /// Output interval in hours
    pub interval_hours: f64,
}

/// Where grids and trajectories are written
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory
    pub directory: PathBuf,
    /// Trajectory file name, without extension
    pub particle_file: String,
}

/// Dataset manifest and sync target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetsConfig {
    /// Manifest file, built-in manifest when unset
    pub manifest: Option<PathBuf>,
    /// Directory receiving the datasets
    pub root: PathBuf,
}

impl Default for AdvectionConfig {
    fn default() -> Self {
        Self {
            endtime_days: None,
            dt_minutes: 5.,
            interval_hours: 12.,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            particle_file: "StommelParticle".to_owned(),
        }
    }
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            root: PathBuf::from("examples-data"),
        }
    }
}

impl AdvectionConfig {
    /// Time step in seconds
    pub fn dt(&self) -> f64 {
        self.dt_minutes * 60.
    }

    /// Output interval in seconds
    pub fn interval(&self) -> f64 {
        self.interval_hours * 3600.
    }

    /// Run length in seconds, `default_days` when not configured
    pub fn endtime(&self, default_days: f64) -> f64 {
        self.endtime_days.unwrap_or(default_days) * crate::types::DAY
    }
}

impl Config {
    /// Read configuration from `path`
    ///
    /// # Errors
    /// File can not be read or parsed
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Configuration from [`CONFIG_FILE`] if present, defaults otherwise.
/// A file that fails to parse is reported and ignored.
pub fn load() -> Config {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Config::default();
    }
    match Config::load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("failed to load {}: {}; using defaults", CONFIG_FILE, e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.advection.endtime_days, None);
        assert_eq!(cfg.advection.dt(), 300.);
        assert_eq!(cfg.advection.interval(), 43200.);
        assert_eq!(cfg.advection.endtime(25.), 25. * 86400.);
        assert_eq!(cfg.output.particle_file, "StommelParticle");
        assert_eq!(cfg.datasets.manifest, None);
        assert_eq!(cfg.datasets.root, PathBuf::from("examples-data"));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "advection:\n  endtime_days: 50\ndatasets:\n  manifest: data/datasets.yaml\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.advection.endtime(25.), 50. * 86400.);
        assert_eq!(cfg.advection.dt_minutes, 5.); // default
        assert_eq!(
            cfg.datasets.manifest,
            Some(PathBuf::from("data/datasets.yaml"))
        );
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "output:\n  directory: out\n  particle_file: run1\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.output.directory, PathBuf::from("out"));
        assert_eq!(cfg.output.particle_file, "run1");

        std::fs::write(&path, "advection: [1, 2]\n").unwrap();
        assert!(Config::load_from(&path).is_err());
        assert!(Config::load_from(dir.path().join("missing.yaml")).is_err());
    }
}
