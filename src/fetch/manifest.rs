//! Dataset manifest, deserialised from yaml
use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Base url of the published example data
pub const EXAMPLES_URL: &str = "http://oceanparcels.org/examples-data";

/// List of datasets
///
/// ```yaml
/// datasets:
///   - name: OFAM_example_data
///     url: http://oceanparcels.org/examples-data/OFAM_example_data
///     files: [OFAM_simple_U.nc, OFAM_simple_V.nc]
///   - name: GlobCurrent_example_data
///     url: http://example.org/globcurrent
///     date_range:
///       pattern: "{date}-GLOBCURRENT-{var}.nc"
///       start: 2002-01-01
///       end: 2002-01-03
///       variables: [U, V]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared datasets, names are unique
    pub datasets: Vec<Dataset>,
}

/// One dataset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name
    pub name: String,
    /// Base url, file names are appended
    pub url: String,
    /// Directory below the sync root, defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Explicit file names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Generated file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Date range file generator. `{date}` in `pattern` is replaced by every
/// date from `start` to `end` (inclusive) in steps of `step_days`,
/// formatted with `date_format`; `{var}` by each of `variables`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// File name pattern
    pub pattern: String,
    /// First date
    pub start: NaiveDate,
    /// Last date, included
    pub end: NaiveDate,
    /// Days between files
    #[serde(default = "default_step_days")]
    pub step_days: u64,
    /// `strftime` format of `{date}`
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Values of `{var}`
    #[serde(default)]
    pub variables: Vec<String>,
}

fn default_step_days() -> u64 {
    1
}

fn default_date_format() -> String {
    "%Y%m%d".to_owned()
}

impl DateRange {
    /// Generated file names, ordered by date then variable
    ///
    /// # Errors
    /// Empty or reversed range, zero step, invalid date format, or
    /// `variables` without a `{var}` placeholder.
    pub fn filenames(&self) -> Result<Vec<String>> {
        if self.step_days == 0 {
            return Err(Error::invalid("step_days", "must be positive"));
        }
        if self.end < self.start {
            return Err(Error::invalid(
                "date_range",
                format!("end {} lies before start {}", self.end, self.start),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::invalid(
                "date_format",
                format!("`{}` is not a valid strftime format", self.date_format),
            ));
        }
        let has_var = self.pattern.contains("{var}");
        if has_var == self.variables.is_empty() {
            return Err(Error::invalid(
                "variables",
                "must be given exactly when the pattern contains `{var}`",
            ));
        }

        let mut names = Vec::new();
        let mut date = Some(self.start);
        while let Some(d) = date.filter(|d| *d <= self.end) {
            let with_date = self
                .pattern
                .replace("{date}", &d.format(&self.date_format).to_string());
            if has_var {
                names.extend(self.variables.iter().map(|v| with_date.replace("{var}", v)));
            } else {
                names.push(with_date);
            }
            date = d.checked_add_days(Days::new(self.step_days));
        }
        Ok(names)
    }
}

impl Dataset {
    /// Dataset with an explicit file list
    pub fn with_files(name: &str, url: &str, files: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
            directory: None,
            files: files.iter().map(|f| (*f).to_owned()).collect(),
            date_range: None,
        }
    }

    /// All file names, the explicit list first
    ///
    /// # Errors
    /// Invalid date range, or no files at all
    pub fn filenames(&self) -> Result<Vec<String>> {
        let mut names = self.files.clone();
        if let Some(range) = &self.date_range {
            names.extend(range.filenames()?);
        }
        if names.is_empty() {
            return Err(Error::invalid(
                "files",
                format!("dataset `{}` lists no files", self.name),
            ));
        }
        Ok(names)
    }

    /// Url of `file`
    pub fn file_url(&self, file: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), file)
    }

    /// Local directory of this dataset below `root`
    pub fn target_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref()
            .join(self.directory.as_deref().unwrap_or(&self.name))
    }
}

impl Manifest {
    /// Example data shipped with the particle tracking examples
    pub fn builtin() -> Self {
        Self {
            datasets: vec![
                Dataset::with_files(
                    "OFAM_example_data",
                    &format!("{}/OFAM_example_data", EXAMPLES_URL),
                    &["OFAM_simple_U.nc", "OFAM_simple_V.nc"],
                ),
                Dataset::with_files(
                    "MovingEddies_data",
                    &format!("{}/MovingEddies_data", EXAMPLES_URL),
                    &["moving_eddiesP.nc", "moving_eddiesU.nc", "moving_eddiesV.nc"],
                ),
            ],
        }
    }

    /// Parse and validate a yaml manifest
    ///
    /// # Errors
    /// Malformed yaml, duplicate names or datasets without files
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(contents)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a yaml manifest from file
    ///
    /// # Errors
    /// See [`Manifest::from_yaml`], plus file system errors
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        tracing::debug!("Read manifest {:?}", path.as_ref());
        Self::from_yaml(&contents)
    }

    /// Serialise to yaml
    ///
    /// # Errors
    /// Serialisation failed
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Look up a dataset by name
    ///
    /// # Errors
    /// No dataset of that name
    pub fn dataset(&self, name: &str) -> Result<&Dataset> {
        self.datasets
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::UnknownDataset(name.to_owned()))
    }

    /// Unique names, every dataset resolves to at least one file
    ///
    /// # Errors
    /// First violation
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for dataset in &self.datasets {
            if !seen.insert(dataset.name.as_str()) {
                return Err(Error::invalid(
                    "datasets",
                    format!("dataset `{}` declared twice", dataset.name),
                ));
            }
            dataset.filenames()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBCURRENT: &str = r#"
datasets:
  - name: GlobCurrent_example_data
    url: http://example.org/globcurrent/
    directory: globcurrent
    date_range:
      pattern: "{date}000000-GLOBCURRENT-{var}.nc"
      start: 2002-01-30
      end: 2002-02-02
      variables: [U, V]
"#;

    #[test]
    fn test_builtin() {
        let manifest = Manifest::builtin();
        manifest.validate().unwrap();
        let eddies = manifest.dataset("MovingEddies_data").unwrap();
        assert_eq!(eddies.filenames().unwrap().len(), 3);
        assert_eq!(
            eddies.file_url("moving_eddiesU.nc"),
            "http://oceanparcels.org/examples-data/MovingEddies_data/moving_eddiesU.nc"
        );
        assert!(matches!(
            manifest.dataset("GlobCurrent"),
            Err(Error::UnknownDataset(_))
        ));
    }

    #[test]
    fn test_date_range_expansion() {
        let manifest = Manifest::from_yaml(GLOBCURRENT).unwrap();
        let ds = &manifest.datasets[0];
        let names = ds.filenames().unwrap();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "20020130000000-GLOBCURRENT-U.nc");
        assert_eq!(names[1], "20020130000000-GLOBCURRENT-V.nc");
        assert_eq!(names[7], "20020202000000-GLOBCURRENT-V.nc");
        assert_eq!(
            ds.file_url(&names[0]),
            "http://example.org/globcurrent/20020130000000-GLOBCURRENT-U.nc"
        );
        assert_eq!(ds.target_dir("data"), Path::new("data/globcurrent"));
    }

    #[test]
    fn test_date_range_step_and_format() {
        let range = DateRange {
            pattern: "day_{date}.nc".to_owned(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            step_days: 3,
            date_format: "%Y-%j".to_owned(),
            variables: vec![],
        };
        assert_eq!(
            range.filenames().unwrap(),
            vec!["day_2020-001.nc", "day_2020-004.nc", "day_2020-007.nc", "day_2020-010.nc"]
        );
    }

    #[test]
    fn test_invalid_manifests() {
        let twice = "datasets:\n  - {name: a, url: u, files: [x]}\n  - {name: a, url: u, files: [y]}\n";
        assert!(Manifest::from_yaml(twice).is_err());
        let empty = "datasets:\n  - {name: a, url: u}\n";
        assert!(Manifest::from_yaml(empty).is_err());
        let reversed = GLOBCURRENT.replace("2002-02-02", "2002-01-01");
        assert!(Manifest::from_yaml(&reversed).is_err());
        let no_vars = GLOBCURRENT.replace("variables: [U, V]", "variables: []");
        assert!(Manifest::from_yaml(&no_vars).is_err());
        let bad_format = format!("{}      date_format: \"%Y%!\"\n", GLOBCURRENT);
        assert!(Manifest::from_yaml(&bad_format).is_err());
    }

    #[test]
    fn test_shipped_manifest() {
        let manifest = Manifest::from_yaml(include_str!("../../data/datasets.yaml")).unwrap();
        let builtin = Manifest::builtin();
        assert_eq!(manifest.datasets[..2], builtin.datasets[..]);
        let globcurrent = manifest.dataset("GlobCurrent_example_data").unwrap();
        assert_eq!(globcurrent.filenames().unwrap().len(), 365);
    }

    #[test]
    fn test_yaml_roundtrip_builtin() {
        let manifest = Manifest::builtin();
        let back = Manifest::from_yaml(&manifest.to_yaml().unwrap()).unwrap();
        assert_eq!(back, manifest);
    }
}
