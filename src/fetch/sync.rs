//! Bring local dataset directories up to date
use super::manifest::{Dataset, Manifest};
use crate::error::Result;
use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Retrieve a single file
pub trait Fetcher {
    /// Store the content behind `url` in `dest`
    ///
    /// # Errors
    /// Content not available or `dest` not writable
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetcher copying from a local mirror laid out as `<root>/<dataset>/<file>`,
/// where `<dataset>/<file>` are the last two segments of the url.
#[derive(Clone, Debug)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    /// Mirror rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Mirror path of `url`
    pub fn resolve(&self, url: &str) -> PathBuf {
        let mut segments = url.trim_end_matches('/').rsplit('/');
        let file = segments.next().unwrap_or_default();
        match segments.next() {
            Some(dataset) if !dataset.is_empty() && !dataset.ends_with(':') => {
                self.root.join(dataset).join(file)
            }
            _ => self.root.join(file),
        }
    }
}

impl Fetcher for LocalMirror {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let source = self.resolve(url);
        if !source.is_file() {
            return Err(IoError::new(
                ErrorKind::NotFound,
                format!("{} not found in mirror ({:?})", url, source),
            )
            .into());
        }
        fs::copy(&source, dest)?;
        Ok(())
    }
}

/// Outcome of a sync
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Newly written files
    pub fetched: Vec<PathBuf>,
    /// Files which were already present
    pub skipped: Vec<PathBuf>,
}

impl SyncReport {
    fn merge(&mut self, other: Self) {
        self.fetched.extend(other.fetched);
        self.skipped.extend(other.skipped);
    }
}

/// Files of `dataset` that are missing below `root`
///
/// # Errors
/// Invalid file list
pub fn plan_dataset<P: AsRef<Path>>(root: P, dataset: &Dataset) -> Result<Vec<PathBuf>> {
    let dir = dataset.target_dir(root);
    Ok(dataset
        .filenames()?
        .into_iter()
        .map(|f| dir.join(f))
        .filter(|p| !p.exists())
        .collect())
}

/// Fetch every missing file of `dataset` into its directory below `root`.
///
/// Existing files are left untouched and the fetcher is not called for
/// them. New files are written to `<file>.part` first and renamed once
/// complete, so an interrupted sync never leaves a truncated file under
/// the final name.
///
/// # Errors
/// First failing fetch or file system operation
pub fn sync_dataset<P: AsRef<Path>, F: Fetcher + ?Sized>(
    root: P,
    dataset: &Dataset,
    fetcher: &F,
) -> Result<SyncReport> {
    let dir = dataset.target_dir(root);
    fs::create_dir_all(&dir)?;
    let mut report = SyncReport::default();
    for file in dataset.filenames()? {
        let dest = dir.join(&file);
        if dest.exists() {
            info!("{} already exists within {:?}", file, dir);
            report.skipped.push(dest);
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let part = part_path(&dest);
        let url = dataset.file_url(&file);
        debug!("Fetch {} to {:?}", url, part);
        if let Err(e) = fetcher.fetch(&url, &part) {
            // Leftover from the failed fetch, may not exist
            let _ = fs::remove_file(&part);
            return Err(e);
        }
        fs::rename(&part, &dest)?;
        info!("{} written to {:?}", file, dir);
        report.fetched.push(dest);
    }
    Ok(report)
}

/// [`sync_dataset`] for every dataset of `manifest`
///
/// # Errors
/// First failing dataset
pub fn sync_manifest<P: AsRef<Path>, F: Fetcher + ?Sized>(
    root: P,
    manifest: &Manifest,
    fetcher: &F,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    for dataset in &manifest.datasets {
        report.merge(sync_dataset(root.as_ref(), dataset, fetcher)?);
    }
    info!(
        "Sync finished: {} fetched, {} already present",
        report.fetched.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
