//! # Example datasets
//!
//! Datasets are declared in a [`Manifest`]: a name, a base url, and
//! either an explicit list of files or a date range from which file
//! names are generated. [`sync_dataset`] brings a local directory up to
//! date through a [`Fetcher`]. Files which are already present are
//! never fetched again.
//!
//! # Example
//! ```
//! use driftgrid::fetch::{plan_dataset, Manifest};
//! let manifest = Manifest::builtin();
//! let ofam = manifest.dataset("OFAM_example_data").unwrap();
//! let dir = tempfile::tempdir().unwrap();
//! let todo = plan_dataset(dir.path(), ofam).unwrap();
//! assert_eq!(todo.len(), 2);
//! ```
pub mod manifest;
pub mod sync;
pub use manifest::{DateRange, Dataset, Manifest};
pub use sync::{plan_dataset, sync_dataset, sync_manifest, Fetcher, LocalMirror, SyncReport};
