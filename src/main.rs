//! Run example:
//!
//! cargo run --release -- stommel -p 3 -g 200 200 -v
//!
//! Reload a grid stored as one file per day:
//!
//! cargo run --release -- multi-filename --numfiles 6
//!
//! Sync the example datasets from a local mirror:
//!
//! cargo run --release -- fetch --mirror /data/examples-data
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use driftgrid::config::{self, Config};
use driftgrid::fetch::{plan_dataset, sync_manifest, LocalMirror, Manifest};
use driftgrid::grid::io::variable_name;
use driftgrid::grid::{Dimensions, Grid, Mesh, U, V};
use driftgrid::particles::{Method, ParticleFile, ParticleSet};
use driftgrid::synth::{
    simple_grid, stommel_exponential_grid, stommel_streamfunction_grid, SimpleGrid,
    StommelExponential, StommelStreamfunction,
};
use driftgrid::types::DAY;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Analytic ocean grids and particle advection
#[derive(Parser)]
#[command(name = "driftgrid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analytic ocean grids and particle advection", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file, `driftgrid.yaml` in the working directory if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advect particles in the steady-state solution of the Stommel equation
    Stommel(StommelArgs),
    /// Write a grid as one file per day and reload it
    MultiFilename(MultiFilenameArgs),
    /// Sync example datasets
    Fetch(FetchArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Exponential boundary layer, degrees
    Exponential,
    /// Closed-form streamfunction, metres
    Streamfunction,
}

#[derive(Args)]
struct StommelArgs {
    /// Number of particles to advect
    #[arg(short, long, default_value = "1")]
    particles: usize,

    /// Numerical method used for advection (EE, RK4, RK45)
    #[arg(short, long, default_value = "RK4")]
    method: Method,

    /// Stommel fixture
    #[arg(long, value_enum, default_value = "exponential")]
    variant: Variant,

    /// Generate grid files with given dimensions
    #[arg(short, long, num_args = 2, value_names = ["XDIM", "YDIM"])]
    grid: Option<Vec<usize>>,

    /// Print particle information before and after execution
    #[arg(short, long)]
    verbose: bool,

    /// Run length in days
    #[arg(long)]
    days: Option<f64>,
}

#[derive(Args)]
struct MultiFilenameArgs {
    /// Number of daily files
    #[arg(long, default_value = "6")]
    numfiles: usize,
}

#[derive(Args)]
struct FetchArgs {
    /// Dataset manifest (yaml), built-in manifest if not given
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Target directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Local mirror to copy from
    #[arg(long, required_unless_present = "dry_run")]
    mirror: Option<PathBuf>,

    /// Only list files that would be fetched
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration {:?}", path))?,
        None => config::load(),
    };

    match cli.command {
        Commands::Stommel(args) => stommel(args, &config),
        Commands::MultiFilename(args) => multi_filename(args, &config),
        Commands::Fetch(args) => fetch(args, &config),
    }
}

fn stommel(args: StommelArgs, config: &Config) -> Result<()> {
    let (basename, mesh, start, finish, default_days) = match args.variant {
        Variant::Exponential => ("stommel", Mesh::Spherical, (10., 50.), (7., 30.), 25.),
        Variant::Streamfunction => (
            "stommel_streamfunction",
            Mesh::Flat,
            (100., 5000.),
            (4000., 5000.),
            50.,
        ),
    };
    let basename = config.output.directory.join(basename);

    // Generate grid files according to given dimensions
    if let Some(dims) = &args.grid {
        let (xdim, ydim) = (dims[0], dims[1]);
        let grid = match args.variant {
            Variant::Exponential => stommel_exponential_grid(&StommelExponential {
                xdim,
                ydim,
                ..StommelExponential::default()
            })?,
            Variant::Streamfunction => stommel_streamfunction_grid(&StommelStreamfunction {
                xdim,
                ydim,
                ..StommelStreamfunction::default()
            })?,
        };
        std::fs::create_dir_all(&config.output.directory)?;
        grid.write(&basename)?;
    }

    // Open grid files
    let grid = Grid::from_nemo(&basename, mesh).with_context(|| {
        format!(
            "failed to open grid {:?}, generate it with -g XDIM YDIM",
            basename
        )
    })?;

    let mut pset = ParticleSet::from_line(args.particles, start, finish)?;
    if args.verbose {
        println!("Initial particle positions:\n{}", pset);
    }

    let endtime = args
        .days
        .map_or_else(|| config.advection.endtime(default_days), |days| days * DAY);
    info!(
        "Stommel: Advecting {} particles for {} days",
        pset.len(),
        endtime / DAY
    );
    let mut output = ParticleFile::new(config.output.directory.join(&config.output.particle_file));
    pset.execute(
        &grid,
        args.method,
        endtime,
        config.advection.dt(),
        Some(config.advection.interval()),
        Some(&mut output),
    )?;
    output.close()?;

    if args.verbose {
        println!("Final particle positions:\n{}", pset);
    }
    Ok(())
}

fn multi_filename(args: MultiFilenameArgs, config: &Config) -> Result<()> {
    if args.numfiles == 0 {
        bail!("numfiles must be positive");
    }
    std::fs::create_dir_all(&config.output.directory)?;
    let prefix = config.output.directory.join("multi_filename");
    for t in 0..args.numfiles {
        let grid = simple_grid(&SimpleGrid {
            ndays: 1,
            startday: i64::try_from(t)?,
            ..SimpleGrid::default()
        })?;
        grid.write(format!("{}{}", prefix.display(), t))?;
    }

    let mut filenames = BTreeMap::new();
    let mut variables = BTreeMap::new();
    for name in [U, V] {
        filenames.insert(
            name.to_owned(),
            format!("{}*{}.nc", prefix.display(), name),
        );
        variables.insert(name.to_owned(), variable_name(name).to_owned());
    }
    let dimensions = Dimensions {
        depth: None,
        ..Dimensions::default()
    };
    let grid = Grid::from_netcdf(&filenames, &variables, &dimensions, Mesh::Spherical)?;
    println!("Grid.time as returned by from_netcdf {}", grid.time());
    if grid.time().len() != args.numfiles {
        bail!(
            "expected {} time samples, got {}",
            args.numfiles,
            grid.time().len()
        );
    }
    Ok(())
}

fn fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let manifest = match args.manifest.as_ref().or(config.datasets.manifest.as_ref()) {
        Some(path) => Manifest::load(path)
            .with_context(|| format!("failed to load manifest {:?}", path))?,
        None => Manifest::builtin(),
    };
    let root = args.root.unwrap_or_else(|| config.datasets.root.clone());

    if args.dry_run {
        for dataset in &manifest.datasets {
            for path in plan_dataset(&root, dataset)? {
                println!("{}", path.display());
            }
        }
        return Ok(());
    }

    let Some(mirror) = args.mirror else {
        bail!("--mirror is required unless --dry-run is given");
    };
    let report = sync_manifest(&root, &manifest, &LocalMirror::new(mirror))?;
    println!(
        "{} fetched, {} already present",
        report.fetched.len(),
        report.skipped.len()
    );
    Ok(())
}
