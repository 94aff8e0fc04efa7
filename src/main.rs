//! Percolate - Monte Carlo percolation of random composites.
//!
//! # Usage
//!
//! ```bash
//! percolate composite.perc --iterations 100 --csv results.csv --pgm snapshot.pgm
//! ```

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use percolation_core::{
    error::Result,
    report::{write_pgm, CsvReport},
    settings, MonteCarlo, PercolationError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Continuum percolation simulator for random composites
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file
    #[arg(value_name = "SETTINGS_FILE")]
    settings_file: PathBuf,

    /// Override the number of realizations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Override the base seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the per-realization table here instead of stdout
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write a greymap of the first realization's final lattice
    #[arg(long, value_name = "FILE")]
    pgm: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Parse the settings file
    let mut config = settings::parse_file(&args.settings_file)?;
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    // Run the ensemble
    let runner = MonteCarlo::new(config)?;
    let report = runner.run()?;

    match &args.csv {
        Some(path) => {
            CsvReport::new(BufWriter::new(create(path)?)).write_report(&report)?;
            info!("wrote {}", path.display());
        }
        None => CsvReport::new(io::stdout().lock()).write_report(&report)?,
    }

    if let Some(path) = &args.pgm {
        let (_, realization) = runner.run_one(0)?;
        let mut snapshot = realization.lattice().clone();
        snapshot.mark_border();
        write_pgm(&snapshot, BufWriter::new(create(path)?))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

fn create(path: &std::path::Path) -> Result<File> {
    File::create(path).map_err(|source| PercolationError::ReportWriteError { source })
}
