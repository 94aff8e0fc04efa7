//! # Percolation Core
//!
//! Continuum percolation and effective-property estimation for random
//! composites.
//!
//! This library provides:
//! - A line-oriented settings language for describing phases and particles
//! - Random microstructure generation on a pixel lattice
//! - Top-to-bottom span testing and minimum conductive path extraction
//! - Reduction of conductive paths to electrical, thermal and elastic
//!   properties
//! - Cluster labelling and correlation-length statistics
//! - A finite-difference conjugate-gradient solver for bulk conductivity
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`settings`] - Parser for settings files and the run configuration
//! - [`phase`] - Per-material properties
//! - [`lattice`] - Cell storage and neighbour queries
//! - [`generator`] - Particle placement and rasterization
//! - [`search`] - Span test and path searches
//! - [`reduction`] - Path-to-property reduction
//! - [`cluster`] - Connected-component statistics
//! - [`solver`] - Periodic finite-difference conductivity solver
//! - [`simulation`] - Realizations and the Monte Carlo driver
//! - [`report`] - CSV tables and PGM snapshots
//!
//! ## Usage
//!
//! ```bash
//! percolate composite.perc --csv results.csv --pgm last.pgm
//! ```
//!
//! ```no_run
//! use percolation_core::{settings, MonteCarlo};
//!
//! let config = settings::parse_file("composite.perc".as_ref())?;
//! let report = MonteCarlo::new(config)?.run()?;
//! println!("p = {}", report.summary.percolation_probability);
//! # Ok::<(), percolation_core::PercolationError>(())
//! ```
//!
//! ## Simulation Method
//!
//! Every realization places particles at random on a fresh lattice. The
//! graph analyses then look for a `Core` cluster joining the top row to
//! the bottom row and extract breadth-first minimum paths through it. Each
//! path is widened into a tube of transverse slices whose series
//! resistances give the path resistance; independent paths add in
//! parallel. The finite-difference solver instead treats every pixel as a
//! node of a periodic resistor network and needs no path at all.

pub mod cluster;
pub mod error;
pub mod generator;
pub mod lattice;
pub mod phase;
pub mod reduction;
pub mod report;
pub mod search;
pub mod settings;
pub mod simulation;
pub mod solver;

// Re-export main types for convenience
pub use error::{PercolationError, Result};
pub use lattice::Lattice;
pub use settings::SimulationConfig;
pub use simulation::{MonteCarlo, MonteCarloReport, Realization, RealizationResult, Summary};
