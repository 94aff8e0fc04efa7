//! Monte Carlo simulation.
//!
//! A run draws `iterations` independent microstructures from one
//! configuration and applies the selected analyses to each:
//!
//! 1. place particles ([`crate::generator`])
//! 2. label clusters ([`crate::cluster`]) when statistics are requested
//! 3. solve the finite-difference network ([`crate::solver`]) when requested
//! 4. test for a span and extract node-disjoint minimum paths
//!    ([`crate::search`]), reducing each to lumped properties
//!    ([`crate::reduction`])
//!
//! Steps 2 and 3 read the untouched microstructure; step 4 rewrites cell
//! states and runs last.

mod realization;
mod runner;

pub use realization::{Realization, RealizationResult};
pub use runner::{MonteCarlo, MonteCarloReport, Summary};
