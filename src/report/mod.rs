//! Report output for the CLI frontend.
//!
//! Writes per-realization tables as CSV and lattice snapshots as ASCII
//! greymaps (PGM, `P2`).

mod csv;
mod pgm;

pub use self::csv::CsvReport;
pub use self::pgm::{grey_level, write_pgm, MAX_GREY};
