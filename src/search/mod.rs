//! Percolation search.
//!
//! This module decides whether a conductive path spans the lattice from
//! the top row to the bottom row, and extracts paths through the spanning
//! cluster.
//!
//! ## State flow
//!
//! ```text
//! Empty --paint--> Core / Hoop --span_test--> Percolating --minimum_path--> OnPath
//! ```
//!
//! A successful [`span_test`] also marks the whole bottom row
//! `Percolating`, turning the bottom edge into a uniform sink electrode for
//! the path searches.

mod path;
mod span;

pub use path::{minimum_path, shortest_path, DepthFirstResult};
pub use span::{flood_fill, span_test, FloodFill};

/// Number of top-row start columns flood-filled per parallel batch.
pub const SPAN_BATCH: usize = 8;
