//! Lattice representation.
//!
//! This module provides the pixel grid a microstructure is digitized onto.
//! The [`Lattice`] owns per-cell states, material ids and the two
//! independent visitation buffers used by the path and cluster searches.

mod grid;
mod types;

pub use grid::{Lattice, MATRIX_PHASE};
pub use types::*;
