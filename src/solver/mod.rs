//! Finite-difference conductivity solver.
//!
//! This module computes the effective conductivity of a digitized
//! microstructure directly from its phase labels, without any path search.
//!
//! ## Resistor network
//!
//! Every pixel is a node. Neighbouring pixels of phases `i` and `j` are
//! joined by a bond of conductance
//!
//! ```text
//! g_ij = 1 / (0.5/sigma_i + 0.5/sigma_j)      (0 if either sigma is 0)
//! ```
//!
//! i.e. two half-pixel resistors in series. The grid is periodic in both
//! directions: the `nx x ny` labels are stored in an `(nx+2) x (ny+2)`
//! array whose one-cell halo mirrors the opposite edge.
//!
//! ## Solve
//!
//! A uniform field `(ex, ey)` is applied by writing the potential as
//! `u = -ex*i - ey*j + phi` with `phi` periodic. Current conservation at
//! every node gives a symmetric positive semi-definite system `A phi = b`,
//! solved by unpreconditioned conjugate gradient starting from `phi = 0`
//! (the linear potential). The volume-averaged bond currents give the
//! effective conductivity tensor diagonal.

mod cg;
mod grid;

pub use cg::{ConjugateGradient, FdmSolution};
pub use grid::{bond_conductance, FdmGrid};

/// Convergence threshold on the squared residual, per lattice site.
pub const DEFAULT_TOLERANCE: f64 = 1e-16;

/// Conjugate-gradient iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
