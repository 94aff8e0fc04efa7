//! Unpreconditioned conjugate gradient on the periodic network.

use tracing::{debug, warn};

use super::grid::FdmGrid;
use super::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Result of one conductivity solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdmSolution {
    /// Volume-averaged current density along x
    pub current_x: f64,
    /// Volume-averaged current density along y
    pub current_y: f64,
    /// Applied field
    pub field: (f64, f64),
    /// Conjugate-gradient iterations performed
    pub iterations: usize,
    /// Squared residual norm at exit
    pub residual: f64,
    /// Whether the residual met the tolerance
    pub converged: bool,
}

impl FdmSolution {
    /// Effective conductivity along x, 0 when no field was applied along x.
    pub fn conductivity_x(&self) -> f64 {
        ratio(self.current_x, self.field.0)
    }

    /// Effective conductivity along y, 0 when no field was applied along y.
    pub fn conductivity_y(&self) -> f64 {
        ratio(self.current_y, self.field.1)
    }

    /// Effective resistivity along x under a unit field.
    pub fn resistivity_x(&self) -> f64 {
        ratio(1.0, self.conductivity_x())
    }

    /// Effective resistivity along y under a unit field.
    pub fn resistivity_y(&self) -> f64 {
        ratio(1.0, self.conductivity_y())
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Conjugate-gradient solver for [`FdmGrid`] networks.
#[derive(Debug, Clone)]
pub struct ConjugateGradient {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Squared-residual threshold per site
    pub tolerance: f64,
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl ConjugateGradient {
    /// Create a solver with the default tolerance and iteration cap.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)
    }

    /// Create a solver with custom settings.
    pub fn with_config(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Solve for the potential under the applied `field` and reduce it to
    /// mean currents.
    ///
    /// Running out of iterations is not an error: the notice is logged and
    /// the currents of the last iterate are returned with
    /// `converged == false`.
    pub fn solve(&self, grid: &FdmGrid, field: (f64, f64)) -> FdmSolution {
        let len = grid.storage_len();
        let threshold = self.tolerance * grid.sites() as f64;

        let mut phi = vec![0.0; len];
        let mut r = grid.source(field);
        let mut p = r.clone();
        let mut ap = vec![0.0; len];
        let mut rr = dot(grid, &r, &r);
        let mut iterations = 0;

        while rr >= threshold && iterations < self.max_iterations {
            grid.prod(&mut p, &mut ap);
            let pap = dot(grid, &p, &ap);
            if pap <= 0.0 {
                break;
            }
            let alpha = rr / pap;
            for (_, _, m) in grid.interior() {
                phi[m] += alpha * p[m];
                r[m] -= alpha * ap[m];
            }

            let rr_next = dot(grid, &r, &r);
            let beta = rr_next / rr;
            for (_, _, m) in grid.interior() {
                p[m] = r[m] + beta * p[m];
            }
            rr = rr_next;
            iterations += 1;
        }

        let converged = rr < threshold;
        if converged {
            debug!(
                "conjugate gradient converged in {} iterations (residual {:.2e})",
                iterations, rr
            );
        } else {
            warn!(
                "conjugate gradient failed to converge after {} iterations (residual {:.2e})",
                iterations, rr
            );
        }

        let (current_x, current_y) = grid.mean_current(&mut phi, field);
        FdmSolution {
            current_x,
            current_y,
            field,
            iterations,
            residual: rr,
            converged,
        }
    }
}

fn dot(grid: &FdmGrid, a: &[f64], b: &[f64]) -> f64 {
    grid.interior().map(|(_, _, m)| a[m] * b[m]).sum()
}
