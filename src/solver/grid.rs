//! Haloed phase grid and bond conductances.

use crate::error::{PercolationError, Result};

/// Conductance of the bond between two pixels.
///
/// Equal conductivities return the shared value unchanged; a zero
/// conductivity on either side cuts the bond.
pub fn bond_conductance(sigma_a: f64, sigma_b: f64) -> f64 {
    if sigma_a <= 0.0 || sigma_b <= 0.0 {
        0.0
    } else if sigma_a == sigma_b {
        sigma_a
    } else {
        1.0 / (0.5 / sigma_a + 0.5 / sigma_b)
    }
}

/// Periodic resistor network built from a phase-label array.
#[derive(Debug, Clone)]
pub struct FdmGrid {
    nx: usize,
    ny: usize,
    /// Phase labels with a one-cell periodic halo
    pix: Vec<usize>,
    /// Bond from `m` to `m + 1`
    pub(super) gx: Vec<f64>,
    /// Bond from `m` to `m + stride`
    pub(super) gy: Vec<f64>,
}

impl FdmGrid {
    /// Build the network for an `nx x ny` label array (row-major, row 0 first).
    pub fn new(nx: usize, ny: usize, labels: &[usize], conductivities: &[f64]) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(PercolationError::DegenerateSolverGrid {
                message: format!("{}x{} grid has no sites", nx, ny),
            });
        }
        if labels.len() != nx * ny {
            return Err(PercolationError::LengthMismatch {
                expected: nx * ny,
                actual: labels.len(),
            });
        }
        if let Some(&material) = labels.iter().find(|&&l| l >= conductivities.len()) {
            return Err(PercolationError::UnknownMaterial {
                material,
                phases: conductivities.len(),
            });
        }

        let size = (nx + 2) * (ny + 2);
        let mut grid = Self {
            nx,
            ny,
            pix: vec![0; size],
            gx: vec![0.0; size],
            gy: vec![0.0; size],
        };

        for j in 1..=ny {
            for i in 1..=nx {
                let m = grid.index(i, j);
                grid.pix[m] = labels[(j - 1) * nx + (i - 1)];
            }
        }
        grid.wrap_labels();
        grid.build_bonds(conductivities);
        Ok(grid)
    }

    /// Interior width.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Interior height.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of interior sites.
    pub fn sites(&self) -> usize {
        self.nx * self.ny
    }

    /// Row stride of the haloed storage.
    #[inline]
    pub(super) fn stride(&self) -> usize {
        self.nx + 2
    }

    /// Storage length including the halo.
    pub(super) fn storage_len(&self) -> usize {
        self.pix.len()
    }

    /// Storage index of site `(i, j)`; interior sites have `1 <= i <= nx`,
    /// `1 <= j <= ny`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.stride() + i
    }

    /// Storage indices of all interior sites.
    pub(super) fn interior(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (1..=self.ny).flat_map(move |j| (1..=self.nx).map(move |i| (i, j, self.index(i, j))))
    }

    /// Phase label at a storage position.
    pub fn label(&self, i: usize, j: usize) -> usize {
        self.pix[self.index(i, j)]
    }

    /// Bond conductance from `(i, j)` to `(i + 1, j)`.
    pub fn bond_x(&self, i: usize, j: usize) -> f64 {
        self.gx[self.index(i, j)]
    }

    /// Bond conductance from `(i, j)` to `(i, j + 1)`.
    pub fn bond_y(&self, i: usize, j: usize) -> f64 {
        self.gy[self.index(i, j)]
    }

    fn wrap_labels(&mut self) {
        let (nx, ny) = (self.nx, self.ny);
        for j in 1..=ny {
            let (left, right) = (self.index(0, j), self.index(nx + 1, j));
            self.pix[left] = self.pix[self.index(nx, j)];
            self.pix[right] = self.pix[self.index(1, j)];
        }
        for i in 0..nx + 2 {
            let (top, bottom) = (self.index(i, 0), self.index(i, ny + 1));
            self.pix[top] = self.pix[self.index(i, ny)];
            self.pix[bottom] = self.pix[self.index(i, 1)];
        }
    }

    fn build_bonds(&mut self, conductivities: &[f64]) {
        let (nx, ny, stride) = (self.nx, self.ny, self.stride());
        let sigma = |label: usize| conductivities[label];

        for j in 1..=ny {
            for i in 1..=nx {
                let m = self.index(i, j);
                self.gx[m] = bond_conductance(sigma(self.pix[m]), sigma(self.pix[m + 1]));
                self.gy[m] = bond_conductance(sigma(self.pix[m]), sigma(self.pix[m + stride]));
            }
        }

        // Rewire the halo bonds to their periodic partners.
        for j in 1..=ny {
            let ghost = self.index(0, j);
            self.gx[ghost] = self.gx[self.index(nx, j)];
        }
        for i in 1..=nx {
            let ghost = self.index(i, 0);
            self.gy[ghost] = self.gy[self.index(i, ny)];
        }
    }

    /// Copy the interior edges of `v` into its halo.
    pub(super) fn wrap(&self, v: &mut [f64]) {
        let (nx, ny) = (self.nx, self.ny);
        for j in 1..=ny {
            v[self.index(0, j)] = v[self.index(nx, j)];
            v[self.index(nx + 1, j)] = v[self.index(1, j)];
        }
        for i in 0..nx + 2 {
            v[self.index(i, 0)] = v[self.index(i, ny)];
            v[self.index(i, ny + 1)] = v[self.index(i, 1)];
        }
    }

    /// Apply the conservation operator: `out = A v`.
    ///
    /// `v` has its halo refreshed first; halo entries of `out` are zero.
    pub(super) fn prod(&self, v: &mut [f64], out: &mut [f64]) {
        self.wrap(v);
        out.fill(0.0);
        let stride = self.stride();
        for (_, _, m) in self.interior() {
            out[m] = self.gx[m] * (v[m] - v[m + 1])
                + self.gx[m - 1] * (v[m] - v[m - 1])
                + self.gy[m] * (v[m] - v[m + stride])
                + self.gy[m - stride] * (v[m] - v[m - stride]);
        }
    }

    /// Right-hand side produced by the applied field.
    pub(super) fn source(&self, field: (f64, f64)) -> Vec<f64> {
        let (ex, ey) = field;
        let stride = self.stride();
        let mut b = vec![0.0; self.storage_len()];
        for (_, _, m) in self.interior() {
            b[m] = -ex * (self.gx[m] - self.gx[m - 1]) - ey * (self.gy[m] - self.gy[m - stride]);
        }
        b
    }

    /// Volume-averaged bond currents for a solved fluctuation `phi`.
    pub(super) fn mean_current(&self, phi: &mut [f64], field: (f64, f64)) -> (f64, f64) {
        self.wrap(phi);
        let (ex, ey) = field;
        let stride = self.stride();
        let (mut cx, mut cy) = (0.0, 0.0);
        for (_, _, m) in self.interior() {
            cx += self.gx[m] * (ex + phi[m] - phi[m + 1]);
            cy += self.gy[m] * (ey + phi[m] - phi[m + stride]);
        }
        let n = self.sites() as f64;
        (cx / n, cy / n)
    }
}
