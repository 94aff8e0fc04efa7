//! Path reduction.
//!
//! Converts an extracted minimum path into lumped transport properties.
//!
//! ## Tube model
//!
//! Every path node owns a transverse slice of the conductor: the run of
//! conductive cells perpendicular to the direction the path entered the
//! node. Along a slice the cell resistances `1/sigma` add in series; the
//! inverse is the node's transverse conductance. Nodes follow each other
//! along the path, so the path resistance is the sum of the slice
//! resistances.
//!
//! ```text
//!         slice of node k
//!      <-- . . # # @ # . -->        @ = path node, # = tube cells
//!                  |
//!                  v  path direction
//! ```
//!
//! Elastic constants are not walked transversely. Each straight run of
//! consecutive nodes along a row or a column forms one layer with the
//! harmonic mean of its node moduli. Layers act as springs in series: the
//! path modulus is the reciprocal sum `1 / sum(1/E_layer)`.
//!
//! Independent paths of one realization are parallel conductors; see
//! [`parallel_conductance`].

mod elastic;
mod tube;

pub use elastic::{group_layers, harmonic_mean, reciprocal_sum, ElasticLayer, Orientation};
pub use tube::{transverse_slice, Slice};

use tracing::debug;

use crate::lattice::{Lattice, PathNode};
use crate::phase::PhaseTable;

/// Lumped properties of one reduced path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProperties {
    /// Number of path nodes
    pub length: usize,
    /// Electrical resistance of the tube
    pub electric_resistance: f64,
    /// Thermal resistance of the tube
    pub thermal_resistance: f64,
    /// Young's modulus of the path
    pub youngs_modulus: f64,
    /// Poisson ratio of the path
    pub poisson_ratio: f64,
    /// Cells claimed by the tube, path nodes included
    pub tube_cells: usize,
}

/// Reduce a minimum path to its lumped properties.
///
/// Slice cells other than the path nodes are marked `SidePath`, so the
/// tubes of later paths never overlap this one. A terminal node on the
/// bottom row is the sink electrode and contributes no resistance, unless it
/// is also the origin.
pub fn reduce_path(lattice: &mut Lattice, path: &[PathNode], phases: &PhaseTable) -> PathProperties {
    let bottom = lattice.bottom_row();
    let mut electric_resistance = 0.0;
    let mut thermal_resistance = 0.0;
    let mut tube_cells = 0usize;
    let mut moduli = Vec::with_capacity(path.len());

    for (i, node) in path.iter().enumerate() {
        let is_electrode = i > 0 && i + 1 == path.len() && node.point.y == bottom;
        if is_electrode {
            continue;
        }

        let slice = transverse_slice(lattice, node, phases);
        electric_resistance += slice.electric_resistance;
        thermal_resistance += slice.thermal_resistance;
        tube_cells += slice.cells.len() + 1;
        slice.claim(lattice);

        let phase = phases.get(lattice.material(node.point));
        moduli.push((
            *node,
            phase.map_or(0.0, |p| p.youngs_modulus),
            phase.map_or(0.0, |p| p.poisson_ratio),
        ));
    }

    let layers = group_layers(&moduli);
    let youngs_modulus = reciprocal_sum(layers.iter().map(|l| l.youngs_modulus));
    let poisson_ratio = reciprocal_sum(layers.iter().map(|l| l.poisson_ratio));

    debug!(
        "reduced path of {} nodes: R_e={:.3e} R_t={:.3e} E={:.3e} over {} layers",
        path.len(),
        electric_resistance,
        thermal_resistance,
        youngs_modulus,
        layers.len()
    );

    PathProperties {
        length: path.len(),
        electric_resistance,
        thermal_resistance,
        youngs_modulus,
        poisson_ratio,
        tube_cells,
    }
}

/// Total conductance of independent paths connected in parallel.
///
/// Paths with infinite resistance contribute nothing.
pub fn parallel_conductance(resistances: impl IntoIterator<Item = f64>) -> f64 {
    resistances
        .into_iter()
        .filter(|r| r.is_finite() && *r > 0.0)
        .map(|r| 1.0 / r)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{CellState, Point};
    use crate::phase::PhaseProperties;
    use crate::search::{minimum_path, span_test};
    use approx::assert_relative_eq;

    fn phases() -> PhaseTable {
        let mut table = PhaseTable::new();
        table
            .push(PhaseProperties::conductor("matrix", 0.0).with_elastic(1.0, 0.4))
            .unwrap();
        table
            .push(
                PhaseProperties::conductor("filler", 2.0)
                    .with_thermal_conductivity(4.0)
                    .with_elastic(10.0, 0.25),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_single_column_path() {
        // One-wide vertical wire: each slice is just the node itself.
        let mut labels = vec![0; 9];
        for y in 0..3 {
            labels[y * 3 + 1] = 1;
        }
        let mut lattice = Lattice::from_phase_labels(3, 3, &labels).unwrap();
        assert!(span_test(&mut lattice));
        let path = minimum_path(&mut lattice, Point::new(1, 0)).unwrap();

        let props = reduce_path(&mut lattice, &path, &phases());

        assert_eq!(props.length, 3);
        assert_eq!(props.tube_cells, 2);
        // Two resistive nodes, the terminal is the electrode.
        assert_relative_eq!(props.electric_resistance, 2.0 * 0.5);
        assert_relative_eq!(props.thermal_resistance, 2.0 * 0.25);
        assert_relative_eq!(props.youngs_modulus, 10.0, max_relative = 1e-12);
        assert_relative_eq!(props.poisson_ratio, 0.25, max_relative = 1e-12);
    }

    #[test]
    fn test_slices_widen_resistance_and_claim_cells() {
        let mut lattice = Lattice::from_phase_labels(3, 3, &[1; 9]).unwrap();
        assert!(span_test(&mut lattice));
        let path = minimum_path(&mut lattice, Point::new(1, 0)).unwrap();

        let props = reduce_path(&mut lattice, &path, &phases());

        // Rows 0 and 1 each hold a three-cell slice in series.
        assert_relative_eq!(props.electric_resistance, 2.0 * 1.5);
        assert_eq!(props.tube_cells, 6);
        assert_eq!(lattice.get(Point::new(0, 0)), CellState::SidePath);
        assert_eq!(lattice.get(Point::new(2, 1)), CellState::SidePath);
        assert_eq!(lattice.get(Point::new(0, 2)), CellState::Percolating);
    }

    #[test]
    fn test_insulating_node_gives_infinite_resistance() {
        let mut table = PhaseTable::new();
        table.push(PhaseProperties::conductor("matrix", 0.0)).unwrap();
        table.push(PhaseProperties::conductor("dead", 0.0)).unwrap();

        let mut lattice = Lattice::from_phase_labels(1, 3, &[1, 1, 1]).unwrap();
        assert!(span_test(&mut lattice));
        let path = minimum_path(&mut lattice, Point::new(0, 0)).unwrap();
        let props = reduce_path(&mut lattice, &path, &table);

        assert!(props.electric_resistance.is_infinite());
        assert_eq!(parallel_conductance([props.electric_resistance]), 0.0);
    }

    #[test]
    fn test_straight_runs_add_as_springs_in_series() {
        // #...
        // ###.
        // ..#.
        // ..#.
        let labels = vec![
            1, 0, 0, 0, //
            1, 1, 1, 0, //
            0, 0, 1, 0, //
            0, 0, 1, 0,
        ];
        let mut lattice = Lattice::from_phase_labels(4, 4, &labels).unwrap();
        assert!(span_test(&mut lattice));
        let path = minimum_path(&mut lattice, Point::new(0, 0)).unwrap();
        assert_eq!(path.len(), 6);

        let props = reduce_path(&mut lattice, &path, &phases());

        // Column (2,2)-(2,1), row (1,1)-(0,1), then the origin alone.
        assert_relative_eq!(props.youngs_modulus, 10.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(props.poisson_ratio, 0.25 / 3.0, max_relative = 1e-12);
    }

    #[test]
    fn test_parallel_conductance() {
        assert_relative_eq!(parallel_conductance([2.0, 2.0]), 1.0);
        assert_relative_eq!(parallel_conductance([4.0, f64::INFINITY]), 0.25);
        assert_eq!(parallel_conductance(Vec::new()), 0.0);
    }
}
