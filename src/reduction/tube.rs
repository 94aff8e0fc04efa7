//! Transverse slices of the conduction tube.

use crate::lattice::{CellState, Lattice, PathNode, Point};
use crate::phase::PhaseTable;

/// The cells perpendicular to a path node and their series resistance.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Slice cells other than the path node
    pub cells: Vec<Point>,
    /// Sum of `1/sigma` over the node and its slice cells
    pub electric_resistance: f64,
    /// Sum of `1/kappa` over the node and its slice cells
    pub thermal_resistance: f64,
}

impl Slice {
    /// Transverse electrical conductance of the node.
    pub fn electric_conductance(&self) -> f64 {
        invert(self.electric_resistance)
    }

    /// Transverse thermal conductance of the node.
    pub fn thermal_conductance(&self) -> f64 {
        invert(self.thermal_resistance)
    }

    /// Mark the slice cells as part of a tube.
    pub fn claim(&self, lattice: &mut Lattice) {
        for &p in &self.cells {
            lattice.set(p, CellState::SidePath);
        }
    }
}

/// Walk perpendicular to the direction the path entered `node`.
///
/// The walk runs both ways from the node and stops at the grid edge, at the
/// sink row, or at any cell that is not free conductor (insulators and cells
/// already owned by a path or tube).
pub fn transverse_slice(lattice: &Lattice, node: &PathNode, phases: &PhaseTable) -> Slice {
    let directions: [(isize, isize); 2] = if node.entered_vertically() {
        [(-1, 0), (1, 0)]
    } else {
        [(0, -1), (0, 1)]
    };

    let bottom = lattice.bottom_row();
    let mut cells = Vec::new();
    for (dx, dy) in directions {
        let mut current = node.point;
        while let Some(next) = current.offset(dx, dy) {
            if !lattice.contains(next) || next.y == bottom || !joins_tube(lattice.get(next)) {
                break;
            }
            cells.push(next);
            current = next;
        }
    }

    let mut electric_resistance = 0.0;
    let mut thermal_resistance = 0.0;
    for p in std::iter::once(node.point).chain(cells.iter().copied()) {
        let phase = phases.get(lattice.material(p));
        electric_resistance += resistance(phase.map_or(0.0, |ph| ph.electric_conductivity));
        thermal_resistance += resistance(phase.map_or(0.0, |ph| ph.thermal_conductivity));
    }

    Slice {
        cells,
        electric_resistance,
        thermal_resistance,
    }
}

fn joins_tube(state: CellState) -> bool {
    matches!(
        state,
        CellState::Core | CellState::Hoop | CellState::Percolating
    )
}

fn resistance(conductivity: f64) -> f64 {
    if conductivity > 0.0 {
        1.0 / conductivity
    } else {
        f64::INFINITY
    }
}

fn invert(resistance: f64) -> f64 {
    if resistance > 0.0 {
        1.0 / resistance
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseProperties;
    use approx::assert_relative_eq;

    fn table() -> PhaseTable {
        let mut table = PhaseTable::new();
        table.push(PhaseProperties::conductor("matrix", 0.0)).unwrap();
        table
            .push(PhaseProperties::conductor("a", 1.0).with_thermal_conductivity(2.0))
            .unwrap();
        table
            .push(PhaseProperties::conductor("b", 4.0).with_thermal_conductivity(8.0))
            .unwrap();
        table
    }

    #[test]
    fn test_horizontal_slice_for_vertical_entry() {
        // Row 1: . a b a .   node at x=2, entered from above
        let labels = vec![
            0, 0, 0, 0, 0, //
            0, 1, 2, 1, 0, //
            0, 0, 0, 0, 0,
        ];
        let lattice = Lattice::from_phase_labels(5, 3, &labels).unwrap();
        let node = PathNode {
            point: Point::new(2, 1),
            prev: Point::new(2, 0),
            distance: 1,
        };
        let slice = transverse_slice(&lattice, &node, &table());

        assert_eq!(slice.cells, vec![Point::new(1, 1), Point::new(3, 1)]);
        assert_relative_eq!(slice.electric_resistance, 1.0 + 0.25 + 1.0);
        assert_relative_eq!(slice.thermal_resistance, 0.5 + 0.125 + 0.5);
        assert_relative_eq!(slice.electric_conductance(), 1.0 / 2.25);
    }

    #[test]
    fn test_vertical_slice_stops_above_sink_row() {
        let lattice = Lattice::from_phase_labels(2, 4, &[1; 8]).unwrap();
        let node = PathNode {
            point: Point::new(1, 1),
            prev: Point::new(0, 1),
            distance: 1,
        };
        let slice = transverse_slice(&lattice, &node, &table());
        assert_eq!(slice.cells, vec![Point::new(1, 0), Point::new(1, 2)]);
    }

    #[test]
    fn test_slice_stops_at_claimed_cells() {
        let mut lattice = Lattice::from_phase_labels(4, 2, &[1; 8]).unwrap();
        lattice.set(Point::new(1, 0), CellState::SidePath);
        let node = PathNode {
            point: Point::new(2, 0),
            prev: Point::new(2, 0),
            distance: 0,
        };
        let slice = transverse_slice(&lattice, &node, &table());
        assert_eq!(slice.cells, vec![Point::new(3, 0)]);
    }
}
