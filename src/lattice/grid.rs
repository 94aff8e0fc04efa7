//! Lattice storage.

use super::types::{CellState, Point, NEIGHBOR_OFFSETS};
use crate::error::{PercolationError, Result};

/// Phase id reported for cells that hold no particle.
pub const MATRIX_PHASE: usize = 0;

/// A `width x height` grid of cell states and material ids.
///
/// All per-cell buffers have exactly `width * height` entries and are
/// allocated and cleared together. The path-search and cluster-search
/// visitation flags live in separate buffers so the two searches never
/// observe each other's marks.
#[derive(Debug, Clone)]
pub struct Lattice {
    width: usize,
    height: usize,
    states: Vec<CellState>,
    materials: Vec<usize>,
    visited: Vec<bool>,
    cluster_visited: Vec<bool>,
}

impl Lattice {
    /// Create an empty lattice.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PercolationError::InvalidGrid { width, height });
        }
        let len = width * height;
        Ok(Self {
            width,
            height,
            states: vec![CellState::Empty; len],
            materials: vec![MATRIX_PHASE; len],
            visited: vec![false; len],
            cluster_visited: vec![false; len],
        })
    }

    /// Build a lattice from a phase-label array.
    ///
    /// Cells labelled with the matrix phase stay empty, all others become
    /// particle cores carrying their label as material id.
    pub fn from_phase_labels(width: usize, height: usize, labels: &[usize]) -> Result<Self> {
        let mut lattice = Self::new(width, height)?;
        lattice.load_phase_labels(labels)?;
        Ok(lattice)
    }

    /// Repaint the lattice from a phase-label array.
    pub fn load_phase_labels(&mut self, labels: &[usize]) -> Result<()> {
        if labels.len() != self.len() {
            return Err(PercolationError::LengthMismatch {
                expected: self.len(),
                actual: labels.len(),
            });
        }
        self.clear();
        for (idx, &label) in labels.iter().enumerate() {
            if label != MATRIX_PHASE {
                self.states[idx] = CellState::Core;
                self.materials[idx] = label;
            }
        }
        Ok(())
    }

    /// Grid width (number of columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (number of rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; a lattice has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Row index of the bottom edge.
    pub fn bottom_row(&self) -> usize {
        self.height - 1
    }

    /// Bounds check on signed coordinates.
    pub fn is_valid(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Bounds check on a point.
    pub fn contains(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Checked conversion from a point to its buffer index.
    pub fn checked_index(&self, p: Point) -> Result<usize> {
        if self.contains(p) {
            Ok(self.index(p))
        } else {
            Err(PercolationError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        debug_assert!(self.contains(p), "{} outside lattice", p);
        p.y * self.width + p.x
    }

    /// State of a cell.
    #[inline]
    pub fn get(&self, p: Point) -> CellState {
        self.states[self.index(p)]
    }

    /// Set the state of a cell.
    #[inline]
    pub fn set(&mut self, p: Point, state: CellState) {
        let idx = self.index(p);
        self.states[idx] = state;
    }

    /// Material id of a cell.
    #[inline]
    pub fn material(&self, p: Point) -> usize {
        self.materials[self.index(p)]
    }

    /// Paint a cell with a state and material in one step.
    pub fn paint(&mut self, p: Point, state: CellState, material: usize) {
        let idx = self.index(p);
        self.states[idx] = state;
        self.materials[idx] = material;
    }

    /// Path-search visitation flag.
    #[inline]
    pub fn is_visited(&self, p: Point) -> bool {
        self.visited[self.index(p)]
    }

    /// Set the path-search visitation flag.
    #[inline]
    pub fn set_visited(&mut self, p: Point, visited: bool) {
        let idx = self.index(p);
        self.visited[idx] = visited;
    }

    /// Cluster-search visitation flag.
    #[inline]
    pub fn is_cluster_visited(&self, p: Point) -> bool {
        self.cluster_visited[self.index(p)]
    }

    /// Set the cluster-search visitation flag.
    #[inline]
    pub fn set_cluster_visited(&mut self, p: Point, visited: bool) {
        let idx = self.index(p);
        self.cluster_visited[idx] = visited;
    }

    /// Reset every per-cell buffer to its default.
    pub fn clear(&mut self) {
        self.states.fill(CellState::Empty);
        self.materials.fill(MATRIX_PHASE);
        self.clear_visited();
        self.clear_cluster_visited();
    }

    /// Reset only the path-search flags.
    pub fn clear_visited(&mut self) {
        self.visited.fill(false);
    }

    /// Reset only the cluster-search flags.
    pub fn clear_cluster_visited(&mut self) {
        self.cluster_visited.fill(false);
    }

    /// In-bounds 4-neighbours of `p` in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| p.offset(dx, dy))
            .filter(move |n| self.contains(*n))
    }

    /// All cells in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    /// Cell states in row-major order.
    pub fn states(&self) -> &[CellState] {
        &self.states
    }

    /// Number of cells in the given state.
    pub fn count(&self, state: CellState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    /// Fraction of cells that conduct.
    pub fn conductive_fraction(&self) -> f64 {
        let conductive = self.states.iter().filter(|s| s.is_conductive()).count();
        conductive as f64 / self.len() as f64
    }

    /// Phase label of every cell in row-major order.
    ///
    /// Cells that hold no particle report the matrix phase regardless of
    /// any stale material id.
    pub fn phase_labels(&self) -> Vec<usize> {
        self.states
            .iter()
            .zip(&self.materials)
            .map(|(state, &material)| {
                if state.is_conductive() {
                    material
                } else {
                    MATRIX_PHASE
                }
            })
            .collect()
    }

    /// Mark empty edge cells as [`CellState::Border`].
    pub fn mark_border(&mut self) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            for y in [0, h - 1] {
                self.mark_border_cell(Point::new(x, y));
            }
        }
        for y in 0..h {
            for x in [0, w - 1] {
                self.mark_border_cell(Point::new(x, y));
            }
        }
    }

    fn mark_border_cell(&mut self, p: Point) {
        if self.get(p) == CellState::Empty {
            self.set(p, CellState::Border);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_grid() {
        assert!(matches!(
            Lattice::new(0, 4),
            Err(PercolationError::InvalidGrid { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_buffers_share_length() {
        let lattice = Lattice::new(7, 3).unwrap();
        assert_eq!(lattice.len(), 21);
        assert_eq!(lattice.states().len(), lattice.phase_labels().len());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut lattice = Lattice::new(4, 4).unwrap();
        let p = Point::new(1, 2);
        lattice.paint(p, CellState::Core, 2);
        lattice.set_visited(p, true);
        lattice.set_cluster_visited(p, true);

        lattice.clear();

        assert_eq!(lattice.get(p), CellState::Empty);
        assert_eq!(lattice.material(p), MATRIX_PHASE);
        assert!(!lattice.is_visited(p));
        assert!(!lattice.is_cluster_visited(p));
    }

    #[test]
    fn test_visitation_spaces_are_independent() {
        let mut lattice = Lattice::new(3, 3).unwrap();
        let p = Point::new(1, 1);
        lattice.set_visited(p, true);
        assert!(!lattice.is_cluster_visited(p));
        lattice.clear_visited();
        lattice.set_cluster_visited(p, true);
        assert!(!lattice.is_visited(p));
    }

    #[test]
    fn test_is_valid() {
        let lattice = Lattice::new(5, 2).unwrap();
        assert!(lattice.is_valid(4, 1));
        assert!(!lattice.is_valid(5, 1));
        assert!(!lattice.is_valid(-1, 0));
        assert!(!lattice.is_valid(0, 2));
    }

    #[test]
    fn test_neighbors_order_and_bounds() {
        let lattice = Lattice::new(3, 3).unwrap();
        let center: Vec<_> = lattice.neighbors(Point::new(1, 1)).collect();
        assert_eq!(
            center,
            vec![
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(1, 2),
                Point::new(2, 1)
            ]
        );
        assert_eq!(lattice.neighbors(Point::new(0, 0)).count(), 2);
    }

    #[test]
    fn test_phase_labels_round_trip() {
        let labels = vec![0, 1, 2, 0, 0, 1];
        let lattice = Lattice::from_phase_labels(3, 2, &labels).unwrap();
        assert_eq!(lattice.get(Point::new(0, 0)), CellState::Empty);
        assert_eq!(lattice.get(Point::new(2, 0)), CellState::Core);
        assert_eq!(lattice.phase_labels(), labels);
    }

    #[test]
    fn test_load_rejects_wrong_length() {
        let mut lattice = Lattice::new(2, 2).unwrap();
        assert!(matches!(
            lattice.load_phase_labels(&[1, 1, 1]),
            Err(PercolationError::LengthMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_mark_border_keeps_particles() {
        let mut lattice = Lattice::new(4, 3).unwrap();
        lattice.paint(Point::new(0, 0), CellState::Core, 1);
        lattice.mark_border();
        assert_eq!(lattice.get(Point::new(0, 0)), CellState::Core);
        assert_eq!(lattice.get(Point::new(3, 2)), CellState::Border);
        assert_eq!(lattice.get(Point::new(1, 1)), CellState::Empty);
        assert_eq!(lattice.count(CellState::Border), 9);
    }

    #[test]
    fn test_checked_index() {
        let lattice = Lattice::new(4, 3).unwrap();
        assert_eq!(lattice.checked_index(Point::new(3, 2)).unwrap(), 11);
        assert!(matches!(
            lattice.checked_index(Point::new(4, 0)),
            Err(PercolationError::OutOfBounds { x: 4, y: 0, .. })
        ));
    }
}
