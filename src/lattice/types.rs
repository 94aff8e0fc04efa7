//! Core types for lattice representation.

use std::fmt;

/// A cell coordinate. `x` is the column, `y` the row; row 0 is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset this point, returning `None` when it would leave the
    /// non-negative quadrant.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Point> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Point { x, y })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 4-neighbourhood offsets in traversal order: left, up, down, right.
///
/// The order only changes which cells a search visits first, never
/// whether a span exists.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// State of a single lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Insulating matrix
    #[default]
    Empty,
    /// Particle core
    Core,
    /// Soft shell around a particle core
    Hoop,
    /// Reached by a spanning flood fill
    Percolating,
    /// Part of an extracted minimum path
    OnPath,
    /// Part of the transverse tube of an extracted path
    SidePath,
    /// Sample frame drawn for snapshots
    Border,
}

impl CellState {
    /// Check if the cell carries current.
    pub fn is_conductive(&self) -> bool {
        matches!(
            self,
            CellState::Core
                | CellState::Hoop
                | CellState::Percolating
                | CellState::OnPath
                | CellState::SidePath
        )
    }

    /// Check if a path search may start on this cell.
    pub fn is_search_origin(&self) -> bool {
        matches!(
            self,
            CellState::Core | CellState::Hoop | CellState::Percolating
        )
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellState::Empty => "empty",
            CellState::Core => "core",
            CellState::Hoop => "hoop",
            CellState::Percolating => "percolating",
            CellState::OnPath => "on-path",
            CellState::SidePath => "side-path",
            CellState::Border => "border",
        };
        f.write_str(name)
    }
}

/// A node of a discovered path.
///
/// The origin node is its own predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    /// Cell this node occupies
    pub point: Point,
    /// Cell the path came from
    pub prev: Point,
    /// Hop distance from the path origin
    pub distance: usize,
}

impl PathNode {
    /// Check if the path entered this node along a column.
    ///
    /// The origin counts as vertical since paths run top to bottom.
    pub fn entered_vertically(&self) -> bool {
        self.prev.x == self.point.x
    }
}
