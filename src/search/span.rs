//! Top-to-bottom span test.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::SPAN_BATCH;
use crate::lattice::{CellState, Lattice, Point};

/// Result of a single flood fill from a top-row cell.
#[derive(Debug, Clone)]
pub struct FloodFill {
    /// Column the fill started from
    pub origin: Point,
    /// Cells reached, in discovery order
    members: Vec<Point>,
    reached: HashSet<Point>,
    /// Number of cells reached
    pub cells: usize,
    /// Whether the fill touched the bottom row
    pub spans: bool,
}

impl FloodFill {
    /// Check if the fill reached a cell.
    pub fn reached(&self, p: Point) -> bool {
        self.reached.contains(&p)
    }

    /// Cells reached, in discovery order.
    pub fn members(&self) -> &[Point] {
        &self.members
    }
}

/// Flood-fill the `Core` cells connected to `origin`.
///
/// The fill keeps its own reach set, sized by the cells it reaches, and
/// never writes to the lattice, so several fills can run over the same
/// lattice concurrently. Returns `None` when `origin` is not a `Core` cell.
pub fn flood_fill(lattice: &Lattice, origin: Point) -> Option<FloodFill> {
    if !lattice.contains(origin) || lattice.get(origin) != CellState::Core {
        warn!("flood fill requested from non-conductive cell {}", origin);
        return None;
    }

    let bottom = lattice.bottom_row();
    let mut reached = HashSet::from([origin]);
    let mut members = Vec::new();
    let mut stack = vec![origin];
    let mut spans = false;

    while let Some(p) = stack.pop() {
        members.push(p);
        if p.y == bottom {
            spans = true;
        }
        for n in lattice.neighbors(p) {
            if lattice.get(n) == CellState::Core && reached.insert(n) {
                stack.push(n);
            }
        }
    }

    Some(FloodFill {
        origin,
        cells: members.len(),
        members,
        reached,
        spans,
    })
}

/// Leftmost column of every run of `Core` cells along the top row.
///
/// Cells of one run belong to one cluster, so a single fill per run
/// decides the whole run.
fn start_columns(lattice: &Lattice) -> Vec<Point> {
    let is_core = |x: usize| lattice.get(Point::new(x, 0)) == CellState::Core;
    (0..lattice.width())
        .filter(|&x| is_core(x) && (x == 0 || !is_core(x - 1)))
        .map(|x| Point::new(x, 0))
        .collect()
}

/// Test whether a `Core` cluster connects the top row to the bottom row.
///
/// Start columns are processed in batches of [`SPAN_BATCH`]; the fills of
/// one batch run in parallel. The first spanning fill in column order wins:
/// its cells become `Percolating`, the entire bottom row is marked
/// `Percolating`, and the remaining columns are not examined. Top-row
/// cells reached by a failed fill are dropped from later batches, so a
/// non-spanning cluster is filled at most once per batch it has a start in.
///
/// Returns `false` without touching the lattice when nothing spans.
pub fn span_test(lattice: &mut Lattice) -> bool {
    let starts = start_columns(lattice);
    let mut covered = vec![false; lattice.width()];
    let mut next = 0;
    let mut fills_run = 0usize;

    while next < starts.len() {
        let mut batch = Vec::with_capacity(SPAN_BATCH);
        while batch.len() < SPAN_BATCH && next < starts.len() {
            let start = starts[next];
            next += 1;
            if !covered[start.x] {
                batch.push(start);
            }
        }
        if batch.is_empty() {
            break;
        }

        let snapshot: &Lattice = lattice;
        let fills: Vec<FloodFill> = batch
            .par_iter()
            .filter_map(|&origin| flood_fill(snapshot, origin))
            .collect();
        fills_run += fills.len();

        if let Some(fill) = fills.iter().find(|fill| fill.spans) {
            debug!(
                "span found from column {} covering {} cells",
                fill.origin.x, fill.cells
            );
            mark_percolating(lattice, fill);
            return true;
        }

        for fill in &fills {
            for p in fill.members.iter().filter(|p| p.y == 0) {
                covered[p.x] = true;
            }
        }
    }

    debug!(
        "no spanning cluster among {} start runs ({} fills)",
        starts.len(),
        fills_run
    );
    false
}

fn mark_percolating(lattice: &mut Lattice, fill: &FloodFill) {
    for &p in &fill.members {
        lattice.set(p, CellState::Percolating);
    }

    let bottom = lattice.bottom_row();
    for x in 0..lattice.width() {
        lattice.set(Point::new(x, bottom), CellState::Percolating);
    }
}
