//! Path extraction through the percolating cluster.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::lattice::{CellState, Lattice, PathNode, Point};

/// Outcome of the depth-first path walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthFirstResult {
    /// Bottom-row cell the walk arrived at
    pub terminal: Point,
    /// Hops along the walk's branch from origin to terminal
    pub hops: usize,
}

/// Depth-first walk from `origin` to the bottom row.
///
/// Walks `Percolating` cells not yet visited by this walk. Visit marks are
/// never cleared on backtrack, so each cell is entered at most once. The hop
/// count is the length of a real path, so it bounds the minimum path length
/// from above, but it is not minimal. The lattice is left untouched.
///
/// Returns `None` when `origin` is not a valid start or the bottom row is
/// unreachable.
pub fn shortest_path(lattice: &Lattice, origin: Point) -> Option<DepthFirstResult> {
    if !is_valid_origin(lattice, origin) {
        warn!("depth-first walk requested from non-conductive cell {}", origin);
        return None;
    }

    let width = lattice.width();
    let bottom = lattice.bottom_row();
    let mut visited = vec![false; lattice.len()];
    let mut stack = vec![(origin, 0usize)];

    while let Some((p, hops)) = stack.pop() {
        let idx = p.y * width + p.x;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if p.y == bottom {
            return Some(DepthFirstResult { terminal: p, hops });
        }

        // Reverse so the first offset is explored first.
        let next: Vec<Point> = lattice.neighbors(p).collect();
        for n in next.into_iter().rev() {
            if lattice.get(n) == CellState::Percolating && !visited[n.y * width + n.x] {
                stack.push((n, hops + 1));
            }
        }
    }

    None
}

/// Breadth-first extraction of a minimum path from `origin` to the bottom
/// row.
///
/// Explores `Percolating` cells whose path-search flag is clear, recording
/// each discovered cell's predecessor. On reaching the bottom row the
/// predecessor chain is walked back to the origin; the cells of that chain
/// become `OnPath`, and every other discovered cell has its flag cleared so
/// it stays available to later searches.
///
/// Returns the nodes ordered from origin to terminal, or `None` when no path
/// exists.
pub fn minimum_path(lattice: &mut Lattice, origin: Point) -> Option<Vec<PathNode>> {
    if !is_valid_origin(lattice, origin) {
        warn!("minimum path requested from non-conductive cell {}", origin);
        return None;
    }

    let bottom = lattice.bottom_row();
    let mut nodes: HashMap<Point, PathNode> = HashMap::new();
    let mut discovered = vec![origin];
    let mut queue = VecDeque::from([origin]);
    let mut goal = None;

    nodes.insert(
        origin,
        PathNode {
            point: origin,
            prev: origin,
            distance: 0,
        },
    );
    lattice.set_visited(origin, true);

    while let Some(p) = queue.pop_front() {
        if p.y == bottom {
            goal = Some(p);
            break;
        }
        let distance = nodes[&p].distance + 1;
        let next: Vec<Point> = lattice.neighbors(p).collect();
        for n in next {
            if lattice.get(n) == CellState::Percolating && !lattice.is_visited(n) {
                lattice.set_visited(n, true);
                nodes.insert(
                    n,
                    PathNode {
                        point: n,
                        prev: p,
                        distance,
                    },
                );
                discovered.push(n);
                queue.push_back(n);
            }
        }
    }

    let path = goal.map(|goal| trace_back(&nodes, goal));
    let on_path: Vec<Point> = path
        .iter()
        .flatten()
        .map(|node| node.point)
        .collect();

    for p in discovered {
        lattice.set_visited(p, false);
    }
    for &p in &on_path {
        lattice.set(p, CellState::OnPath);
        lattice.set_visited(p, true);
    }

    match &path {
        Some(nodes) => debug!(
            "minimum path from {} has {} nodes",
            origin,
            nodes.len()
        ),
        None => debug!("no path from {} to the bottom row", origin),
    }
    path
}

fn trace_back(nodes: &HashMap<Point, PathNode>, goal: Point) -> Vec<PathNode> {
    let mut path = Vec::new();
    let mut current = nodes[&goal];
    loop {
        path.push(current);
        if current.prev == current.point {
            break;
        }
        current = nodes[&current.prev];
    }
    path.reverse();
    path
}

fn is_valid_origin(lattice: &Lattice, origin: Point) -> bool {
    lattice.contains(origin) && lattice.get(origin).is_search_origin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::span_test;

    fn percolating(rows: &[&str]) -> Lattice {
        let height = rows.len();
        let width = rows[0].len();
        let mut lattice = Lattice::new(width, height).unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    lattice.paint(Point::new(x, y), CellState::Core, 1);
                }
            }
        }
        assert!(span_test(&mut lattice));
        lattice
    }

    #[test]
    fn test_minimum_path_straight_column() {
        let mut lattice = Lattice::from_phase_labels(5, 5, &[1; 25]).unwrap();
        assert!(span_test(&mut lattice));

        let path = minimum_path(&mut lattice, Point::new(2, 0)).unwrap();
        assert_eq!(path.len(), 5);
        for (i, node) in path.iter().enumerate() {
            assert_eq!(node.point, Point::new(2, i));
            assert_eq!(node.distance, i);
        }
        assert_eq!(path[0].prev, path[0].point);
        assert_eq!(lattice.count(CellState::OnPath), 5);
    }

    #[test]
    fn test_off_path_cells_remain_available() {
        let mut lattice = Lattice::from_phase_labels(4, 4, &[1; 16]).unwrap();
        assert!(span_test(&mut lattice));
        minimum_path(&mut lattice, Point::new(0, 0)).unwrap();

        for p in lattice.points().collect::<Vec<_>>() {
            if lattice.get(p) == CellState::Percolating {
                assert!(!lattice.is_visited(p), "{} left visited", p);
            }
        }

        let second = minimum_path(&mut lattice, Point::new(1, 0)).unwrap();
        assert!(second.iter().all(|n| n.point.x != 0));
    }

    #[test]
    fn test_minimum_path_follows_winding_channel() {
        let mut lattice = percolating(&[
            "#....",
            "####.",
            "...#.",
            ".###.",
            ".#...",
        ]);
        let path = minimum_path(&mut lattice, Point::new(0, 0)).unwrap();
        let points: Vec<Point> = path.iter().map(|n| n.point).collect();
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(3, 2),
                Point::new(3, 3),
                Point::new(3, 4),
            ]
        );
        assert_eq!(path.last().unwrap().distance, 7);
    }

    #[test]
    fn test_depth_first_detour_counts_every_hop() {
        // The walk tries the left neighbour first and detours through it.
        let lattice = percolating(&[
            "##..",
            "##..",
            ".#..",
            ".#..",
        ]);
        let percolating_cells = lattice.count(CellState::Percolating);

        let walk = shortest_path(&lattice, Point::new(1, 0)).unwrap();
        assert_eq!(walk.terminal, Point::new(1, 3));
        assert_eq!(walk.hops, 5);
        assert_eq!(lattice.count(CellState::Percolating), percolating_cells);
    }

    #[test]
    fn test_minimum_never_longer_than_depth_first() {
        let mut lattice = percolating(&[
            "######",
            "#....#",
            "#.##.#",
            "#.#..#",
            "###.##",
            "..#...",
        ]);
        for x in 0..6 {
            let origin = Point::new(x, 0);
            let walk = shortest_path(&lattice, origin).unwrap();
            let mut scratch = lattice.clone();
            let path = minimum_path(&mut scratch, origin).unwrap();
            assert!(path.last().unwrap().distance <= walk.hops);
            assert_eq!(walk.terminal.y, 5);
        }
    }

    #[test]
    fn test_depth_first_leaves_lattice_untouched() {
        let lattice = percolating(&["##", "##"]);
        let before = lattice.clone();
        shortest_path(&lattice, Point::new(0, 0)).unwrap();
        assert_eq!(lattice.states(), before.states());
    }

    #[test]
    fn test_invalid_start_returns_none() {
        let mut lattice = percolating(&["#.", "#."]);
        assert!(minimum_path(&mut lattice, Point::new(1, 0)).is_none());
        assert!(shortest_path(&lattice, Point::new(1, 0)).is_none());
    }

    #[test]
    fn test_single_row_lattice() {
        let mut lattice = percolating(&["##"]);
        let path = minimum_path(&mut lattice, Point::new(1, 0)).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(
            shortest_path(&lattice, Point::new(0, 0)),
            Some(DepthFirstResult {
                terminal: Point::new(0, 0),
                hops: 0
            })
        );
    }
}
