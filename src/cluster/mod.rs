//! Cluster analysis.
//!
//! Labels the connected components of conductive cells, measures each one's
//! centroid and radius of gyration, and estimates the percolation
//! correlation length of the cluster population.

use std::collections::VecDeque;

use tracing::debug;

use crate::lattice::{Lattice, Point};

/// A connected component of conductive cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// Number of cells
    pub points: usize,
    /// Mean cell coordinate `(x, y)`
    pub centroid: (f64, f64),
    /// Sum of squared distances to the centroid
    pub inertia: f64,
    /// `sqrt(inertia / points)`
    pub radius_of_gyration: f64,
}

/// Clusters found in one lattice scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStatistics {
    /// Clusters in discovery (row-major) order
    pub clusters: Vec<Cluster>,
    /// Largest radius of gyration, 0 when there are no clusters
    pub max_radius: f64,
}

impl ClusterStatistics {
    /// Correlation length of the scanned population.
    pub fn correlation_length(&self) -> f64 {
        correlation_length(&self.clusters)
    }

    /// Total number of clustered cells.
    pub fn total_points(&self) -> usize {
        self.clusters.iter().map(|c| c.points).sum()
    }
}

/// Label every conductive component of the lattice.
///
/// Scans row-major; every conductive cell without a cluster mark seeds a
/// breadth-first flood over its 4-neighbours. Only the cluster-search flags
/// are written, and they are reset before the scan.
pub fn mark_clusters(lattice: &mut Lattice) -> ClusterStatistics {
    lattice.clear_cluster_visited();

    let mut stats = ClusterStatistics::default();
    let seeds: Vec<Point> = lattice.points().collect();

    for seed in seeds {
        if !lattice.get(seed).is_conductive() || lattice.is_cluster_visited(seed) {
            continue;
        }

        let members = flood_cluster(lattice, seed);
        let centroid = centroid(&members);
        let inertia = cluster_inertia(&members, centroid);
        let radius_of_gyration = (inertia / members.len() as f64).sqrt();

        stats.max_radius = stats.max_radius.max(radius_of_gyration);
        stats.clusters.push(Cluster {
            points: members.len(),
            centroid,
            inertia,
            radius_of_gyration,
        });
    }

    debug!(
        "found {} clusters, largest radius {:.3}",
        stats.clusters.len(),
        stats.max_radius
    );
    stats
}

fn flood_cluster(lattice: &mut Lattice, seed: Point) -> Vec<Point> {
    let mut members = Vec::new();
    let mut queue = VecDeque::from([seed]);
    lattice.set_cluster_visited(seed, true);

    while let Some(p) = queue.pop_front() {
        members.push(p);
        let next: Vec<Point> = lattice.neighbors(p).collect();
        for n in next {
            if lattice.get(n).is_conductive() && !lattice.is_cluster_visited(n) {
                lattice.set_cluster_visited(n, true);
                queue.push_back(n);
            }
        }
    }
    members
}

fn centroid(members: &[Point]) -> (f64, f64) {
    let n = members.len() as f64;
    let (sx, sy) = members
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    (sx / n, sy / n)
}

/// Sum of squared distances from the cells to `centroid`.
pub fn cluster_inertia(members: &[Point], centroid: (f64, f64)) -> f64 {
    members
        .iter()
        .map(|p| {
            let dx = p.x as f64 - centroid.0;
            let dy = p.y as f64 - centroid.1;
            dx * dx + dy * dy
        })
        .sum()
}

/// Second-moment correlation length `sum(r^2 n^2) / sum(n^2)`.
///
/// Weighting by the squared cluster size biases the estimate toward the
/// largest clusters. An empty population gives 0.
pub fn correlation_length(clusters: &[Cluster]) -> f64 {
    let (num, den) = clusters.iter().fold((0.0, 0.0), |(num, den), c| {
        let n2 = (c.points * c.points) as f64;
        let r2 = c.radius_of_gyration * c.radius_of_gyration;
        (num + r2 * n2, den + n2)
    });
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::CellState;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_lattice_has_no_clusters() {
        let mut lattice = Lattice::new(10, 10).unwrap();
        let stats = mark_clusters(&mut lattice);
        assert!(stats.clusters.is_empty());
        assert_eq!(stats.max_radius, 0.0);
        assert_eq!(stats.correlation_length(), 0.0);
    }

    #[test]
    fn test_single_cell_cluster() {
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.paint(Point::new(3, 1), CellState::Core, 1);
        let stats = mark_clusters(&mut lattice);
        assert_eq!(stats.clusters.len(), 1);
        let c = stats.clusters[0];
        assert_eq!(c.points, 1);
        assert_eq!(c.centroid, (3.0, 1.0));
        assert_eq!(c.radius_of_gyration, 0.0);
    }

    #[test]
    fn test_isolated_points_have_zero_correlation_length() {
        let mut lattice = Lattice::new(10, 10).unwrap();
        lattice.paint(Point::new(1, 1), CellState::Core, 1);
        lattice.paint(Point::new(8, 6), CellState::Hoop, 1);
        let stats = mark_clusters(&mut lattice);
        assert_eq!(stats.clusters.len(), 2);
        assert_eq!(stats.correlation_length(), 0.0);
    }

    #[test]
    fn test_bar_cluster_geometry() {
        let mut lattice = Lattice::new(6, 3).unwrap();
        for x in 1..5 {
            lattice.paint(Point::new(x, 1), CellState::Percolating, 1);
        }
        let stats = mark_clusters(&mut lattice);
        let c = stats.clusters[0];
        assert_eq!(c.points, 4);
        assert_relative_eq!(c.centroid.0, 2.5);
        assert_relative_eq!(c.centroid.1, 1.0);
        // Offsets -1.5, -0.5, 0.5, 1.5
        assert_relative_eq!(c.inertia, 5.0);
        assert_relative_eq!(c.radius_of_gyration, (5.0f64 / 4.0).sqrt());
        assert_relative_eq!(stats.max_radius, c.radius_of_gyration);
    }

    #[test]
    fn test_states_join_one_cluster() {
        let mut lattice = Lattice::new(4, 1).unwrap();
        lattice.paint(Point::new(0, 0), CellState::Core, 1);
        lattice.paint(Point::new(1, 0), CellState::Hoop, 2);
        lattice.paint(Point::new(2, 0), CellState::OnPath, 1);
        lattice.paint(Point::new(3, 0), CellState::Border, 0);
        let stats = mark_clusters(&mut lattice);
        assert_eq!(stats.clusters.len(), 1);
        assert_eq!(stats.total_points(), 3);
    }

    #[test]
    fn test_rescan_is_stable() {
        let mut lattice = Lattice::new(4, 4).unwrap();
        lattice.paint(Point::new(0, 0), CellState::Core, 1);
        let first = mark_clusters(&mut lattice);
        let second = mark_clusters(&mut lattice);
        assert_eq!(first, second);
    }

    #[test]
    fn test_equal_sizes_reduce_to_mean_square_radius() {
        let clusters = [
            Cluster {
                points: 3,
                centroid: (0.0, 0.0),
                inertia: 0.0,
                radius_of_gyration: 1.0,
            },
            Cluster {
                points: 3,
                centroid: (5.0, 5.0),
                inertia: 0.0,
                radius_of_gyration: 3.0,
            },
        ];
        assert_relative_eq!(correlation_length(&clusters), (1.0 + 9.0) / 2.0);
    }

    #[test]
    fn test_large_clusters_dominate() {
        let clusters = [
            Cluster {
                points: 1,
                centroid: (0.0, 0.0),
                inertia: 0.0,
                radius_of_gyration: 10.0,
            },
            Cluster {
                points: 10,
                centroid: (0.0, 0.0),
                inertia: 0.0,
                radius_of_gyration: 1.0,
            },
        ];
        assert_relative_eq!(correlation_length(&clusters), (100.0 + 100.0) / 101.0);
    }
}
