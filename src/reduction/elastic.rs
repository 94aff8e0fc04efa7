//! Elastic layering along a path.

use crate::lattice::{PathNode, Point};

/// Direction of a straight run of path nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Nodes share a row
    Horizontal,
    /// Nodes share a column
    Vertical,
}

/// A straight run of consecutive path nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticLayer {
    /// First node of the run in walk order (terminal side)
    pub start: Point,
    /// Run direction, `None` for a single node
    pub orientation: Option<Orientation>,
    /// Number of nodes in the layer
    pub nodes: usize,
    /// Harmonic mean of the node moduli
    pub youngs_modulus: f64,
    /// Harmonic mean of the node Poisson ratios
    pub poisson_ratio: f64,
}

/// Group per-node elastic constants into layers.
///
/// Walks the nodes from the terminal back to the origin. A node continues
/// the current layer while it stays in the layer's row (horizontal run) or
/// column (vertical run); a turn starts a new layer. A corner node closes
/// the run it ends. Layers are returned in the order they were closed,
/// terminal side first.
pub fn group_layers(nodes: &[(PathNode, f64, f64)]) -> Vec<ElasticLayer> {
    let mut layers = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();
    let mut start = None;
    let mut last: Option<Point> = None;
    let mut orientation = None;

    for &(node, modulus, ratio) in nodes.iter().rev() {
        let p = node.point;
        if let (Some(first), Some(prev)) = (start, last) {
            let step = if p.y == prev.y {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            if orientation.map_or(true, |o| o == step) {
                orientation = Some(step);
            } else {
                layers.push(close_layer(first, orientation, &run));
                run.clear();
                start = Some(p);
                orientation = None;
            }
        } else {
            start = Some(p);
        }
        last = Some(p);
        run.push((modulus, ratio));
    }
    if let Some(first) = start {
        layers.push(close_layer(first, orientation, &run));
    }
    layers
}

fn close_layer(start: Point, orientation: Option<Orientation>, run: &[(f64, f64)]) -> ElasticLayer {
    ElasticLayer {
        start,
        orientation,
        nodes: run.len(),
        youngs_modulus: harmonic_mean(run.iter().map(|&(e, _)| e)),
        poisson_ratio: harmonic_mean(run.iter().map(|&(_, nu)| nu)),
    }
}

/// Harmonic mean `n / sum(1/v)`.
///
/// Any non-positive value makes the whole chain compliant, so the mean is 0.
/// An empty input also gives 0.
pub fn harmonic_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    match reciprocal_parts(values) {
        Some((count, reciprocal_sum)) => count as f64 / reciprocal_sum,
        None => 0.0,
    }
}

/// Reciprocal sum `1 / sum(1/v)` of elements acting as springs in series.
///
/// Non-positive values and empty input give 0, as for [`harmonic_mean`].
pub fn reciprocal_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    match reciprocal_parts(values) {
        Some((_, reciprocal_sum)) => 1.0 / reciprocal_sum,
        None => 0.0,
    }
}

fn reciprocal_parts(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    let mut count = 0usize;
    let mut reciprocal_sum = 0.0;
    for v in values {
        if v <= 0.0 {
            return None;
        }
        count += 1;
        reciprocal_sum += 1.0 / v;
    }
    (count > 0).then_some((count, reciprocal_sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node(x: usize, y: usize, px: usize, py: usize) -> PathNode {
        PathNode {
            point: Point::new(x, y),
            prev: Point::new(px, py),
            distance: 0,
        }
    }

    #[test]
    fn test_harmonic_mean() {
        assert_relative_eq!(harmonic_mean([2.0, 2.0]), 2.0);
        assert_relative_eq!(harmonic_mean([1.0, 3.0]), 1.5);
        assert_eq!(harmonic_mean([5.0, 0.0]), 0.0);
        assert_eq!(harmonic_mean(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_reciprocal_sum() {
        assert_relative_eq!(reciprocal_sum([2.0, 2.0]), 1.0);
        assert_relative_eq!(reciprocal_sum([10.0, 10.0, 10.0, 10.0]), 2.5);
        assert_eq!(reciprocal_sum([5.0, -1.0]), 0.0);
        assert_eq!(reciprocal_sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_straight_column_is_one_layer() {
        let nodes: Vec<_> = (0..4)
            .map(|y| (node(0, y, 0, y.saturating_sub(1)), 10.0, 0.3))
            .collect();
        let layers = group_layers(&nodes);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].orientation, Some(Orientation::Vertical));
        assert_eq!(layers[0].nodes, 4);
        assert_relative_eq!(layers[0].youngs_modulus, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_turns_split_layers() {
        // (0,0) -> (0,1) -> (1,1) -> (2,1) -> (2,2)
        let nodes = vec![
            (node(0, 0, 0, 0), 1.0, 0.2),
            (node(0, 1, 0, 0), 1.0, 0.2),
            (node(1, 1, 0, 1), 3.0, 0.3),
            (node(2, 1, 1, 1), 1.0, 0.2),
            (node(2, 2, 2, 1), 4.0, 0.4),
        ];
        let layers = group_layers(&nodes);
        let shape: Vec<_> = layers.iter().map(|l| (l.start, l.orientation, l.nodes)).collect();
        assert_eq!(
            shape,
            vec![
                (Point::new(2, 2), Some(Orientation::Vertical), 2),
                (Point::new(1, 1), Some(Orientation::Horizontal), 2),
                (Point::new(0, 0), None, 1),
            ]
        );
        assert_relative_eq!(layers[0].youngs_modulus, 2.0 / (0.25 + 1.0));
        assert_relative_eq!(layers[1].youngs_modulus, 2.0 / (1.0 / 3.0 + 1.0));
        assert_relative_eq!(layers[2].youngs_modulus, 1.0);
    }

    #[test]
    fn test_empty_path_has_no_layers() {
        assert!(group_layers(&[]).is_empty());
    }
}
