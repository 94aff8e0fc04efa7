//! One Monte Carlo realization.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::cluster::{mark_clusters, ClusterStatistics};
use crate::error::Result;
use crate::generator::Generator;
use crate::lattice::{CellState, Lattice, Point};
use crate::reduction::{parallel_conductance, reduce_path, PathProperties};
use crate::search::{minimum_path, shortest_path, span_test};
use crate::settings::SimulationConfig;
use crate::solver::{ConjugateGradient, FdmGrid, FdmSolution};

/// Everything measured on one realization.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizationResult {
    /// Realization index
    pub iteration: usize,
    /// Fraction of conductive cells after placement
    pub filler_fraction: f64,
    /// Whether a conductor spans top to bottom
    pub percolates: bool,
    /// Reduced node-disjoint paths in extraction order
    pub paths: Vec<PathProperties>,
    /// Hop count of the depth-first walk from the first path origin
    pub dfs_hops: Option<usize>,
    /// Electrical conductance of all paths in parallel
    pub electric_conductance: f64,
    /// Thermal conductance of all paths in parallel
    pub thermal_conductance: f64,
    /// Cluster scan, when statistics were requested
    pub clusters: Option<ClusterStatistics>,
    /// Finite-difference solve, when requested
    pub fdm: Option<FdmSolution>,
}

impl RealizationResult {
    fn new(iteration: usize, filler_fraction: f64) -> Self {
        Self {
            iteration,
            filler_fraction,
            percolates: false,
            paths: Vec::new(),
            dfs_hops: None,
            electric_conductance: 0.0,
            thermal_conductance: 0.0,
            clusters: None,
            fdm: None,
        }
    }

    /// Number of extracted paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Mean node count of the extracted paths, 0 without paths.
    pub fn mean_path_length(&self) -> f64 {
        mean(self.paths.iter().map(|p| p.length as f64))
    }

    /// Mean Young's modulus of the extracted paths, 0 without paths.
    pub fn youngs_modulus(&self) -> f64 {
        mean(self.paths.iter().map(|p| p.youngs_modulus))
    }

    /// Mean Poisson ratio of the extracted paths, 0 without paths.
    pub fn poisson_ratio(&self) -> f64 {
        mean(self.paths.iter().map(|p| p.poisson_ratio))
    }

    /// Largest cluster radius of gyration, 0 without statistics.
    pub fn max_cluster_radius(&self) -> f64 {
        self.clusters.as_ref().map_or(0.0, |c| c.max_radius)
    }

    /// Correlation length of the cluster population, 0 without statistics.
    pub fn correlation_length(&self) -> f64 {
        self.clusters
            .as_ref()
            .map_or(0.0, ClusterStatistics::correlation_length)
    }
}

/// Arithmetic mean, 0 for an empty input.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Runs realizations of one configuration on a reusable lattice.
pub struct Realization<'a> {
    config: &'a SimulationConfig,
    generator: Generator,
    solver: ConjugateGradient,
    lattice: Lattice,
}

impl<'a> Realization<'a> {
    /// Create a runner for a validated configuration.
    pub fn new(config: &'a SimulationConfig) -> Result<Self> {
        Ok(Self {
            config,
            generator: config.generator(),
            solver: config.solver(),
            lattice: Lattice::new(config.width, config.height)?,
        })
    }

    /// Lattice as left by the last realization.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Generate and analyse realization `iteration`.
    ///
    /// The microstructure is drawn from `seed ^ iteration`, so every
    /// realization can be replayed on its own. Clusters and the
    /// finite-difference solve see the fresh microstructure; the span test
    /// and path extraction run last because they rewrite cell states.
    pub fn run(&mut self, iteration: usize) -> Result<RealizationResult> {
        let config = self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ iteration as u64);
        self.generator.populate(&mut self.lattice, &mut rng);

        let mut result = RealizationResult::new(iteration, self.lattice.conductive_fraction());

        if config.analyses.calc_statistics {
            result.clusters = Some(mark_clusters(&mut self.lattice));
        }

        if config.analyses.calc_electric_conductivity_with_fdm {
            let grid = FdmGrid::new(
                config.width,
                config.height,
                &self.lattice.phase_labels(),
                &config.phases.electric_conductivities(),
            )?;
            result.fdm = Some(self.solver.solve(&grid, config.field));
        }

        if config.analyses.calc_electric_conductivity {
            result.percolates = span_test(&mut self.lattice);
            if result.percolates {
                self.extract_paths(&mut result);
            }
        }

        debug!(
            "realization {}: fraction {:.4}, percolates {}, {} paths",
            iteration,
            result.filler_fraction,
            result.percolates,
            result.paths.len()
        );
        Ok(result)
    }

    /// Pull node-disjoint minimum paths from the top-row origins until the
    /// path limit is reached or the origins run out.
    fn extract_paths(&mut self, result: &mut RealizationResult) {
        let origins: Vec<Point> = (0..self.lattice.width())
            .map(|x| Point::new(x, 0))
            .filter(|&p| self.lattice.get(p) == CellState::Percolating)
            .collect();

        for origin in origins {
            if result.paths.len() >= self.config.max_paths {
                break;
            }
            // Earlier tubes may have claimed this origin.
            if self.lattice.get(origin) != CellState::Percolating {
                continue;
            }

            if result.dfs_hops.is_none() {
                result.dfs_hops = shortest_path(&self.lattice, origin).map(|walk| walk.hops);
            }

            let Some(path) = minimum_path(&mut self.lattice, origin) else {
                trace!("origin {} is cut off from the bottom row", origin);
                continue;
            };
            let props = reduce_path(&mut self.lattice, &path, &self.config.phases);
            result.paths.push(props);
        }

        result.electric_conductance =
            parallel_conductance(result.paths.iter().map(|p| p.electric_resistance));
        result.thermal_conductance =
            parallel_conductance(result.paths.iter().map(|p| p.thermal_resistance));
    }
}
