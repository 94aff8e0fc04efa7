//! Monte Carlo driver.

use rayon::prelude::*;
use tracing::{info, warn};

use super::realization::{mean, Realization, RealizationResult};
use crate::error::{PercolationError, Result};
use crate::settings::SimulationConfig;

/// Ensemble averages over all realizations of a run.
///
/// Means over an empty subset are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Number of realizations
    pub realizations: usize,
    /// Mean conductive fraction
    pub filler_fraction: f64,
    /// Fraction of realizations that percolate
    pub percolation_probability: f64,
    /// Mean number of extracted paths
    pub mean_path_count: f64,
    /// Mean path length over realizations with paths
    pub mean_path_length: f64,
    /// Mean electrical conductance, non-percolating realizations count as 0
    pub electric_conductance: f64,
    /// Mean thermal conductance, non-percolating realizations count as 0
    pub thermal_conductance: f64,
    /// Mean path Young's modulus over realizations with paths
    pub youngs_modulus: f64,
    /// Mean path Poisson ratio over realizations with paths
    pub poisson_ratio: f64,
    /// Mean largest cluster radius over realizations with statistics
    pub max_cluster_radius: f64,
    /// Mean correlation length over realizations with statistics
    pub correlation_length: f64,
    /// Mean finite-difference conductivity along x
    pub fdm_conductivity_x: f64,
    /// Mean finite-difference conductivity along y
    pub fdm_conductivity_y: f64,
    /// Finite-difference solves that hit the iteration cap
    pub unconverged_solves: usize,
}

impl Summary {
    /// Aggregate per-realization results.
    pub fn from_results(results: &[RealizationResult]) -> Self {
        let with_paths = || results.iter().filter(|r| !r.paths.is_empty());
        let with_clusters = || results.iter().filter(|r| r.clusters.is_some());
        let solves = || results.iter().filter_map(|r| r.fdm);

        Self {
            realizations: results.len(),
            filler_fraction: mean(results.iter().map(|r| r.filler_fraction)),
            percolation_probability: mean(
                results.iter().map(|r| if r.percolates { 1.0 } else { 0.0 }),
            ),
            mean_path_count: mean(results.iter().map(|r| r.path_count() as f64)),
            mean_path_length: mean(with_paths().map(RealizationResult::mean_path_length)),
            electric_conductance: mean(results.iter().map(|r| r.electric_conductance)),
            thermal_conductance: mean(results.iter().map(|r| r.thermal_conductance)),
            youngs_modulus: mean(with_paths().map(RealizationResult::youngs_modulus)),
            poisson_ratio: mean(with_paths().map(RealizationResult::poisson_ratio)),
            max_cluster_radius: mean(with_clusters().map(RealizationResult::max_cluster_radius)),
            correlation_length: mean(with_clusters().map(RealizationResult::correlation_length)),
            fdm_conductivity_x: mean(solves().map(|s| s.conductivity_x())),
            fdm_conductivity_y: mean(solves().map(|s| s.conductivity_y())),
            unconverged_solves: solves().filter(|s| !s.converged).count(),
        }
    }
}

/// Results of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloReport {
    /// Per-realization results in iteration order
    pub results: Vec<RealizationResult>,
    /// Ensemble averages
    pub summary: Summary,
}

/// Runs all realizations of a configuration in parallel.
#[derive(Debug)]
pub struct MonteCarlo {
    config: SimulationConfig,
}

impl MonteCarlo {
    /// Create a driver, validating the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every realization and aggregate the results.
    ///
    /// Realizations are independent: each owns its lattice and random
    /// stream, so results do not depend on the thread count.
    pub fn run(&self) -> Result<MonteCarloReport> {
        let config = &self.config;
        info!(
            "running {} realizations on a {}x{} lattice",
            config.iterations, config.width, config.height
        );

        let results = match config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| PercolationError::invalid_config(e.to_string()))?
                .install(|| self.run_all()),
            None => self.run_all(),
        }?;

        let summary = Summary::from_results(&results);
        if summary.unconverged_solves > 0 {
            warn!(
                "{} of {} finite-difference solves did not converge",
                summary.unconverged_solves, summary.realizations
            );
        }
        info!(
            "percolation probability {:.3}, mean conductance {:.4e}",
            summary.percolation_probability, summary.electric_conductance
        );

        Ok(MonteCarloReport { results, summary })
    }

    /// Run a single realization, for replays and snapshots.
    pub fn run_one(&self, iteration: usize) -> Result<(RealizationResult, Realization<'_>)> {
        let mut realization = Realization::new(&self.config)?;
        let result = realization.run(iteration)?;
        Ok((result, realization))
    }

    fn run_all(&self) -> Result<Vec<RealizationResult>> {
        (0..self.config.iterations)
            .into_par_iter()
            .map_init(
                || Realization::new(&self.config),
                |realization, iteration| match realization {
                    Ok(realization) => realization.run(iteration),
                    Err(_) => Realization::new(&self.config)?.run(iteration),
                },
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{ParticleSpec, Shape};
    use crate::phase::{PhaseProperties, PhaseTable};
    use crate::settings::AnalysisFlags;
    use approx::assert_relative_eq;

    fn config() -> SimulationConfig {
        let mut phases = PhaseTable::new();
        phases.push(PhaseProperties::conductor("matrix", 0.0)).unwrap();
        phases
            .push(PhaseProperties::conductor("filler", 1.0).with_elastic(5.0, 0.3))
            .unwrap();
        SimulationConfig::new()
            .with_grid(20, 20)
            .with_iterations(6)
            .with_seed(11)
            .with_phases(phases)
            .with_particle(ParticleSpec::new(Shape::Circle { radius: 2.5 }, 25, 1))
            .with_analyses(AnalysisFlags::all())
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(MonteCarlo::new(SimulationConfig::new()).is_err());
    }

    #[test]
    fn test_results_are_ordered_and_reproducible() {
        let runner = MonteCarlo::new(config()).unwrap();
        let first = runner.run().unwrap();
        let second = MonteCarlo::new(config().with_threads(1)).unwrap().run().unwrap();

        let iterations: Vec<usize> = first.results.iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, (0..6).collect::<Vec<_>>());
        assert_eq!(first, second);

        let (replay, _) = runner.run_one(3).unwrap();
        assert_eq!(replay, first.results[3]);
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        assert_eq!(Summary::from_results(&[]), Summary::default());
    }

    #[test]
    fn test_summary_probability() {
        let report = MonteCarlo::new(config()).unwrap().run().unwrap();
        let percolating = report.results.iter().filter(|r| r.percolates).count();
        assert_relative_eq!(
            report.summary.percolation_probability,
            percolating as f64 / 6.0
        );
        assert!(report.summary.fdm_conductivity_x >= 0.0);
        assert!(report.summary.fdm_conductivity_x <= 1.0 + 1e-9);
    }
}
