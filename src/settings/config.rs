//! Simulation configuration.

use crate::error::{PercolationError, Result};
use crate::generator::{Generator, ParticleSpec};
use crate::phase::PhaseTable;
use crate::solver::{ConjugateGradient, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Default grid edge length in cells.
pub const DEFAULT_GRID_SIZE: usize = 100;

/// Default number of Monte Carlo realizations.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Largest particle bounding radius, as a multiple of the larger grid side.
pub const MAX_SHAPE_REACH: f64 = 16.0;

/// Analyses run on every realization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisFlags {
    /// Span test, minimum paths and path reduction
    pub calc_electric_conductivity: bool,
    /// Finite-difference conductivity solve
    pub calc_electric_conductivity_with_fdm: bool,
    /// Cluster labelling and correlation length
    pub calc_statistics: bool,
}

impl Default for AnalysisFlags {
    fn default() -> Self {
        Self {
            calc_electric_conductivity: true,
            calc_electric_conductivity_with_fdm: false,
            calc_statistics: false,
        }
    }
}

impl AnalysisFlags {
    /// All analyses disabled.
    pub fn none() -> Self {
        Self {
            calc_electric_conductivity: false,
            calc_electric_conductivity_with_fdm: false,
            calc_statistics: false,
        }
    }

    /// All analyses enabled.
    pub fn all() -> Self {
        Self {
            calc_electric_conductivity: true,
            calc_electric_conductivity_with_fdm: true,
            calc_statistics: true,
        }
    }
}

/// Configuration for a Monte Carlo run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Lattice width in cells
    pub width: usize,
    /// Lattice height in cells
    pub height: usize,
    /// Number of realizations
    pub iterations: usize,
    /// Base seed; realization `k` draws from `seed ^ k`
    pub seed: u64,
    /// Material phases, phase 0 is the matrix
    pub phases: PhaseTable,
    /// Particle kinds placed per realization
    pub particles: Vec<ParticleSpec>,
    /// Negate the microstructure after placement
    pub inverse: bool,
    /// Conductor phase of an inverted matrix, defaults to the first
    /// particle's core
    pub inverse_material: Option<usize>,
    /// Selected analyses
    pub analyses: AnalysisFlags,
    /// Upper bound on node-disjoint paths extracted per realization
    pub max_paths: usize,
    /// Applied field for the finite-difference solve
    pub field: (f64, f64),
    /// Conjugate-gradient tolerance
    pub solver_tolerance: f64,
    /// Conjugate-gradient iteration cap
    pub solver_max_iterations: usize,
    /// Worker threads for realizations, `None` for the rayon default
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            iterations: DEFAULT_ITERATIONS,
            seed: 0,
            phases: PhaseTable::new(),
            particles: Vec::new(),
            inverse: false,
            inverse_material: None,
            analyses: AnalysisFlags::default(),
            max_paths: 1,
            field: (1.0, 1.0),
            solver_tolerance: DEFAULT_TOLERANCE,
            solver_max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lattice size.
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of realizations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the phase table.
    pub fn with_phases(mut self, phases: PhaseTable) -> Self {
        self.phases = phases;
        self
    }

    /// Add a particle kind.
    pub fn with_particle(mut self, particle: ParticleSpec) -> Self {
        self.particles.push(particle);
        self
    }

    /// Invert the microstructure, making the matrix a conductor of
    /// `material` (or of the first particle core when `None`).
    pub fn with_inverse(mut self, material: Option<usize>) -> Self {
        self.inverse = true;
        self.inverse_material = material;
        self
    }

    /// Select the analyses.
    pub fn with_analyses(mut self, analyses: AnalysisFlags) -> Self {
        self.analyses = analyses;
        self
    }

    /// Set the per-realization path limit.
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    /// Set the field applied by the finite-difference solve.
    pub fn with_field(mut self, ex: f64, ey: f64) -> Self {
        self.field = (ex, ey);
        self
    }

    /// Set the conjugate-gradient tolerance and iteration cap.
    pub fn with_solver(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.solver_tolerance = tolerance;
        self.solver_max_iterations = max_iterations;
        self
    }

    /// Set the realization worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PercolationError::InvalidGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.phases.is_empty() {
            return Err(PercolationError::MissingPhases);
        }
        if self.iterations == 0 {
            return Err(PercolationError::invalid_config("iterations must be positive"));
        }
        if self.threads == Some(0) {
            return Err(PercolationError::invalid_config("threads must be positive"));
        }
        if !(self.solver_tolerance.is_finite() && self.solver_tolerance > 0.0) {
            return Err(PercolationError::invalid_config(format!(
                "solver tolerance must be positive, got {}",
                self.solver_tolerance
            )));
        }
        if self.solver_max_iterations == 0 {
            return Err(PercolationError::invalid_config(
                "solver iteration cap must be positive",
            ));
        }
        let max_reach = MAX_SHAPE_REACH * self.width.max(self.height) as f64;
        for particle in &self.particles {
            self.phases.check_material(particle.core_material)?;
            self.phases.check_material(particle.hoop_material)?;
            if !(particle.hoop_width.is_finite() && particle.hoop_width >= 0.0) {
                return Err(PercolationError::invalid_config(format!(
                    "hoop width must be non-negative, got {}",
                    particle.hoop_width
                )));
            }
            if !particle.shape.is_well_formed() {
                return Err(PercolationError::invalid_config(format!(
                    "{} dimensions must be finite and positive: {:?}",
                    particle.shape.keyword(),
                    particle.shape
                )));
            }
            let reach = particle.shape.bounding_radius(particle.hoop_width);
            if reach > max_reach {
                return Err(PercolationError::invalid_config(format!(
                    "{} reaches {} cells, more than {} for a {}x{} grid",
                    particle.shape.keyword(),
                    reach,
                    max_reach,
                    self.width,
                    self.height
                )));
            }
        }
        if self.inverse {
            let material = self.resolved_inverse_material().ok_or_else(|| {
                PercolationError::invalid_config("inverse mode needs a conductor phase")
            })?;
            self.phases.check_material(material)?;
        }
        Ok(())
    }

    fn resolved_inverse_material(&self) -> Option<usize> {
        self.inverse_material
            .or_else(|| self.particles.first().map(|p| p.core_material))
    }

    /// Build the microstructure generator.
    pub fn generator(&self) -> Generator {
        let generator = Generator::new(self.particles.clone());
        match self.resolved_inverse_material() {
            Some(material) if self.inverse => generator.with_inverse(material),
            _ => generator,
        }
    }

    /// Build the conjugate-gradient solver.
    pub fn solver(&self) -> ConjugateGradient {
        ConjugateGradient::with_config(self.solver_max_iterations, self.solver_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Shape;
    use crate::phase::PhaseProperties;

    fn two_phases() -> PhaseTable {
        let mut table = PhaseTable::new();
        table.push(PhaseProperties::conductor("matrix", 0.0)).unwrap();
        table.push(PhaseProperties::conductor("filler", 1.0)).unwrap();
        table
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::new();
        assert_eq!((config.width, config.height), (100, 100));
        assert_eq!(config.max_paths, 1);
        assert!(config.analyses.calc_electric_conductivity);
        assert!(!config.analyses.calc_electric_conductivity_with_fdm);
    }

    #[test]
    fn test_validate_requires_phases() {
        assert!(matches!(
            SimulationConfig::new().validate(),
            Err(PercolationError::MissingPhases)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let config = SimulationConfig::new().with_phases(two_phases()).with_grid(0, 5);
        assert!(matches!(
            config.validate(),
            Err(PercolationError::InvalidGrid { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_validate_rejects_huge_radius() {
        let config = SimulationConfig::new()
            .with_phases(two_phases())
            .with_grid(20, 20)
            .with_particle(ParticleSpec::new(Shape::Circle { radius: 1e30 }, 1, 1));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PercolationError::InvalidConfig { .. }));
        assert!(err.to_string().contains("circle"));
    }

    #[test]
    fn test_validate_rejects_degenerate_shape() {
        let shape = Shape::Rectangle {
            width: 0.0,
            height: 2.0,
        };
        let config = SimulationConfig::new()
            .with_phases(two_phases())
            .with_particle(ParticleSpec::new(shape, 1, 1));
        assert!(matches!(
            config.validate(),
            Err(PercolationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_checks_particle_materials() {
        let config = SimulationConfig::new()
            .with_phases(two_phases())
            .with_particle(ParticleSpec::new(Shape::Circle { radius: 1.0 }, 1, 4));
        assert!(matches!(
            config.validate(),
            Err(PercolationError::UnknownMaterial { material: 4, .. })
        ));
    }

    #[test]
    fn test_inverse_needs_a_conductor() {
        let config = SimulationConfig::new()
            .with_phases(two_phases())
            .with_inverse(None);
        assert!(config.validate().is_err());

        let config = config.with_particle(ParticleSpec::new(Shape::Circle { radius: 1.0 }, 1, 1));
        assert!(config.validate().is_ok());
        assert_eq!(config.generator(), Generator::new(config.particles.clone()).with_inverse(1));
    }
}
