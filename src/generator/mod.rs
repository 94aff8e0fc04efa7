//! Random microstructure generation.
//!
//! Particles are dropped at uniformly random centres and rasterized onto the
//! lattice. Each particle kind has a [`Shape`], a core material and an
//! optional hoop: a shell of `hoop_width` cells around the core painted as
//! [`CellState::Hoop`].
//!
//! Painting rules:
//! - cores overwrite whatever is underneath, including earlier hoops
//! - hoops only fill empty cells
//!
//! In inverse mode the picture is negated after placement: particle cells
//! become holes and the matrix becomes a conductor of the chosen phase.
//!
//! The random generator is always passed in by the caller, so every
//! realization can own an independently seeded stream.

mod shape;

pub use shape::Shape;

use rand::Rng;
use tracing::debug;

use crate::lattice::{CellState, Lattice, Point, MATRIX_PHASE};

/// One particle kind to place.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpec {
    /// Particle geometry
    pub shape: Shape,
    /// Number of particles placed per realization
    pub count: usize,
    /// Material id of the core
    pub core_material: usize,
    /// Material id of the hoop
    pub hoop_material: usize,
    /// Hoop thickness in cells, 0 for bare cores
    pub hoop_width: f64,
    /// Draw a uniform random orientation for every particle
    pub random_orientation: bool,
}

impl ParticleSpec {
    /// Bare particles of one material.
    pub fn new(shape: Shape, count: usize, core_material: usize) -> Self {
        Self {
            shape,
            count,
            core_material,
            hoop_material: core_material,
            hoop_width: 0.0,
            random_orientation: false,
        }
    }

    /// Add a hoop of the given material and thickness.
    pub fn with_hoop(mut self, material: usize, width: f64) -> Self {
        self.hoop_material = material;
        self.hoop_width = width;
        self
    }

    /// Randomize the orientation of every placed particle.
    pub fn with_random_orientation(mut self) -> Self {
        self.random_orientation = true;
        self
    }
}

/// Places particles on a lattice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generator {
    particles: Vec<ParticleSpec>,
    inverse_material: Option<usize>,
}

impl Generator {
    /// Create a generator for the given particle kinds.
    pub fn new(particles: Vec<ParticleSpec>) -> Self {
        Self {
            particles,
            inverse_material: None,
        }
    }

    /// Negate the picture after placement, making the matrix a conductor of
    /// `material`.
    pub fn with_inverse(mut self, material: usize) -> Self {
        self.inverse_material = Some(material);
        self
    }

    /// Particle kinds placed by this generator.
    pub fn particles(&self) -> &[ParticleSpec] {
        &self.particles
    }

    /// Clear the lattice and fill it with a fresh random microstructure.
    pub fn populate<R: Rng>(&self, lattice: &mut Lattice, rng: &mut R) {
        lattice.clear();
        let (width, height) = (lattice.width() as f64, lattice.height() as f64);

        for spec in &self.particles {
            for _ in 0..spec.count {
                let cx = rng.gen_range(0.0..width);
                let cy = rng.gen_range(0.0..height);
                let shape = if spec.random_orientation {
                    spec.shape.oriented(rng.gen_range(0.0..180.0))
                } else {
                    spec.shape
                };
                place(lattice, spec, &shape, (cx, cy));
            }
        }

        if let Some(material) = self.inverse_material {
            invert(lattice, material);
        }

        debug!(
            "populated {}x{} lattice, conductive fraction {:.4}",
            lattice.width(),
            lattice.height(),
            lattice.conductive_fraction()
        );
    }
}

/// Rasterize one particle centred at `center` (cell units).
pub fn place(lattice: &mut Lattice, spec: &ParticleSpec, shape: &Shape, center: (f64, f64)) {
    let width = lattice.width() as f64;
    let height = lattice.height() as f64;
    let reach = shape.bounding_radius(spec.hoop_width).ceil() + 1.0;
    let (cx, cy) = center;

    // Scan window clipped to the lattice.
    let x0 = (cx - reach).floor().clamp(0.0, width) as isize;
    let x1 = (cx + reach).ceil().clamp(0.0, width - 1.0) as isize;
    let y0 = (cy - reach).floor().clamp(0.0, height) as isize;
    let y1 = (cy + reach).ceil().clamp(0.0, height - 1.0) as isize;

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !lattice.is_valid(x, y) {
                continue;
            }
            let p = Point::new(x as usize, y as usize);
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;

            if shape.contains(dx, dy, 0.0) {
                lattice.paint(p, CellState::Core, spec.core_material);
            } else if spec.hoop_width > 0.0
                && lattice.get(p) == CellState::Empty
                && shape.contains(dx, dy, spec.hoop_width)
            {
                lattice.paint(p, CellState::Hoop, spec.hoop_material);
            }
        }
    }
}

fn invert(lattice: &mut Lattice, material: usize) {
    let points: Vec<Point> = lattice.points().collect();
    for p in points {
        if lattice.get(p).is_conductive() {
            lattice.paint(p, CellState::Empty, MATRIX_PHASE);
        } else {
            lattice.paint(p, CellState::Core, material);
        }
    }
}
