//! Per-phase material properties.

use crate::error::{PercolationError, Result};

/// Transport and elastic properties of one material phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseProperties {
    /// Phase name as written in the settings file
    pub name: String,
    /// Electrical conductivity (S/m)
    pub electric_conductivity: f64,
    /// Thermal conductivity (W/(m K))
    pub thermal_conductivity: f64,
    /// Young's modulus (Pa)
    pub youngs_modulus: f64,
    /// Poisson ratio
    pub poisson_ratio: f64,
}

impl PhaseProperties {
    /// Create a phase with the given electrical conductivity and all other
    /// properties zero.
    pub fn conductor(name: impl Into<String>, electric_conductivity: f64) -> Self {
        Self {
            name: name.into(),
            electric_conductivity,
            thermal_conductivity: 0.0,
            youngs_modulus: 0.0,
            poisson_ratio: 0.0,
        }
    }

    /// Set the thermal conductivity.
    pub fn with_thermal_conductivity(mut self, value: f64) -> Self {
        self.thermal_conductivity = value;
        self
    }

    /// Set the elastic constants.
    pub fn with_elastic(mut self, youngs_modulus: f64, poisson_ratio: f64) -> Self {
        self.youngs_modulus = youngs_modulus;
        self.poisson_ratio = poisson_ratio;
        self
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            ("sigma", self.electric_conductivity),
            ("kappa", self.thermal_conductivity),
            ("E", self.youngs_modulus),
        ];
        for (param, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(PercolationError::invalid_parameter(
                    &self.name,
                    param,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }
        if !(0.0..=0.5).contains(&self.poisson_ratio) {
            return Err(PercolationError::invalid_parameter(
                &self.name,
                "nu",
                format!("must lie in [0, 0.5], got {}", self.poisson_ratio),
            ));
        }
        Ok(())
    }
}

/// Read-only property table indexed by material id.
///
/// Phase 0 is the matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTable {
    phases: Vec<PhaseProperties>,
}

impl PhaseTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase, returning its material id.
    pub fn push(&mut self, phase: PhaseProperties) -> Result<usize> {
        if self.find(&phase.name).is_some() {
            return Err(PercolationError::DuplicatePhase { name: phase.name });
        }
        phase.validate()?;
        self.phases.push(phase);
        Ok(self.phases.len() - 1)
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Check if no phase has been defined.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Properties of a material id.
    pub fn get(&self, material: usize) -> Option<&PhaseProperties> {
        self.phases.get(material)
    }

    /// Material id of a named phase.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Electrical conductivity of each phase in material-id order.
    pub fn electric_conductivities(&self) -> Vec<f64> {
        self.phases.iter().map(|p| p.electric_conductivity).collect()
    }

    /// Ensure a material id is defined.
    pub fn check_material(&self, material: usize) -> Result<()> {
        if material < self.phases.len() {
            Ok(())
        } else {
            Err(PercolationError::UnknownMaterial {
                material,
                phases: self.phases.len(),
            })
        }
    }

    /// Iterate over all phases.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseProperties> {
        self.phases.iter()
    }
}
