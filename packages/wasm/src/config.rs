//! Simulation configuration.
//!
//! All live-editable parameters in one place. The UI collaborator may send a
//! partial object; missing keys fall back to [`Default`].

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Lattice, LatticeError};

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

/// Parameters of the constraint relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelaxConfig {
    /// Minimum spacing between points of different colors (default: 0.75).
    pub min_distance_different_color: f64,
    /// Minimum spacing between points of the same color (default: 2.0).
    pub min_distance_same_color: f64,
    /// Correction strength per unit of penetration (default: 0.0, i.e. paused).
    pub tension: f64,
    /// Largest displacement of a point in one step (default: 0.1).
    pub max_velocity_per_step: f64,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            min_distance_different_color: 0.75,
            min_distance_same_color: 2.0,
            tension: 0.0,
            max_velocity_per_step: 0.1,
        }
    }
}

impl RelaxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("minDistanceDifferentColor", self.min_distance_different_color)?;
        positive("minDistanceSameColor", self.min_distance_same_color)?;
        non_negative("tension", self.tension)?;
        positive("maxVelocityPerStep", self.max_velocity_per_step)?;
        Ok(())
    }

    /// Spacing required between two colors.
    #[inline]
    pub fn min_distance(&self, a: i32, b: i32) -> f64 {
        if a == b {
            self.min_distance_same_color
        } else {
            self.min_distance_different_color
        }
    }
}

/// Parameters of the dual graph export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Radius around the origin whose images become graph vertices (default: 5.0).
    pub radius: f64,
    /// Width of the halo ring triangulated beyond the radius (default: 2.0).
    pub halo_margin: f64,
    /// Upper bound on the sector window scanned for images (default: 64).
    pub max_sector_window: i32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            halo_margin: 2.0,
            max_sector_window: 64,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("radius", self.radius)?;
        non_negative("haloMargin", self.halo_margin)?;
        non_negative("maxSectorWindow", self.max_sector_window as f64)?;
        Ok(())
    }
}

/// Full simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// First lattice basis vector (default: `[2.4, 0]`).
    pub basis_u: [f64; 2],
    /// Second lattice basis vector (default: `[1.2, 2.4·√0.75]`).
    pub basis_v: [f64; 2],
    pub relax: RelaxConfig,
    pub export: ExportConfig,
    /// Relaxation steps run per animation tick (default: 50).
    pub steps_per_tick: u32,
    /// Suggested timer interval for the animation driver (default: 16).
    pub tick_interval_ms: u32,
    /// Start with the eight demo points (default: false).
    pub seed_demo_points: bool,
}

/// Scale of the default hexagonal cell.
pub const DEFAULT_CELL_SCALE: f64 = 2.4;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            basis_u: [DEFAULT_CELL_SCALE, 0.0],
            basis_v: [0.5 * DEFAULT_CELL_SCALE, 0.75_f64.sqrt() * DEFAULT_CELL_SCALE],
            relax: RelaxConfig::default(),
            export: ExportConfig::default(),
            steps_per_tick: 50,
            tick_interval_ms: 16,
            seed_demo_points: false,
        }
    }
}

impl SimulationConfig {
    /// Build the lattice this configuration describes.
    pub fn lattice(&self) -> Result<Lattice, ConfigError> {
        Ok(Lattice::new(
            DVec2::from(self.basis_u),
            DVec2::from(self.basis_v),
        )?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lattice()?;
        self.relax.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps_per_tick, 50);
        assert_eq!(config.relax.min_distance(1, 1), 2.0);
        assert_eq!(config.relax.min_distance(1, 2), 0.75);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{ "basisU": [3.0, 0.0], "relax": { "tension": 0.5 }, "export": { "radius": 2.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.basis_u, [3.0, 0.0]);
        assert_eq!(config.basis_v, SimulationConfig::default().basis_v);
        assert_eq!(config.relax.tension, 0.5);
        assert_eq!(config.relax.max_velocity_per_step, 0.1);
        assert_eq!(config.export.radius, 2.0);
        assert_eq!(config.export.halo_margin, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SimulationConfig::default();
        config.relax.min_distance_same_color = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "minDistanceSameColor", .. })
        ));

        let mut config = SimulationConfig::default();
        config.relax.tension = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { name: "tension", .. })));

        let mut config = SimulationConfig::default();
        config.basis_v = [4.8, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Lattice(_))));
    }
}
