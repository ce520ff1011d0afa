//! RelaxationEngine - pushes points apart until minimum spacings hold.
//!
//! Each step is one explicit Euler update. Every stored point is pushed away
//! from every image in its 3×3 neighbourhood that sits closer than the minimum
//! spacing for the pair's colors, including the point's own periodic copies.
//! The summed push is capped in length, applied, and the result canonicalized
//! back into the fundamental cell.

use glam::DVec2;

use crate::config::{ConfigError, RelaxConfig};
use crate::geometry::Lattice;
use crate::periodic::{PeriodicView, NEIGHBORHOOD_RADIUS};
use crate::points::{PointId, PointImage, PointSet};

/// Fixed-iteration relaxation integrator.
///
/// The engine does not own the points; the simulation passes its [`PointSet`]
/// and [`Lattice`] into every step.
#[derive(Debug, Clone, Default)]
pub struct RelaxationEngine {
    config: RelaxConfig,

    /// Point under direct user control, exempt from relaxation writes.
    pinned: Option<PointId>,

    /// Per-point velocity scratch, reused across steps.
    velocities: Vec<DVec2>,
}

impl RelaxationEngine {
    /// Create an engine with validated parameters.
    pub fn new(config: RelaxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            pinned: None,
            velocities: Vec::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &RelaxConfig {
        &self.config
    }

    /// Replace all parameters at once. On error the previous values stay.
    pub fn set_config(&mut self, config: RelaxConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_min_distance_different_color(&mut self, value: f64) -> Result<(), ConfigError> {
        self.update(|c| c.min_distance_different_color = value)
    }

    pub fn set_min_distance_same_color(&mut self, value: f64) -> Result<(), ConfigError> {
        self.update(|c| c.min_distance_same_color = value)
    }

    pub fn set_tension(&mut self, value: f64) -> Result<(), ConfigError> {
        self.update(|c| c.tension = value)
    }

    pub fn set_max_velocity_per_step(&mut self, value: f64) -> Result<(), ConfigError> {
        self.update(|c| c.max_velocity_per_step = value)
    }

    fn update(&mut self, edit: impl FnOnce(&mut RelaxConfig)) -> Result<(), ConfigError> {
        let mut config = self.config;
        edit(&mut config);
        self.set_config(config)
    }

    // =========================================================================
    // Pinning
    // =========================================================================

    /// Exempt a point from relaxation writes. Replaces any previous pin.
    pub fn pin(&mut self, id: PointId) {
        self.pinned = Some(id);
    }

    /// Release the pinned point, if any.
    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    #[inline]
    pub fn pinned(&self) -> Option<PointId> {
        self.pinned
    }

    /// Keep the pin on the same point after `deleted` was removed.
    ///
    /// Deleting the pinned point clears the pin; deleting an earlier point
    /// shifts the pinned id down by one.
    pub fn on_point_deleted(&mut self, deleted: PointId) {
        self.pinned = match self.pinned {
            Some(pinned) if pinned == deleted => None,
            Some(pinned) if pinned > deleted => Some(PointId(pinned.0 - 1)),
            other => other,
        };
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Run one relaxation step.
    ///
    /// Returns the largest displacement applied to an unpinned point.
    pub fn step(&mut self, points: &mut PointSet, lattice: &Lattice) -> f64 {
        if points.is_empty() {
            return 0.0;
        }

        self.accumulate(points, lattice);

        let mut largest: f64 = 0.0;
        for (index, velocity) in self.velocities.iter().enumerate() {
            let id = PointId(index as u32);
            if self.pinned == Some(id) {
                continue;
            }
            let Some(position) = points.position(id) else {
                continue;
            };
            points.set_position(id, lattice.canonicalize(position + *velocity));
            largest = largest.max(velocity.length());
        }
        largest
    }

    /// Run `count` steps back to back. No convergence check.
    pub fn step_n(&mut self, points: &mut PointSet, lattice: &Lattice, count: u32) {
        for _ in 0..count {
            self.step(points, lattice);
        }
    }

    /// Fill the velocity scratch from the current positions.
    fn accumulate(&mut self, points: &PointSet, lattice: &Lattice) {
        let config = self.config;
        let view = PeriodicView::new(points, lattice);
        let neighbourhood = view.positioned_images(NEIGHBORHOOD_RADIUS);
        let stored = points.as_slice();

        self.velocities.clear();
        self.velocities.resize(stored.len(), DVec2::ZERO);

        for (id, a) in points.iter() {
            let raw = PointImage::raw(id);
            let mut velocity = DVec2::ZERO;

            for &(image, b_position) in &neighbourhood {
                if image == raw {
                    continue;
                }
                let Some(b) = stored.get(image.point.index()) else {
                    continue;
                };
                if !b_position.is_finite() {
                    continue;
                }
                let min_distance = config.min_distance(a.color, b.color);
                let delta = a.position - b_position;
                let distance_sq = delta.length_squared();
                if distance_sq >= min_distance * min_distance {
                    continue;
                }
                // Coincident images have no direction and exert nothing.
                let penetration = min_distance - distance_sq.sqrt();
                velocity += delta.normalize_or_zero() * (penetration * config.tension);
            }

            self.velocities[id.index()] = velocity.clamp_length_max(config.max_velocity_per_step);
        }
    }
}
