//! Simulation - owner of all mutable state.
//!
//! The simulation is the single writer of the [`PointSet`]. Every mutation
//! goes through it, so the invariants that span modules live here:
//! - stored positions are canonical for the current lattice
//! - at most one point is pinned, and the pin follows renumbering
//! - rejected parameter changes leave the previous values in place

use glam::DVec2;
use log::{debug, trace, warn};

use crate::config::{ConfigError, ExportConfig, SimulationConfig, DEFAULT_CELL_SCALE};
use crate::dual::{triangulate, unique_edges, DualGraph, NeighborGraphBuilder};
use crate::geometry::Lattice;
use crate::periodic::{PeriodicView, NEIGHBORHOOD_RADIUS};
use crate::points::{PointId, PointImage, PointSet};
use crate::relax::RelaxationEngine;
use crate::util::interpolate_exp;

/// Demo scene: `(x, y, color)`, inserted in order and canonicalized.
pub const DEMO_POINTS: [(f64, f64, i32); 8] = [
    (0.0, 0.0, 0),
    (1.0, 0.0, 1),
    (2.0, 0.1, 2),
    (2.5, 0.0, 3),
    (1.0, 1.0, 4),
    (2.0, 1.0, 5),
    (3.0, 1.1, 6),
    (2.1, 2.0, 7),
];

/// Tension range covered by the exponential slider.
pub const TENSION_SLIDER_RANGE: (f64, f64) = (0.001, 1.0);

/// An interactive periodic packing simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    lattice: Lattice,
    points: PointSet,
    relax: RelaxationEngine,
    builder: NeighborGraphBuilder,

    /// Image grabbed by the pointer, if a drag is in progress.
    drag: Option<PointImage>,
}

impl Simulation {
    /// Create a simulation from a validated configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let lattice = config.lattice()?;
        let relax = RelaxationEngine::new(config.relax)?;
        let builder = NeighborGraphBuilder::new(config.export.max_sector_window);

        let mut simulation = Self {
            config,
            lattice,
            points: PointSet::new(),
            relax,
            builder,
            drag: None,
        };
        if simulation.config.seed_demo_points {
            simulation.seed_demo_points();
        }
        Ok(simulation)
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Read-only periodic view of the current state.
    #[inline]
    pub fn view(&self) -> PeriodicView<'_> {
        PeriodicView::new(&self.points, &self.lattice)
    }

    /// Point currently exempt from relaxation.
    #[inline]
    pub fn pinned(&self) -> Option<PointId> {
        self.relax.pinned()
    }

    #[inline]
    pub fn dragged_image(&self) -> Option<PointImage> {
        self.drag
    }

    /// Append the demo points.
    pub fn seed_demo_points(&mut self) {
        for (x, y, color) in DEMO_POINTS {
            self.request_add_point(DVec2::new(x, y), color);
        }
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Grab the image nearest to `position` within `pick_radius`.
    ///
    /// Any previous drag is released first, so a miss leaves nothing pinned.
    /// The grabbed point is pinned and immediately moved to `position`.
    /// Returns the grabbed image, or `None` for an empty selection.
    pub fn pointer_down(&mut self, position: DVec2, pick_radius: f64) -> Option<PointImage> {
        self.release();
        let image = self.view().nearest_image(position, pick_radius)?;
        trace!("pointer down at {position} grabbed {image}");
        self.drag = Some(image);
        self.relax.pin(image.point);
        self.pointer_drag(position);
        Some(image)
    }

    /// Move the grabbed image to `position`. No-op without a drag.
    ///
    /// A drag whose image went stale is released.
    pub fn pointer_drag(&mut self, position: DVec2) -> bool {
        let Some(image) = self.drag else {
            return false;
        };
        if !self.view().is_valid(image) {
            warn!("releasing stale drag of {image}");
            self.release();
            return false;
        }
        self.set_position(image, position)
    }

    /// End the drag and release the pin.
    pub fn pointer_up(&mut self, position: DVec2) {
        trace!("pointer up at {position}");
        self.release();
    }

    /// Abort the drag and release the pin.
    pub fn pointer_cancel(&mut self) {
        trace!("pointer cancelled");
        self.release();
    }

    fn release(&mut self) {
        self.drag = None;
        self.relax.unpin();
    }

    // =========================================================================
    // Point Lifecycle
    // =========================================================================

    /// Add a point at `position` (canonicalized) with any color tag.
    ///
    /// Non-finite positions are rejected and return `None`.
    pub fn request_add_point(&mut self, position: DVec2, color: i32) -> Option<PointId> {
        if !position.is_finite() {
            warn!("rejected point at non-finite position {position}");
            return None;
        }
        Some(self.points.add_point(self.lattice.canonicalize(position), color))
    }

    /// Delete the point whose image is nearest to `position`.
    ///
    /// Returns the deleted id, or `None` if nothing is within `pick_radius`.
    pub fn request_delete_point(&mut self, position: DVec2, pick_radius: f64) -> Option<PointId> {
        let id = self.view().nearest_point(position, pick_radius)?;
        self.delete_point(id).then_some(id)
    }

    /// Delete a point by id. Out-of-range ids are a silent no-op.
    pub fn delete_point(&mut self, id: PointId) -> bool {
        if !self.points.delete_point(id) {
            return false;
        }
        self.relax.on_point_deleted(id);
        self.drag = match self.drag {
            Some(image) if image.point == id => None,
            Some(image) if image.point > id => {
                Some(PointImage::new(PointId(image.point.0 - 1), image.sector))
            }
            other => other,
        };
        true
    }

    /// Place `image` at `position`; stores the canonical base position.
    ///
    /// Returns false for a stale image or a non-finite position.
    pub fn set_position(&mut self, image: PointImage, position: DVec2) -> bool {
        if !position.is_finite() {
            warn!("rejected move of {image} to non-finite position {position}");
            return false;
        }
        self.points
            .set_position(image.point, self.lattice.canonicalize(position))
    }

    /// Remove every point and end any drag.
    pub fn clear(&mut self) {
        self.points.clear();
        self.release();
    }

    // =========================================================================
    // Relaxation
    // =========================================================================

    /// Run one animation tick worth of steps. Returns the number of steps run.
    pub fn tick(&mut self) -> u32 {
        let steps = self.config.steps_per_tick;
        self.step(steps);
        debug!("tick: {} steps over {} points", steps, self.points.len());
        steps
    }

    /// Run `count` relaxation steps.
    pub fn step(&mut self, count: u32) {
        self.relax.step_n(&mut self.points, &self.lattice, count);
    }

    pub fn set_min_distance_different_color(&mut self, value: f64) -> Result<(), ConfigError> {
        let result = self.relax.set_min_distance_different_color(value);
        self.sync_relax(result)
    }

    pub fn set_min_distance_same_color(&mut self, value: f64) -> Result<(), ConfigError> {
        let result = self.relax.set_min_distance_same_color(value);
        self.sync_relax(result)
    }

    pub fn set_tension(&mut self, value: f64) -> Result<(), ConfigError> {
        let result = self.relax.set_tension(value);
        self.sync_relax(result)
    }

    pub fn set_max_velocity_per_step(&mut self, value: f64) -> Result<(), ConfigError> {
        let result = self.relax.set_max_velocity_per_step(value);
        self.sync_relax(result)
    }

    /// Set tension from a slider position in `[0, 1]`, exponentially mapped.
    pub fn set_tension_from_slider(&mut self, t: f64) -> Result<(), ConfigError> {
        if !t.is_finite() {
            return self.set_tension(t);
        }
        let (min, max) = TENSION_SLIDER_RANGE;
        self.set_tension(interpolate_exp(t.clamp(0.0, 1.0), min, max))
    }

    pub fn set_steps_per_tick(&mut self, steps: u32) {
        self.config.steps_per_tick = steps;
    }

    fn sync_relax(&mut self, result: Result<(), ConfigError>) -> Result<(), ConfigError> {
        match result {
            Ok(()) => {
                self.config.relax = *self.relax.config();
                Ok(())
            }
            Err(err) => {
                warn!("rejected relaxation parameter: {err}");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Lattice
    // =========================================================================

    /// Replace both basis vectors and re-canonicalize all points.
    pub fn set_basis(&mut self, u: DVec2, v: DVec2) -> Result<(), ConfigError> {
        if let Err(err) = self.lattice.set_basis(u, v) {
            warn!("rejected basis {u}, {v}: {err}");
            return Err(err.into());
        }
        self.config.basis_u = self.lattice.u().to_array();
        self.config.basis_v = self.lattice.v().to_array();
        self.points.canonicalize_all(&self.lattice);
        debug!("basis set to {}, {}", self.lattice.u(), self.lattice.v());
        Ok(())
    }

    pub fn set_basis_u(&mut self, u: DVec2) -> Result<(), ConfigError> {
        self.set_basis(u, self.lattice.v())
    }

    pub fn set_basis_v(&mut self, v: DVec2) -> Result<(), ConfigError> {
        self.set_basis(self.lattice.u(), v)
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn set_export_radius(&mut self, radius: f64) -> Result<(), ConfigError> {
        let mut export = self.config.export;
        export.radius = radius;
        self.apply_export(export)
    }

    pub fn set_halo_margin(&mut self, margin: f64) -> Result<(), ConfigError> {
        let mut export = self.config.export;
        export.halo_margin = margin;
        self.apply_export(export)
    }

    fn apply_export(&mut self, export: ExportConfig) -> Result<(), ConfigError> {
        if let Err(err) = export.validate() {
            warn!("rejected export parameter: {err}");
            return Err(err);
        }
        self.config.export = export;
        self.builder.set_max_sector_window(export.max_sector_window);
        Ok(())
    }

    /// Export with the configured radius and halo margin.
    pub fn export(&self) -> DualGraph {
        self.export_with_radius(self.config.export.radius)
    }

    /// Export with an explicit radius and the configured halo margin.
    pub fn export_with_radius(&self, radius: f64) -> DualGraph {
        self.builder
            .build(&self.view(), radius, self.config.export.halo_margin)
    }

    // =========================================================================
    // Render Buffers
    // =========================================================================

    /// Delaunay edges of the 3×3 neighbourhood, as position pairs.
    pub fn view_triangulation(&self) -> Vec<(DVec2, DVec2)> {
        let positions: Vec<DVec2> = self
            .view()
            .positioned_images(NEIGHBORHOOD_RADIUS)
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        unique_edges(&triangulate(&positions))
            .into_iter()
            .map(|(a, b)| (positions[a], positions[b]))
            .collect()
    }

    /// Image positions of the 3×3 neighbourhood as `[x0, y0, x1, y1, ...]`.
    pub fn image_positions(&self) -> Vec<f64> {
        self.view()
            .positioned_images(NEIGHBORHOOD_RADIUS)
            .into_iter()
            .flat_map(|(_, p)| [p.x, p.y])
            .collect()
    }

    /// Colors matching [`image_positions`](Self::image_positions).
    pub fn image_colors(&self) -> Vec<i32> {
        let colors: Vec<i32> = self.points.iter().map(|(_, p)| p.color).collect();
        let sectors = self.view().sectors(NEIGHBORHOOD_RADIUS).len();
        let mut out = Vec::with_capacity(sectors * colors.len());
        for _ in 0..sectors {
            out.extend_from_slice(&colors);
        }
        out
    }

    /// Fundamental cell corners `0, U, U+V, V` as `[x0, y0, ...]`.
    pub fn cell_outline(&self) -> Vec<f64> {
        self.lattice
            .cell_outline()
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            lattice: Lattice::hexagonal(DEFAULT_CELL_SCALE).unwrap_or_default(),
            points: PointSet::new(),
            relax: RelaxationEngine::default(),
            builder: NeighborGraphBuilder::new(config.export.max_sector_window),
            drag: None,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        let mut simulation = Simulation::default();
        simulation.set_tension(1.0).unwrap();
        simulation
    }

    fn is_canonical(lattice: &Lattice, p: DVec2) -> bool {
        let f = lattice.fractional_of(p);
        (0.0..1.0).contains(&f.x) && (0.0..1.0).contains(&f.y)
    }

    #[test]
    fn test_demo_scene() {
        let config = SimulationConfig {
            seed_demo_points: true,
            ..Default::default()
        };
        let simulation = Simulation::new(config).unwrap();

        assert_eq!(simulation.points().len(), DEMO_POINTS.len());
        for (i, (_, point)) in simulation.points().iter().enumerate() {
            assert_eq!(point.color, i as i32);
            assert!(is_canonical(simulation.lattice(), point.position));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.basis_v = [-4.8, 0.0];
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_add_point_canonicalizes() {
        let mut simulation = simulation();
        let id = simulation.request_add_point(DVec2::new(10.0, -3.0), 42).unwrap();

        let position = simulation.points().position(id).unwrap();
        assert!(is_canonical(simulation.lattice(), position));
        assert_eq!(simulation.points().color(id), Some(42));
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(1.0, 1.0), 0);
        simulation.request_add_point(DVec2::new(1.2, 1.0), 1);

        let grabbed = simulation.pointer_down(DVec2::new(1.0, 1.0), 0.1).unwrap();
        assert_eq!(grabbed, PointImage::raw(PointId(0)));
        assert_eq!(simulation.pinned(), Some(PointId(0)));

        let target = DVec2::new(1.5, 1.1);
        assert!(simulation.pointer_drag(target));
        simulation.tick();
        assert_eq!(simulation.points().position(PointId(0)), Some(target));
        // The free point was pushed away from the pinned one.
        assert!(simulation.points().position(PointId(1)).unwrap().distance(target) > 0.7);

        simulation.pointer_up(target);
        assert_eq!(simulation.pinned(), None);
        assert_eq!(simulation.dragged_image(), None);
        assert!(!simulation.pointer_drag(DVec2::ZERO));
    }

    #[test]
    fn test_pointer_down_on_empty_space() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(1.0, 1.0), 0);

        assert_eq!(simulation.pointer_down(DVec2::new(1.5, 1.5), 0.1), None);
        assert_eq!(simulation.pinned(), None);
    }

    #[test]
    fn test_pointer_cancel_releases_pin() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(1.0, 1.0), 0);

        simulation.pointer_down(DVec2::new(1.0, 1.0), 0.5);
        simulation.pointer_cancel();

        assert_eq!(simulation.pinned(), None);
        assert_eq!(simulation.dragged_image(), None);
    }

    #[test]
    fn test_drag_through_periodic_image() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.2, 0.2), 0);

        // The copy one cell to the right.
        let copy = DVec2::new(2.6, 0.2);
        let grabbed = simulation.pointer_down(copy, 0.1).unwrap();
        assert_eq!(grabbed.sector.dx, 1);

        simulation.pointer_drag(copy + DVec2::new(0.1, 0.0));
        let stored = simulation.points().position(PointId(0)).unwrap();
        assert!((stored - DVec2::new(0.3, 0.2)).length() < 1e-12);
    }

    #[test]
    fn test_delete_pinned_point_clears_pin() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.5, 0.5), 0);
        simulation.request_add_point(DVec2::new(1.5, 1.0), 1);

        simulation.pointer_down(DVec2::new(1.5, 1.0), 0.1);
        assert_eq!(simulation.request_delete_point(DVec2::new(1.5, 1.0), 0.1), Some(PointId(1)));

        assert_eq!(simulation.pinned(), None);
        assert_eq!(simulation.dragged_image(), None);
        assert_eq!(simulation.points().len(), 1);
    }

    #[test]
    fn test_delete_earlier_point_shifts_pin() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.5, 0.5), 0);
        simulation.request_add_point(DVec2::new(1.5, 1.0), 1);

        simulation.pointer_down(DVec2::new(1.5, 1.0), 0.1);
        assert!(simulation.delete_point(PointId(0)));

        assert_eq!(simulation.pinned(), Some(PointId(0)));
        assert_eq!(simulation.dragged_image(), Some(PointImage::raw(PointId(0))));
        assert_eq!(simulation.points().color(PointId(0)), Some(1));
    }

    #[test]
    fn test_delete_misses() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.5, 0.5), 0);

        assert_eq!(simulation.request_delete_point(DVec2::new(1.5, 1.5), 0.1), None);
        assert!(!simulation.delete_point(PointId(7)));
        assert_eq!(simulation.points().len(), 1);
    }

    #[test]
    fn test_basis_change_recanonicalizes() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(2.0, 1.0), 0);

        simulation.set_basis_u(DVec2::new(1.0, 0.0)).unwrap();

        let position = simulation.points().position(PointId(0)).unwrap();
        assert!(is_canonical(simulation.lattice(), position));
        assert_eq!(simulation.config().basis_u, [1.0, 0.0]);
    }

    #[test]
    fn test_degenerate_basis_keeps_state() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(2.0, 1.0), 0);
        let lattice = simulation.lattice().clone();

        assert!(simulation.set_basis_v(DVec2::new(4.8, 0.0)).is_err());

        assert_eq!(simulation.lattice(), &lattice);
        assert_eq!(simulation.config().basis_v, SimulationConfig::default().basis_v);
        assert_eq!(simulation.points().position(PointId(0)), Some(DVec2::new(2.0, 1.0)));
    }

    #[test]
    fn test_parameter_setters() {
        let mut simulation = simulation();

        assert!(simulation.set_min_distance_same_color(1.5).is_ok());
        assert!(simulation.set_min_distance_different_color(-1.0).is_err());
        assert!(simulation.set_export_radius(-2.0).is_err());
        assert!(simulation.set_halo_margin(3.0).is_ok());

        let config = simulation.config();
        assert_eq!(config.relax.min_distance_same_color, 1.5);
        assert_eq!(config.relax.min_distance_different_color, 0.75);
        assert_eq!(config.export.radius, 5.0);
        assert_eq!(config.export.halo_margin, 3.0);
    }

    #[test]
    fn test_tension_slider() {
        let mut simulation = simulation();

        simulation.set_tension_from_slider(0.0).unwrap();
        assert!((simulation.config().relax.tension - 0.001).abs() < 1e-12);
        simulation.set_tension_from_slider(1.0).unwrap();
        assert!((simulation.config().relax.tension - 1.0).abs() < 1e-12);
        assert!(simulation.set_tension_from_slider(f64::NAN).is_err());
    }

    #[test]
    fn test_render_buffers() {
        let mut simulation = simulation();
        simulation.seed_demo_points();

        assert_eq!(simulation.image_positions().len(), 9 * 8 * 2);
        let colors = simulation.image_colors();
        assert_eq!(colors.len(), 9 * 8);
        assert_eq!(&colors[8..16], &[0, 1, 2, 3, 4, 5, 6, 7]);

        let outline = simulation.cell_outline();
        assert_eq!(outline.len(), 8);
        assert_eq!(&outline[..4], &[0.0, 0.0, 2.4, 0.0]);

        let edges = simulation.view_triangulation();
        assert!(!edges.is_empty());
    }

    #[test]
    fn test_export_uses_configured_radius() {
        let mut simulation = simulation();
        simulation.seed_demo_points();

        let graph = simulation.export();
        let expected = simulation
            .view()
            .positioned_images(10)
            .iter()
            .filter(|(_, p)| p.length_squared() < 25.0)
            .count();
        assert_eq!(graph.num_valid(), expected);
        assert!(graph.edge_count() > 0);

        assert_eq!(simulation.export_with_radius(0.0).num_valid(), 0);
    }

    #[test]
    fn test_missed_press_releases_previous_drag() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(1.0, 1.0), 0);

        assert!(simulation.pointer_down(DVec2::new(1.0, 1.0), 0.2).is_some());
        // The release of the first drag never arrived.
        assert_eq!(simulation.pointer_down(DVec2::new(1.8, 0.3), 0.1), None);

        assert_eq!(simulation.pinned(), None);
        assert_eq!(simulation.dragged_image(), None);
        assert!(!simulation.pointer_drag(DVec2::new(1.8, 0.3)));
        assert_eq!(simulation.points().position(PointId(0)), Some(DVec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_non_finite_positions_rejected() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.5, 0.5), 0);
        simulation.request_add_point(DVec2::new(1.0, 0.5), 1);

        assert_eq!(simulation.request_add_point(DVec2::new(f64::NAN, 0.0), 2), None);
        assert_eq!(simulation.request_add_point(DVec2::new(0.0, f64::INFINITY), 2), None);
        assert_eq!(simulation.points().len(), 2);

        simulation.pointer_down(DVec2::new(0.5, 0.5), 0.1);
        assert!(!simulation.pointer_drag(DVec2::new(f64::NAN, 1.0)));
        assert!(!simulation.set_position(PointImage::raw(PointId(1)), DVec2::new(f64::NEG_INFINITY, 0.0)));
        simulation.pointer_up(DVec2::new(0.5, 0.5));

        simulation.step(5);
        for (_, point) in simulation.points().iter() {
            assert!(point.position.is_finite());
        }
    }

    #[test]
    fn test_stale_drag_is_released() {
        let mut simulation = simulation();
        simulation.request_add_point(DVec2::new(0.5, 0.5), 0);
        simulation.pointer_down(DVec2::new(0.5, 0.5), 0.1);

        // Removed behind the drag's back; the drag image now names no point.
        simulation.points.delete_point(PointId(0));

        assert!(!simulation.pointer_drag(DVec2::new(1.0, 1.0)));
        assert_eq!(simulation.dragged_image(), None);
        assert_eq!(simulation.pinned(), None);
    }
}
