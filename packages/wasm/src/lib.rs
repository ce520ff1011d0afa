//! TileDist - WASM Module
//!
//! Periodic packing of colored points on a 2D lattice, with export of the
//! Delaunay neighbour graph of a radius-bounded sample. Compiled to
//! WebAssembly and exposed to JavaScript via wasm-bindgen.
//!
//! # Architecture
//!
//! - `geometry`: Lattice basis, fractional coordinates, sectors
//! - `points`: Point storage and periodic images
//! - `periodic`: Read-only view over the tiled plane
//! - `spatial`: R-tree index for nearest-image picking
//! - `relax`: Minimum-spacing relaxation
//! - `dual`: Delaunay neighbour graph export with a halo ring
//! - `simulation`: The interactive instance that owns all state

use glam::DVec2;
use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod dual;
pub mod geometry;
pub mod logging;
pub mod periodic;
pub mod points;
pub mod relax;
pub mod simulation;
pub mod spatial;
pub mod util;

use config::SimulationConfig;
use points::PointId;
use simulation::Simulation;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Set the console log level (`"off"`, `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    logging::init(logging::parse_level(level));
}

/// Main entry point for the simulation.
///
/// This struct wraps the internal Simulation and provides the public API
/// exposed to JavaScript. Coordinates are absolute model coordinates.
#[wasm_bindgen]
pub struct TileDistWasm {
    simulation: Simulation,
}

#[wasm_bindgen]
impl TileDistWasm {
    /// Create a simulation with the default hexagonal cell and no points.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            simulation: Simulation::default(),
        }
    }

    /// Create a simulation from a (possibly partial) config object.
    ///
    /// Missing keys take their defaults. Fails on invalid values.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<TileDistWasm, JsError> {
        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            simulation: Simulation::new(config)?,
        })
    }

    /// The current configuration as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        to_js(self.simulation.config())
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Grab the nearest point image within `pick_radius` and move it under the pointer.
    ///
    /// Returns the grabbed point's index, or undefined for an empty selection.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, pick_radius: f64) -> Option<u32> {
        self.simulation
            .pointer_down(DVec2::new(x, y), pick_radius)
            .map(|image| image.point.raw())
    }

    /// Move the grabbed point. Returns false when no drag is in progress.
    #[wasm_bindgen(js_name = pointerDrag)]
    pub fn pointer_drag(&mut self, x: f64, y: f64) -> bool {
        self.simulation.pointer_drag(DVec2::new(x, y))
    }

    /// Release the grabbed point.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.simulation.pointer_up(DVec2::new(x, y));
    }

    /// Abort a drag (pointer lost, window blurred). Always releases the pin.
    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self) {
        self.simulation.pointer_cancel();
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Add a point; its position is wrapped into the fundamental cell.
    ///
    /// Returns the new point's index, or undefined for a non-finite position.
    #[wasm_bindgen(js_name = addPoint)]
    pub fn add_point(&mut self, x: f64, y: f64, color: i32) -> Option<u32> {
        self.simulation
            .request_add_point(DVec2::new(x, y), color)
            .map(PointId::raw)
    }

    /// Delete the point nearest to `(x, y)` within `pick_radius`.
    ///
    /// Returns true if a point was deleted. Later indices shift down by one.
    #[wasm_bindgen(js_name = deletePointAt)]
    pub fn delete_point_at(&mut self, x: f64, y: f64, pick_radius: f64) -> bool {
        self.simulation
            .request_delete_point(DVec2::new(x, y), pick_radius)
            .is_some()
    }

    /// Delete a point by index. Returns false for an out-of-range index.
    #[wasm_bindgen(js_name = deletePoint)]
    pub fn delete_point(&mut self, index: u32) -> bool {
        self.simulation.delete_point(PointId(index))
    }

    /// Load the demo scene (eight points, colors 0..7).
    #[wasm_bindgen(js_name = seedDemoPoints)]
    pub fn seed_demo_points(&mut self) {
        self.simulation.seed_demo_points();
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.simulation.clear();
    }

    #[wasm_bindgen(js_name = pointCount)]
    pub fn point_count(&self) -> u32 {
        self.simulation.points().len() as u32
    }

    /// A point's stored position as `[x, y]`.
    #[wasm_bindgen(js_name = pointPosition)]
    pub fn point_position(&self, index: u32) -> Option<Float64Array> {
        self.simulation
            .points()
            .position(PointId(index))
            .map(|p| Float64Array::from(&p.to_array()[..]))
    }

    #[wasm_bindgen(js_name = pointColor)]
    pub fn point_color(&self, index: u32) -> Option<i32> {
        self.simulation.points().color(PointId(index))
    }

    /// Index of the point currently held by the pointer.
    #[wasm_bindgen(js_name = pinnedPoint)]
    pub fn pinned_point(&self) -> Option<u32> {
        self.simulation.pinned().map(PointId::raw)
    }

    // =========================================================================
    // Simulation Control
    // =========================================================================

    /// Run one animation tick (`stepsPerTick` relaxation steps).
    ///
    /// Returns the number of steps run.
    pub fn tick(&mut self) -> u32 {
        self.simulation.tick()
    }

    /// Run `count` relaxation steps.
    pub fn step(&mut self, count: u32) {
        self.simulation.step(count);
    }

    /// Suggested interval between ticks in milliseconds.
    #[wasm_bindgen(js_name = tickIntervalMs)]
    pub fn tick_interval_ms(&self) -> u32 {
        self.simulation.config().tick_interval_ms
    }

    #[wasm_bindgen(js_name = setStepsPerTick)]
    pub fn set_steps_per_tick(&mut self, steps: u32) {
        self.simulation.set_steps_per_tick(steps);
    }

    // =========================================================================
    // Parameters
    // =========================================================================
    //
    // Setters return true if the value was accepted. Rejected values leave the
    // previous value in place.

    #[wasm_bindgen(js_name = setBasis)]
    pub fn set_basis(&mut self, ux: f64, uy: f64, vx: f64, vy: f64) -> bool {
        self.simulation
            .set_basis(DVec2::new(ux, uy), DVec2::new(vx, vy))
            .is_ok()
    }

    #[wasm_bindgen(js_name = setBasisU)]
    pub fn set_basis_u(&mut self, x: f64, y: f64) -> bool {
        self.simulation.set_basis_u(DVec2::new(x, y)).is_ok()
    }

    #[wasm_bindgen(js_name = setBasisV)]
    pub fn set_basis_v(&mut self, x: f64, y: f64) -> bool {
        self.simulation.set_basis_v(DVec2::new(x, y)).is_ok()
    }

    #[wasm_bindgen(js_name = setMinDistanceDifferentColor)]
    pub fn set_min_distance_different_color(&mut self, value: f64) -> bool {
        self.simulation.set_min_distance_different_color(value).is_ok()
    }

    #[wasm_bindgen(js_name = setMinDistanceSameColor)]
    pub fn set_min_distance_same_color(&mut self, value: f64) -> bool {
        self.simulation.set_min_distance_same_color(value).is_ok()
    }

    #[wasm_bindgen(js_name = setTension)]
    pub fn set_tension(&mut self, value: f64) -> bool {
        self.simulation.set_tension(value).is_ok()
    }

    /// Set tension from a slider position in `[0, 1]` (exponential, 0.001 to 1).
    #[wasm_bindgen(js_name = setTensionFromSlider)]
    pub fn set_tension_from_slider(&mut self, t: f64) -> bool {
        self.simulation.set_tension_from_slider(t).is_ok()
    }

    #[wasm_bindgen(js_name = setMaxVelocityPerStep)]
    pub fn set_max_velocity_per_step(&mut self, value: f64) -> bool {
        self.simulation.set_max_velocity_per_step(value).is_ok()
    }

    #[wasm_bindgen(js_name = setExportRadius)]
    pub fn set_export_radius(&mut self, radius: f64) -> bool {
        self.simulation.set_export_radius(radius).is_ok()
    }

    #[wasm_bindgen(js_name = setHaloMargin)]
    pub fn set_halo_margin(&mut self, margin: f64) -> bool {
        self.simulation.set_halo_margin(margin).is_ok()
    }

    // =========================================================================
    // Render Buffers
    // =========================================================================

    /// Positions of every image in the 3×3 neighbourhood as [x0, y0, x1, y1, ...].
    ///
    /// Sector-major, point-minor, matching `imageColors`.
    #[wasm_bindgen(js_name = imagePositions)]
    pub fn image_positions(&self) -> Float64Array {
        Float64Array::from(&self.simulation.image_positions()[..])
    }

    #[wasm_bindgen(js_name = imageColors)]
    pub fn image_colors(&self) -> Vec<i32> {
        self.simulation.image_colors()
    }

    /// Fundamental cell corners `0, U, U+V, V` as [x0, y0, ..., x3, y3].
    #[wasm_bindgen(js_name = cellOutline)]
    pub fn cell_outline(&self) -> Float64Array {
        Float64Array::from(&self.simulation.cell_outline()[..])
    }

    /// Delaunay edges of the 3×3 neighbourhood as [ax, ay, bx, by, ...].
    #[wasm_bindgen(js_name = triangulationEdges)]
    pub fn triangulation_edges(&self) -> Float64Array {
        let flat: Vec<f64> = self
            .simulation
            .view_triangulation()
            .into_iter()
            .flat_map(|(a, b)| [a.x, a.y, b.x, b.y])
            .collect();
        Float64Array::from(&flat[..])
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export the neighbour graph as `{ vertices, neighbors }`.
    ///
    /// A missing radius uses the configured export radius.
    #[wasm_bindgen(js_name = exportDual)]
    pub fn export_dual(&self, radius: Option<f64>) -> Result<JsValue, JsError> {
        to_js(&self.export(radius))
    }

    /// Export the neighbour graph as `.dual` JSON text.
    #[wasm_bindgen(js_name = exportDualJson)]
    pub fn export_dual_json(&self, radius: Option<f64>) -> Result<String, JsError> {
        Ok(self.export(radius).to_json_pretty()?)
    }

    /// Export the neighbour graph in CSR format.
    ///
    /// Returns [offsets..., targets...] where offsets has vertex_count + 1 elements.
    #[wasm_bindgen(js_name = exportDualCsr)]
    pub fn export_dual_csr(&self, radius: Option<f64>) -> Vec<u32> {
        self.export(radius).to_csr()
    }
}

impl TileDistWasm {
    fn export(&self, radius: Option<f64>) -> dual::DualGraph {
        match radius {
            Some(radius) => self.simulation.export_with_radius(radius),
            None => self.simulation.export(),
        }
    }
}

impl Default for TileDistWasm {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize to a plain JS object (maps become objects, not `Map`s).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}
