//! Per-surface scene owner: live entity collections, the pending-shape
//! queue, selection, frame planning and drawing.

mod frame;
mod overlay;
mod pending;
mod selection;

use log::{error, info, warn};

use crate::document::SceneDocument;
use crate::error::{Result, SceneError};
use crate::gpu::{FrameTarget, GpuContext, ScenePrograms, SharedBackend};
use crate::scene::{Camera, EntityId, EntityKind, GameCamera, Shape, ShapeKind, ShapeParams, SpotLight};
use crate::surface::SurfaceKind;
use crate::time::FrameClock;

pub use frame::{debug_lines, DrawItem, FramePlan, LineVertex, CLEAR_COLOR, GRID_HALF_EXTENT};
pub use overlay::{PanelState, ShapeChoice};
pub use pending::ShapeSubmitter;
pub use selection::Selection;

use pending::PendingQueue;

/// Diagnostics kept for display; older entries are dropped first.
const MAX_ERRORS: usize = 64;

/// Outcome of [`Renderer::load_scene`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub shapes_queued: usize,
    pub lights: usize,
    pub game_cameras: usize,
    pub camera_replaced: bool,
    pub skipped: usize,
}

/// Outcome of [`Renderer::drain_pending`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub materialized: usize,
    pub failed: usize,
}

pub struct Renderer {
    label: String,
    kind: SurfaceKind,
    backend: SharedBackend,
    programs: Option<ScenePrograms>,
    shapes: Vec<Shape>,
    lights: Vec<SpotLight>,
    game_cameras: Vec<GameCamera>,
    camera: Option<Camera>,
    selection: Selection,
    pending: PendingQueue,
    clock: FrameClock,
    errors: Vec<SceneError>,
    debug_pass: bool,
    save_requested: bool,
    pub(crate) panel: PanelState,
}

impl Renderer {
    /// An empty renderer allocating through `backend`.
    ///
    /// Debug surfaces get the line pass enabled.
    pub fn new(label: impl Into<String>, kind: SurfaceKind, backend: SharedBackend) -> Self {
        Self {
            label: label.into(),
            kind,
            backend,
            programs: None,
            shapes: Vec::new(),
            lights: Vec::new(),
            game_cameras: Vec::new(),
            camera: None,
            selection: Selection::None,
            pending: PendingQueue::new(),
            clock: FrameClock::new(),
            errors: Vec::new(),
            debug_pass: kind == SurfaceKind::Debug,
            save_requested: false,
            panel: PanelState::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Compile the draw programs. On error nothing is kept and the renderer
    /// cannot draw.
    pub fn initialize(
        &mut self,
        gpu: &GpuContext,
        color_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Result<()> {
        self.programs = None;
        self.programs = Some(ScenePrograms::compile(gpu, color_format, texture_layout)?);
        info!("{}: programs ready ({color_format:?})", self.label);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.programs.is_some()
    }

    /// Apply a parsed scene document.
    ///
    /// Lights, game cameras and the camera are replaced when the document
    /// has them; shapes are appended to the pending queue and go live on
    /// the next [`drain_pending`](Self::drain_pending). Entries rejected
    /// during parsing are recorded as validation errors.
    pub fn load_scene(&mut self, document: &SceneDocument) -> LoadReport {
        let mut report = LoadReport::default();

        for rejected in &document.rejected {
            let err = SceneError::validation(&rejected.entity, &rejected.reason);
            warn!("{}: skipping {err}", self.label);
            self.record_error(err);
            report.skipped += 1;
        }

        for entry in &document.shapes {
            match entry.to_record() {
                Ok((kind, params)) => {
                    self.pending.push(Shape::new(kind, params));
                    report.shapes_queued += 1;
                }
                Err(err) => {
                    warn!("{}: skipping {err}", self.label);
                    self.record_error(err);
                    report.skipped += 1;
                }
            }
        }

        if let Some(lights) = &document.spotlights {
            self.lights = lights.iter().map(|entry| entry.to_light()).collect();
            report.lights = self.lights.len();
            self.drop_dangling_selection();
        }
        if let Some(cameras) = &document.game_cameras {
            self.game_cameras = cameras.iter().map(|entry| entry.to_game_camera()).collect();
            report.game_cameras = self.game_cameras.len();
            self.drop_dangling_selection();
        }
        if let Some(entry) = &document.camera {
            let mut camera = self.camera.take().unwrap_or_default();
            entry.apply_to(&mut camera);
            self.camera = Some(camera);
            report.camera_replaced = true;
        }

        info!(
            "{}: loaded scene ({} shapes queued, {} lights, {} game cameras, {} skipped)",
            self.label, report.shapes_queued, report.lights, report.game_cameras, report.skipped
        );
        report
    }

    /// Parse and apply a raw document. A malformed top level fails the
    /// whole call and leaves the scene untouched.
    pub fn load_scene_value(&mut self, value: &serde_json::Value) -> Result<LoadReport> {
        let document = SceneDocument::from_value(value)?;
        Ok(self.load_scene(&document))
    }

    /// Handle for queueing shapes from any thread.
    pub fn submitter(&self) -> ShapeSubmitter {
        self.pending.submitter()
    }

    pub fn request_add_shape(&self, kind: ShapeKind, params: ShapeParams) -> EntityId {
        self.pending.submitter().request_add_shape(kind, params)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Materialize everything queued, oldest first. Failures are logged,
    /// recorded and dropped.
    pub fn drain_pending(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        let queued = self.pending.drain();
        if queued.is_empty() {
            return report;
        }

        let backend = self.backend.clone();
        let mut backend = backend.borrow_mut();
        for mut shape in queued {
            match shape.materialize(&mut *backend) {
                Ok(()) => {
                    shape.mark_live();
                    self.shapes.push(shape);
                    report.materialized += 1;
                }
                Err(err) => {
                    warn!("{}: could not materialize {}: {err}", self.label, shape.label());
                    shape.release(&mut *backend);
                    self.record_error(err);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Sync the camera with a surface size, creating the default camera if
    /// none was loaded.
    pub fn update_aspect(&mut self, width: u32, height: u32) {
        self.camera
            .get_or_insert_with(Camera::default)
            .update_aspect(width, height);
    }

    /// Compute matrices, draw items and debug lines for a frame.
    pub fn plan_frame(&mut self, width: u32, height: u32) -> FramePlan {
        self.update_aspect(width, height);
        let camera = self.camera.get_or_insert_with(Camera::default);

        let items = self
            .shapes
            .iter()
            .filter(|shape| shape.is_live())
            .filter_map(|shape| {
                let binding = shape.binding()?;
                Some(DrawItem {
                    shape: shape.id(),
                    mesh: binding.handle,
                    index_count: binding.index_count,
                    model: shape.params.model_matrix(),
                    color: shape.params.color,
                    textured: binding.textured,
                })
            })
            .collect();

        let lines = if self.debug_pass {
            let selected = self
                .selection
                .game_camera()
                .and_then(|id| self.game_cameras.iter().find(|c| c.id() == id));
            debug_lines(&self.lights, selected)
        } else {
            Vec::new()
        };

        FramePlan {
            clear_color: CLEAR_COLOR,
            view: camera.view(),
            projection: camera.projection(),
            aspect: camera.aspect,
            items,
            lines,
        }
    }

    /// Plan and record a frame into `target`.
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        target: &mut FrameTarget<'_>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let plan = self.plan_frame(width, height);
        let backend = self.backend.clone();
        let programs = self
            .programs
            .as_mut()
            .ok_or_else(|| SceneError::Context(format!("{} drawn before initialize", self.label)))?;
        programs.record(gpu, target, &plan, &*backend.borrow());
        Ok(())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn lights(&self) -> &[SpotLight] {
        &self.lights
    }

    pub fn game_cameras(&self) -> &[GameCamera] {
        &self.game_cameras
    }

    /// The loaded camera, if any. Drawing supplies a default when absent.
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.camera.get_or_insert_with(Camera::default)
    }

    pub fn shape(&self, id: EntityId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn shape_mut(&mut self, id: EntityId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Replace a live shape's transform and color after validating them.
    pub fn update_shape(&mut self, id: EntityId, params: ShapeParams) -> Result<()> {
        let shape = self
            .shape_mut(id)
            .ok_or_else(|| SceneError::validation(format!("shape {id}"), "not in scene"))?;
        params.validate(&shape.label())?;
        shape.params = params;
        Ok(())
    }

    pub fn light_mut(&mut self, id: EntityId) -> Option<&mut SpotLight> {
        self.lights.iter_mut().find(|l| l.id() == id)
    }

    pub fn game_camera_mut(&mut self, id: EntityId) -> Option<&mut GameCamera> {
        self.game_cameras.iter_mut().find(|c| c.id() == id)
    }

    pub fn add_light(&mut self, name: impl Into<String>) -> EntityId {
        let light = SpotLight::new(name);
        let id = light.id();
        self.lights.push(light);
        id
    }

    pub fn add_game_camera(&mut self, name: impl Into<String>) -> EntityId {
        let camera = GameCamera::new(name);
        let id = camera.id();
        self.game_cameras.push(camera);
        id
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Select a live shape. Returns false (and keeps the old selection) if
    /// there is no such shape.
    pub fn select_shape(&mut self, id: EntityId) -> bool {
        let found = self.shape(id).is_some();
        if found {
            self.selection = Selection::Shape(id);
        }
        found
    }

    pub fn select_light(&mut self, id: EntityId) -> bool {
        let found = self.lights.iter().any(|l| l.id() == id);
        if found {
            self.selection = Selection::Light(id);
        }
        found
    }

    pub fn select_game_camera(&mut self, id: EntityId) -> bool {
        let found = self.game_cameras.iter().any(|c| c.id() == id);
        if found {
            self.selection = Selection::GameCamera(id);
        }
        found
    }

    /// Select a light by name. Names may collide; the first match wins.
    pub fn select_light_by_name(&mut self, name: &str) -> Option<EntityId> {
        let id = self.lights.iter().find(|l| l.name == name)?.id();
        self.selection = Selection::Light(id);
        Some(id)
    }

    pub fn select_game_camera_by_name(&mut self, name: &str) -> Option<EntityId> {
        let id = self.game_cameras.iter().find(|c| c.name == name)?.id();
        self.selection = Selection::GameCamera(id);
        Some(id)
    }

    /// Remove the selected entity of `kind`, freeing its GPU resources.
    /// Returns false if nothing of that kind was selected.
    pub fn delete_selected(&mut self, kind: EntityKind) -> bool {
        let Some(id) = self.selection.of(kind) else {
            return false;
        };
        self.selection = Selection::None;

        match kind {
            EntityKind::Shape => {
                let Some(index) = self.shapes.iter().position(|s| s.id() == id) else {
                    return false;
                };
                let mut shape = self.shapes.remove(index);
                shape.release(&mut *self.backend.borrow_mut());
                info!("{}: deleted {}", self.label, shape.label());
            }
            EntityKind::Light => {
                let before = self.lights.len();
                self.lights.retain(|l| l.id() != id);
                if self.lights.len() == before {
                    return false;
                }
            }
            EntityKind::GameCamera => {
                let before = self.game_cameras.len();
                self.game_cameras.retain(|c| c.id() != id);
                if self.game_cameras.len() == before {
                    return false;
                }
            }
        }
        true
    }

    /// Release every shape and drop all lights and game cameras. The camera
    /// is kept.
    pub fn reset_scene(&mut self) {
        {
            let mut backend = self.backend.borrow_mut();
            for shape in &mut self.shapes {
                shape.release(&mut *backend);
            }
        }
        self.shapes.clear();
        self.lights.clear();
        self.game_cameras.clear();
        self.selection = Selection::None;
        info!("{}: scene reset", self.label);
    }

    /// Tear down everything this renderer holds on the GPU, including
    /// shapes still waiting in the queue.
    pub fn release_all(&mut self) {
        self.reset_scene();
        let discarded = self.pending.drain().len();
        if discarded > 0 {
            info!("{}: discarded {discarded} queued shapes", self.label);
        }
        self.programs = None;
    }

    /// Snapshot of the live scene in document form.
    pub fn scene_document(&self) -> SceneDocument {
        SceneDocument::capture(
            self.shapes.iter().filter(|s| s.is_live()),
            &self.lights,
            &self.game_cameras,
            self.camera.as_ref(),
        )
    }

    pub fn errors(&self) -> &[SceneError] {
        &self.errors
    }

    pub fn last_error(&self) -> Option<&SceneError> {
        self.errors.last()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Keep `err` for the control panel. Errors beyond a single entity
    /// are also logged here.
    pub fn record_error(&mut self, err: SceneError) {
        if !err.is_recoverable() {
            error!("{}: {err}", self.label);
        }
        if self.errors.len() == MAX_ERRORS {
            self.errors.remove(0);
        }
        self.errors.push(err);
    }

    pub fn request_save(&mut self) {
        self.save_requested = true;
    }

    /// True once per [`request_save`](Self::request_save).
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    pub fn debug_pass(&self) -> bool {
        self.debug_pass
    }

    pub fn set_debug_pass(&mut self, enabled: bool) {
        self.debug_pass = enabled;
    }

    /// Frames per second since the previous call. Call once per tick.
    pub fn fps(&mut self) -> f32 {
        self.clock.fps()
    }

    fn drop_dangling_selection(&mut self) {
        let still_there = match self.selection {
            Selection::None => true,
            Selection::Shape(id) => self.shapes.iter().any(|s| s.id() == id),
            Selection::Light(id) => self.lights.iter().any(|l| l.id() == id),
            Selection::GameCamera(id) => self.game_cameras.iter().any(|c| c.id() == id),
        };
        if !still_there {
            self.selection = Selection::None;
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let mut backend = self.backend.borrow_mut();
        for shape in &mut self.shapes {
            shape.release(&mut *backend);
        }
    }
}
