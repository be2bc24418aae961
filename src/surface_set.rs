//! Multi-window coordinator.
//!
//! Owns every [`Surface`], routes window events to the surface that owns the
//! window, and drives one draw pass over all surfaces per loop iteration.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::document::SessionDocument;
use crate::error::SceneError;
use crate::gpu::ShareGroup;
use crate::renderer::Renderer;
use crate::surface::{RunState, Surface, UiSubsystem};

struct Slot {
    /// Index of the session window this surface was opened for
    entry: usize,
    surface: Surface,
}

pub struct SurfaceSet {
    session_path: PathBuf,
    session: SessionDocument,
    surfaces: Vec<Slot>,
    next_index: usize,
    share: Option<ShareGroup>,
    ui: UiSubsystem,
    run_state: RunState,
    error: Option<SceneError>,
    started: bool,
}

impl SurfaceSet {
    pub fn new(session_path: PathBuf, session: SessionDocument) -> Self {
        Self {
            session_path,
            session,
            surfaces: Vec::new(),
            next_index: 0,
            share: None,
            ui: UiSubsystem::new(),
            run_state: RunState::new(),
            error: None,
            started: false,
        }
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// The startup or loop error that ended the run, if any.
    pub fn error(&self) -> Option<&SceneError> {
        self.error.as_ref()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.error.is_some() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn open_session(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SceneError> {
        let windows = self.session.windows.clone();
        for (entry, window) in windows.iter().enumerate() {
            let index = self.next_index;
            self.next_index += 1;

            let mut surface = match Surface::create(
                event_loop,
                index,
                window.width,
                window.height,
                self.share.as_ref(),
                window.kind,
                &self.ui,
            ) {
                Ok(surface) => surface,
                Err(err @ (SceneError::ShaderCompile { .. } | SceneError::ShaderLink { .. })) => {
                    error!("Skipping window {entry} ({}): {err}", window.kind.display_name());
                    continue;
                }
                Err(err) => return Err(err),
            };

            if self.share.is_none() {
                self.share = Some(surface.share_group().clone());
            }

            surface.load_from_document(window)?;
            self.surfaces.push(Slot { entry, surface });
        }

        if self.surfaces.is_empty() {
            return Err(SceneError::Context("no window could be opened".into()));
        }
        for slot in &self.surfaces {
            slot.surface.show();
        }
        Ok(())
    }

    fn draw_all(&mut self) -> Result<(), SceneError> {
        let renderers = scene_renderers(self.surfaces.iter().map(|slot| slot.surface.renderer()));
        for slot in &mut self.surfaces {
            slot.surface.draw(&self.run_state, &renderers)?;
        }
        Ok(())
    }

    /// Write back the scene of every renderer that asked to be saved.
    fn service_saves(&mut self) {
        let Self {
            surfaces,
            session,
            session_path,
            ..
        } = self;

        for slot in surfaces.iter() {
            let mut renderer = slot.surface.renderer().borrow_mut();
            if !renderer.take_save_request() {
                continue;
            }
            let scene = renderer.scene_document();
            if let Err(err) = session.save_scene(slot.entry, &scene, session_path) {
                warn!("{}: save failed: {err}", renderer.label());
                renderer.record_error(err);
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!("{err}");
        self.error = Some(err);
        self.run_state.stop();
        event_loop.exit();
    }
}

impl ApplicationHandler for SurfaceSet {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Err(err) = self.open_session(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(slot) = self
            .surfaces
            .iter_mut()
            .find(|slot| slot.surface.window_id() == window_id)
        else {
            return;
        };

        // Let egui handle the event first
        if slot.surface.handle_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                info!("Close requested on {}", slot.surface.title());
                self.run_state.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => slot.surface.resize(size.width, size.height),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.run_state.is_running() {
            event_loop.exit();
            return;
        }

        if let Err(err) = self.draw_all() {
            self.fail(event_loop, err);
            return;
        }
        self.service_saves();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Renderers release their meshes while the device is still alive
        self.surfaces.clear();
        self.share = None;
        info!("All surfaces closed");
    }
}

/// The renderers handed to every overlay pass: all surfaces except
/// hierarchy editors, in surface order.
pub fn scene_renderers<'a>(
    renderers: impl IntoIterator<Item = &'a Rc<RefCell<Renderer>>>,
) -> Vec<Rc<RefCell<Renderer>>> {
    renderers
        .into_iter()
        .filter(|renderer| {
            renderer
                .try_borrow()
                .map(|r| r.kind().draws_scene())
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
