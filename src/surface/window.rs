use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, info};
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use super::{RunState, SizeTracker, SurfaceKind, UiLease, UiSubsystem};
use crate::document::WindowEntry;
use crate::error::{Result, SceneError};
use crate::gpu::{clear_target, DepthTarget, FrameTarget, GpuContext, ShareGroup};
use crate::renderer::{LoadReport, Renderer, CLEAR_COLOR};

/// One native window, its wgpu surface and the renderer drawing into it.
///
/// Dropping a surface releases the renderer's GPU resources before the
/// wgpu surface and the window go away.
pub struct Surface {
    index: usize,
    kind: SurfaceKind,
    title: String,
    renderer: Rc<RefCell<Renderer>>,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    depth: DepthTarget,
    config: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    share: ShareGroup,
    size: SizeTracker,
    _ui: UiLease,
    window: Arc<Window>,
}

impl Surface {
    /// Open a hidden window and set up its context.
    ///
    /// With `shared` the surface joins an existing share group; otherwise
    /// it creates the device and becomes the first member of a new one.
    pub fn create(
        event_loop: &ActiveEventLoop,
        index: usize,
        width: u32,
        height: u32,
        shared: Option<&ShareGroup>,
        kind: SurfaceKind,
        ui: &UiSubsystem,
    ) -> Result<Self> {
        let title = format!("{} {}", kind.display_name(), index);
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(title.as_str())
                    .with_inner_size(LogicalSize::new(width, height))
                    .with_visible(false),
            )
            .map_err(|e| SceneError::Context(format!("failed to create window: {e}")))?;
        let window = Arc::new(window);

        let (share, surface) = match shared {
            Some(group) => (group.clone(), group.gpu().create_surface(window.clone())?),
            None => {
                let (gpu, surface) = pollster::block_on(GpuContext::for_window(window.clone()))?;
                (ShareGroup::new(gpu), surface)
            }
        };

        let gpu = share.gpu();
        let physical = window.inner_size();
        let size = SizeTracker::new(physical.width.max(1), physical.height.max(1));
        let config = surface_config(&surface, gpu.adapter(), size.width(), size.height())?;
        surface.configure(gpu.device(), &config);
        let depth = DepthTarget::new(gpu.device(), config.width, config.height);

        let mut renderer = Renderer::new(title.clone(), kind, share.backend());
        if kind.draws_scene() {
            let meshes = share.meshes().borrow();
            renderer.initialize(gpu, config.format, meshes.texture_layout())?;
        }
        renderer.update_aspect(config.width, config.height);

        let ui = ui.acquire();
        let egui_ctx = ui.create_context();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            config.format,
            egui_wgpu::RendererOptions::default(),
        );

        info!(
            "Created surface {index} ({title}, {}x{}, {:?})",
            config.width, config.height, config.format
        );

        Ok(Self {
            index,
            kind,
            title,
            renderer: Rc::new(RefCell::new(renderer)),
            egui_renderer,
            egui_state,
            egui_ctx,
            depth,
            config,
            surface,
            share,
            size,
            _ui: ui,
            window,
        })
    }

    pub fn show(&self) {
        self.window.set_visible(true);
    }

    /// Apply a window entry: title and scene. The camera aspect always
    /// follows the live window size, whatever the document says.
    pub fn load_from_document(&mut self, entry: &WindowEntry) -> Result<LoadReport> {
        if let Some(title) = &entry.title {
            self.window.set_title(title);
            self.title = title.clone();
        }

        let mut renderer = self.renderer.borrow_mut();
        renderer.set_label(self.title.clone());
        let report = renderer.load_scene_value(&entry.scene)?;
        renderer.update_aspect(self.size.width(), self.size.height());
        Ok(report)
    }

    /// Feed a window event to the overlay. Returns true if it consumed it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(&self.window, event).consumed
    }

    /// Track a new pixel size. Repeating the same size does nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size.observe(width, height).is_none() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.depth = DepthTarget::new(self.share.gpu().device(), width, height);
        self.renderer.borrow_mut().update_aspect(width, height);
        debug!("{} resized to {width}x{height}", self.title);
    }

    /// Render one frame: drain queued shapes, draw the scene (unless this
    /// is a hierarchy surface), then the overlay on top.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    /// Any other acquisition failure is a `Context` error.
    pub fn draw(&mut self, run_state: &RunState, renderers: &[Rc<RefCell<Renderer>>]) -> Result<()> {
        if !run_state.is_running() {
            return Ok(());
        }

        let current = self.window.inner_size();
        self.resize(current.width, current.height);
        if self.size.is_empty() {
            return Ok(());
        }
        let (width, height) = (self.size.width(), self.size.height());

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("{}: surface lost or outdated, reconfiguring", self.title);
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("{}: frame acquisition timed out", self.title);
                return Ok(());
            }
            Err(err) => {
                return Err(SceneError::Context(format!(
                    "{}: cannot acquire frame: {err}",
                    self.title
                )))
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let gpu = self.share.gpu().clone();
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Surface Encoder"),
            });

        let mut renderer = self.renderer.borrow_mut();
        renderer.drain_pending();
        let fps = renderer.fps();

        {
            let mut target = FrameTarget {
                encoder: &mut encoder,
                color: &view,
                depth: self.depth.view(),
            };
            if self.kind.draws_scene() {
                renderer.draw(&gpu, &mut target, width, height)?;
            } else {
                clear_target(&mut target, CLEAR_COLOR);
            }
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self
            .egui_ctx
            .run(raw_input, |ctx| renderer.show_overlay(ctx, fps, renderers));
        drop(renderer);

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let tris = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point,
        };
        self.egui_renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        gpu.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn renderer(&self) -> &Rc<RefCell<Renderer>> {
        &self.renderer
    }

    pub fn share_group(&self) -> &ShareGroup {
        &self.share
    }

    fn reconfigure(&self) {
        self.surface.configure(self.share.gpu().device(), &self.config);
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if let Ok(mut renderer) = self.renderer.try_borrow_mut() {
            renderer.release_all();
        }
        info!("Closed surface {} ({})", self.index, self.title);
    }
}

fn surface_config(
    surface: &wgpu::Surface,
    adapter: &wgpu::Adapter,
    width: u32,
    height: u32,
) -> Result<wgpu::SurfaceConfiguration> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| SceneError::Context("surface is not supported by the adapter".into()))?;

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}
