use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::info;
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};
use winit::window::Window;

use super::backend::SharedBackend;
use super::wgpu_backend::WgpuBackend;
use crate::error::{Result, SceneError};

/// Device and queue shared by every surface of a session.
///
/// Cloning is cheap (Arc). Surfaces created from the same context see the
/// same buffers and textures, which is what makes a share group.
#[derive(Clone)]
pub struct GpuContext {
    instance: Arc<Instance>,
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a context compatible with `window` and the window's surface.
    pub async fn for_window(window: Arc<Window>) -> Result<(Self, Surface<'static>)> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SceneError::Context(format!("failed to create surface: {e}")))?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let info = adapter.get_info();
        info!("Using adapter {} ({:?})", info.name, info.backend);

        let context = Self {
            instance: Arc::new(instance),
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        };
        Ok((context, surface))
    }

    /// Surface for another window, drawn with this context's device.
    pub fn create_surface(&self, window: Arc<Window>) -> Result<Surface<'static>> {
        self.instance
            .create_surface(window)
            .map_err(|e| SceneError::Context(format!("failed to create surface: {e}")))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::Context(format!("no suitable adapter: {e:?}")))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Scene Host Device"),
                required_features: Features::empty(),
                required_limits: Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| SceneError::Context(format!("failed to create device: {e:?}")))
    }
}

/// Everything surfaces of one session share: the device and the mesh table.
#[derive(Clone)]
pub struct ShareGroup {
    gpu: GpuContext,
    meshes: Rc<RefCell<WgpuBackend>>,
}

impl ShareGroup {
    pub fn new(gpu: GpuContext) -> Self {
        let meshes = Rc::new(RefCell::new(WgpuBackend::new(gpu.clone())));
        Self { gpu, meshes }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Concrete mesh table, for pipeline setup that needs its layouts.
    pub fn meshes(&self) -> &Rc<RefCell<WgpuBackend>> {
        &self.meshes
    }

    pub fn backend(&self) -> SharedBackend {
        self.meshes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_cheap_to_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GpuContext>();
        assert_clone::<ShareGroup>();
    }
}
