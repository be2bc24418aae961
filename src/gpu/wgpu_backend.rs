use std::collections::HashMap;

use log::debug;
use wgpu::util::DeviceExt;

use super::backend::{GpuBackend, GpuMesh, MeshHandle};
use super::context::GpuContext;
use super::mesh::{MeshData, TextureData};
use crate::error::{Result, SceneError};

/// Mesh table backed by a real device.
pub struct WgpuBackend {
    gpu: GpuContext,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_view: wgpu::TextureView,
    _fallback_texture: wgpu::Texture,
    meshes: HashMap<MeshHandle, GpuMesh>,
    next_handle: u64,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let device = gpu.device();

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mesh Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = TextureData {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        let fallback_texture = upload_texture(&gpu, "Fallback Texture", &white);
        let fallback_view = fallback_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            gpu,
            texture_layout,
            sampler,
            fallback_view,
            _fallback_texture: fallback_texture,
            meshes: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Layout of the per-mesh texture bind group (group 2 of the scene program).
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    fn texture_bind_group(&self, label: &str, view: &wgpu::TextureView) -> wgpu::BindGroup {
        self.gpu
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
    }
}

impl GpuBackend for WgpuBackend {
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle> {
        mesh.validate(label)?;

        let device = self.gpu.device();
        if let Some(texture) = &mesh.texture {
            texture.check_dimensions(label, device.limits().max_texture_dimension_2d)?;
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (texture, texture_bind_group) = match &mesh.texture {
            Some(data) => {
                let texture = upload_texture(&self.gpu, label, data);
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let bind_group = self.texture_bind_group(label, &view);
                (Some(texture), bind_group)
            }
            None => (None, self.texture_bind_group(label, &self.fallback_view)),
        };

        // Scopes pop in reverse order: validation first, then out-of-memory
        let device = self.gpu.device();
        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            return Err(SceneError::resource(label, err));
        }

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        debug!(
            "Uploaded mesh {label} ({} vertices, {} indices) as #{}",
            mesh.vertices.len(),
            mesh.indices.len(),
            handle.raw()
        );

        self.meshes.insert(
            handle,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                texture_bind_group,
                textured: texture.is_some(),
                _texture: texture,
            },
        );
        Ok(handle)
    }

    fn destroy_mesh(&mut self, handle: MeshHandle) -> bool {
        // Dropped, not destroyed: a recorded but unsubmitted frame may still
        // reference the buffers, and wgpu frees them once that work is done.
        let removed = self.meshes.remove(&handle).is_some();
        if removed {
            debug!("Released mesh #{}", handle.raw());
        }
        removed
    }

    fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn resolve(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }
}

fn upload_texture(gpu: &GpuContext, label: &str, data: &TextureData) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    gpu.queue().write_texture(
        texture.as_image_copy(),
        &data.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );
    texture
}
