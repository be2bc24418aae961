use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::backend::{GpuBackend, GpuMesh, MeshHandle, SharedBackend};
use super::mesh::MeshData;
use crate::error::{Result, SceneError};

/// Bookkeeping-only backend with no device behind it.
///
/// Tracks what a real backend would allocate so resource lifetimes can be
/// checked without a GPU. Nothing it holds is drawable.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    meshes: BTreeMap<MeshHandle, (String, usize)>,
    next_handle: u64,
    uploads: usize,
    fail_uploads: bool,
    max_texture_dimension: Option<u32>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent upload fails, as if the device ran out of memory.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    /// Rejects textures larger than `max` on either side, like a device
    /// with that `max_texture_dimension_2d`.
    pub fn with_texture_limit(max: u32) -> Self {
        Self {
            max_texture_dimension: Some(max),
            ..Self::default()
        }
    }

    pub fn shared() -> Rc<RefCell<HeadlessBackend>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Coerces a concrete handle table into the trait-object form renderers use.
    pub fn as_shared(this: &Rc<RefCell<HeadlessBackend>>) -> SharedBackend {
        this.clone()
    }

    /// Total successful uploads, including ones since destroyed.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn label(&self, handle: MeshHandle) -> Option<&str> {
        self.meshes.get(&handle).map(|(label, _)| label.as_str())
    }

    pub fn vertex_count(&self, handle: MeshHandle) -> Option<usize> {
        self.meshes.get(&handle).map(|(_, count)| *count)
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle> {
        mesh.validate(label)?;
        if let (Some(texture), Some(max)) = (&mesh.texture, self.max_texture_dimension) {
            texture.check_dimensions(label, max)?;
        }
        if self.fail_uploads {
            return Err(SceneError::resource(label, "device refused allocation"));
        }

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.uploads += 1;
        self.meshes
            .insert(handle, (label.to_string(), mesh.vertices.len()));
        Ok(handle)
    }

    fn destroy_mesh(&mut self, handle: MeshHandle) -> bool {
        self.meshes.remove(&handle).is_some()
    }

    fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn resolve(&self, _handle: MeshHandle) -> Option<&GpuMesh> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{TextureData, Vertex};

    fn triangle() -> MeshData {
        MeshData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn tracks_allocations() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_mesh("a", &triangle()).unwrap();
        let b = backend.create_mesh("b", &triangle()).unwrap();

        assert_ne!(a, b);
        assert_eq!(backend.live_meshes(), 2);
        assert_eq!(backend.label(a), Some("a"));

        assert!(backend.destroy_mesh(a));
        assert!(!backend.destroy_mesh(a));
        assert_eq!(backend.live_meshes(), 1);
        assert_eq!(backend.uploads(), 2);
    }

    #[test]
    fn failing_backend_allocates_nothing() {
        let mut backend = HeadlessBackend::failing();
        assert!(backend.create_mesh("a", &triangle()).is_err());
        assert_eq!(backend.live_meshes(), 0);
    }

    #[test]
    fn nothing_is_drawable() {
        let mut backend = HeadlessBackend::new();
        let handle = backend.create_mesh("a", &triangle()).unwrap();
        assert!(backend.contains(handle));
        assert!(backend.resolve(handle).is_none());
    }

    #[test]
    fn oversized_texture_allocates_nothing() {
        let mut backend = HeadlessBackend::with_texture_limit(16);
        let small = triangle().with_texture(TextureData {
            width: 16,
            height: 16,
            pixels: vec![255; 16 * 16 * 4],
        });
        let big = triangle().with_texture(TextureData {
            width: 32,
            height: 1,
            pixels: vec![255; 32 * 4],
        });

        assert!(backend.create_mesh("small", &small).is_ok());
        let err = backend.create_mesh("big", &big).unwrap_err();
        assert!(matches!(err, SceneError::ResourceLoad { .. }));
        assert_eq!(backend.live_meshes(), 1);
        assert_eq!(backend.uploads(), 1);
    }
}
