use std::path::PathBuf;

use glam::{Mat4, Vec3, Vec4};
use log::debug;

use super::geometry;
use super::EntityId;
use crate::error::{Result, SceneError};
use crate::gpu::{GpuBackend, MeshHandle};
use crate::math::model_matrix;

/// Closed set of drawable shape kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Disc,
    Triangle,
    ImportedMesh { path: PathBuf },
}

impl ShapeKind {
    /// Name used for this kind in scene documents.
    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Box => "Cube",
            Self::Disc => "Circle",
            Self::Triangle => "Triangle",
            Self::ImportedMesh { .. } => "Mesh",
        }
    }

    /// Parse a document `type` string. `Mesh` requires `obj_path`.
    pub fn from_document(name: &str, obj_path: Option<&str>) -> Result<Self> {
        match name {
            "Cube" => Ok(Self::Box),
            "Circle" => Ok(Self::Disc),
            "Triangle" => Ok(Self::Triangle),
            "Mesh" => match obj_path {
                Some(path) if !path.is_empty() => Ok(Self::ImportedMesh { path: path.into() }),
                _ => Err(SceneError::validation("Mesh shape", "missing objPath")),
            },
            other => Err(SceneError::validation(
                "shape",
                format!("unknown shape type {other:?}"),
            )),
        }
    }

    pub fn mesh_path(&self) -> Option<&PathBuf> {
        match self {
            Self::ImportedMesh { path } => Some(path),
            _ => None,
        }
    }
}

/// Transform and color shared by every shape kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub position: Vec3,
    /// Component-wise, every component > 0
    pub scale: Vec3,
    /// Euler degrees: pitch (x), yaw (y), roll (z)
    pub rotation: Vec3,
    /// RGBA, not clamped
    pub color: Vec4,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            color: Vec4::ONE,
        }
    }
}

impl ShapeParams {
    pub fn validate(&self, entity: &str) -> Result<()> {
        if self.scale.to_array().iter().any(|c| !c.is_finite() || *c <= 0.0) {
            return Err(SceneError::validation(
                entity,
                format!(
                    "scale must be positive, got [{}, {}, {}]",
                    self.scale.x, self.scale.y, self.scale.z
                ),
            ));
        }
        if !self.position.is_finite() || !self.rotation.is_finite() || !self.color.is_finite() {
            return Err(SceneError::validation(entity, "non-finite transform or color"));
        }
        Ok(())
    }

    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.position, self.rotation, self.scale)
    }
}

/// Lifecycle of a shape. `Released` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeState {
    Queued,
    Materialized,
    Live,
    Released,
}

/// GPU resources of a materialized shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBinding {
    pub handle: MeshHandle,
    pub index_count: u32,
    pub textured: bool,
}

/// A drawable shape record.
///
/// Built anywhere (it holds no GPU state until materialized), moved to
/// the render thread through the pending queue.
#[derive(Debug)]
pub struct Shape {
    id: EntityId,
    kind: ShapeKind,
    pub params: ShapeParams,
    state: ShapeState,
    binding: Option<MeshBinding>,
}

impl Shape {
    pub fn new(kind: ShapeKind, params: ShapeParams) -> Self {
        Self {
            id: EntityId::next(),
            kind,
            params,
            state: ShapeState::Queued,
            binding: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn state(&self) -> ShapeState {
        self.state
    }

    pub fn binding(&self) -> Option<&MeshBinding> {
        self.binding.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.state == ShapeState::Live && self.binding.is_some()
    }

    /// Label used for logs and GPU object names, e.g. `Cube #3`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind.document_name(), self.id)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate(&self.label())
    }

    /// Build geometry and upload it through `backend`.
    ///
    /// On error the shape is untouched: no binding, same state.
    pub fn materialize(&mut self, backend: &mut dyn GpuBackend) -> Result<()> {
        match self.state {
            ShapeState::Released => return Err(SceneError::Released(self.id.raw())),
            ShapeState::Materialized | ShapeState::Live => return Ok(()),
            ShapeState::Queued => {}
        }

        self.validate()?;
        let mesh = geometry::mesh_for(&self.kind)?;
        let handle = backend.create_mesh(&self.label(), &mesh)?;

        self.binding = Some(MeshBinding {
            handle,
            index_count: mesh.indices.len() as u32,
            textured: mesh.texture.is_some(),
        });
        self.state = ShapeState::Materialized;
        debug!("Materialized {} ({} triangles)", self.label(), mesh.triangle_count());
        Ok(())
    }

    /// Free GPU resources. Safe to call any number of times.
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(binding) = self.binding.take() {
            backend.destroy_mesh(binding.handle);
        }
        self.state = ShapeState::Released;
    }

    pub(crate) fn mark_live(&mut self) {
        if self.state == ShapeState::Materialized {
            self.state = ShapeState::Live;
        }
    }
}
