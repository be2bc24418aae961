//! Plain scene records. Nothing here touches the GPU except
//! [`Shape::materialize`] and [`Shape::release`], which go through a
//! [`GpuBackend`](crate::gpu::GpuBackend).

mod camera;
pub mod geometry;
mod light;
mod shape;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use camera::{Camera, GameCamera};
pub use light::SpotLight;
pub use shape::{MeshBinding, Shape, ShapeKind, ShapeParams, ShapeState};

static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a shape, light or game camera.
///
/// Ids are allocated from an atomic counter so records built on worker
/// threads never collide with ones built on the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn next() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which collection an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Shape,
    Light,
    GameCamera,
}
