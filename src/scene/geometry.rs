use std::f32::consts::TAU;

use super::ShapeKind;
use crate::error::{Result, SceneError};
use crate::gpu::{MeshData, Vertex};
use crate::loaders;

pub const DISC_SEGMENTS: u32 = 32;
pub const DISC_RADIUS: f32 = 0.5;

/// Geometry for `kind`, loading it from disk for imported meshes.
pub fn mesh_for(kind: &ShapeKind) -> Result<MeshData> {
    match kind {
        ShapeKind::Box => Ok(cube()),
        ShapeKind::Disc => disc(DISC_SEGMENTS, DISC_RADIUS),
        ShapeKind::Triangle => Ok(triangle()),
        ShapeKind::ImportedMesh { path } => loaders::load_mesh(path),
    }
}

/// Unit cube centred on the origin.
pub fn cube() -> MeshData {
    let vertices = vec![
        Vertex::new([-0.5, -0.5, -0.5], [0.0, 0.0]),
        Vertex::new([0.5, -0.5, -0.5], [1.0, 0.0]),
        Vertex::new([0.5, 0.5, -0.5], [1.0, 1.0]),
        Vertex::new([-0.5, 0.5, -0.5], [0.0, 1.0]),
        Vertex::new([-0.5, -0.5, 0.5], [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.5], [1.0, 0.0]),
        Vertex::new([0.5, 0.5, 0.5], [1.0, 1.0]),
        Vertex::new([-0.5, 0.5, 0.5], [0.0, 1.0]),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 2, 3, 0, // back
        4, 5, 6, 6, 7, 4, // front
        0, 4, 7, 7, 3, 0, // left
        1, 5, 6, 6, 2, 1, // right
        3, 2, 6, 6, 7, 3, // top
        0, 1, 5, 5, 4, 0, // bottom
    ];
    MeshData::new(vertices, indices)
}

/// Flat disc in the XY plane: a centre vertex plus `segments + 1` rim
/// vertices (first and last coincide).
pub fn disc(segments: u32, radius: f32) -> Result<MeshData> {
    if segments < 3 {
        return Err(SceneError::validation(
            "disc",
            format!("needs at least 3 segments, got {segments}"),
        ));
    }
    if radius.is_nan() || radius <= 0.0 {
        return Err(SceneError::validation(
            "disc",
            format!("radius must be positive, got {radius}"),
        ));
    }

    let mut vertices = Vec::with_capacity(segments as usize + 2);
    vertices.push(Vertex::new([0.0, 0.0, 0.0], [0.5, 0.5]));
    for i in 0..=segments {
        let angle = TAU * i as f32 / segments as f32;
        let (sin, cos) = angle.sin_cos();
        vertices.push(Vertex::new(
            [radius * cos, radius * sin, 0.0],
            [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
        ));
    }

    let indices = (1..=segments).flat_map(|i| [0, i, i + 1]).collect();
    Ok(MeshData::new(vertices, indices))
}

pub fn triangle() -> MeshData {
    MeshData::new(
        vec![
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0]),
            Vertex::new([0.0, 0.5, 0.0], [0.5, 1.0]),
        ],
        vec![0, 1, 2],
    )
}
