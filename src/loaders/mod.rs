//! Mesh and texture loaders. Each returns upload-ready [`MeshData`] or a
//! `ResourceLoad` error naming the offending file.

mod gltf_mesh;
mod obj;

use std::path::Path;

use log::info;

use crate::error::{Result, SceneError};
use crate::gpu::{MeshData, TextureData};

pub use gltf_mesh::load_gltf_mesh;
pub use obj::load_obj_mesh;

/// Load a mesh, picking the format from the file extension.
pub fn load_mesh(path: &Path) -> Result<MeshData> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let loaded = match extension.as_deref() {
        Some("obj") => load_obj_mesh(path),
        Some("gltf") | Some("glb") => load_gltf_mesh(path),
        _ => return Err(SceneError::resource(path, "unsupported mesh format")),
    };

    let mesh = loaded.map_err(|err| SceneError::resource(path, format!("{err:#}")))?;
    info!(
        "Loaded {} ({} vertices, {} triangles{})",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count(),
        if mesh.texture.is_some() { ", textured" } else { "" }
    );
    Ok(mesh)
}

/// Decode an image file into RGBA8 pixels.
pub fn load_texture(path: &Path) -> Result<TextureData> {
    let image = image::open(path)
        .map_err(|err| SceneError::resource(path, err))?
        .to_rgba8();
    Ok(TextureData {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}
