use std::path::Path;

use anyhow::{bail, Context, Result};
use log::warn;

use crate::gpu::{MeshData, Vertex};

/// Loads a Wavefront OBJ, merging every model into one mesh.
///
/// The first material with a diffuse map supplies the texture; a missing
/// material library is tolerated, a missing texture file is not.
pub fn load_obj_mesh(path: &Path) -> Result<MeshData> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options)
        .with_context(|| format!("failed to parse OBJ {}", path.display()))?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let base = vertices.len() as u32;
        let count = mesh.positions.len() / 3;

        for i in 0..count {
            let position = [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ];
            // OBJ puts v = 0 at the bottom
            let uv = if mesh.texcoords.len() >= 2 * (i + 1) {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            };
            vertices.push(Vertex::new(position, uv));
        }
        indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    if vertices.is_empty() {
        bail!("OBJ {} contains no geometry", path.display());
    }

    let materials = match materials {
        Ok(materials) => materials,
        Err(err) => {
            warn!("Ignoring materials of {}: {err}", path.display());
            Vec::new()
        }
    };

    let mut data = MeshData::new(vertices, indices);
    if let Some(texture_name) = materials.iter().find_map(|m| m.diffuse_texture.clone()) {
        let texture_path = path
            .parent()
            .map(|dir| dir.join(&texture_name))
            .unwrap_or_else(|| texture_name.clone().into());
        let texture = super::load_texture(&texture_path)
            .with_context(|| format!("diffuse map {}", texture_path.display()))?;
        data = data.with_texture(texture);
    }
    Ok(data)
}
