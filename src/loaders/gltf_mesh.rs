use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, warn};

use crate::gpu::{MeshData, TextureData, Vertex};

/// Loads every mesh of every scene in a glTF file into one mesh, with
/// node transforms baked into the vertices.
///
/// The first base-color texture found on a primitive's material becomes
/// the mesh texture.
pub fn load_gltf_mesh(path: &Path) -> Result<MeshData> {
    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("failed to load glTF file {}", path.display()))?;

    debug!(
        "glTF {}: {} scenes, {} meshes, {} images",
        path.display(),
        document.scenes().count(),
        document.meshes().count(),
        images.len()
    );

    let mut out = MeshData::default();
    let mut texture_index = None;

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut out, &mut texture_index)?;
        }
    }

    if out.vertices.is_empty() || out.indices.is_empty() {
        bail!("glTF {} contains no triangle geometry", path.display());
    }

    if let Some(index) = texture_index {
        if let Some(image) = images.get(index) {
            out.texture = to_rgba(image);
        }
    }
    Ok(out)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    out: &mut MeshData,
    texture_index: &mut Option<usize>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                continue;
            }
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<Vec3> = reader
                .read_positions()
                .context("mesh primitive has no positions")?
                .map(|p| global_transform.transform_point3(Vec3::from_array(p)))
                .collect();

            let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(uv) => uv.into_f32().collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };

            let base = out.vertices.len() as u32;
            out.vertices.extend(
                positions
                    .iter()
                    .zip(uvs.iter().chain(std::iter::repeat(&[0.0, 0.0])))
                    .map(|(p, uv)| Vertex::new(p.to_array(), *uv)),
            );

            match reader.read_indices() {
                Some(indices) => out.indices.extend(indices.into_u32().map(|i| base + i)),
                None => out
                    .indices
                    .extend((0..positions.len() as u32 / 3 * 3).map(|i| base + i)),
            }

            if texture_index.is_none() {
                *texture_index = primitive
                    .material()
                    .pbr_metallic_roughness()
                    .base_color_texture()
                    .map(|info| info.texture().source().index());
            }
        }
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, out, texture_index)?;
    }
    Ok(())
}

fn to_rgba(image: &gltf::image::Data) -> Option<TextureData> {
    let pixels = match image.format {
        gltf::image::Format::R8G8B8A8 => image.pixels.clone(),
        gltf::image::Format::R8G8B8 => image
            .pixels
            .chunks(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        gltf::image::Format::R8G8 => image
            .pixels
            .chunks(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        gltf::image::Format::R8 => image.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        other => {
            warn!("Unsupported glTF texture format {other:?}, drawing untextured");
            return None;
        }
    };
    Some(TextureData {
        width: image.width,
        height: image.height,
        pixels,
    })
}
