use bytemuck::{Pod, Zeroable};

use crate::error::{Result, SceneError};

/// Vertex layout shared by every shape kind.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Texture pixels decoded by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>, // RGBA8
}

impl TextureData {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Fails with `ResourceLoad` when either side exceeds the device's
    /// largest 2D texture.
    pub fn check_dimensions(&self, label: &str, max_dimension: u32) -> Result<()> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(SceneError::resource(
                label,
                format!(
                    "texture is {}x{}, device limit is {max_dimension}",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }
}

/// CPU-side geometry ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub texture: Option<TextureData>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureData) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the buffers can be uploaded and drawn as a triangle list.
    pub fn validate(&self, label: &str) -> Result<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(SceneError::validation(label, "mesh has no vertices or indices"));
        }
        if self.indices.len() % 3 != 0 {
            return Err(SceneError::validation(
                label,
                format!("index count {} is not a multiple of 3", self.indices.len()),
            ));
        }
        let vertex_count = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(SceneError::validation(
                label,
                format!("index {bad} out of range for {vertex_count} vertices"),
            ));
        }
        if let Some(texture) = &self.texture {
            if texture.width == 0 || texture.height == 0 {
                return Err(SceneError::validation(label, "texture has zero size"));
            }
            if texture.pixels.len() != texture.expected_len() {
                return Err(SceneError::validation(
                    label,
                    format!(
                        "texture holds {} bytes, expected {}",
                        texture.pixels.len(),
                        texture.expected_len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0]),
                Vertex::new([1.0, 1.0, 0.0], [1.0, 1.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn valid_mesh_passes() {
        assert!(quad().validate("quad").is_ok());
        assert_eq!(quad().triangle_count(), 2);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = MeshData::default().validate("empty").unwrap_err();
        assert!(matches!(err, SceneError::EntityValidation { .. }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = quad();
        mesh.indices[5] = 9;
        assert!(mesh.validate("quad").is_err());
    }

    #[test]
    fn texture_size_must_match_pixels() {
        let mesh = quad().with_texture(TextureData {
            width: 2,
            height: 2,
            pixels: vec![255; 15],
        });
        assert!(mesh.validate("quad").is_err());
    }

    #[test]
    fn oversized_texture_is_a_resource_error() {
        let texture = TextureData {
            width: 4096,
            height: 2,
            pixels: vec![255; 4096 * 2 * 4],
        };
        assert!(texture.check_dimensions("big.png", 8192).is_ok());
        assert!(texture.check_dimensions("big.png", 4096).is_ok());

        let err = texture.check_dimensions("big.png", 2048).unwrap_err();
        assert!(matches!(err, SceneError::ResourceLoad { .. }));
        assert!(err.to_string().contains("big.png"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn vertex_layout_stride() {
        assert_eq!(Vertex::layout().array_stride, 20);
    }
}
