use glam::{Vec3, Vec4};

use super::EntityId;

pub const DEFAULT_CUTOFF_DEG: f32 = 12.5;

/// A named spot light.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    id: EntityId,
    pub name: String,
    pub position: Vec3,
    /// Not necessarily unit length
    pub direction: Vec3,
    pub color: Vec4,
    /// Cone half-angle in degrees
    pub cutoff: f32,
    pub intensity: f32,
}

impl SpotLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec4::ONE,
            cutoff: DEFAULT_CUTOFF_DEG,
            intensity: 1.0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Unit direction, or straight down if `direction` is degenerate.
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let light = SpotLight::new("key");
        assert_eq!(light.direction, Vec3::NEG_Y);
        assert_eq!(light.cutoff, 12.5);
        assert_eq!(light.intensity, 1.0);
    }

    #[test]
    fn direction_is_normalized_by_consumers() {
        let mut light = SpotLight::new("key");
        light.direction = Vec3::new(0.0, 0.0, -4.0);
        assert_eq!(light.unit_direction(), Vec3::NEG_Z);

        light.direction = Vec3::ZERO;
        assert_eq!(light.unit_direction(), Vec3::NEG_Y);
    }
}
