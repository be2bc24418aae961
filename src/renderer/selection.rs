use crate::scene::{EntityId, EntityKind};

/// The single selection cursor of a renderer.
///
/// At most one entity of any kind is selected: choosing a light drops a
/// selected shape or game camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Shape(EntityId),
    Light(EntityId),
    GameCamera(EntityId),
}

impl Selection {
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Self::None => None,
            Self::Shape(_) => Some(EntityKind::Shape),
            Self::Light(_) => Some(EntityKind::Light),
            Self::GameCamera(_) => Some(EntityKind::GameCamera),
        }
    }

    /// Selected id if the selection is of `kind`.
    pub fn of(&self, kind: EntityKind) -> Option<EntityId> {
        match (self, kind) {
            (Self::Shape(id), EntityKind::Shape)
            | (Self::Light(id), EntityKind::Light)
            | (Self::GameCamera(id), EntityKind::GameCamera) => Some(*id),
            _ => None,
        }
    }

    pub fn shape(&self) -> Option<EntityId> {
        self.of(EntityKind::Shape)
    }

    pub fn light(&self) -> Option<EntityId> {
        self.of(EntityKind::Light)
    }

    pub fn game_camera(&self) -> Option<EntityId> {
        self.of(EntityKind::GameCamera)
    }

    pub fn is(&self, id: EntityId) -> bool {
        matches!(self, Self::Shape(s) | Self::Light(s) | Self::GameCamera(s) if *s == id)
    }
}
