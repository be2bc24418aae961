//! JSON scene and session documents.

mod scene;
mod session;

pub use scene::{
    CameraEntry, GameCameraEntry, Rejected, SceneDocument, ShapeEntry, SpotlightEntry,
};
pub use session::{SessionDocument, WindowEntry, DEFAULT_HEIGHT, DEFAULT_WIDTH};
