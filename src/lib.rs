pub mod cli;
pub mod document;
pub mod error;
pub mod gpu;
pub mod loaders;
pub mod logging;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod surface;
pub mod surface_set;
pub mod time;

pub use error::{Result, SceneError};
pub use renderer::Renderer;
pub use surface_set::SurfaceSet;
