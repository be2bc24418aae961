//! Windows and their rendering contexts.

mod kind;
mod size;
mod ui;
mod window;

use std::cell::Cell;

pub use kind::SurfaceKind;
pub use size::SizeTracker;
pub use ui::{UiLease, UiSubsystem};
pub use window::Surface;

/// Shared "keep running" flag of the event loop.
#[derive(Debug)]
pub struct RunState(Cell<bool>);

impl RunState {
    pub fn new() -> Self {
        Self(Cell::new(true))
    }

    pub fn is_running(&self) -> bool {
        self.0.get()
    }

    pub fn stop(&self) {
        self.0.set(false);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
