use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, info};

#[derive(Default)]
struct UiShared {
    leases: Cell<usize>,
    style: RefCell<Option<Arc<egui::Style>>>,
    initializations: Cell<u32>,
    teardowns: Cell<u32>,
}

/// Process-wide overlay state shared by every surface.
///
/// The first [`acquire`](Self::acquire) builds the shared style; dropping
/// the last [`UiLease`] tears it down. Acquiring again afterwards starts a
/// fresh generation.
#[derive(Clone, Default)]
pub struct UiSubsystem {
    shared: Rc<UiShared>,
}

impl UiSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> UiLease {
        let shared = &self.shared;
        if shared.leases.get() == 0 {
            *shared.style.borrow_mut() = Some(Arc::new(overlay_style()));
            shared.initializations.set(shared.initializations.get() + 1);
            info!("UI subsystem initialized");
        }
        shared.leases.set(shared.leases.get() + 1);
        UiLease {
            shared: self.shared.clone(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.style.borrow().is_some()
    }

    pub fn active_leases(&self) -> usize {
        self.shared.leases.get()
    }

    pub fn initializations(&self) -> u32 {
        self.shared.initializations.get()
    }

    pub fn teardowns(&self) -> u32 {
        self.shared.teardowns.get()
    }
}

/// A surface's hold on the UI subsystem.
pub struct UiLease {
    shared: Rc<UiShared>,
}

impl UiLease {
    /// A fresh egui context using the shared style.
    pub fn create_context(&self) -> egui::Context {
        let ctx = egui::Context::default();
        if let Some(style) = self.shared.style.borrow().as_ref() {
            ctx.set_style(style.clone());
        }
        ctx
    }
}

impl Drop for UiLease {
    fn drop(&mut self) {
        let remaining = self.shared.leases.get().saturating_sub(1);
        self.shared.leases.set(remaining);
        debug!("UI lease released, {remaining} remaining");
        if remaining == 0 {
            self.shared.style.borrow_mut().take();
            self.shared.teardowns.set(self.shared.teardowns.get() + 1);
            info!("UI subsystem torn down");
        }
    }
}

fn overlay_style() -> egui::Style {
    let mut style = egui::Style {
        visuals: egui::Visuals::dark(),
        ..Default::default()
    };
    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    style
}
