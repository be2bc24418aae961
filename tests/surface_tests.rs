use std::cell::RefCell;
use std::rc::Rc;

use scene_host::gpu::HeadlessBackend;
use scene_host::renderer::Renderer;
use scene_host::surface::{RunState, SizeTracker, SurfaceKind, UiSubsystem};
use scene_host::surface_set::scene_renderers;

#[cfg(test)]
mod coordinator_tests {
    use super::*;

    #[test]
    fn test_hierarchy_renderers_are_excluded() {
        let backend = HeadlessBackend::shared();
        let renderers: Vec<_> = [
            SurfaceKind::Main,
            SurfaceKind::Hierarchy,
            SurfaceKind::Debug,
            SurfaceKind::Gui,
        ]
        .into_iter()
        .map(|kind| {
            Rc::new(RefCell::new(Renderer::new(
                kind.display_name(),
                kind,
                HeadlessBackend::as_shared(&backend),
            )))
        })
        .collect();

        let list = scene_renderers(&renderers);
        let kinds: Vec<_> = list.iter().map(|r| r.borrow().kind()).collect();
        assert_eq!(
            kinds,
            vec![SurfaceKind::Main, SurfaceKind::Debug, SurfaceKind::Gui]
        );
        assert!(Rc::ptr_eq(&list[0], &renderers[0]));
    }

    #[test]
    fn test_cross_renderer_delete_through_list() {
        use scene_host::scene::{EntityKind, ShapeKind, ShapeParams};

        let backend = HeadlessBackend::shared();
        let main = Rc::new(RefCell::new(Renderer::new(
            "main",
            SurfaceKind::Main,
            HeadlessBackend::as_shared(&backend),
        )));
        main.borrow_mut()
            .request_add_shape(ShapeKind::Box, ShapeParams::default());
        main.borrow_mut().drain_pending();

        let list = scene_renderers([&main]);
        {
            let mut target = list[0].borrow_mut();
            let id = target.shapes()[0].id();
            assert!(target.select_shape(id));
            assert!(target.delete_selected(EntityKind::Shape));
        }
        assert!(main.borrow().shapes().is_empty());
    }

    #[test]
    fn test_run_state_stops_once() {
        let state = RunState::new();
        assert!(state.is_running());
        state.stop();
        state.stop();
        assert!(!state.is_running());
    }
}

#[cfg(test)]
mod surface_support_tests {
    use super::*;

    #[test]
    fn test_size_tracker_drives_aspect_once() {
        let backend = HeadlessBackend::shared();
        let mut renderer = Renderer::new("main", SurfaceKind::Main, HeadlessBackend::as_shared(&backend));
        let mut size = SizeTracker::new(800, 600);

        let mut updates = 0;
        for (w, h) in [(1024, 512), (1024, 512), (0, 0), (1024, 512)] {
            if size.observe(w, h).is_some() {
                renderer.update_aspect(w, h);
                updates += 1;
            }
        }

        assert_eq!(updates, 1);
        assert_eq!(renderer.camera().unwrap().aspect, 2.0);
    }

    #[test]
    fn test_ui_subsystem_lives_as_long_as_surfaces() {
        let ui = UiSubsystem::new();
        let leases: Vec<_> = (0..3).map(|_| ui.acquire()).collect();
        let contexts: Vec<_> = leases.iter().map(|lease| lease.create_context()).collect();
        assert_eq!(contexts.len(), 3);
        assert_eq!(ui.initializations(), 1);

        drop(leases);
        assert!(!ui.is_initialized());
        assert_eq!(ui.teardowns(), 1);

        let _again = ui.acquire();
        assert_eq!(ui.initializations(), 2);
    }
}
