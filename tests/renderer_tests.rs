use std::cell::RefCell;
use std::rc::Rc;
use std::thread;

use glam::{Vec3, Vec4};
use scene_host::error::SceneError;
use scene_host::gpu::{GpuBackend, HeadlessBackend};
use scene_host::renderer::{Renderer, Selection};
use scene_host::scene::{EntityKind, ShapeKind, ShapeParams, ShapeState};
use scene_host::surface::SurfaceKind;
use serde_json::json;

fn renderer_with(backend: &Rc<RefCell<HeadlessBackend>>) -> Renderer {
    Renderer::new("test", SurfaceKind::Main, HeadlessBackend::as_shared(backend))
}

#[cfg(test)]
mod pending_queue_tests {
    use super::*;

    #[test]
    fn test_concurrent_submitters_lose_nothing() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let submitter = renderer.submitter();
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let params = ShapeParams {
                            position: Vec3::new(t as f32, i as f32, 0.0),
                            ..ShapeParams::default()
                        };
                        submitter.request_add_shape(ShapeKind::Box, params);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(renderer.pending_len(), THREADS * PER_THREAD);
        let report = renderer.drain_pending();
        assert_eq!(report.materialized, THREADS * PER_THREAD);
        assert_eq!(report.failed, 0);
        assert_eq!(renderer.shapes().len(), THREADS * PER_THREAD);
        assert_eq!(backend.borrow().live_meshes(), THREADS * PER_THREAD);

        let mut ids: Vec<_> = renderer.shapes().iter().map(|s| s.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn test_drain_preserves_submission_order() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);

        let first = renderer.request_add_shape(ShapeKind::Triangle, ShapeParams::default());
        let second = renderer.request_add_shape(ShapeKind::Disc, ShapeParams::default());
        renderer.drain_pending();

        let order: Vec<_> = renderer.shapes().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![first, second]);
        assert!(renderer.shapes().iter().all(|s| s.state() == ShapeState::Live));
    }

    #[test]
    fn test_missing_mesh_never_goes_live() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);

        renderer.request_add_shape(
            ShapeKind::ImportedMesh {
                path: "missing.obj".into(),
            },
            ShapeParams::default(),
        );
        let report = renderer.drain_pending();

        assert_eq!(report.failed, 1);
        assert!(renderer.shapes().is_empty());
        assert_eq!(backend.borrow().live_meshes(), 0);
        assert_eq!(renderer.errors().len(), 1);
        match &renderer.errors()[0] {
            SceneError::ResourceLoad { path, .. } => {
                assert!(path.to_string_lossy().contains("missing.obj"))
            }
            other => panic!("expected a resource error, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_upload_is_recorded() {
        let backend = Rc::new(RefCell::new(HeadlessBackend::failing()));
        let mut renderer = renderer_with(&backend);

        renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());
        let report = renderer.drain_pending();

        assert_eq!(report.failed, 1);
        assert!(renderer.shapes().is_empty());
        assert!(renderer.last_error().is_some());
    }
}

#[cfg(test)]
mod scene_loading_tests {
    use super::*;

    #[test]
    fn test_bare_cube_loads_with_defaults() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);

        let report = renderer
            .load_scene_value(&json!({"shapes": [{"type": "Cube"}]}))
            .unwrap();
        assert_eq!(report.shapes_queued, 1);
        assert!(renderer.shapes().is_empty());

        renderer.drain_pending();
        assert_eq!(renderer.shapes().len(), 1);
        let shape = &renderer.shapes()[0];
        assert_eq!(*shape.kind(), ShapeKind::Box);
        assert!(shape.is_live());
        assert_eq!(shape.params.position, Vec3::ZERO);
        assert_eq!(shape.params.scale, Vec3::ONE);
        assert_eq!(shape.params.color, Vec4::ONE);
    }

    #[test]
    fn test_negative_scale_is_rejected() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);

        let report = renderer
            .load_scene_value(&json!({"shapes": [{"type": "Cube", "scale": [-1, 1, 1]}]}))
            .unwrap();
        renderer.drain_pending();

        assert_eq!(report.skipped, 1);
        assert!(renderer.shapes().is_empty());
        assert_eq!(renderer.errors().len(), 1);
        assert!(matches!(
            renderer.errors()[0],
            SceneError::EntityValidation { .. }
        ));
    }

    #[test]
    fn test_malformed_document_keeps_prior_state() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.add_light("key");

        let result = renderer.load_scene_value(&json!({"shapes": "not a list"}));
        assert!(matches!(result, Err(SceneError::DocumentFormat(_))));
        assert_eq!(renderer.lights().len(), 1);
        assert_eq!(renderer.pending_len(), 0);
    }

    #[test]
    fn test_document_replaces_lights_and_cameras() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.add_light("old");

        let report = renderer
            .load_scene_value(&json!({
                "spotlights": [{"name": "a"}, {"name": "b", "intensity": 2}],
                "gameCameras": [{"name": "cam", "fov": 60}],
                "camera": {"position": [0, 1, 5], "fov": 50}
            }))
            .unwrap();

        assert_eq!(report.lights, 2);
        assert_eq!(report.game_cameras, 1);
        assert!(report.camera_replaced);
        assert_eq!(renderer.lights()[0].name, "a");
        assert_eq!(renderer.lights()[1].intensity, 2.0);
        let camera = renderer.camera().unwrap();
        assert_eq!(camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(camera.fov, 50.0);
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    fn populated() -> (Rc<RefCell<HeadlessBackend>>, Renderer) {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());
        renderer.drain_pending();
        renderer.add_light("light");
        renderer.add_game_camera("camera");
        (backend, renderer)
    }

    #[test]
    fn test_selecting_light_clears_other_kinds() {
        let (_backend, mut renderer) = populated();
        let shape = renderer.shapes()[0].id();

        assert!(renderer.select_shape(shape));
        renderer.select_game_camera_by_name("camera").unwrap();
        let light = renderer.select_light_by_name("light").unwrap();

        assert_eq!(renderer.selection(), Selection::Light(light));
        assert_eq!(renderer.selection().shape(), None);
        assert_eq!(renderer.selection().game_camera(), None);
    }

    #[test]
    fn test_name_collision_selects_first() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        let first = renderer.add_light("twin");
        renderer.add_light("twin");

        assert_eq!(renderer.select_light_by_name("twin"), Some(first));
        assert_eq!(renderer.select_light_by_name("nobody"), None);
        assert_eq!(renderer.selection(), Selection::Light(first));
    }

    #[test]
    fn test_delete_selected_shape_frees_mesh() {
        let (backend, mut renderer) = populated();
        let shape = renderer.shapes()[0].id();
        assert_eq!(backend.borrow().live_meshes(), 1);

        renderer.select_shape(shape);
        assert!(renderer.delete_selected(EntityKind::Shape));

        assert!(renderer.shapes().is_empty());
        assert_eq!(backend.borrow().live_meshes(), 0);
        assert_eq!(renderer.selection(), Selection::None);
        assert!(!renderer.delete_selected(EntityKind::Shape));
    }

    #[test]
    fn test_delete_selected_light() {
        let (_backend, mut renderer) = populated();
        renderer.add_light("other");
        let light = renderer.select_light_by_name("light").unwrap();

        assert!(renderer.delete_selected(EntityKind::Light));

        assert_eq!(renderer.lights().len(), 1);
        assert!(renderer.lights().iter().all(|l| l.id() != light));
        assert_eq!(renderer.lights()[0].name, "other");
        assert_eq!(renderer.selection(), Selection::None);
        assert_eq!(renderer.game_cameras().len(), 1);
        assert_eq!(renderer.shapes().len(), 1);
        assert!(!renderer.delete_selected(EntityKind::Light));
    }

    #[test]
    fn test_delete_selected_game_camera() {
        let (_backend, mut renderer) = populated();
        let camera = renderer.select_game_camera_by_name("camera").unwrap();

        assert!(renderer.delete_selected(EntityKind::GameCamera));

        assert!(renderer.game_cameras().iter().all(|c| c.id() != camera));
        assert!(renderer.game_cameras().is_empty());
        assert_eq!(renderer.selection(), Selection::None);
        assert_eq!(renderer.lights().len(), 1);
        assert!(!renderer.delete_selected(EntityKind::GameCamera));
    }

    #[test]
    fn test_delete_of_other_kind_is_noop() {
        let (_backend, mut renderer) = populated();
        renderer.select_light_by_name("light");

        assert!(!renderer.delete_selected(EntityKind::GameCamera));
        assert_eq!(renderer.lights().len(), 1);
    }

    #[test]
    fn test_reset_keeps_camera() {
        let (backend, mut renderer) = populated();
        renderer.camera_mut().position = Vec3::new(4.0, 5.0, 6.0);
        renderer.select_light_by_name("light");

        renderer.reset_scene();

        assert!(renderer.shapes().is_empty());
        assert!(renderer.lights().is_empty());
        assert!(renderer.game_cameras().is_empty());
        assert_eq!(renderer.selection(), Selection::None);
        assert_eq!(backend.borrow().live_meshes(), 0);
        assert_eq!(renderer.camera().unwrap().position, Vec3::new(4.0, 5.0, 6.0));
    }
}

#[cfg(test)]
mod shared_backend_tests {
    use super::*;

    #[test]
    fn test_mesh_visible_to_every_renderer_in_group() {
        let backend = HeadlessBackend::shared();
        let mut a = renderer_with(&backend);
        let mut b = Renderer::new("b", SurfaceKind::Debug, HeadlessBackend::as_shared(&backend));

        a.request_add_shape(ShapeKind::Disc, ShapeParams::default());
        a.drain_pending();
        let handle = a.shapes()[0].binding().unwrap().handle;
        let uploads = backend.borrow().uploads();

        let plan = b.plan_frame(640, 480);
        assert!(plan.items.is_empty());
        assert!(b.backend().borrow().contains(handle));
        assert_eq!(backend.borrow().uploads(), uploads);
    }

    #[test]
    fn test_dropping_renderer_releases_its_meshes() {
        let backend = HeadlessBackend::shared();
        {
            let mut renderer = renderer_with(&backend);
            renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());
            renderer.request_add_shape(ShapeKind::Triangle, ShapeParams::default());
            renderer.drain_pending();
            assert_eq!(backend.borrow().live_meshes(), 2);
        }
        assert_eq!(backend.borrow().live_meshes(), 0);
    }
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    #[test]
    fn test_resize_twice_matches_once() {
        let backend = HeadlessBackend::shared();
        let mut once = renderer_with(&backend);
        let mut twice = renderer_with(&backend);

        once.update_aspect(1280, 720);
        twice.update_aspect(1280, 720);
        twice.update_aspect(1280, 720);

        assert_eq!(once.camera().unwrap().aspect, twice.camera().unwrap().aspect);
        assert!((once.camera().unwrap().aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_plan_contains_only_live_shapes() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());

        assert!(renderer.plan_frame(800, 600).items.is_empty());
        renderer.drain_pending();
        let plan = renderer.plan_frame(800, 600);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].index_count, 36);
        assert!(plan.lines.is_empty());
    }

    #[test]
    fn test_delete_after_planning_skips_released_mesh() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());
        renderer.drain_pending();

        // The frame is planned, then the overlay deletes before submit
        let recorded = renderer.plan_frame(800, 600);
        let handle = recorded.items[0].mesh;
        renderer.select_shape(recorded.items[0].shape);
        assert!(renderer.delete_selected(EntityKind::Shape));

        let backend = backend.borrow();
        assert!(!backend.contains(handle));
        assert!(backend.resolve(handle).is_none());
        drop(backend);
        assert!(renderer.plan_frame(800, 600).items.is_empty());
    }

    #[test]
    fn test_reset_after_planning_releases_every_mesh() {
        let backend = HeadlessBackend::shared();
        let mut renderer = renderer_with(&backend);
        renderer.request_add_shape(ShapeKind::Box, ShapeParams::default());
        renderer.request_add_shape(ShapeKind::Disc, ShapeParams::default());
        renderer.drain_pending();

        let recorded = renderer.plan_frame(800, 600);
        assert_eq!(recorded.items.len(), 2);
        renderer.reset_scene();

        for item in &recorded.items {
            assert!(!backend.borrow().contains(item.mesh));
        }
        assert_eq!(backend.borrow().live_meshes(), 0);
        assert!(renderer.plan_frame(800, 600).items.is_empty());
    }

    #[test]
    fn test_debug_surface_plans_lines() {
        let backend = HeadlessBackend::shared();
        let mut renderer = Renderer::new("debug", SurfaceKind::Debug, HeadlessBackend::as_shared(&backend));
        renderer.add_light("sun");

        let plan = renderer.plan_frame(800, 600);
        assert!(!plan.lines.is_empty());
        assert_eq!(plan.lines.len() % 2, 0);
    }
}
