use std::fs;
use std::path::PathBuf;

use glam::{Vec3, Vec4};
use scene_host::document::{SceneDocument, SessionDocument};
use scene_host::gpu::HeadlessBackend;
use scene_host::renderer::Renderer;
use scene_host::scene::{ShapeKind, ShapeParams};
use scene_host::surface::SurfaceKind;

fn temp_session(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scene-host-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join("scene.json")
}

#[cfg(test)]
mod round_trip_tests {
    use super::*;

    #[test]
    fn test_saved_scene_loads_back_identical() {
        let path = temp_session("round-trip");
        let backend = HeadlessBackend::shared();
        let mut original = Renderer::new("a", SurfaceKind::Main, HeadlessBackend::as_shared(&backend));

        original.request_add_shape(
            ShapeKind::Box,
            ShapeParams {
                position: Vec3::new(1.0, 2.0, 3.0),
                scale: Vec3::new(0.5, 2.0, 1.0),
                rotation: Vec3::new(10.0, 20.0, 30.0),
                color: Vec4::new(0.1, 0.2, 0.3, 1.0),
            },
        );
        original.request_add_shape(ShapeKind::Disc, ShapeParams::default());
        // never materializes, so it must not be saved
        original.request_add_shape(
            ShapeKind::ImportedMesh {
                path: "missing.obj".into(),
            },
            ShapeParams::default(),
        );
        original.drain_pending();
        original.add_light("key");
        original.add_game_camera("overview");

        let mut session = SessionDocument::default();
        session
            .save_scene(0, &original.scene_document(), &path)
            .unwrap();

        let reloaded = SessionDocument::load(&path).unwrap();
        assert_eq!(reloaded.windows.len(), 1);
        let mut copy = Renderer::new("b", SurfaceKind::Main, HeadlessBackend::as_shared(&backend));
        copy.load_scene_value(&reloaded.windows[0].scene).unwrap();
        copy.drain_pending();

        assert_eq!(copy.shapes().len(), original.shapes().len());
        for (a, b) in original.shapes().iter().zip(copy.shapes()) {
            assert_eq!(a.kind(), b.kind());
            assert!(a.params.position.abs_diff_eq(b.params.position, 1e-5));
            assert!(a.params.scale.abs_diff_eq(b.params.scale, 1e-5));
            assert!(a.params.rotation.abs_diff_eq(b.params.rotation, 1e-5));
            assert!(a.params.color.abs_diff_eq(b.params.color, 1e-5));
        }
        assert_eq!(copy.lights()[0].name, "key");
        assert_eq!(copy.game_cameras()[0].name, "overview");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_keeps_window_keys() {
        let path = temp_session("window-keys");
        fs::write(
            &path,
            r#"{"windows": [
                {"type": "WINDOW_DEBUG", "title": "Debug view", "width": 640, "height": 480},
                {"type": "WINDOW_HIERARCHY"}
            ]}"#,
        )
        .unwrap();

        let mut session = SessionDocument::load(&path).unwrap();
        let scene = SceneDocument::parse(r#"{"shapes": [{"type": "Triangle"}]}"#).unwrap();
        session.save_scene(0, &scene, &path).unwrap();

        let reloaded = SessionDocument::load(&path).unwrap();
        let window = &reloaded.windows[0];
        assert_eq!(window.kind, SurfaceKind::Debug);
        assert_eq!(window.title.as_deref(), Some("Debug view"));
        assert_eq!((window.width, window.height), (640, 480));
        assert_eq!(window.scene["shapes"][0]["type"], "Triangle");
        assert_eq!(reloaded.windows[1].kind, SurfaceKind::Hierarchy);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_session_opens_one_main_window() {
        let path = temp_session("absent").with_file_name("does-not-exist.json");
        let session = SessionDocument::load(&path).unwrap();
        assert_eq!(session.windows.len(), 1);
        assert_eq!(session.windows[0].kind, SurfaceKind::Main);
    }

    #[test]
    fn test_save_to_unknown_window_fails() {
        let path = temp_session("unknown-window");
        let mut session = SessionDocument::default();
        let scene = SceneDocument::default();
        assert!(session.save_scene(3, &scene, &path).is_err());
    }
}
