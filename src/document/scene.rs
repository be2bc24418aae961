use glam::{Vec3, Vec4};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SceneError};
use crate::scene::{Camera, GameCamera, Shape, ShapeKind, ShapeParams, SpotLight};

const SCENE_KEYS: [&str; 4] = ["shapes", "spotlights", "gameCameras", "camera"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 4]>,
}

impl ShapeEntry {
    pub fn from_shape(shape: &Shape) -> Self {
        let params = &shape.params;
        Self {
            kind: shape.kind().document_name().to_string(),
            obj_path: shape
                .kind()
                .mesh_path()
                .map(|path| path.to_string_lossy().into_owned()),
            position: Some(params.position.to_array()),
            scale: Some(params.scale.to_array()),
            rotation: Some(params.rotation.to_array()),
            color: Some(params.color.to_array()),
        }
    }

    /// Kind and parameters with defaults filled in, validated.
    pub fn to_record(&self) -> Result<(ShapeKind, ShapeParams)> {
        let kind = ShapeKind::from_document(&self.kind, self.obj_path.as_deref())?;
        let defaults = ShapeParams::default();
        let params = ShapeParams {
            position: self.position.map_or(defaults.position, Vec3::from_array),
            scale: self.scale.map_or(defaults.scale, Vec3::from_array),
            rotation: self.rotation.map_or(defaults.rotation, Vec3::from_array),
            color: self.color.map_or(defaults.color, Vec4::from_array),
        };
        params.validate(&format!("{} shape", self.kind))?;
        Ok((kind, params))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotlightEntry {
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub direction: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 4]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
}

impl SpotlightEntry {
    pub fn from_light(light: &SpotLight) -> Self {
        Self {
            name: light.name.clone(),
            position: Some(light.position.to_array()),
            direction: Some(light.direction.to_array()),
            color: Some(light.color.to_array()),
            cutoff: Some(light.cutoff),
            intensity: Some(light.intensity),
        }
    }

    pub fn to_light(&self) -> SpotLight {
        let mut light = SpotLight::new(self.name.clone());
        if let Some(position) = self.position {
            light.position = Vec3::from_array(position);
        }
        if let Some(direction) = self.direction {
            light.direction = Vec3::from_array(direction);
        }
        if let Some(color) = self.color {
            light.color = Vec4::from_array(color);
        }
        light.cutoff = self.cutoff.unwrap_or(light.cutoff);
        light.intensity = self.intensity.unwrap_or(light.intensity);
        light
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCameraEntry {
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
}

impl GameCameraEntry {
    pub fn from_game_camera(camera: &GameCamera) -> Self {
        Self {
            name: camera.name.clone(),
            position: Some(camera.position.to_array()),
            rotation: Some(camera.rotation.to_array()),
            fov: Some(camera.fov),
        }
    }

    pub fn to_game_camera(&self) -> GameCamera {
        let mut camera = GameCamera::new(self.name.clone());
        if let Some(position) = self.position {
            camera.position = Vec3::from_array(position);
        }
        if let Some(rotation) = self.rotation {
            camera.rotation = Vec3::from_array(rotation);
        }
        camera.fov = self.fov.unwrap_or(camera.fov);
        camera
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraEntry {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub aspect: Option<f32>,
}

impl CameraEntry {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: Some(camera.position.to_array()),
            rotation: Some(camera.rotation.to_array()),
            fov: Some(camera.fov),
            aspect: Some(camera.aspect),
        }
    }

    /// Overwrite the fields this entry carries.
    pub fn apply_to(&self, camera: &mut Camera) {
        if let Some(position) = self.position {
            camera.position = Vec3::from_array(position);
        }
        if let Some(rotation) = self.rotation {
            camera.rotation = Vec3::from_array(rotation);
        }
        camera.fov = self.fov.unwrap_or(camera.fov);
        camera.aspect = self.aspect.unwrap_or(camera.aspect);
    }
}

/// An entry dropped while parsing, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub entity: String,
    pub reason: String,
}

/// A parsed scene document.
///
/// `shapes` holds only entries that passed validation; the rest are in
/// `rejected`. Light and camera lists are `None` when the document does
/// not mention them, so loading leaves the existing ones alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDocument {
    pub shapes: Vec<ShapeEntry>,
    pub spotlights: Option<Vec<SpotlightEntry>>,
    pub game_cameras: Option<Vec<GameCameraEntry>>,
    pub camera: Option<CameraEntry>,
    pub rejected: Vec<Rejected>,
}

impl SceneDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SceneError::DocumentFormat(format!("not valid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Parse a scene object. Unknown keys are ignored.
    ///
    /// Fails only on structural problems: a non-object top level, or a
    /// scene key holding the wrong JSON type. A bad entry inside a list
    /// is rejected on its own.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SceneError::DocumentFormat("scene must be a JSON object".into()))?;

        let mut document = SceneDocument::default();

        if let Some(entries) = array_field(object, "shapes")? {
            for (index, entry) in entries.iter().enumerate() {
                let parsed = serde_json::from_value::<ShapeEntry>(entry.clone())
                    .map_err(|e| e.to_string())
                    .and_then(|shape| match shape.to_record() {
                        Ok(_) => Ok(shape),
                        Err(err) => Err(reason_of(err)),
                    });
                match parsed {
                    Ok(shape) => document.shapes.push(shape),
                    Err(reason) => document.reject(format!("shapes[{index}]"), reason),
                }
            }
        }

        if let Some(entries) = array_field(object, "spotlights")? {
            let mut lights = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                match serde_json::from_value::<SpotlightEntry>(entry.clone()) {
                    Ok(light) => lights.push(light),
                    Err(e) => document.reject(format!("spotlights[{index}]"), e.to_string()),
                }
            }
            document.spotlights = Some(lights);
        }

        if let Some(entries) = array_field(object, "gameCameras")? {
            let mut cameras = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                match serde_json::from_value::<GameCameraEntry>(entry.clone()) {
                    Ok(camera) => cameras.push(camera),
                    Err(e) => document.reject(format!("gameCameras[{index}]"), e.to_string()),
                }
            }
            document.game_cameras = Some(cameras);
        }

        match object.get("camera") {
            None | Some(Value::Null) => {}
            Some(value @ Value::Object(_)) => {
                match serde_json::from_value::<CameraEntry>(value.clone()) {
                    Ok(camera) => document.camera = Some(camera),
                    Err(e) => document.reject("camera".to_string(), e.to_string()),
                }
            }
            Some(_) => {
                return Err(SceneError::DocumentFormat("\"camera\" must be an object".into()))
            }
        }

        Ok(document)
    }

    /// Document form of a live scene.
    pub fn capture<'a>(
        shapes: impl IntoIterator<Item = &'a Shape>,
        lights: &[SpotLight],
        game_cameras: &[GameCamera],
        camera: Option<&Camera>,
    ) -> Self {
        Self {
            shapes: shapes.into_iter().map(ShapeEntry::from_shape).collect(),
            spotlights: Some(lights.iter().map(SpotlightEntry::from_light).collect()),
            game_cameras: Some(
                game_cameras
                    .iter()
                    .map(GameCameraEntry::from_game_camera)
                    .collect(),
            ),
            camera: camera.map(CameraEntry::from_camera),
            rejected: Vec::new(),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        let mut object = Map::new();
        self.write_into(&mut object)?;
        Ok(Value::Object(object))
    }

    /// Replace the scene keys of `object`, keeping every other key.
    pub fn write_into(&self, object: &mut Map<String, Value>) -> Result<()> {
        for key in SCENE_KEYS {
            object.remove(key);
        }
        object.insert("shapes".into(), serde_json::to_value(&self.shapes)?);
        if let Some(lights) = &self.spotlights {
            object.insert("spotlights".into(), serde_json::to_value(lights)?);
        }
        if let Some(cameras) = &self.game_cameras {
            object.insert("gameCameras".into(), serde_json::to_value(cameras)?);
        }
        if let Some(camera) = &self.camera {
            object.insert("camera".into(), serde_json::to_value(camera)?);
        }
        Ok(())
    }

    fn reject(&mut self, entity: String, reason: String) {
        self.rejected.push(Rejected { entity, reason });
    }
}

fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(entries)),
        Some(_) => Err(SceneError::DocumentFormat(format!("\"{key}\" must be an array"))),
    }
}

/// Reads an optional field, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            warn!("Ignoring mistyped field value {value}: {e}");
            Ok(None)
        }
    }
}

fn reason_of(err: SceneError) -> String {
    match err {
        SceneError::EntityValidation { reason, .. } => reason,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_cube_gets_defaults() {
        let doc = SceneDocument::from_value(&json!({"shapes": [{"type": "Cube"}]})).unwrap();
        assert_eq!(doc.shapes.len(), 1);
        assert!(doc.rejected.is_empty());

        let (kind, params) = doc.shapes[0].to_record().unwrap();
        assert_eq!(kind, ShapeKind::Box);
        assert_eq!(params, ShapeParams::default());
    }

    #[test]
    fn bad_entries_are_rejected_individually() {
        let doc = SceneDocument::from_value(&json!({
            "shapes": [
                {"type": "Cube", "scale": [-1, 1, 1]},
                {"type": "Sphere"},
                {"type": "Circle", "position": [1, 2]},
                {"type": "Mesh"},
                {"type": "Triangle", "position": [1, 2, 3]}
            ]
        }))
        .unwrap();

        assert_eq!(doc.shapes.len(), 1);
        assert_eq!(doc.shapes[0].kind, "Triangle");
        assert_eq!(doc.rejected.len(), 4);
        assert_eq!(doc.rejected[0].entity, "shapes[0]");
    }

    #[test]
    fn integers_are_accepted_for_floats() {
        let doc = SceneDocument::from_value(&json!({
            "spotlights": [{"name": "key", "cutoff": 20, "intensity": 2}]
        }))
        .unwrap();
        let light = doc.spotlights.unwrap()[0].to_light();
        assert_eq!(light.cutoff, 20.0);
        assert_eq!(light.intensity, 2.0);
    }

    #[test]
    fn light_without_name_is_rejected() {
        let doc = SceneDocument::from_value(&json!({
            "spotlights": [{"position": [0, 1, 0]}, {"name": "fill"}]
        }))
        .unwrap();
        assert_eq!(doc.spotlights.as_ref().map(Vec::len), Some(1));
        assert_eq!(doc.rejected.len(), 1);
    }

    #[test]
    fn mistyped_light_field_keeps_the_light() {
        let doc = SceneDocument::from_value(&json!({
            "spotlights": [{"name": "a", "cutoff": "x", "intensity": 3, "position": [0, "y", 0]}]
        }))
        .unwrap();
        assert!(doc.rejected.is_empty());

        let lights = doc.spotlights.unwrap();
        assert_eq!(lights.len(), 1);
        let light = lights[0].to_light();
        assert_eq!(light.name, "a");
        assert_eq!(light.cutoff, 12.5);
        assert_eq!(light.intensity, 3.0);
        assert_eq!(light.position, Vec3::ZERO);
    }

    #[test]
    fn mistyped_camera_fields_fall_back() {
        let doc = SceneDocument::from_value(&json!({
            "gameCameras": [{"name": "chase", "fov": "wide", "position": [1, 2, 3]}],
            "camera": {"fov": null, "aspect": "tall", "position": [0, 0, 5]}
        }))
        .unwrap();
        assert!(doc.rejected.is_empty());

        let chase = doc.game_cameras.unwrap()[0].to_game_camera();
        assert_eq!(chase.fov, GameCamera::new("default").fov);
        assert_eq!(chase.position, Vec3::new(1.0, 2.0, 3.0));

        let mut camera = Camera::default();
        doc.camera.unwrap().apply_to(&mut camera);
        assert_eq!(camera.aspect, Camera::default().aspect);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn structural_errors_fail_the_document() {
        for bad in [
            json!([1, 2, 3]),
            json!({"shapes": {"type": "Cube"}}),
            json!({"spotlights": "key"}),
            json!({"camera": [0, 0, 3]}),
        ] {
            let err = SceneDocument::from_value(&bad).unwrap_err();
            assert!(matches!(err, SceneError::DocumentFormat(_)), "{bad}");
        }
        assert!(SceneDocument::parse("{ not json").is_err());
    }

    #[test]
    fn absent_lists_stay_absent() {
        let doc = SceneDocument::from_value(&json!({})).unwrap();
        assert!(doc.spotlights.is_none());
        assert!(doc.game_cameras.is_none());
        assert!(doc.camera.is_none());
    }

    #[test]
    fn camera_fields_overwrite_defaults() {
        let doc = SceneDocument::from_value(&json!({"camera": {"fov": 60, "aspect": 2.0}})).unwrap();
        let mut camera = Camera::default();
        doc.camera.unwrap().apply_to(&mut camera);
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn write_into_keeps_foreign_keys() {
        let mut window = json!({"type": "WINDOW_MAIN", "title": "Main", "shapes": [{"type": "Cube"}]});
        let doc = SceneDocument {
            shapes: vec![ShapeEntry {
                kind: "Triangle".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        doc.write_into(window.as_object_mut().unwrap()).unwrap();

        assert_eq!(window["title"], "Main");
        assert_eq!(window["shapes"][0]["type"], "Triangle");
        assert!(window.get("spotlights").is_none());
    }

    #[test]
    fn mesh_entries_keep_obj_path() {
        let shape = Shape::new(
            ShapeKind::ImportedMesh {
                path: "models/teapot.obj".into(),
            },
            ShapeParams::default(),
        );
        let entry = ShapeEntry::from_shape(&shape);
        assert_eq!(entry.kind, "Mesh");
        assert_eq!(entry.obj_path.as_deref(), Some("models/teapot.obj"));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["objPath"], "models/teapot.obj");
    }
}
