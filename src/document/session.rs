use std::fs;
use std::path::Path;

use log::{info, warn};
use serde_json::{json, Map, Value};

use super::scene::SceneDocument;
use crate::error::{Result, SceneError};
use crate::surface::SurfaceKind;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// One window of a session: what kind of surface to open and the scene to
/// load into it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    pub kind: SurfaceKind,
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// The window object itself; scene keys live next to the window keys
    pub scene: Value,
}

impl WindowEntry {
    pub fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            title: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scene: json!({ "type": kind.document_name() }),
        }
    }

    fn from_value(index: usize, value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            SceneError::DocumentFormat(format!("windows[{index}] must be an object"))
        })?;

        let kind = match object.get("type").and_then(Value::as_str) {
            Some(name) => SurfaceKind::from_document(name).unwrap_or_else(|| {
                warn!("windows[{index}]: unknown window type {name:?}, opening a main window");
                SurfaceKind::Main
            }),
            None => SurfaceKind::Main,
        };

        Ok(Self {
            kind,
            title: object.get("title").and_then(Value::as_str).map(str::to_string),
            width: dimension(object, "width", index).unwrap_or(DEFAULT_WIDTH),
            height: dimension(object, "height", index).unwrap_or(DEFAULT_HEIGHT),
            scene: value.clone(),
        })
    }
}

/// The top-level session document: a list of windows.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDocument {
    pub windows: Vec<WindowEntry>,
    raw: Value,
}

impl Default for SessionDocument {
    /// A single main window with an empty scene.
    fn default() -> Self {
        let window = WindowEntry::new(SurfaceKind::Main);
        let raw = json!({ "windows": [window.scene.clone()] });
        Self {
            windows: vec![window],
            raw,
        }
    }
}

impl SessionDocument {
    /// Read the session at `path`. A missing file yields the default session.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let session = Self::parse(&text)?;
                info!("Loaded session {} ({} windows)", path.display(), session.windows.len());
                Ok(session)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No session at {}, starting with one main window", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SceneError::DocumentFormat(format!("session is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(raw: Value) -> Result<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| SceneError::DocumentFormat("session must be a JSON object".into()))?;

        let windows = match object.get("windows") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Array(windows)) => windows,
            Some(_) => {
                return Err(SceneError::DocumentFormat("\"windows\" must be an array".into()))
            }
        };
        if windows.is_empty() {
            return Ok(Self::default());
        }

        let windows = windows
            .iter()
            .enumerate()
            .map(|(index, window)| WindowEntry::from_value(index, window))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { windows, raw })
    }

    /// Replace the scene of window `index` and write the session to `path`.
    pub fn save_scene(&mut self, index: usize, scene: &SceneDocument, path: &Path) -> Result<()> {
        let window = self
            .windows_mut_raw()?
            .get_mut(index)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SceneError::DocumentFormat(format!("no window {index} to save into")))?;
        scene.write_into(window)?;
        let updated = Value::Object(window.clone());

        if let Some(entry) = self.windows.get_mut(index) {
            entry.scene = updated;
        }

        fs::write(path, self.to_string_pretty()?)?;
        info!("Saved window {index} scene to {}", path.display());
        Ok(())
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.raw)?)
    }

    fn windows_mut_raw(&mut self) -> Result<&mut Vec<Value>> {
        let object = self
            .raw
            .as_object_mut()
            .ok_or_else(|| SceneError::DocumentFormat("session must be a JSON object".into()))?;
        match object
            .entry("windows")
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(windows) => Ok(windows),
            _ => Err(SceneError::DocumentFormat("\"windows\" must be an array".into())),
        }
    }
}

fn dimension(object: &Map<String, Value>, key: &str, index: usize) -> Option<u32> {
    let value = object.get(key)?;
    match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
        Some(v) if v > 0 => Some(v),
        _ => {
            warn!("windows[{index}]: ignoring {key} {value}, expected a positive integer");
            None
        }
    }
}
