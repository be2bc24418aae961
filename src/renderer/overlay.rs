use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec3, Vec4};
use log::info;

use super::Renderer;
use crate::error::SceneError;
use crate::scene::{Camera, ShapeKind, ShapeParams};
use crate::surface::SurfaceKind;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(74, 158, 255);
const HEADING: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeChoice {
    #[default]
    Cube,
    Circle,
    Triangle,
    Mesh,
}

impl ShapeChoice {
    const ALL: [ShapeChoice; 4] = [Self::Cube, Self::Circle, Self::Triangle, Self::Mesh];

    fn label(&self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Circle => "Circle",
            Self::Triangle => "Triangle",
            Self::Mesh => "Mesh",
        }
    }
}

/// Widget state of a renderer's control panel.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub shape_choice: ShapeChoice,
    pub obj_path: String,
    pub light_name: String,
    pub camera_name: String,
}

impl Renderer {
    /// Build this renderer's overlay for one frame.
    ///
    /// Hierarchy surfaces list the scenes of `others`; every other kind
    /// shows its own control panel.
    pub fn show_overlay(&mut self, ctx: &egui::Context, fps: f32, others: &[Rc<RefCell<Renderer>>]) {
        if self.kind() == SurfaceKind::Hierarchy {
            egui::Window::new("Hierarchy")
                .title_bar(true)
                .default_pos(egui::pos2(10.0, 10.0))
                .default_width(280.0)
                .show(ctx, |ui| hierarchy_ui(ui, others));
            return;
        }

        let title = format!("{} Controls", self.label());
        egui::Window::new(title)
            .title_bar(true)
            .resizable(true)
            .default_pos(egui::pos2(10.0, 10.0))
            .default_width(300.0)
            .show(ctx, |ui| self.control_panel_ui(ui, fps));
    }

    fn control_panel_ui(&mut self, ui: &mut egui::Ui, fps: f32) {
        ui.heading(
            egui::RichText::new(format!("{fps:.0} FPS"))
                .size(24.0)
                .color(ACCENT),
        );
        if let Some(err) = self.last_error() {
            ui.colored_label(ERROR_TEXT, err.to_string());
        }

        ui.add_space(5.0);
        ui.separator();
        self.add_entities_ui(ui);

        ui.add_space(5.0);
        ui.separator();
        self.entity_lists_ui(ui);

        ui.add_space(5.0);
        ui.separator();
        self.selected_editor_ui(ui);

        ui.add_space(5.0);
        ui.separator();
        camera_editor_ui(ui, self.camera_mut());

        ui.add_space(5.0);
        ui.separator();
        let mut debug = self.debug_pass();
        if ui.checkbox(&mut debug, "Debug lines").changed() {
            self.set_debug_pass(debug);
        }
        ui.horizontal(|ui| {
            if ui.button("Reset Scene").clicked() {
                self.reset_scene();
            }
            if ui.button("Save Scene").clicked() {
                self.request_save();
            }
            if ui.button("Clear Errors").clicked() {
                self.clear_errors();
            }
        });
    }

    fn add_entities_ui(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Add").size(16.0).color(HEADING));

        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("shape_choice")
                .selected_text(self.panel.shape_choice.label())
                .show_ui(ui, |ui| {
                    for choice in ShapeChoice::ALL {
                        ui.selectable_value(&mut self.panel.shape_choice, choice, choice.label());
                    }
                });
            if ui.button("Add Shape").clicked() {
                self.spawn_add_shape();
            }
        });
        if self.panel.shape_choice == ShapeChoice::Mesh {
            ui.horizontal(|ui| {
                ui.label("OBJ path");
                ui.text_edit_singleline(&mut self.panel.obj_path);
            });
        }

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.panel.light_name);
            if ui.button("Add Spotlight").clicked() {
                let count = self.lights().len();
                let name = take_name(&mut self.panel.light_name, "Light", count);
                let id = self.add_light(name);
                self.select_light(id);
            }
        });
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.panel.camera_name);
            if ui.button("Add Game Camera").clicked() {
                let count = self.game_cameras().len();
                let name = take_name(&mut self.panel.camera_name, "Camera", count);
                let id = self.add_game_camera(name);
                self.select_game_camera(id);
            }
        });
    }

    /// Hands the record to a detached worker, which queues it and exits.
    fn spawn_add_shape(&mut self) {
        let kind = match self.panel.shape_choice {
            ShapeChoice::Cube => ShapeKind::Box,
            ShapeChoice::Circle => ShapeKind::Disc,
            ShapeChoice::Triangle => ShapeKind::Triangle,
            ShapeChoice::Mesh => {
                let path = self.panel.obj_path.trim();
                if path.is_empty() {
                    self.record_error(SceneError::validation("Mesh shape", "missing objPath"));
                    return;
                }
                ShapeKind::ImportedMesh { path: path.into() }
            }
        };

        let submitter = self.submitter();
        let spawned = std::thread::Builder::new()
            .name("add-shape".into())
            .spawn(move || {
                let id = submitter.request_add_shape(kind, ShapeParams::default());
                info!("Queued shape {id}");
            });
        if let Err(err) = spawned {
            self.record_error(SceneError::Io(err));
        }
    }

    fn entity_lists_ui(&mut self, ui: &mut egui::Ui) {
        let selection = self.selection();

        let shapes: Vec<_> = self.shapes().iter().map(|s| (s.id(), s.label())).collect();
        let lights: Vec<_> = self.lights().iter().map(|l| (l.id(), l.name.clone())).collect();
        let cameras: Vec<_> = self
            .game_cameras()
            .iter()
            .map(|c| (c.id(), c.name.clone()))
            .collect();

        egui::ScrollArea::vertical()
            .max_height(200.0)
            .show(ui, |ui| {
                egui::CollapsingHeader::new(format!("Shapes ({})", shapes.len()))
                    .default_open(true)
                    .show(ui, |ui| {
                        for (id, label) in &shapes {
                            if ui.selectable_label(selection.is(*id), label.as_str()).clicked() {
                                self.select_shape(*id);
                            }
                        }
                    });
                egui::CollapsingHeader::new(format!("Spotlights ({})", lights.len()))
                    .default_open(true)
                    .show(ui, |ui| {
                        for (id, name) in &lights {
                            if ui.selectable_label(selection.is(*id), name.as_str()).clicked() {
                                self.select_light(*id);
                            }
                        }
                    });
                egui::CollapsingHeader::new(format!("Game Cameras ({})", cameras.len()))
                    .default_open(true)
                    .show(ui, |ui| {
                        for (id, name) in &cameras {
                            if ui.selectable_label(selection.is(*id), name.as_str()).clicked() {
                                self.select_game_camera(*id);
                            }
                        }
                    });
            });
    }

    fn selected_editor_ui(&mut self, ui: &mut egui::Ui) {
        let selection = self.selection();
        let Some(kind) = selection.kind() else {
            ui.label("Nothing selected");
            return;
        };

        if let Some(id) = selection.shape() {
            let Some(shape) = self.shape(id) else { return };
            let label = shape.label();
            let mut params = shape.params;

            ui.label(egui::RichText::new(label).size(16.0).color(HEADING));
            let mut changed = vec3_editor(ui, "Position", &mut params.position, 0.05, None);
            changed |= vec3_editor(ui, "Rotation", &mut params.rotation, 1.0, None);
            changed |= vec3_editor(ui, "Scale", &mut params.scale, 0.05, Some(0.01));
            changed |= color_editor(ui, &mut params.color);
            if changed {
                if let Err(err) = self.update_shape(id, params) {
                    self.record_error(err);
                }
            }
        } else if let Some(id) = selection.light() {
            let Some(light) = self.light_mut(id) else { return };
            ui.label(egui::RichText::new(light.name.clone()).size(16.0).color(HEADING));
            vec3_editor(ui, "Position", &mut light.position, 0.05, None);
            vec3_editor(ui, "Direction", &mut light.direction, 0.05, None);
            color_editor(ui, &mut light.color);
            ui.horizontal(|ui| {
                ui.label("Cutoff");
                ui.add(egui::DragValue::new(&mut light.cutoff).speed(0.5).range(0.0..=90.0));
                ui.label("Intensity");
                ui.add(egui::DragValue::new(&mut light.intensity).speed(0.05).range(0.0..=f32::MAX));
            });
        } else if let Some(id) = selection.game_camera() {
            let Some(camera) = self.game_camera_mut(id) else { return };
            ui.label(egui::RichText::new(camera.name.clone()).size(16.0).color(HEADING));
            vec3_editor(ui, "Position", &mut camera.position, 0.05, None);
            vec3_editor(ui, "Rotation", &mut camera.rotation, 1.0, None);
            ui.horizontal(|ui| {
                ui.label("FOV");
                ui.add(egui::DragValue::new(&mut camera.fov).speed(0.5).range(1.0..=179.0));
            });
        }

        if ui.button("Delete Selected").clicked() {
            self.delete_selected(kind);
        }
    }
}

fn hierarchy_ui(ui: &mut egui::Ui, others: &[Rc<RefCell<Renderer>>]) {
    if others.is_empty() {
        ui.label("No scene surfaces");
        return;
    }

    for renderer in others {
        // Already borrowed means it is the renderer drawing this overlay
        let Ok(mut renderer) = renderer.try_borrow_mut() else {
            continue;
        };
        let renderer = &mut *renderer;
        let selection = renderer.selection();

        egui::CollapsingHeader::new(renderer.label().to_string())
            .default_open(true)
            .show(ui, |ui| {
                let shapes: Vec<_> = renderer.shapes().iter().map(|s| (s.id(), s.label())).collect();
                for (id, label) in shapes {
                    if ui.selectable_label(selection.is(id), label).clicked() {
                        renderer.select_shape(id);
                    }
                }
                let lights: Vec<_> = renderer
                    .lights()
                    .iter()
                    .map(|l| (l.id(), format!("Spotlight {}", l.name)))
                    .collect();
                for (id, label) in lights {
                    if ui.selectable_label(selection.is(id), label).clicked() {
                        renderer.select_light(id);
                    }
                }
                let cameras: Vec<_> = renderer
                    .game_cameras()
                    .iter()
                    .map(|c| (c.id(), format!("Game Camera {}", c.name)))
                    .collect();
                for (id, label) in cameras {
                    if ui.selectable_label(selection.is(id), label).clicked() {
                        renderer.select_game_camera(id);
                    }
                }

                if let Some(kind) = selection.kind() {
                    if ui.button("Delete Selected").clicked() {
                        renderer.delete_selected(kind);
                    }
                }
            });
    }
}

fn camera_editor_ui(ui: &mut egui::Ui, camera: &mut Camera) {
    egui::CollapsingHeader::new("Camera").show(ui, |ui| {
        vec3_editor(ui, "Position", &mut camera.position, 0.05, None);
        vec3_editor(ui, "Rotation", &mut camera.rotation, 1.0, None);
        ui.horizontal(|ui| {
            ui.label("FOV");
            ui.add(egui::DragValue::new(&mut camera.fov).speed(0.5).range(1.0..=179.0));
        });
        ui.monospace(format!("Aspect: {:.3}", camera.aspect));
    });
}

fn vec3_editor(ui: &mut egui::Ui, label: &str, value: &mut Vec3, speed: f64, min: Option<f32>) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for component in [&mut value.x, &mut value.y, &mut value.z] {
            let mut drag = egui::DragValue::new(component).speed(speed);
            if let Some(min) = min {
                drag = drag.range(min..=f32::MAX);
            }
            changed |= ui.add(drag).changed();
        }
    });
    changed
}

fn color_editor(ui: &mut egui::Ui, color: &mut Vec4) -> bool {
    let mut rgba = color.to_array();
    let changed = ui
        .horizontal(|ui| {
            ui.label("Color");
            ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed()
        })
        .inner;
    if changed {
        *color = Vec4::from_array(rgba);
    }
    changed
}

/// Typed name, or a numbered default when the field is blank. Clears the field.
fn take_name(field: &mut String, prefix: &str, count: usize) -> String {
    let name = field.trim().to_string();
    field.clear();
    if name.is_empty() {
        format!("{prefix} {}", count + 1)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_get_numbered() {
        let mut field = String::from("  ");
        assert_eq!(take_name(&mut field, "Light", 2), "Light 3");

        let mut field = String::from("key");
        assert_eq!(take_name(&mut field, "Light", 0), "key");
        assert!(field.is_empty());
    }

    #[test]
    fn every_choice_has_a_document_name() {
        for choice in ShapeChoice::ALL {
            assert!(ShapeKind::from_document(choice.label(), Some("x.obj")).is_ok());
        }
    }
}
