//! egui widgets shared by the viewer front ends

use bevy::math::DVec3;
use bevy_egui::egui;
use std::ops::RangeInclusive;
use vista_core::{Rgb, ViewerState, SECTION_COUNT};

/// Read-only camera readout shown in the corner of the viewport
pub fn render_camera_hud(ui: &mut egui::Ui, viewer: &ViewerState) {
    let pose = viewer.pose();
    let mono = |text: String| egui::RichText::new(text).monospace().size(11.0);

    ui.label(mono(format!(
        "Camera Pos: {:.2}, {:.2}, {:.2}",
        pose.position.x, pose.position.y, pose.position.z
    )));
    ui.label(mono(format!(
        "Target: {:.2}, {:.2}, {:.2}",
        pose.target.x, pose.target.y, pose.target.z
    )));
    ui.label(mono(format!("Zoom: {:.2}", viewer.zoom())));
    ui.label(mono(format!("Rotate: {:.1}°", viewer.azimuth())));
    ui.label(mono(format!("FOV: {:.0}°", pose.fov)));
    ui.label(mono(format!(
        "Section {}/{}",
        viewer.selected_section() + 1,
        SECTION_COUNT
    )));
}

/// Labelled slider; returns true when the value was dragged.
///
/// Values outside the range are shown pinned but only clamped once edited,
/// so a camera zoomed past the slider's end is not pulled back.
pub fn slider(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f64,
    range: RangeInclusive<f64>,
    step: f64,
) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .step_by(step)
            .clamping(egui::SliderClamping::Edits)
            .text(label),
    )
    .changed()
}

/// X/Y/Z drag fields on one row
pub fn vec3_editor(ui: &mut egui::Ui, label: &str, value: &mut DVec3, speed: f64) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for (axis, component) in [("X", &mut value.x), ("Y", &mut value.y), ("Z", &mut value.z)] {
            ui.label(axis);
            changed |= ui
                .add(egui::DragValue::new(component).speed(speed).max_decimals(3))
                .changed();
        }
    });
    changed
}

pub fn color_editor(ui: &mut egui::Ui, label: &str, color: &mut Rgb) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let changed = ui.color_edit_button_srgb(&mut color.0).changed();
        ui.monospace(color.to_string());
        changed
    })
    .inner
}

/// Combo box over a fixed list of options
pub fn choice<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    current: &mut T,
    options: &[T],
    name: impl Fn(T) -> String,
) -> bool {
    let mut changed = false;
    egui::ComboBox::new(id, label)
        .selected_text(name(*current))
        .show_ui(ui, |ui| {
            for option in options {
                changed |= ui
                    .selectable_value(current, *option, name(*option))
                    .changed();
            }
        });
    changed
}
