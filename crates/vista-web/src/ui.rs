//! Debug panel and camera readout using bevy_egui

use std::time::Duration;

use bevy::math::DVec3;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use vista_core::{
    CameraError, DirectorMode, EnvironmentPreset, LightingEdit, ShadowQuality, ToneMapping, ViewerState,
    SECTION_COUNT,
};
use vista_scene::ui::{choice, color_editor, render_camera_hud, slider, vec3_editor};
use vista_scene::Viewer;

const SHADOW_RESOLUTIONS: [u32; 4] = [512, 1024, 2048, 4096];

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugPanel>()
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

#[derive(Debug, Clone, Resource)]
pub struct DebugPanel {
    pub visible: bool,
    /// Production pages never show the panel or its toggle
    pub locked: bool,
    /// Section picked in the panel's section list
    pub section: usize,
    /// Result of the last quick action
    pub status: Option<String>,
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self {
            visible: true,
            locked: false,
            section: 0,
            status: None,
        }
    }
}

impl DebugPanel {
    /// Fixed-config viewer with no debug UI
    pub fn production() -> Self {
        Self {
            visible: false,
            locked: true,
            ..default()
        }
    }
}

const SCROLL_OWNS_CAMERA: &str = "Camera follows page scroll";

/// Something the panel asked the viewer to do
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    CopyAll,
    SunsetPreset,
    ResetAll,
    LoadSection(usize),
    SaveSection(usize),
    SetDirected(bool),
    Zoom(f64),
    Rotate(f64),
    Fov(f64),
    Position(DVec3),
    Target(DVec3),
    Lighting(LightingEdit),
}

/// Apply a panel action. Returns the text to copy for `CopyAll`.
pub fn apply_action(
    viewer: &mut ViewerState,
    panel: &mut DebugPanel,
    action: PanelAction,
    now: Duration,
) -> Option<String> {
    match action {
        PanelAction::CopyAll => match viewer.export() {
            Ok(json) => {
                panel.status = Some("Copied all values".to_string());
                return Some(json);
            }
            Err(e) => {
                tracing::error!("Failed to export viewer config: {}", e);
                panel.status = Some(format!("Export failed: {}", e));
            }
        },
        PanelAction::SunsetPreset => note_camera_skipped(panel, viewer.apply_sunset_preset()),
        PanelAction::ResetAll => note_camera_skipped(panel, viewer.reset_all()),
        PanelAction::LoadSection(index) => match viewer.load_section(index) {
            Ok(()) => panel.section = index,
            Err(CameraError::Directed) => panel.status = Some(SCROLL_OWNS_CAMERA.to_string()),
            Err(e) => tracing::warn!("{}", e),
        },
        PanelAction::SaveSection(index) => match viewer.save_section(index) {
            Ok(()) => panel.status = Some(format!("Saved camera to Section {}", index + 1)),
            Err(e) => tracing::warn!("{}", e),
        },
        PanelAction::SetDirected(true) => viewer.enter_directed(now),
        PanelAction::SetDirected(false) => viewer.enter_interactive(),
        PanelAction::Zoom(zoom) => log_camera_edit(viewer.set_zoom(zoom)),
        PanelAction::Rotate(azimuth) => log_camera_edit(viewer.set_azimuth(azimuth)),
        PanelAction::Fov(fov) => log_camera_edit(viewer.set_fov(fov)),
        PanelAction::Position(position) => log_camera_edit(viewer.set_position(position)),
        PanelAction::Target(target) => log_camera_edit(viewer.set_target(target)),
        PanelAction::Lighting(edit) => viewer.apply_lighting(edit),
    }
    None
}

fn note_camera_skipped(panel: &mut DebugPanel, camera_moved: bool) {
    panel.status = (!camera_moved)
        .then(|| format!("Lighting updated; {}", SCROLL_OWNS_CAMERA.to_lowercase()));
}

fn log_camera_edit(result: Result<(), CameraError>) {
    if let Err(e) = result {
        tracing::debug!("Camera edit dropped: {}", e);
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    time: Res<Time>,
    mut viewer: ResMut<Viewer>,
    mut panel: ResMut<DebugPanel>,
) {
    // Get the egui context - early return if not available
    let Ok(ctx) = contexts.ctx_mut() else { return };

    if panel.locked {
        return;
    }

    egui::Area::new(egui::Id::new("debug_toggle"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(20.0, 20.0))
        .show(ctx, |ui| {
            let label = if panel.visible { "Hide Debug" } else { "Show Debug" };
            if ui.button(label).clicked() {
                panel.visible = !panel.visible;
            }
        });

    egui::Area::new(egui::Id::new("camera_hud"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(20.0, -20.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                render_camera_hud(ui, &viewer);
            });
        });

    if !panel.visible {
        return;
    }

    let mut actions = Vec::new();
    egui::SidePanel::right("debug_panel")
        .default_width(320.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading("Debug Menu"));
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                debug_panel(ui, &viewer, &panel, &mut actions);
            });
        });

    let now = time.elapsed();
    for action in actions {
        if let Some(text) = apply_action(&mut viewer, &mut panel, action, now) {
            ctx.copy_text(text);
        }
    }
}

fn debug_panel(ui: &mut egui::Ui, viewer: &ViewerState, panel: &DebugPanel, actions: &mut Vec<PanelAction>) {
    let mut lighting = viewer.lighting().lighting.clone();
    let mut shadow = viewer.lighting().shadow.clone();
    let mut placement = viewer.lighting().placement.clone();
    let mut lighting_edits = Vec::new();
    let mut push = |e: LightingEdit| lighting_edits.push(e);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Quick Actions").strong());
        ui.horizontal_wrapped(|ui| {
            if ui.button("📋 Copy All").clicked() {
                actions.push(PanelAction::CopyAll);
            }
            if ui.button("🌅 Sunset Preset").clicked() {
                actions.push(PanelAction::SunsetPreset);
            }
            if ui.button("🔄 Reset All").clicked() {
                actions.push(PanelAction::ResetAll);
            }
        });
        if let Some(status) = &panel.status {
            ui.small(status);
        }

        let mut directed = viewer.mode() == DirectorMode::Directed;
        if ui.checkbox(&mut directed, "Scroll-driven camera").changed() {
            actions.push(PanelAction::SetDirected(directed));
        }
    });

    let directed = viewer.mode() == DirectorMode::Directed;

    ui.add_enabled_ui(!directed, |ui| ui.group(|ui| {
        ui.label(egui::RichText::new("Sections").strong());
        let mut section = panel.section;
        if choice(
            ui,
            "section_select",
            "",
            &mut section,
            &(0..SECTION_COUNT).collect::<Vec<_>>(),
            |i| format!("Section {} - Camera Position", i + 1),
        ) {
            actions.push(PanelAction::LoadSection(section));
        }
        if ui
            .button(format!("Save Current to Section {}", panel.section + 1))
            .clicked()
        {
            actions.push(PanelAction::SaveSection(panel.section));
        }
    }));

    ui.group(|ui| {
        ui.label(egui::RichText::new("Lighting").strong());
        if slider(ui, "Ambient", &mut lighting.ambient_intensity, 0.0..=10.0, 0.01) {
            push(LightingEdit::AmbientIntensity(lighting.ambient_intensity));
        }
        if slider(ui, "Hemisphere", &mut lighting.hemi_intensity, 0.0..=5.0, 0.01) {
            push(LightingEdit::HemiIntensity(lighting.hemi_intensity));
        }
        if slider(ui, "Directional", &mut lighting.directional_intensity, 0.0..=20.0, 0.01) {
            push(LightingEdit::DirectionalIntensity(lighting.directional_intensity));
        }
        if slider(ui, "Fill", &mut lighting.fill_intensity, 0.0..=5.0, 0.01) {
            push(LightingEdit::FillIntensity(lighting.fill_intensity));
        }
        if slider(ui, "Rim", &mut lighting.rim_intensity, 0.0..=5.0, 0.01) {
            push(LightingEdit::RimIntensity(lighting.rim_intensity));
        }
        if slider(ui, "HDRI Intensity", &mut lighting.env_intensity, 0.0..=20.0, 0.01) {
            push(LightingEdit::EnvironmentIntensity(lighting.env_intensity));
        }
        if slider(ui, "Exposure", &mut lighting.exposure, 0.01..=5.0, 0.01) {
            push(LightingEdit::Exposure(lighting.exposure));
        }
        if choice(
            ui,
            "tone_mapping",
            "Tone Mapping",
            &mut lighting.tone_mapping,
            &ToneMapping::ALL,
            |t| t.label().to_string(),
        ) {
            push(LightingEdit::ToneMapping(lighting.tone_mapping));
        }

        ui.label("Directional Position");
        let mut pos = lighting.directional_pos;
        let mut moved = slider(ui, "X", &mut pos.x, -50.0..=50.0, 0.5);
        moved |= slider(ui, "Y", &mut pos.y, -50.0..=50.0, 0.5);
        moved |= slider(ui, "Z", &mut pos.z, -50.0..=50.0, 0.5);
        if moved {
            push(LightingEdit::DirectionalPosition(pos));
        }
        if vec3_editor(ui, "Target", &mut lighting.directional_target, 0.1) {
            push(LightingEdit::DirectionalTarget(lighting.directional_target));
        }

        if choice(
            ui,
            "environment",
            "Environment",
            &mut lighting.env_value,
            &EnvironmentPreset::ALL,
            |e| e.label().to_string(),
        ) {
            push(LightingEdit::Environment(lighting.env_value));
        }

        if color_editor(ui, "Ambient Color", &mut lighting.ambient_color) {
            push(LightingEdit::AmbientColor(lighting.ambient_color));
        }
        if color_editor(ui, "Directional Color", &mut lighting.directional_color) {
            push(LightingEdit::DirectionalColor(lighting.directional_color));
        }
    });

    ui.group(|ui| {
        ui.label(egui::RichText::new("Shadows").strong());
        if ui.checkbox(&mut shadow.enabled, "Enable Shadows").changed() {
            push(LightingEdit::ShadowsEnabled(shadow.enabled));
        }
        if choice(
            ui,
            "shadow_quality",
            "Quality",
            &mut shadow.quality,
            &ShadowQuality::ALL,
            |q| q.label().to_string(),
        ) {
            push(LightingEdit::ShadowQuality(shadow.quality));
        }
        if choice(
            ui,
            "shadow_resolution",
            "Resolution",
            &mut shadow.resolution,
            &SHADOW_RESOLUTIONS,
            |r| format!("{r}x{r}"),
        ) {
            push(LightingEdit::ShadowResolution(shadow.resolution));
        }
        if slider(ui, "Softness", &mut shadow.softness, 0.0..=20.0, 0.1) {
            push(LightingEdit::ShadowSoftness(shadow.softness));
        }
        if slider(ui, "Darkness", &mut shadow.darkness, 0.0..=1.0, 0.01) {
            push(LightingEdit::ShadowDarkness(shadow.darkness));
        }
        if slider(ui, "Radius", &mut shadow.radius, 0.0..=20.0, 1.0) {
            push(LightingEdit::ShadowRadius(shadow.radius));
        }
        if slider(ui, "Bias", &mut shadow.bias, -0.001..=0.001, 0.0001) {
            push(LightingEdit::ShadowBias(shadow.bias));
        }
        if slider(ui, "Normal Bias", &mut shadow.normal_bias, 0.0..=0.1, 0.01) {
            push(LightingEdit::ShadowNormalBias(shadow.normal_bias));
        }
    });

    ui.group(|ui| {
        ui.label(egui::RichText::new("Scene Layout").strong());
        if vec3_editor(ui, "Position", &mut placement.position, 0.1) {
            push(LightingEdit::BuildingPosition(placement.position));
        }
        if vec3_editor(ui, "Rotation", &mut placement.rotation, 0.01) {
            push(LightingEdit::BuildingRotation(placement.rotation));
        }
        if vec3_editor(ui, "Scale", &mut placement.scale, 0.1) {
            push(LightingEdit::BuildingScale(placement.scale));
        }
    });

    actions.extend(lighting_edits.into_iter().map(PanelAction::Lighting));

    // Camera widgets are disabled while the scroll director owns the camera
    ui.add_enabled_ui(!directed, |ui| {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Camera").strong());
            let pose = *viewer.pose();

            let mut fov = pose.fov;
            if slider(ui, "FOV °", &mut fov, 5.0..=120.0, 1.0) {
                actions.push(PanelAction::Fov(fov));
            }
            let mut zoom = viewer.zoom();
            if slider(ui, "Zoom", &mut zoom, 1.0..=50.0, 0.1) {
                actions.push(PanelAction::Zoom(zoom));
            }
            let mut rotate = viewer.azimuth();
            if slider(ui, "Rotate °", &mut rotate, -180.0..=180.0, 1.0) {
                actions.push(PanelAction::Rotate(rotate));
            }

            let mut position = pose.position;
            if vec3_editor(ui, "Position", &mut position, 0.1) {
                actions.push(PanelAction::Position(position));
            }
            let mut target = pose.target;
            if vec3_editor(ui, "Target", &mut target, 0.1) {
                actions.push(PanelAction::Target(target));
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::ViewerConfig;

    #[test]
    fn test_copy_all_returns_export() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();

        let copied = apply_action(&mut viewer, &mut panel, PanelAction::CopyAll, Duration::ZERO).unwrap();
        let config = ViewerConfig::from_json(&copied).unwrap();
        assert_eq!(config, viewer.config());
        assert!(panel.status.is_some());
    }

    #[test]
    fn test_section_actions() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();

        apply_action(&mut viewer, &mut panel, PanelAction::LoadSection(1), Duration::ZERO);
        assert_eq!(panel.section, 1);
        assert_eq!(viewer.pose().fov, 22.0);

        apply_action(&mut viewer, &mut panel, PanelAction::Fov(35.0), Duration::ZERO);
        apply_action(&mut viewer, &mut panel, PanelAction::SaveSection(1), Duration::ZERO);
        assert_eq!(viewer.sections().load(1).unwrap().fov, 35.0);
        assert_eq!(panel.status.as_deref(), Some("Saved camera to Section 2"));
    }

    #[test]
    fn test_out_of_range_section_is_ignored() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();
        let before = *viewer.pose();

        apply_action(&mut viewer, &mut panel, PanelAction::LoadSection(SECTION_COUNT), Duration::ZERO);
        assert_eq!(*viewer.pose(), before);
        assert_eq!(panel.section, 0);
    }

    #[test]
    fn test_camera_actions_defer_to_scroll() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();
        apply_action(&mut viewer, &mut panel, PanelAction::SetDirected(true), Duration::ZERO);
        let before = *viewer.pose();

        apply_action(&mut viewer, &mut panel, PanelAction::LoadSection(1), Duration::ZERO);
        assert_eq!(panel.section, 0);
        assert_eq!(panel.status.as_deref(), Some("Camera follows page scroll"));

        apply_action(&mut viewer, &mut panel, PanelAction::Fov(80.0), Duration::ZERO);
        apply_action(&mut viewer, &mut panel, PanelAction::ResetAll, Duration::ZERO);
        assert_eq!(*viewer.pose(), before);
        assert!(!viewer.has_pending_write());
        assert_eq!(
            panel.status.as_deref(),
            Some("Lighting updated; camera follows page scroll")
        );
    }

    #[test]
    fn test_production_panel_stays_hidden() {
        let panel = DebugPanel::production();
        assert!(!panel.visible);
        assert!(panel.locked);
        assert!(!DebugPanel::default().locked);
    }

    #[test]
    fn test_mode_toggle() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();

        apply_action(&mut viewer, &mut panel, PanelAction::SetDirected(true), Duration::ZERO);
        assert_eq!(viewer.mode(), DirectorMode::Directed);
        apply_action(&mut viewer, &mut panel, PanelAction::SetDirected(false), Duration::ZERO);
        assert_eq!(viewer.mode(), DirectorMode::Interactive);
    }

    #[test]
    fn test_lighting_edit_bumps_revision() {
        let mut viewer = ViewerState::default();
        let mut panel = DebugPanel::default();
        let revision = viewer.lighting().revision();

        apply_action(
            &mut viewer,
            &mut panel,
            PanelAction::Lighting(LightingEdit::Exposure(1.5)),
            Duration::ZERO,
        );
        assert_eq!(viewer.lighting().lighting.exposure, 1.5);
        assert!(viewer.lighting().revision() > revision);
    }
}
