//! Viewer state: the single owner of the live camera pose
//!
//! Every camera or lighting mutation goes through `ViewerState`. Programmatic
//! camera writes are queued as a pending pose; the render layer takes the
//! pending pose, applies it to the scene, and the guard stays closed until the
//! settle delay has elapsed so the controller's echo of that write is ignored.

use std::time::Duration;

use glam::DVec3;
use thiserror::Error;

use crate::config::{ConfigError, ViewerConfig};
use crate::director::{DirectorMode, ScrollDirector};
use crate::guard::{InteractionMode, SurfaceChange, UpdateGuard};
use crate::lighting::{EnvironmentPreset, LightingEdit, LightingStore, ScenePlacement};
use crate::pose::CameraPose;
use crate::presets::{PresetError, SectionPresets};
use crate::scroll::{SmoothScroll, SmoothScrollConfig};
use crate::timeline::LandmarkLayout;

#[derive(Error, Debug, PartialEq)]
pub enum CameraError {
    #[error("Camera is driven by page scroll")]
    Directed,

    #[error(transparent)]
    Preset(#[from] PresetError),
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    pose: CameraPose,
    guard: UpdateGuard,
    sections: SectionPresets,
    store: LightingStore,
    director: ScrollDirector,
    scroll: SmoothScroll,
    smooth_scroll: SmoothScrollConfig,
    pending_write: Option<CameraPose>,
    selected_section: usize,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            guard: UpdateGuard::new(&config.camera),
            pose: config.camera,
            sections: config.sections,
            store: LightingStore::new(config.lighting, config.shadow, config.placement),
            director: ScrollDirector::new(config.transitions),
            scroll: SmoothScroll::new(config.smooth_scroll, 0.0),
            smooth_scroll: config.smooth_scroll,
            pending_write: None,
            selected_section: 0,
        }
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn zoom(&self) -> f64 {
        self.pose.zoom()
    }

    pub fn azimuth(&self) -> f64 {
        self.pose.azimuth()
    }

    pub fn sections(&self) -> &SectionPresets {
        &self.sections
    }

    /// Section last loaded or saved through the panel
    pub fn selected_section(&self) -> usize {
        self.selected_section
    }

    pub fn lighting(&self) -> &LightingStore {
        &self.store
    }

    pub fn director(&self) -> &ScrollDirector {
        &self.director
    }

    pub fn mode(&self) -> DirectorMode {
        self.director.mode()
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.guard.mode()
    }

    /// Smoothed scroll offset fed to the director
    pub fn scroll_offset(&self) -> f64 {
        self.scroll.current()
    }

    /// True while a programmatic write is waiting to be applied
    pub fn has_pending_write(&self) -> bool {
        self.pending_write.is_some()
    }

    fn request_write(&mut self, pose: CameraPose) {
        self.guard.begin_write();
        self.pose = pose;
        self.pending_write = Some(pose);
    }

    /// Take the queued programmatic write. The caller must apply it to the
    /// scene before the next controller report is forwarded.
    pub fn take_write(&mut self, now: Duration) -> Option<CameraPose> {
        let pose = self.pending_write.take()?;
        self.guard.finish_write(&pose, now);
        Some(pose)
    }

    /// Queue a camera write on behalf of the user. The scroll director is the
    /// only writer while directed, so the request is refused then.
    fn user_write(&mut self, pose: CameraPose) -> Result<(), CameraError> {
        if self.director.mode() == DirectorMode::Directed {
            tracing::debug!("Camera write refused while scroll-driven");
            return Err(CameraError::Directed);
        }
        self.request_write(pose);
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), CameraError> {
        self.user_write(self.pose.with_zoom(zoom))
    }

    pub fn set_azimuth(&mut self, azimuth: f64) -> Result<(), CameraError> {
        self.user_write(self.pose.with_azimuth(azimuth))
    }

    pub fn set_position(&mut self, position: DVec3) -> Result<(), CameraError> {
        self.user_write(CameraPose { position, ..self.pose })
    }

    pub fn set_target(&mut self, target: DVec3) -> Result<(), CameraError> {
        self.user_write(CameraPose { target, ..self.pose })
    }

    pub fn set_fov(&mut self, fov: f64) -> Result<(), CameraError> {
        self.user_write(CameraPose { fov, ..self.pose })
    }

    /// Move the camera to the pose stored for `index`
    pub fn load_section(&mut self, index: usize) -> Result<(), CameraError> {
        let pose = self.sections.load(index)?;
        self.user_write(pose)?;
        self.selected_section = index;
        tracing::debug!(section = index, "Loaded section camera");
        Ok(())
    }

    /// Store the live pose as the preset for `index`
    pub fn save_section(&mut self, index: usize) -> Result<(), PresetError> {
        self.sections.save(index, &self.pose)?;
        self.selected_section = index;
        tracing::info!(section = index, "Saved section camera");
        Ok(())
    }

    /// Forward a change report from the orbit controller.
    ///
    /// While the scroll director owns the camera every report is treated as
    /// an echo.
    pub fn on_controls_change(&mut self, position: DVec3, target: DVec3) -> SurfaceChange {
        if self.director.mode() == DirectorMode::Directed {
            return SurfaceChange::Suppressed;
        }
        let change = self.guard.filter_change(position, target);
        if let SurfaceChange::Accepted { position, target } = change {
            self.pose.position = position;
            self.pose.target = target;
        }
        change
    }

    pub fn apply_lighting(&mut self, edit: LightingEdit) {
        self.store.apply(edit);
    }

    /// Advance timers: releases the guard and registers scroll tracks when due
    pub fn poll(&mut self, now: Duration, layout: &dyn LandmarkLayout) {
        if self.guard.poll(now) {
            tracing::trace!("Update guard released");
        }
        if self.director.poll(now, layout) {
            tracing::info!(tracks = self.director.tracks().len(), "Scroll camera active");
        }
    }

    /// Feed the raw page scroll offset, advance smoothing by `dt` seconds, and
    /// queue the director's pose for that offset. Returns the queued pose.
    pub fn update_scroll(&mut self, raw_offset: f64, dt: f64) -> Option<CameraPose> {
        self.scroll.scroll_to(raw_offset);
        let offset = self.scroll.advance(dt);
        let pose = self.director.sample(offset)?;
        self.request_write(pose);
        Some(pose)
    }

    pub fn enter_directed(&mut self, now: Duration) {
        self.director.enter_directed(now);
    }

    pub fn enter_interactive(&mut self) {
        self.director.enter_interactive();
    }

    /// Page reflowed; landmarks must be measured again
    pub fn refresh_layout(&mut self, now: Duration) {
        self.director.refresh(now);
    }

    /// Viewer torn down: drop every timer, track and queued write
    pub fn unmount(&mut self) {
        self.director.unmount();
        self.guard.cancel();
        self.pending_write = None;
    }

    /// Warm low sun with soft shadows. Returns false when the camera part was
    /// skipped because the page scroll owns the camera.
    pub fn apply_sunset_preset(&mut self) -> bool {
        let mut lighting = self.store.lighting.clone();
        lighting.ambient_intensity = 0.3;
        lighting.hemi_intensity = 0.7;
        lighting.directional_intensity = 1.5;
        lighting.fill_intensity = 0.2;
        lighting.directional_pos = DVec3::new(5.0, 10.0, -5.0);
        lighting.directional_target = DVec3::ZERO;
        lighting.env_value = EnvironmentPreset::Sunset;
        lighting.env_intensity = 1.2;

        let mut shadow = self.store.shadow.clone();
        shadow.enabled = true;
        shadow.softness = 12.0;
        shadow.radius = 12.0;
        shadow.bias = -0.0002;
        shadow.normal_bias = 0.05;

        let placement = self.store.placement.clone();
        self.store.replace(lighting, shadow, placement);
        self.set_fov(60.0).is_ok()
    }

    /// Neutral studio lighting and the overview camera. Returns false when
    /// the camera was left to the scroll director.
    pub fn reset_all(&mut self) -> bool {
        let mut lighting = self.store.lighting.clone();
        lighting.ambient_intensity = 0.3;
        lighting.hemi_intensity = 0.3;
        lighting.directional_intensity = 0.7;
        lighting.fill_intensity = 0.2;
        lighting.directional_pos = DVec3::splat(10.0);
        lighting.directional_target = DVec3::ZERO;
        lighting.env_intensity = 0.6;

        let mut shadow = self.store.shadow.clone();
        shadow.enabled = true;
        shadow.softness = 8.0;
        shadow.radius = 8.0;
        shadow.bias = -0.0001;
        shadow.normal_bias = 0.04;

        self.store.replace(lighting, shadow, ScenePlacement::default());
        self.user_write(CameraPose::new(DVec3::new(0.0, 2.0, 6.0), DVec3::ZERO, 50.0))
            .is_ok()
    }

    /// Everything tunable, as it stands now
    pub fn config(&self) -> ViewerConfig {
        ViewerConfig {
            lighting: self.store.lighting.clone(),
            shadow: self.store.shadow.clone(),
            placement: self.store.placement.clone(),
            camera: self.pose,
            sections: self.sections.clone(),
            transitions: self.director.transitions().to_vec(),
            smooth_scroll: self.smooth_scroll,
        }
    }

    /// Pretty JSON snapshot of every parameter
    pub fn export(&self) -> Result<String, ConfigError> {
        self.config().to_json_pretty()
    }

    /// Load a JSON export; on error nothing changes
    pub fn import(&mut self, json: &str, now: Duration) -> Result<(), ConfigError> {
        let config = ViewerConfig::from_json(json)?;
        self.apply_config(config, now);
        Ok(())
    }

    /// Replace every parameter; the camera moves through a programmatic write
    /// unless the scroll director owns it. Returns whether the camera moved.
    pub fn apply_config(&mut self, config: ViewerConfig, now: Duration) -> bool {
        self.store.replace(config.lighting, config.shadow, config.placement);
        self.sections = config.sections;
        self.director.set_transitions(config.transitions, now);
        if config.smooth_scroll != self.smooth_scroll {
            self.smooth_scroll = config.smooth_scroll;
            self.scroll = SmoothScroll::new(config.smooth_scroll, self.scroll.current());
        }
        self.user_write(config.camera).is_ok()
    }
}
