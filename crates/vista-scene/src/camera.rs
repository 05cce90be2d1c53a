//! Perspective camera and orbit controls
//!
//! The orbit controller is the render surface's input side: it moves the
//! camera directly and reports every change as a `ControlsChanged` message,
//! including the change caused by applying a programmatic write. The viewer's
//! update guard decides which of those reports are genuine user edits.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::DVec3;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use vista_core::spherical::position_from_spherical;
use vista_core::{CameraPose, DirectorMode, SurfaceChange};

use crate::types::{pose_transform, to_vec3, PageGeometry, Viewer};

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Camera position/target reported by the orbit controller
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ControlsChanged {
    pub position: DVec3,
    pub target: DVec3,
}

/// Orbit controller state
#[derive(Debug, Clone, Resource)]
pub struct OrbitControls {
    pub distance: f32,
    /// Wheel and pinch zoom glide towards this distance
    pub target_distance: f32,
    /// Radians around +Y, zero looking down -Z
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        let mut controls = Self {
            distance: 0.0,
            target_distance: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            target: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.5,
            smooth_factor: 0.15,
            min_distance: 1.0,
            max_distance: 200.0,
        };
        controls.sync_to(&CameraPose::default());
        controls
    }
}

impl OrbitControls {
    /// Re-seat the controller on `pose` without reporting a change
    pub fn sync_to(&mut self, pose: &CameraPose) {
        self.distance = pose.zoom() as f32;
        self.target_distance = self.distance;
        self.azimuth = pose.azimuth().to_radians() as f32;
        self.elevation = pose.elevation() as f32;
        self.target = to_vec3(pose.target);
    }

    /// Camera position implied by the spherical state
    pub fn position(&self) -> Vec3 {
        let position = position_from_spherical(
            self.target.as_dvec3(),
            self.distance as f64,
            (self.azimuth as f64).to_degrees(),
            self.elevation as f64,
        );
        to_vec3(position)
    }

    fn zoom_by(&mut self, factor: f32) {
        self.target_distance = (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }
}

/// Plugin for the camera and orbit controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitControls>()
            .add_message::<ControlsChanged>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (advance_viewer, orbit_input, forward_controls_changes, apply_camera_writes).chain(),
            );
    }
}

fn spawn_camera(mut commands: Commands, viewer: Res<Viewer>, mut controls: ResMut<OrbitControls>) {
    let pose = *viewer.pose();
    controls.sync_to(&pose);

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: (pose.fov as f32).to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        pose_transform(&pose),
        MainCamera,
    ));
}

/// Run viewer timers and, while the page owns the camera, turn scroll into poses
fn advance_viewer(
    time: Res<Time>,
    page: Res<PageGeometry>,
    mut viewer: ResMut<Viewer>,
    mut seen_layout: Local<u64>,
) {
    let now = time.elapsed();

    if page.layout_generation != *seen_layout {
        *seen_layout = page.layout_generation;
        viewer.refresh_layout(now);
    }

    viewer.poll(now, &*page);

    if viewer.mode() == DirectorMode::Directed {
        viewer.update_scroll(page.scroll_y, time.delta_secs_f64());
    }
}

fn orbit_input(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut controls: ResMut<OrbitControls>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    viewer: Res<Viewer>,
    mut contexts: EguiContexts,
    mut changes: MessageWriter<ControlsChanged>,
) {
    // Check if egui wants the mouse - if so, don't process camera controls
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // The page scroll owns the camera; drain input so nothing replays later
    if viewer.mode() == DirectorMode::Directed || egui_wants_pointer {
        mouse_wheel.clear();
        return;
    }

    let mut moved = false;

    // Orbit with left mouse drag
    if mouse_button.pressed(MouseButton::Left) && total_motion != Vec2::ZERO {
        controls.azimuth -= total_motion.x * controls.sensitivity;
        controls.elevation = (controls.elevation + total_motion.y * controls.sensitivity).clamp(-1.5, 1.5);
        moved = true;
    }

    // Pan with right mouse drag in the camera plane
    if mouse_button.pressed(MouseButton::Right) && total_motion != Vec2::ZERO {
        if let Ok(transform) = camera_query.single() {
            let pan_speed = controls.distance * 0.002;
            let offset = (transform.right() * -total_motion.x + transform.up() * total_motion.y) * pan_speed;
            controls.target += offset;
            moved = true;
        }
    }

    for scroll in mouse_wheel.read() {
        let lines = match scroll.unit {
            MouseScrollUnit::Line => scroll.y,
            MouseScrollUnit::Pixel => scroll.y / 100.0,
        };
        let factor = 1.0 - lines * controls.zoom_speed * 0.2;
        controls.zoom_by(factor.max(0.1));
    }

    // Touch orbit
    if touch_input.iter().count() == 1 {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                controls.azimuth -= delta.x * controls.sensitivity;
                controls.elevation = (controls.elevation + delta.y * controls.sensitivity).clamp(-1.5, 1.5);
                moved = true;
            }
        }
    }

    // Pinch to zoom
    if touch_input.iter().count() == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            controls.zoom_by(prev_dist / curr_dist.max(1.0));
        }
    }

    // Smooth zoom
    let dt = time.delta_secs();
    if (controls.target_distance - controls.distance).abs() > 1e-4 {
        let lerp_factor = 1.0 - (-controls.smooth_factor * 60.0 * dt).exp();
        controls.distance += (controls.target_distance - controls.distance) * lerp_factor;
        moved = true;
    }

    if !moved {
        return;
    }

    let position = controls.position();
    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = position;
        transform.look_at(controls.target, Vec3::Y);
    }
    changes.write(ControlsChanged {
        position: position.as_dvec3(),
        target: controls.target.as_dvec3(),
    });
}

fn forward_controls_changes(mut changes: MessageReader<ControlsChanged>, mut viewer: ResMut<Viewer>) {
    for change in changes.read() {
        if let SurfaceChange::Accepted { position, target } =
            viewer.on_controls_change(change.position, change.target)
        {
            tracing::trace!(?position, ?target, "Camera moved by user");
        }
    }
}

/// Apply queued programmatic writes to the camera and re-seat the controller
fn apply_camera_writes(
    time: Res<Time>,
    mut viewer: ResMut<Viewer>,
    mut controls: ResMut<OrbitControls>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
    mut changes: MessageWriter<ControlsChanged>,
) {
    let Some(pose) = viewer.take_write(time.elapsed()) else {
        return;
    };
    let Ok((mut transform, mut projection)) = camera_query.single_mut() else {
        return;
    };

    *transform = pose_transform(&pose);
    if let Projection::Perspective(perspective) = &mut *projection {
        perspective.fov = (pose.fov as f32).to_radians();
    }
    controls.sync_to(&pose);

    // The controller reports the move like any other; the guard drops it
    changes.write(ControlsChanged {
        position: pose.position,
        target: pose.target,
    });
}
