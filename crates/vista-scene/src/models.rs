//! Building model loading and placement

use std::time::Duration;

use bevy::asset::LoadState;
use bevy::prelude::*;
use vista_core::ScenePlacement;

use crate::types::{to_vec3, Viewer};

/// Loading overlay stays up this long after the last asset resolves
pub const OVERLAY_EXIT_DELAY: Duration = Duration::from_millis(200);

/// Asset path of the building model
#[derive(Debug, Clone, Resource)]
pub struct ModelSettings {
    pub path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: "Outer.glb".to_string(),
        }
    }
}

/// Marker component for the building root entity
#[derive(Component)]
pub struct BuildingModel;

/// The building glTF while it is still loading
#[derive(Resource, Default)]
pub struct PendingModel {
    pub handle: Option<Handle<Gltf>>,
}

/// Count of assets still loading, driving the page's loading overlay
#[derive(Debug, Clone, Default, Resource)]
pub struct LoadingProgress {
    pub pending: usize,
    pub failed: usize,
    /// When the pending count last dropped to zero
    pub finished_at: Option<Duration>,
}

impl LoadingProgress {
    pub fn is_active(&self) -> bool {
        self.pending > 0
    }

    pub fn begin(&mut self) {
        self.pending += 1;
        self.finished_at = None;
    }

    pub fn finish(&mut self, now: Duration, failed: bool) {
        self.pending = self.pending.saturating_sub(1);
        if failed {
            self.failed += 1;
        }
        if self.pending == 0 {
            self.finished_at = Some(now);
        }
    }

    /// Whether the overlay should still cover the page at `now`
    pub fn overlay_visible(&self, now: Duration) -> bool {
        if self.is_active() {
            return true;
        }
        match self.finished_at {
            Some(finished) => now < finished + OVERLAY_EXIT_DELAY,
            None => true,
        }
    }
}

pub fn placement_transform(placement: &ScenePlacement) -> Transform {
    let rotation = to_vec3(placement.rotation);
    Transform {
        translation: to_vec3(placement.position),
        rotation: Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
        scale: to_vec3(placement.scale),
    }
}

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelSettings>()
            .init_resource::<PendingModel>()
            .init_resource::<LoadingProgress>()
            .add_systems(Startup, spawn_building)
            .add_systems(Update, (load_building, apply_placement));
    }
}

fn spawn_building(
    mut commands: Commands,
    settings: Res<ModelSettings>,
    asset_server: Res<AssetServer>,
    viewer: Res<Viewer>,
    mut pending: ResMut<PendingModel>,
    mut progress: ResMut<LoadingProgress>,
) {
    tracing::info!(path = %settings.path, "Loading building model");
    pending.handle = Some(asset_server.load(settings.path.clone()));
    progress.begin();

    // Lights and ground render while the model is still loading
    commands.spawn((
        placement_transform(&viewer.lighting().placement),
        Visibility::default(),
        BuildingModel,
    ));
}

/// Attach the model's scene once the glTF resolves
fn load_building(
    mut commands: Commands,
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    settings: Res<ModelSettings>,
    mut pending: ResMut<PendingModel>,
    mut progress: ResMut<LoadingProgress>,
    building: Query<Entity, With<BuildingModel>>,
) {
    let Some(handle) = pending.handle.as_ref() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets
                .get(handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match (scene, building.single()) {
                (Some(scene), Ok(entity)) => {
                    tracing::info!(path = %settings.path, "Building model loaded");
                    commands.entity(entity).insert(SceneRoot(scene));
                    progress.finish(time.elapsed(), false);
                }
                (None, _) => {
                    tracing::error!(path = %settings.path, "Building model has no scenes");
                    progress.finish(time.elapsed(), true);
                }
                (Some(_), Err(_)) => {
                    tracing::error!("Building root entity missing");
                    progress.finish(time.elapsed(), true);
                }
            }
            pending.handle = None;
        }
        Some(LoadState::Failed(err)) => {
            tracing::error!(path = %settings.path, error = %err, "Failed to load building model");
            progress.finish(time.elapsed(), true);
            pending.handle = None;
        }
        _ => {
            // Still loading
        }
    }
}

fn apply_placement(
    viewer: Res<Viewer>,
    mut building: Query<&mut Transform, With<BuildingModel>>,
    mut applied: Local<Option<u64>>,
) {
    let revision = viewer.lighting().revision();
    if *applied == Some(revision) {
        return;
    }
    if let Ok(mut transform) = building.single_mut() {
        *transform = placement_transform(&viewer.lighting().placement);
        *applied = Some(revision);
    }
}
