//! Vista Scene - Bevy rendering surface for the building viewer
//!
//! This crate connects the engine-independent state in `vista-core` to a
//! Bevy world: the perspective camera and its orbit controls, the light rig,
//! the ground plane and the building model. Input is forwarded to the
//! `Viewer` resource and the resulting camera writes are applied back to
//! the scene.

pub mod camera;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the viewer scene
pub struct VistaScenePlugin;

impl Plugin for VistaScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewer>()
            .init_resource::<PageGeometry>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::LightingPlugin)
            .add_plugins(models::ModelsPlugin);
    }
}

// Re-export commonly used types
pub use camera::{ControlsChanged, MainCamera, OrbitControls};
pub use models::{BuildingModel, LoadingProgress};
pub use types::*;
