//! Scene setup - light rig, ground plane and environment

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::light::{CascadeShadowConfigBuilder, DirectionalLightShadowMap, ShadowFilteringMethod};
use bevy::prelude::*;
use vista_core::{ResolvedLighting, ShadowFilter, ToneMapping};

use crate::camera::MainCamera;
use crate::types::{to_color, to_vec3, Viewer};

/// Ambient brightness per unit of ambient/hemisphere intensity
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 80.0;
/// Directional illuminance (lux) per unit of intensity
pub const DIRECTIONAL_LUX_PER_UNIT: f32 = 2_000.0;
/// Point light output (lumens) per unit of fill/rim intensity
pub const POINT_LUMENS_PER_UNIT: f32 = 100_000.0;
/// Environment map intensity per unit of environment intensity
pub const ENVIRONMENT_INTENSITY_PER_UNIT: f32 = 100.0;

const FILL_POSITION: Vec3 = Vec3::new(0.0, 10.0, 0.0);
const RIM_POSITION: Vec3 = Vec3::new(-10.0, 5.0, 10.0);
const RIM_RANGE: f32 = 40.0;
const GROUND_SIZE: f32 = 200.0;

/// Marker component for the key (sun) light
#[derive(Component)]
pub struct SunLight;

/// Marker component for the overhead fill light
#[derive(Component)]
pub struct FillLight;

/// Marker component for the edge highlight light
#[derive(Component)]
pub struct RimLight;

/// Marker component for the shadow-receiving ground
#[derive(Component)]
pub struct Ground;

/// Plugin for the light rig
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, apply_lighting);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(AmbientLight::default());
    commands.insert_resource(DirectionalLightShadowMap::default());

    commands.spawn((DirectionalLight::default(), Transform::default(), SunLight));

    commands.spawn((
        PointLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(FILL_POSITION),
        FillLight,
    ));

    commands.spawn((
        PointLight {
            range: RIM_RANGE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(RIM_POSITION),
        RimLight,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x77, 0x77, 0x77),
            metallic: 0.0,
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::default(),
        Ground,
    ));
}

pub fn tonemapping_for(mode: ToneMapping) -> Tonemapping {
    match mode {
        ToneMapping::Aces => Tonemapping::AcesFitted,
        ToneMapping::Reinhard => Tonemapping::Reinhard,
        ToneMapping::Neutral => Tonemapping::TonyMcMapface,
        ToneMapping::Linear | ToneMapping::None => Tonemapping::None,
    }
}

pub fn filtering_for(filter: ShadowFilter) -> ShadowFilteringMethod {
    match filter {
        ShadowFilter::Basic => ShadowFilteringMethod::Hardware2x2,
        ShadowFilter::Pcf => ShadowFilteringMethod::Gaussian,
        ShadowFilter::PcfSoft => ShadowFilteringMethod::Temporal,
    }
}

/// Light outputs in Bevy units; exposure scales every light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOutputs {
    pub ambient_brightness: f32,
    pub directional_lux: f32,
    pub fill_lumens: f32,
    pub rim_lumens: f32,
    pub environment: f32,
}

impl LightOutputs {
    pub fn from_resolved(lighting: &ResolvedLighting) -> Self {
        let exposure = lighting.exposure as f32;
        Self {
            // Bevy has no hemisphere light; it folds into ambient
            ambient_brightness: (lighting.ambient_intensity + lighting.hemi_intensity) as f32
                * AMBIENT_BRIGHTNESS_PER_UNIT
                * exposure,
            directional_lux: lighting.directional_intensity as f32 * DIRECTIONAL_LUX_PER_UNIT * exposure,
            fill_lumens: lighting.fill_intensity as f32 * POINT_LUMENS_PER_UNIT * exposure,
            rim_lumens: lighting.rim_intensity as f32 * POINT_LUMENS_PER_UNIT * exposure,
            environment: lighting.env_intensity as f32 * ENVIRONMENT_INTENSITY_PER_UNIT * exposure,
        }
    }
}

/// Reapply the whole light rig whenever the parameter store changes
#[allow(clippy::too_many_arguments)]
fn apply_lighting(
    mut commands: Commands,
    viewer: Res<Viewer>,
    asset_server: Res<AssetServer>,
    mut ambient: ResMut<AmbientLight>,
    mut shadow_map: ResMut<DirectionalLightShadowMap>,
    mut sun: Query<(Entity, &mut DirectionalLight, &mut Transform), With<SunLight>>,
    mut fill: Query<&mut PointLight, (With<FillLight>, Without<RimLight>)>,
    mut rim: Query<&mut PointLight, (With<RimLight>, Without<FillLight>)>,
    cameras: Query<Entity, With<MainCamera>>,
    mut applied: Local<Option<u64>>,
) {
    let revision = viewer.lighting().revision();
    // The camera spawns in the same Startup pass; wait until it exists
    let Ok(camera) = cameras.single() else {
        return;
    };
    if *applied == Some(revision) {
        return;
    }
    *applied = Some(revision);

    let lighting = viewer.lighting().resolve();
    let outputs = LightOutputs::from_resolved(&lighting);

    ambient.color = to_color(lighting.ambient_color);
    ambient.brightness = outputs.ambient_brightness;

    if let Ok((entity, mut light, mut transform)) = sun.single_mut() {
        light.color = to_color(lighting.directional_color);
        light.illuminance = outputs.directional_lux;
        light.shadows_enabled = lighting.shadows.is_some();
        if let Some(shadows) = &lighting.shadows {
            light.shadow_depth_bias = shadows.bias as f32;
            light.shadow_normal_bias = shadows.normal_bias as f32;
            // One cascade covering the building, like a fixed orthographic shadow camera
            commands.entity(entity).insert(
                CascadeShadowConfigBuilder {
                    num_cascades: 1,
                    minimum_distance: 0.1,
                    maximum_distance: shadows.camera_far as f32,
                    ..default()
                }
                .build(),
            );
        }
        *transform = Transform::from_translation(to_vec3(lighting.directional_pos))
            .looking_at(to_vec3(lighting.directional_target), Vec3::Y);
    }

    if let Ok(mut light) = fill.single_mut() {
        light.intensity = outputs.fill_lumens;
    }
    if let Ok(mut light) = rim.single_mut() {
        light.intensity = outputs.rim_lumens;
    }

    let stem = lighting.environment.asset_stem();
    let mut camera_entity = commands.entity(camera);
    camera_entity.insert((
        tonemapping_for(lighting.tone_mapping),
        EnvironmentMapLight {
            diffuse_map: asset_server.load(format!("{stem}_diffuse.ktx2")),
            specular_map: asset_server.load(format!("{stem}_specular.ktx2")),
            intensity: outputs.environment,
            ..default()
        },
    ));

    if let Some(shadows) = &lighting.shadows {
        shadow_map.size = shadows.map_size as usize;
        camera_entity.insert(filtering_for(shadows.filter));
    }

    tracing::debug!(revision, environment = stem, "Applied lighting");
}
