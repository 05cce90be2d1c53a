//! Light, shadow and placement parameters
//!
//! The store accepts every value as given; range limits live in the UI
//! controls. Each edit bumps a revision so the renderer can reapply the
//! resolved configuration in full.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half extent of the square directional shadow frustum, in world units
pub const SHADOW_CAMERA_EXTENT: f64 = 20.0;
/// Far plane of the directional shadow frustum
pub const SHADOW_CAMERA_FAR: f64 = 50.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Color must look like #rrggbb, got {0:?}")]
    Format(String),
}

/// sRGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Channels as 0.0..=1.0 floats
    pub fn to_f32(self) -> [f32; 3] {
        self.0.map(|c| c as f32 / 255.0)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError::Format(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// HDR → display range mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneMapping {
    #[serde(rename = "ACES")]
    Aces,
    Reinhard,
    Linear,
    Neutral,
    None,
}

impl ToneMapping {
    pub const ALL: [ToneMapping; 5] = [
        ToneMapping::Aces,
        ToneMapping::Reinhard,
        ToneMapping::Linear,
        ToneMapping::Neutral,
        ToneMapping::None,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToneMapping::Aces => "ACES",
            ToneMapping::Reinhard => "Reinhard",
            ToneMapping::Linear => "Linear",
            ToneMapping::Neutral => "Neutral",
            ToneMapping::None => "None",
        }
    }
}

/// Image-based lighting preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    Sunset,
    Dawn,
    Night,
    Warehouse,
    Park,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 5] = [
        EnvironmentPreset::Sunset,
        EnvironmentPreset::Dawn,
        EnvironmentPreset::Night,
        EnvironmentPreset::Warehouse,
        EnvironmentPreset::Park,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EnvironmentPreset::Sunset => "Sunset",
            EnvironmentPreset::Dawn => "Dawn",
            EnvironmentPreset::Night => "Night",
            EnvironmentPreset::Warehouse => "Warehouse",
            EnvironmentPreset::Park => "Park",
        }
    }

    /// Environment map asset stem, relative to the asset root
    pub fn asset_stem(self) -> &'static str {
        match self {
            EnvironmentPreset::Sunset => "environment/sunset",
            EnvironmentPreset::Dawn => "environment/dawn",
            EnvironmentPreset::Night => "environment/night",
            EnvironmentPreset::Warehouse => "environment/warehouse",
            EnvironmentPreset::Park => "environment/park",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowQuality {
    Low,
    Medium,
    High,
}

impl ShadowQuality {
    pub const ALL: [ShadowQuality; 3] = [ShadowQuality::Low, ShadowQuality::Medium, ShadowQuality::High];

    pub fn filter(self) -> ShadowFilter {
        match self {
            ShadowQuality::Low => ShadowFilter::Basic,
            ShadowQuality::Medium => ShadowFilter::Pcf,
            ShadowQuality::High => ShadowFilter::PcfSoft,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadowQuality::Low => "low",
            ShadowQuality::Medium => "medium",
            ShadowQuality::High => "high",
        }
    }
}

/// Shadow-map filtering algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowFilter {
    /// Single hardware comparison, hard edges
    Basic,
    /// Percentage-closer filtering
    Pcf,
    /// Percentage-closer filtering with a wider soft kernel
    PcfSoft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightingConfig {
    pub ambient_intensity: f64,
    pub ambient_color: Rgb,
    pub hemi_intensity: f64,
    pub directional_intensity: f64,
    pub directional_color: Rgb,
    pub directional_pos: DVec3,
    pub directional_target: DVec3,
    pub fill_intensity: f64,
    pub rim_intensity: f64,
    pub env_value: EnvironmentPreset,
    pub env_intensity: f64,
    pub tone_mapping: ToneMapping,
    pub exposure: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 5.72,
            ambient_color: Rgb::new(0xff, 0xdf, 0xd1),
            hemi_intensity: 0.43,
            directional_intensity: 20.0,
            directional_color: Rgb::new(0xff, 0xd4, 0xc2),
            directional_pos: DVec3::new(15.5, 16.0, 10.5),
            directional_target: DVec3::ZERO,
            fill_intensity: 0.05,
            rim_intensity: 0.0,
            env_value: EnvironmentPreset::Sunset,
            env_intensity: 10.14,
            tone_mapping: ToneMapping::Neutral,
            exposure: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowConfig {
    #[serde(rename = "shadowsEnabled")]
    pub enabled: bool,
    #[serde(rename = "shadowQuality")]
    pub quality: ShadowQuality,
    /// Shadow map edge length in texels
    #[serde(rename = "shadowResolution")]
    pub resolution: u32,
    #[serde(rename = "shadowSoftness")]
    pub softness: f64,
    #[serde(rename = "shadowRadius")]
    pub radius: f64,
    #[serde(rename = "shadowBias")]
    pub bias: f64,
    #[serde(rename = "shadowNormalBias")]
    pub normal_bias: f64,
    /// 0 leaves ambient/hemisphere light untouched, 1 removes it
    #[serde(rename = "shadowDarkness")]
    pub darkness: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: ShadowQuality::High,
            resolution: 2048,
            softness: 10.0,
            radius: 9.7,
            bias: -0.001,
            normal_bias: 0.1,
            darkness: 0.0,
        }
    }
}

/// Building transform in world space; rotation is Euler XYZ in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenePlacement {
    #[serde(rename = "buildingPos")]
    pub position: DVec3,
    #[serde(rename = "buildingRot")]
    pub rotation: DVec3,
    #[serde(rename = "buildingScale")]
    pub scale: DVec3,
}

impl Default for ScenePlacement {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

/// One parameter change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightingEdit {
    AmbientIntensity(f64),
    AmbientColor(Rgb),
    HemiIntensity(f64),
    DirectionalIntensity(f64),
    DirectionalColor(Rgb),
    DirectionalPosition(DVec3),
    DirectionalTarget(DVec3),
    FillIntensity(f64),
    RimIntensity(f64),
    Environment(EnvironmentPreset),
    EnvironmentIntensity(f64),
    ToneMapping(ToneMapping),
    Exposure(f64),
    ShadowsEnabled(bool),
    ShadowQuality(ShadowQuality),
    ShadowResolution(u32),
    /// Also sets the shadow radius, which the softness control drives
    ShadowSoftness(f64),
    ShadowRadius(f64),
    ShadowBias(f64),
    ShadowNormalBias(f64),
    ShadowDarkness(f64),
    BuildingPosition(DVec3),
    BuildingRotation(DVec3),
    BuildingScale(DVec3),
}

/// Renderer-facing settings derived from the store
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLighting {
    pub tone_mapping: ToneMapping,
    pub exposure: f64,
    pub ambient_color: Rgb,
    /// Ambient intensity after shadow darkness
    pub ambient_intensity: f64,
    /// Hemisphere intensity after shadow darkness
    pub hemi_intensity: f64,
    pub directional_intensity: f64,
    pub directional_color: Rgb,
    pub directional_pos: DVec3,
    pub directional_target: DVec3,
    pub fill_intensity: f64,
    pub rim_intensity: f64,
    pub environment: EnvironmentPreset,
    pub env_intensity: f64,
    pub shadows: Option<ResolvedShadows>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedShadows {
    pub filter: ShadowFilter,
    pub map_size: u32,
    pub radius: f64,
    pub bias: f64,
    pub normal_bias: f64,
    pub camera_extent: f64,
    pub camera_far: f64,
}

/// Mutable lighting record plus a change counter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightingStore {
    pub lighting: LightingConfig,
    pub shadow: ShadowConfig,
    pub placement: ScenePlacement,
    revision: u64,
}

impl LightingStore {
    pub fn new(lighting: LightingConfig, shadow: ShadowConfig, placement: ScenePlacement) -> Self {
        Self {
            lighting,
            shadow,
            placement,
            revision: 0,
        }
    }

    /// Increments on every edit; renderers compare it to know when to reapply
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn apply(&mut self, edit: LightingEdit) {
        let l = &mut self.lighting;
        let s = &mut self.shadow;
        let p = &mut self.placement;
        match edit {
            LightingEdit::AmbientIntensity(v) => l.ambient_intensity = v,
            LightingEdit::AmbientColor(c) => l.ambient_color = c,
            LightingEdit::HemiIntensity(v) => l.hemi_intensity = v,
            LightingEdit::DirectionalIntensity(v) => l.directional_intensity = v,
            LightingEdit::DirectionalColor(c) => l.directional_color = c,
            LightingEdit::DirectionalPosition(v) => l.directional_pos = v,
            LightingEdit::DirectionalTarget(v) => l.directional_target = v,
            LightingEdit::FillIntensity(v) => l.fill_intensity = v,
            LightingEdit::RimIntensity(v) => l.rim_intensity = v,
            LightingEdit::Environment(e) => l.env_value = e,
            LightingEdit::EnvironmentIntensity(v) => l.env_intensity = v,
            LightingEdit::ToneMapping(t) => l.tone_mapping = t,
            LightingEdit::Exposure(v) => l.exposure = v,
            LightingEdit::ShadowsEnabled(b) => s.enabled = b,
            LightingEdit::ShadowQuality(q) => s.quality = q,
            LightingEdit::ShadowResolution(r) => s.resolution = r,
            LightingEdit::ShadowSoftness(v) => {
                s.softness = v;
                s.radius = v;
            }
            LightingEdit::ShadowRadius(v) => s.radius = v,
            LightingEdit::ShadowBias(v) => s.bias = v,
            LightingEdit::ShadowNormalBias(v) => s.normal_bias = v,
            LightingEdit::ShadowDarkness(v) => s.darkness = v,
            LightingEdit::BuildingPosition(v) => p.position = v,
            LightingEdit::BuildingRotation(v) => p.rotation = v,
            LightingEdit::BuildingScale(v) => p.scale = v,
        }
        self.revision += 1;
    }

    /// Replace everything at once (presets, reset, import)
    pub fn replace(&mut self, lighting: LightingConfig, shadow: ShadowConfig, placement: ScenePlacement) {
        self.lighting = lighting;
        self.shadow = shadow;
        self.placement = placement;
        self.revision += 1;
    }

    /// Multiplier applied to ambient and hemisphere light
    pub fn ambient_scale(&self) -> f64 {
        1.0 - self.shadow.darkness
    }

    pub fn resolve(&self) -> ResolvedLighting {
        let l = &self.lighting;
        let s = &self.shadow;
        let shadows = s.enabled.then(|| ResolvedShadows {
            filter: s.quality.filter(),
            map_size: s.resolution,
            // softness drives the filter radius
            radius: s.softness,
            bias: s.bias,
            normal_bias: s.normal_bias,
            camera_extent: SHADOW_CAMERA_EXTENT,
            camera_far: SHADOW_CAMERA_FAR,
        });

        ResolvedLighting {
            tone_mapping: l.tone_mapping,
            exposure: l.exposure,
            ambient_color: l.ambient_color,
            ambient_intensity: l.ambient_intensity * self.ambient_scale(),
            hemi_intensity: l.hemi_intensity * self.ambient_scale(),
            directional_intensity: l.directional_intensity,
            directional_color: l.directional_color,
            directional_pos: l.directional_pos,
            directional_target: l.directional_target,
            fill_intensity: l.fill_intensity,
            rim_intensity: l.rim_intensity,
            environment: l.env_value,
            env_intensity: l.env_intensity,
            shadows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_color_parsing() {
        let color: Rgb = "#ffdfd1".parse().unwrap();
        assert_eq!(color, Rgb::new(0xff, 0xdf, 0xd1));
        assert_eq!(color.to_string(), "#ffdfd1");
        assert_eq!("#FFDFD1".parse::<Rgb>().unwrap(), color);

        assert!("ffdfd1".parse::<Rgb>().is_err());
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("#+f+f+f".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_darkness_scales_ambient_at_apply_time() {
        let mut store = LightingStore::default();
        assert_eq!(store.lighting.ambient_intensity, 5.72);
        assert_abs_diff_eq!(store.resolve().ambient_intensity, 5.72);

        store.apply(LightingEdit::ShadowDarkness(0.5));
        assert_abs_diff_eq!(store.resolve().ambient_intensity, 2.86);
        assert_abs_diff_eq!(store.resolve().hemi_intensity, 0.215);

        store.apply(LightingEdit::ShadowDarkness(1.0));
        assert_eq!(store.resolve().ambient_intensity, 0.0);
        assert_eq!(store.resolve().hemi_intensity, 0.0);

        // The stored value is never pre-scaled
        assert_eq!(store.lighting.ambient_intensity, 5.72);
        store.apply(LightingEdit::ShadowDarkness(0.0));
        assert_eq!(store.resolve().ambient_intensity, 5.72);
    }

    #[test]
    fn test_shadow_quality_selects_filter() {
        let mut store = LightingStore::default();
        let expected = [
            (ShadowQuality::Low, ShadowFilter::Basic),
            (ShadowQuality::Medium, ShadowFilter::Pcf),
            (ShadowQuality::High, ShadowFilter::PcfSoft),
        ];
        for (quality, filter) in expected {
            store.apply(LightingEdit::ShadowQuality(quality));
            assert_eq!(store.resolve().shadows.unwrap().filter, filter);
        }

        store.apply(LightingEdit::ShadowsEnabled(false));
        assert!(store.resolve().shadows.is_none());
    }

    #[test]
    fn test_softness_drives_radius() {
        let mut store = LightingStore::default();
        store.apply(LightingEdit::ShadowSoftness(4.5));
        assert_eq!(store.shadow.radius, 4.5);
        assert_eq!(store.resolve().shadows.unwrap().radius, 4.5);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let mut store = LightingStore::default();
        store.apply(LightingEdit::Exposure(-3.0));
        store.apply(LightingEdit::ShadowResolution(1000));
        store.apply(LightingEdit::ShadowDarkness(2.0));

        let resolved = store.resolve();
        assert_eq!(resolved.exposure, -3.0);
        assert_eq!(resolved.shadows.unwrap().map_size, 1000);
        assert_abs_diff_eq!(resolved.ambient_intensity, -5.72);
    }

    #[test]
    fn test_every_edit_bumps_revision() {
        let mut store = LightingStore::default();
        let before = store.revision();
        store.apply(LightingEdit::ToneMapping(ToneMapping::Aces));
        store.apply(LightingEdit::BuildingScale(DVec3::splat(2.0)));
        assert_eq!(store.revision(), before + 2);
        assert_eq!(store.placement.scale, DVec3::splat(2.0));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(LightingConfig::default()).unwrap();
        assert_eq!(json["ambientColor"], "#ffdfd1");
        assert_eq!(json["toneMapping"], "Neutral");
        assert_eq!(json["envValue"], "sunset");

        let json = serde_json::to_value(ShadowConfig::default()).unwrap();
        assert_eq!(json["shadowQuality"], "high");
        assert_eq!(json["shadowResolution"], 2048);

        let aces: ToneMapping = serde_json::from_str("\"ACES\"").unwrap();
        assert_eq!(aces, ToneMapping::Aces);
    }
}
