//! Shared resources and conversions between core and Bevy types

use std::collections::HashMap;

use bevy::math::DVec3;
use bevy::prelude::*;
use vista_core::{CameraPose, LandmarkLayout, LandmarkRect, Rgb, ViewerConfig, ViewerState};

/// The viewer state, owned by the Bevy world
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct Viewer(pub ViewerState);

impl Viewer {
    pub fn from_config(config: ViewerConfig) -> Self {
        Self(ViewerState::new(config))
    }
}

/// Page scroll offset and landmark geometry, filled in by the host page
#[derive(Resource, Debug, Clone, Default)]
pub struct PageGeometry {
    /// Raw vertical scroll offset in CSS pixels
    pub scroll_y: f64,
    pub viewport_height: f64,
    /// Landmark element id -> document-space rectangle
    pub landmarks: HashMap<String, LandmarkRect>,
    /// Bumped by the host whenever the page reflows
    pub layout_generation: u64,
}

impl LandmarkLayout for PageGeometry {
    fn landmark(&self, landmark: &str) -> Option<LandmarkRect> {
        self.landmarks.get(landmark).copied()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

pub fn to_vec3(v: DVec3) -> Vec3 {
    v.as_vec3()
}

pub fn to_color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_f32();
    Color::srgb(r, g, b)
}

/// Camera transform for a pose; Y is up
pub fn pose_transform(pose: &CameraPose) -> Transform {
    Transform::from_translation(to_vec3(pose.position)).looking_at(to_vec3(pose.target), Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_geometry_layout() {
        let mut page = PageGeometry {
            viewport_height: 900.0,
            ..Default::default()
        };
        page.landmarks
            .insert("section-two".to_string(), LandmarkRect { top: 900.0, height: 1200.0 });

        assert_eq!(page.viewport_height(), 900.0);
        assert_eq!(page.landmark("section-two").map(|r| r.top), Some(900.0));
        assert!(page.landmark("section-nine").is_none());
    }

    #[test]
    fn test_pose_transform_looks_at_target() {
        let pose = CameraPose::new(DVec3::new(0.0, 2.0, 6.0), DVec3::ZERO, 50.0);
        let transform = pose_transform(&pose);

        assert_eq!(transform.translation, Vec3::new(0.0, 2.0, 6.0));
        let expected = (Vec3::ZERO - transform.translation).normalize();
        assert!(transform.forward().as_vec3().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_color_conversion() {
        let color = to_color(Rgb::WHITE).to_srgba();
        assert_eq!((color.red, color.green, color.blue), (1.0, 1.0, 1.0));
    }
}
