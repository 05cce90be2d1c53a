//! Camera pose and its derived views

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::spherical::{derive_zoom_and_azimuth, elevation_of, position_from_spherical};

/// Absolute camera placement: where the camera sits, what it orbits, and its vertical FOV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
    /// Vertical field of view in degrees
    pub fov: f64,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: DVec3::new(13.2678760072932, 9.54023342452855, 64.77327507868063),
            target: DVec3::new(-18.6, 20.9, 0.0),
            fov: 23.0,
        }
    }
}

impl CameraPose {
    pub fn new(position: DVec3, target: DVec3, fov: f64) -> Self {
        Self { position, target, fov }
    }

    /// Distance between position and target
    pub fn zoom(&self) -> f64 {
        derive_zoom_and_azimuth(self.position, self.target).distance
    }

    /// Horizontal angle around the target, in degrees
    pub fn azimuth(&self) -> f64 {
        derive_zoom_and_azimuth(self.position, self.target).azimuth
    }

    /// Current tilt above the target's horizontal plane, in radians
    pub fn elevation(&self) -> f64 {
        elevation_of(self.position, self.target)
    }

    /// Same pose pulled in or pushed out to `zoom`, keeping azimuth and elevation.
    ///
    /// Elevation is read from the pose as it is now, once per edit.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        let position = position_from_spherical(self.target, zoom, self.azimuth(), self.elevation());
        Self { position, ..*self }
    }

    /// Same pose swung around the target to `azimuth` degrees, keeping zoom and elevation
    pub fn with_azimuth(&self, azimuth: f64) -> Self {
        let position = position_from_spherical(self.target, self.zoom(), azimuth, self.elevation());
        Self { position, ..*self }
    }

    /// Component-wise interpolation; `t = 0` and `t = 1` return the endpoints exactly
    pub fn lerp(&self, end: &CameraPose, t: f64) -> Self {
        let mix = |a: f64, b: f64| a * (1.0 - t) + b * t;
        let mix3 = |a: DVec3, b: DVec3| DVec3::new(mix(a.x, b.x), mix(a.y, b.y), mix(a.z, b.z));
        Self {
            position: mix3(self.position, end.position),
            target: mix3(self.target, end.target),
            fov: mix(self.fov, end.fov),
        }
    }

    /// True when position or target moved by more than `threshold` on any axis
    pub fn differs_from(&self, position: DVec3, target: DVec3, threshold: f64) -> bool {
        let moved = |a: DVec3, b: DVec3| (a - b).abs().max_element() > threshold;
        moved(self.position, position) || moved(self.target, target)
    }

    /// Pose plus its derived zoom/azimuth, for display and export
    pub fn snapshot(&self) -> PoseSnapshot {
        let derived = derive_zoom_and_azimuth(self.position, self.target);
        PoseSnapshot {
            pos: self.position.to_array(),
            target: self.target.to_array(),
            zoom: derived.distance,
            rotate: derived.azimuth,
            fov: self.fov,
        }
    }
}

/// Flat, serializable view of a pose with precomputed zoom and azimuth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub pos: [f64; 3],
    pub target: [f64; 3],
    pub zoom: f64,
    pub rotate: f64,
    pub fov: f64,
}

impl From<PoseSnapshot> for CameraPose {
    /// Zoom and azimuth in a snapshot are display values; position/target win
    fn from(snapshot: PoseSnapshot) -> Self {
        CameraPose::new(
            DVec3::from_array(snapshot.pos),
            DVec3::from_array(snapshot.target),
            snapshot.fov,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_pose_derived_values() {
        let pose = CameraPose::default();
        assert_abs_diff_eq!(pose.zoom(), 73.0765556268482, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.azimuth(), 26.19677632407517, epsilon = 1e-9);
    }

    #[test]
    fn test_with_zoom_keeps_angles() {
        let pose = CameraPose::default();
        let zoomed = pose.with_zoom(30.0);

        assert_abs_diff_eq!(zoomed.zoom(), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(zoomed.azimuth(), pose.azimuth(), epsilon = 1e-9);
        assert_abs_diff_eq!(zoomed.elevation(), pose.elevation(), epsilon = 1e-9);
        assert_eq!(zoomed.target, pose.target);
        assert_eq!(zoomed.fov, pose.fov);
    }

    #[test]
    fn test_with_azimuth_keeps_zoom_and_elevation() {
        let pose = CameraPose::new(DVec3::new(0.0, 2.0, 6.0), DVec3::ZERO, 50.0);
        let turned = pose.with_azimuth(-90.0);

        assert_abs_diff_eq!(turned.azimuth(), -90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(turned.zoom(), pose.zoom(), epsilon = 1e-9);
        assert_abs_diff_eq!(turned.position.y, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(turned.position.z, 0.0, epsilon = 1e-9);
        assert!(turned.position.x < 0.0);
    }

    #[test]
    fn test_lerp_endpoints_are_exact() {
        let start = CameraPose::default();
        let end = CameraPose::new(
            DVec3::new(-19.88818790881988, 10.0444234224416, 57.77326188194918),
            DVec3::new(20.0, 22.2, 0.0),
            23.0,
        );
        assert_eq!(start.lerp(&end, 0.0), start);
        assert_eq!(start.lerp(&end, 1.0), end);
    }

    #[test]
    fn test_differs_from_threshold() {
        let pose = CameraPose::default();
        let nudged = pose.position + DVec3::new(0.005, 0.0, 0.0);
        assert!(!pose.differs_from(nudged, pose.target, 0.01));

        let moved = pose.position + DVec3::new(0.0, 0.0, 0.02);
        assert!(pose.differs_from(moved, pose.target, 0.01));
        assert!(pose.differs_from(pose.position, pose.target - DVec3::Y, 0.01));
    }
}
