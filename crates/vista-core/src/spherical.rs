//! Spherical camera math
//!
//! Converts between an absolute camera position and the (distance, azimuth,
//! elevation) triple measured around the orbit target. Y is up; azimuth is
//! measured in degrees from +Z towards +X.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Distance and horizontal angle of a camera around its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomAzimuth {
    /// Euclidean distance from target to position
    pub distance: f64,
    /// Horizontal angle in degrees, `atan2(dx, dz)`
    pub azimuth: f64,
}

/// Length of `position - target`, or 1.0 when the two coincide.
///
/// Only used when normalizing a direction; the reported zoom stays 0.
fn effective_length(offset: DVec3) -> f64 {
    let length = offset.length();
    if length == 0.0 {
        1.0
    } else {
        length
    }
}

/// Build a camera position from spherical coordinates around `target`
pub fn position_from_spherical(
    target: DVec3,
    distance: f64,
    azimuth_deg: f64,
    elevation_rad: f64,
) -> DVec3 {
    let azimuth = azimuth_deg.to_radians();
    let direction = DVec3::new(
        azimuth.sin() * elevation_rad.cos(),
        elevation_rad.sin(),
        azimuth.cos() * elevation_rad.cos(),
    );
    target + direction * distance
}

/// Vertical tilt (radians) of the camera relative to the horizontal plane through `target`
pub fn elevation_of(position: DVec3, target: DVec3) -> f64 {
    let offset = position - target;
    let length = effective_length(offset);
    (offset.y / length).clamp(-1.0, 1.0).asin()
}

/// Derive the displayed zoom and azimuth from a position/target pair
pub fn derive_zoom_and_azimuth(position: DVec3, target: DVec3) -> ZoomAzimuth {
    let offset = position - target;
    ZoomAzimuth {
        distance: offset.length(),
        // atan2(0, 0) is 0 in IEEE arithmetic, so a degenerate pose stays finite
        azimuth: offset.x.atan2(offset.z).to_degrees(),
    }
}
