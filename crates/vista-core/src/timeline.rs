//! Scroll-scrubbed camera transitions
//!
//! A transition maps a scroll range on the page to an interpolation between two
//! literal camera poses. The range is described relative to a page landmark
//! (e.g. "from when the top of #section-two reaches the bottom of the viewport
//! until its center reaches the viewport center") and resolved to absolute
//! scroll offsets once the page has been laid out.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pose::CameraPose;

/// Easing applied to scroll progress before interpolating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease-in-out
    #[default]
    Power2InOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// A horizontal line on an element or on the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Center,
    Bottom,
}

impl Edge {
    /// Offset of this edge from the top of a box of the given height
    fn offset(self, height: f64) -> f64 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => height / 2.0,
            Edge::Bottom => height,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Center => "center",
            Edge::Bottom => "bottom",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorParseError {
    #[error("Expected \"<element edge> <viewport edge>\", got {0:?}")]
    Malformed(String),
    #[error("Unknown edge {0:?} (expected top, center or bottom)")]
    UnknownEdge(String),
}

impl FromStr for Edge {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            other => Err(AnchorParseError::UnknownEdge(other.to_string())),
        }
    }
}

/// The scroll offset at which `element` edge lines up with `viewport` edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub element: Edge,
    pub viewport: Edge,
}

impl ScrollAnchor {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Absolute scroll offset for a landmark laid out at `rect`
    pub fn resolve(&self, rect: LandmarkRect, viewport_height: f64) -> f64 {
        rect.top + self.element.offset(rect.height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for ScrollAnchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(Self {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(AnchorParseError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for ScrollAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element.as_str(), self.viewport.as_str())
    }
}

impl Serialize for ScrollAnchor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScrollAnchor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Document-space geometry of a page landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRect {
    /// Distance from the top of the document, in CSS pixels
    pub top: f64,
    pub height: f64,
}

/// Source of page geometry, measured after layout has settled
pub trait LandmarkLayout {
    /// Geometry of the element with id `landmark`, if it exists
    fn landmark(&self, landmark: &str) -> Option<LandmarkRect>;

    fn viewport_height(&self) -> f64;
}

/// Configured camera move between two sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTransition {
    /// Element id of the landmark the range is measured against
    pub landmark: String,
    pub start: ScrollAnchor,
    pub end: ScrollAnchor,
    #[serde(default)]
    pub ease: Ease,
    pub from: CameraPose,
    pub to: CameraPose,
}

impl SectionTransition {
    /// Resolve the landmark-relative range to absolute scroll offsets.
    ///
    /// Returns `None` if the landmark is missing from the page.
    pub fn resolve(&self, layout: &dyn LandmarkLayout) -> Option<ScrollTrack> {
        let rect = layout.landmark(&self.landmark)?;
        let viewport = layout.viewport_height();
        Some(ScrollTrack {
            landmark: self.landmark.clone(),
            start: self.start.resolve(rect, viewport),
            end: self.end.resolve(rect, viewport),
            from: self.from,
            to: self.to,
            ease: self.ease,
        })
    }
}

/// The transitions shipped with the site
pub fn default_transitions() -> Vec<SectionTransition> {
    vec![SectionTransition {
        landmark: "section-two".to_string(),
        start: ScrollAnchor::new(Edge::Top, Edge::Bottom),
        end: ScrollAnchor::new(Edge::Center, Edge::Center),
        ease: Ease::Power2InOut,
        from: CameraPose::new(
            DVec3::new(13.2678760072932, 9.54023342452855, 64.77327507868063),
            DVec3::new(-18.6, 20.9, 0.0),
            23.0,
        ),
        to: CameraPose::new(
            DVec3::new(-19.88818790881988, 10.0444234224416, 57.77326188194918),
            DVec3::new(20.0, 22.2, 0.0),
            23.0,
        ),
    }]
}

/// A transition bound to absolute scroll offsets
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTrack {
    pub landmark: String,
    pub start: f64,
    pub end: f64,
    pub from: CameraPose,
    pub to: CameraPose,
    pub ease: Ease,
}

impl ScrollTrack {
    /// Linear progress through the range, clamped to [0, 1]
    pub fn progress(&self, scroll_y: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll_y >= self.end { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }

    /// Camera pose at `progress` through the range
    pub fn pose_at(&self, progress: f64) -> CameraPose {
        self.from.lerp(&self.to, self.ease.apply(progress))
    }

    pub fn pose_at_scroll(&self, scroll_y: f64) -> CameraPose {
        self.pose_at(self.progress(scroll_y))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashMap;

    /// Fixed page geometry for tests
    pub(crate) struct FixedLayout {
        pub landmarks: HashMap<String, LandmarkRect>,
        pub viewport: f64,
    }

    impl FixedLayout {
        /// A page with #section-two one viewport down
        pub(crate) fn standard() -> Self {
            let mut landmarks = HashMap::new();
            landmarks.insert("section-two".to_string(), LandmarkRect { top: 1000.0, height: 1000.0 });
            Self { landmarks, viewport: 1000.0 }
        }
    }

    impl LandmarkLayout for FixedLayout {
        fn landmark(&self, landmark: &str) -> Option<LandmarkRect> {
            self.landmarks.get(landmark).copied()
        }

        fn viewport_height(&self) -> f64 {
            self.viewport
        }
    }

    #[test]
    fn test_anchor_parsing() {
        let anchor: ScrollAnchor = "top bottom".parse().unwrap();
        assert_eq!(anchor, ScrollAnchor::new(Edge::Top, Edge::Bottom));
        assert_eq!(anchor.to_string(), "top bottom");

        assert!(matches!("top".parse::<ScrollAnchor>(), Err(AnchorParseError::Malformed(_))));
        assert!(matches!("top left".parse::<ScrollAnchor>(), Err(AnchorParseError::UnknownEdge(_))));
    }

    #[test]
    fn test_anchor_resolution() {
        let rect = LandmarkRect { top: 1000.0, height: 800.0 };
        assert_eq!(ScrollAnchor::new(Edge::Top, Edge::Bottom).resolve(rect, 600.0), 400.0);
        assert_eq!(ScrollAnchor::new(Edge::Center, Edge::Center).resolve(rect, 600.0), 1100.0);
    }

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::Power2InOut] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
            assert_eq!(ease.apply(-3.0), 0.0);
            assert_eq!(ease.apply(7.0), 1.0);
        }
        assert_abs_diff_eq!(Ease::Power2InOut.apply(0.5), 0.5);
        assert_abs_diff_eq!(Ease::Power2InOut.apply(0.25), 0.125);
    }

    #[test]
    fn test_first_transition_scrubs_between_literal_poses() {
        let layout = FixedLayout::standard();
        let transition = &default_transitions()[0];
        let track = transition.resolve(&layout).unwrap();

        // top/bottom: 1000 - 1000; center/center: 1500 - 500
        assert_eq!(track.start, 0.0);
        assert_eq!(track.end, 1000.0);

        let end = track.pose_at_scroll(1000.0);
        assert_eq!(end.position, DVec3::new(-19.88818790881988, 10.0444234224416, 57.77326188194918));
        assert_eq!(end.target, DVec3::new(20.0, 22.2, 0.0));
        assert_eq!(end.fov, 23.0);

        // Scrolling back to the start returns exactly to the start pose
        assert_eq!(track.pose_at_scroll(0.0), transition.from);
        assert_eq!(track.pose_at_scroll(-50.0), transition.from);
        assert_eq!(track.pose_at_scroll(5000.0), transition.to);
    }

    #[test]
    fn test_pose_is_pure_function_of_scroll() {
        let track = default_transitions()[0].resolve(&FixedLayout::standard()).unwrap();
        let a = track.pose_at_scroll(420.0);
        let _ = track.pose_at_scroll(900.0);
        let b = track.pose_at_scroll(420.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_landmark() {
        let layout = FixedLayout { landmarks: HashMap::new(), viewport: 800.0 };
        assert!(default_transitions()[0].resolve(&layout).is_none());
    }

    #[test]
    fn test_degenerate_range() {
        let mut track = default_transitions()[0].resolve(&FixedLayout::standard()).unwrap();
        track.end = track.start;
        assert_eq!(track.progress(track.start - 1.0), 0.0);
        assert_eq!(track.progress(track.start), 1.0);
    }

    #[test]
    fn test_transition_toml_round_trip() {
        let toml_text = toml::to_string(&default_transitions()[0]).unwrap();
        assert!(toml_text.contains("start = \"top bottom\""));
        let parsed: SectionTransition = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed, default_transitions()[0]);
    }
}
