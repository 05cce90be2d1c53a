//! Vista Core - Camera, lighting and scroll-direction state for the building viewer
//!
//! This crate holds everything the viewer decides, independent of the renderer:
//! - Spherical camera model (zoom/azimuth derived from position and target)
//! - Programmatic-update guard separating our camera writes from user drags
//! - Section camera presets
//! - Scroll-linked camera director and its transitions
//! - Lighting and shadow parameter store
//! - Viewer configuration loading and JSON export

pub mod config;
pub mod director;
pub mod guard;
pub mod lighting;
pub mod pose;
pub mod presets;
pub mod scroll;
pub mod spherical;
pub mod timeline;
pub mod viewer;

pub use config::{ConfigError, ViewerConfig};
pub use director::{DirectorMode, ScrollDirector};
pub use guard::{InteractionMode, SurfaceChange, UpdateGuard};
pub use lighting::{
    EnvironmentPreset, LightingConfig, LightingEdit, LightingStore, ResolvedLighting,
    ResolvedShadows, Rgb, ScenePlacement, ShadowConfig, ShadowFilter, ShadowQuality, ToneMapping,
};
pub use pose::{CameraPose, PoseSnapshot};
pub use presets::{PresetError, SectionPresets, SECTION_COUNT};
pub use scroll::{SmoothScroll, SmoothScrollConfig};
pub use timeline::{
    default_transitions, Ease, Edge, LandmarkLayout, LandmarkRect, ScrollAnchor, ScrollTrack,
    SectionTransition,
};
pub use viewer::{CameraError, ViewerState};
