//! Offline evaluation of the scroll director

use std::time::Duration;

use serde_json::json;
use vista_core::{LandmarkLayout, PoseSnapshot, ScrollDirector, ScrollTrack, ViewerConfig};

/// Tracks the director registered and the pose it produced
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub scroll_y: f64,
    pub tracks: Vec<ScrollTrack>,
    /// `None` when no transition's landmark was found
    pub pose: Option<PoseSnapshot>,
}

impl SampleReport {
    pub fn to_json(&self) -> serde_json::Value {
        let tracks: Vec<_> = self
            .tracks
            .iter()
            .map(|track| {
                json!({
                    "landmark": track.landmark,
                    "start": track.start,
                    "end": track.end,
                    "progress": track.progress(self.scroll_y),
                })
            })
            .collect();
        json!({
            "scrollY": self.scroll_y,
            "tracks": tracks,
            "pose": self.pose,
        })
    }
}

/// Run the director against a fixed page at one scroll offset
pub fn sample(config: &ViewerConfig, layout: &dyn LandmarkLayout, scroll_y: f64) -> SampleReport {
    let mut director = ScrollDirector::with_settle_delay(config.transitions.clone(), Duration::ZERO);
    director.enter_directed(Duration::ZERO);
    director.poll(Duration::ZERO, layout);

    SampleReport {
        scroll_y,
        tracks: director.tracks().to_vec(),
        pose: director.sample(scroll_y).map(|pose| pose.snapshot()),
    }
}
