//! Scroll-linked camera director
//!
//! In `Directed` mode the camera pose is a function of the page scroll offset.
//! Entering the mode waits one layout-settle delay, then measures the page
//! landmarks and registers one track per section transition. Leaving the mode
//! (or unmounting) drops every registered track at once; a generation counter
//! makes sure a settle scheduled before a mode switch can never register
//! tracks afterwards.

use std::time::Duration;

use crate::pose::CameraPose;
use crate::timeline::{LandmarkLayout, ScrollTrack, SectionTransition};

/// Wait before measuring landmarks after entering `Directed`
pub const DEFAULT_LAYOUT_SETTLE: Duration = Duration::from_millis(50);

/// Whether the user or the page scroll owns the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorMode {
    /// User free-orbits; the director never writes
    Interactive,
    /// Camera pose follows the scroll offset
    Directed,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Inert,
    Settling { deadline: Duration, generation: u64 },
    Active { tracks: Vec<ScrollTrack>, generation: u64 },
}

#[derive(Debug, Clone)]
pub struct ScrollDirector {
    transitions: Vec<SectionTransition>,
    phase: Phase,
    settle_delay: Duration,
    generation: u64,
}

impl ScrollDirector {
    pub fn new(transitions: Vec<SectionTransition>) -> Self {
        Self::with_settle_delay(transitions, DEFAULT_LAYOUT_SETTLE)
    }

    pub fn with_settle_delay(transitions: Vec<SectionTransition>, settle_delay: Duration) -> Self {
        Self {
            transitions,
            phase: Phase::Inert,
            settle_delay,
            generation: 0,
        }
    }

    pub fn mode(&self) -> DirectorMode {
        match self.phase {
            Phase::Inert => DirectorMode::Interactive,
            Phase::Settling { .. } | Phase::Active { .. } => DirectorMode::Directed,
        }
    }

    /// True once tracks are registered and `sample` produces poses
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    pub fn transitions(&self) -> &[SectionTransition] {
        &self.transitions
    }

    /// Registered tracks, empty unless active
    pub fn tracks(&self) -> &[ScrollTrack] {
        match &self.phase {
            Phase::Active { tracks, .. } => tracks,
            _ => &[],
        }
    }

    /// Switch to (or rebuild) scroll-driven mode; tracks register after the settle delay
    pub fn enter_directed(&mut self, now: Duration) {
        self.kill_all();
        self.phase = Phase::Settling {
            deadline: now + self.settle_delay,
            generation: self.generation,
        };
        tracing::debug!(generation = self.generation, "Scroll director settling");
    }

    /// Hand the camera back to the user; nothing registered survives
    pub fn enter_interactive(&mut self) {
        self.kill_all();
    }

    /// Tear down on viewer unmount
    pub fn unmount(&mut self) {
        self.kill_all();
        tracing::debug!("Scroll director unmounted");
    }

    /// Replace the configured transitions; a directed director rebuilds from scratch
    pub fn set_transitions(&mut self, transitions: Vec<SectionTransition>, now: Duration) {
        self.transitions = transitions;
        if self.mode() == DirectorMode::Directed {
            self.enter_directed(now);
        }
    }

    /// Page content reflowed; re-measure landmarks if directed
    pub fn refresh(&mut self, now: Duration) {
        if self.mode() == DirectorMode::Directed {
            self.enter_directed(now);
        }
    }

    fn kill_all(&mut self) {
        if let Phase::Active { tracks, .. } = &self.phase {
            tracing::debug!(count = tracks.len(), "Killing scroll tracks");
        }
        self.generation += 1;
        self.phase = Phase::Inert;
    }

    /// Register tracks once the layout settle is due. Returns true on the
    /// frame the tracks were registered.
    pub fn poll(&mut self, now: Duration, layout: &dyn LandmarkLayout) -> bool {
        let Phase::Settling { deadline, generation } = self.phase else {
            return false;
        };
        if generation != self.generation || now < deadline {
            return false;
        }

        let mut tracks = Vec::with_capacity(self.transitions.len());
        for transition in &self.transitions {
            match transition.resolve(layout) {
                Some(track) => {
                    tracing::debug!(
                        landmark = %track.landmark,
                        start = track.start,
                        end = track.end,
                        "Registered scroll track"
                    );
                    tracks.push(track);
                }
                None => {
                    tracing::warn!(landmark = %transition.landmark, "Landmark not found, skipping transition");
                }
            }
        }

        // `sample` walks tracks in page order, not config order
        tracks.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.phase = Phase::Active { tracks, generation };
        true
    }

    /// Camera pose for the given scroll offset, or `None` if the director is
    /// not driving the camera.
    ///
    /// The track used is the last one whose range has begun; before the first
    /// range the first track is held at its start pose.
    pub fn sample(&self, scroll_y: f64) -> Option<CameraPose> {
        let Phase::Active { tracks, .. } = &self.phase else {
            return None;
        };
        let track = tracks
            .iter()
            .rev()
            .find(|track| scroll_y >= track.start)
            .or_else(|| tracks.first())?;
        Some(track.pose_at_scroll(scroll_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::tests::FixedLayout;
    use crate::timeline::{default_transitions, Edge, LandmarkRect, ScrollAnchor};
    use glam::DVec3;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn active_director() -> ScrollDirector {
        let mut director = ScrollDirector::new(default_transitions());
        director.enter_directed(ms(0));
        assert!(director.poll(ms(50), &FixedLayout::standard()));
        director
    }

    #[test]
    fn test_registers_after_layout_settle() {
        let layout = FixedLayout::standard();
        let mut director = ScrollDirector::new(default_transitions());
        assert_eq!(director.mode(), DirectorMode::Interactive);

        director.enter_directed(ms(100));
        assert_eq!(director.mode(), DirectorMode::Directed);
        assert!(!director.poll(ms(120), &layout));
        assert_eq!(director.sample(0.0), None);

        assert!(director.poll(ms(150), &layout));
        assert!(director.is_active());
        assert_eq!(director.tracks().len(), 1);
        // Registration happens once
        assert!(!director.poll(ms(200), &layout));
    }

    #[test]
    fn test_full_scrub_and_back() {
        let director = active_director();
        let transition = &default_transitions()[0];

        let end = director.sample(1000.0).unwrap();
        assert_eq!(
            end,
            CameraPose::new(
                DVec3::new(-19.88818790881988, 10.0444234224416, 57.77326188194918),
                DVec3::new(20.0, 22.2, 0.0),
                23.0,
            )
        );

        let _ = director.sample(300.0);
        assert_eq!(director.sample(0.0).unwrap(), transition.from);
    }

    #[test]
    fn test_interactive_mid_scrub_stops_all_writes() {
        let mut director = active_director();
        let held = director.sample(400.0).unwrap();
        assert_ne!(held, default_transitions()[0].from);

        director.enter_interactive();
        assert_eq!(director.mode(), DirectorMode::Interactive);
        assert_eq!(director.sample(800.0), None);
        assert_eq!(director.sample(400.0), None);
        assert!(director.tracks().is_empty());
    }

    #[test]
    fn test_stale_settle_never_registers() {
        let layout = FixedLayout::standard();
        let mut director = ScrollDirector::new(default_transitions());

        director.enter_directed(ms(0));
        director.enter_interactive();
        assert!(!director.poll(ms(500), &layout));
        assert!(!director.is_active());

        // Re-entering builds a fresh registration rather than stacking
        director.enter_directed(ms(500));
        director.enter_directed(ms(520));
        assert!(!director.poll(ms(550), &layout));
        assert!(director.poll(ms(570), &layout));
        assert_eq!(director.tracks().len(), 1);
    }

    #[test]
    fn test_unmount_clears_tracks() {
        let mut director = active_director();
        director.unmount();
        assert!(director.tracks().is_empty());
        assert_eq!(director.sample(500.0), None);
    }

    #[test]
    fn test_later_track_takes_over() {
        let layout = {
            let mut layout = FixedLayout::standard();
            layout
                .landmarks
                .insert("section-three".to_string(), LandmarkRect { top: 2000.0, height: 1000.0 });
            layout
        };
        let mut transitions = default_transitions();
        let second_from = transitions[0].to;
        let second_to = CameraPose::new(DVec3::new(0.0, 40.0, 10.0), DVec3::ZERO, 35.0);
        transitions.push(SectionTransition {
            landmark: "section-three".to_string(),
            start: ScrollAnchor::new(Edge::Top, Edge::Bottom),
            end: ScrollAnchor::new(Edge::Center, Edge::Center),
            ease: crate::timeline::Ease::Linear,
            from: second_from,
            to: second_to,
        });

        let mut director = ScrollDirector::new(transitions);
        director.enter_directed(ms(0));
        assert!(director.poll(ms(50), &layout));

        assert_eq!(director.sample(999.0).unwrap().fov, 23.0);
        assert_eq!(director.sample(1000.0).unwrap(), second_from);
        assert_eq!(director.sample(2000.0).unwrap(), second_to);
    }

    #[test]
    fn test_tracks_follow_page_order() {
        let mut layout = FixedLayout::standard();
        layout
            .landmarks
            .insert("section-three".to_string(), LandmarkRect { top: 2000.0, height: 1000.0 });
        let later_to = CameraPose::new(DVec3::new(0.0, 40.0, 10.0), DVec3::ZERO, 35.0);
        let mut transitions = default_transitions();
        let later_from = transitions[0].to;
        transitions.insert(
            0,
            SectionTransition {
                landmark: "section-three".to_string(),
                start: ScrollAnchor::new(Edge::Top, Edge::Bottom),
                end: ScrollAnchor::new(Edge::Center, Edge::Center),
                ease: crate::timeline::Ease::Linear,
                from: later_from,
                to: later_to,
            },
        );

        let mut director = ScrollDirector::new(transitions);
        director.enter_directed(ms(0));
        assert!(director.poll(ms(50), &layout));

        let landmarks: Vec<_> = director.tracks().iter().map(|t| t.landmark.as_str()).collect();
        assert_eq!(landmarks, vec!["section-two", "section-three"]);
        assert_eq!(director.sample(500.0).unwrap().fov, 23.0);
        assert_eq!(director.sample(2000.0).unwrap(), later_to);
    }

    #[test]
    fn test_missing_landmark_is_skipped() {
        let mut director = ScrollDirector::new(default_transitions());
        director.enter_directed(ms(0));
        let empty = FixedLayout { landmarks: Default::default(), viewport: 900.0 };
        assert!(director.poll(ms(50), &empty));
        assert!(director.is_active());
        assert_eq!(director.sample(100.0), None);
    }
}
