//! Per-section camera presets

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pose::{CameraPose, PoseSnapshot};

/// Number of marketing sections that carry a camera preset
pub const SECTION_COUNT: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Section index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },
}

/// Fixed table of camera poses, one per page section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPresets {
    slots: [CameraPose; SECTION_COUNT],
}

fn overview_pose() -> CameraPose {
    CameraPose::new(DVec3::new(0.0, 2.0, 6.0), DVec3::ZERO, 50.0)
}

impl Default for SectionPresets {
    fn default() -> Self {
        let mut slots = [overview_pose(); SECTION_COUNT];
        slots[1] = CameraPose::new(
            DVec3::new(-22.586978292885362, 15.333844260182515, 36.551201138364256),
            DVec3::new(32.2, 21.6, 0.0),
            22.0,
        );
        Self { slots }
    }
}

impl SectionPresets {
    pub fn from_slots(slots: [CameraPose; SECTION_COUNT]) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self, index: usize) -> Result<(), PresetError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(PresetError::OutOfRange { index, len: self.slots.len() })
        }
    }

    /// Pose stored in slot `index`
    pub fn load(&self, index: usize) -> Result<CameraPose, PresetError> {
        self.check(index)?;
        Ok(self.slots[index])
    }

    /// Overwrite slot `index` with `pose`
    pub fn save(&mut self, index: usize, pose: &CameraPose) -> Result<(), PresetError> {
        self.check(index)?;
        self.slots[index] = *pose;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraPose> {
        self.slots.iter()
    }

    /// Slots with derived zoom/azimuth filled in, in section order
    pub fn snapshots(&self) -> Vec<PoseSnapshot> {
        self.slots.iter().map(CameraPose::snapshot).collect()
    }

    /// Rebuild a table from exported snapshots. Missing trailing slots keep
    /// their defaults; extra entries are ignored.
    pub fn from_snapshots(snapshots: &[PoseSnapshot]) -> Self {
        let mut presets = Self::default();
        if snapshots.len() > SECTION_COUNT {
            tracing::warn!(
                count = snapshots.len(),
                "Ignoring section presets beyond slot {}",
                SECTION_COUNT - 1
            );
        }
        for (slot, snapshot) in presets.slots.iter_mut().zip(snapshots) {
            *slot = CameraPose::from(*snapshot);
        }
        presets
    }
}

impl Serialize for SectionPresets {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshots().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SectionPresets {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshots = Vec::<PoseSnapshot>::deserialize(deserializer)?;
        Ok(Self::from_snapshots(&snapshots))
    }
}
