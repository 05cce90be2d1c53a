//! Programmatic-update guard
//!
//! The orbit controller reports every camera change, including the ones caused
//! by our own writes. While a programmatic write is in flight those reports are
//! echoes and must not be fed back into the pose store. The guard is released a
//! fixed settle delay after the write completes so the controller can finish its
//! own update cycle first.

use std::time::Duration;

use glam::DVec3;

use crate::pose::CameraPose;

/// Delay between the end of a programmatic write and re-accepting user input
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Per-axis movement a controller report must exceed to count as a user edit
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.01;

/// Who currently owns the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    UserDriven,
    Programmatic,
}

/// A scheduled release of the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    pub deadline: Duration,
    /// Increments with every scheduled timer so a replaced one can be told apart
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    UserDriven,
    /// A write is in progress (`settle == None`) or waiting to settle
    Programmatic { settle: Option<SettleTimer> },
}

/// Outcome of a controller change report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceChange {
    /// Arrived during a programmatic write; ignored
    Suppressed,
    /// Within the change threshold of the last known pose
    Unchanged,
    /// A genuine user edit; the new last-known position and target
    Accepted { position: DVec3, target: DVec3 },
}

/// Reentrancy guard separating our own camera writes from user drags
#[derive(Debug, Clone)]
pub struct UpdateGuard {
    state: GuardState,
    last_position: DVec3,
    last_target: DVec3,
    settle_delay: Duration,
    threshold: f64,
    next_generation: u64,
}

impl UpdateGuard {
    pub fn new(initial: &CameraPose) -> Self {
        Self::with_timing(initial, DEFAULT_SETTLE_DELAY, DEFAULT_CHANGE_THRESHOLD)
    }

    pub fn with_timing(initial: &CameraPose, settle_delay: Duration, threshold: f64) -> Self {
        Self {
            state: GuardState::UserDriven,
            last_position: initial.position,
            last_target: initial.target,
            settle_delay,
            threshold,
            next_generation: 0,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        match self.state {
            GuardState::UserDriven => InteractionMode::UserDriven,
            GuardState::Programmatic { .. } => InteractionMode::Programmatic,
        }
    }

    /// The pending settle timer, if a completed write is waiting to release
    pub fn pending_settle(&self) -> Option<SettleTimer> {
        match self.state {
            GuardState::Programmatic { settle } => settle,
            GuardState::UserDriven => None,
        }
    }

    /// Mark the start of a programmatic write. Any pending settle is cancelled
    /// so the guard stays closed until the new write finishes.
    pub fn begin_write(&mut self) {
        if let Some(timer) = self.pending_settle() {
            tracing::trace!(generation = timer.generation, "Cancelling settle for new write");
        }
        self.state = GuardState::Programmatic { settle: None };
    }

    /// Mark the end of a programmatic write of `pose` at time `now`.
    ///
    /// The pose becomes the last-known value and a single settle timer is
    /// (re)scheduled.
    pub fn finish_write(&mut self, pose: &CameraPose, now: Duration) -> SettleTimer {
        self.last_position = pose.position;
        self.last_target = pose.target;

        let timer = SettleTimer {
            deadline: now + self.settle_delay,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.state = GuardState::Programmatic { settle: Some(timer) };
        timer
    }

    /// Release the guard if its settle timer is due. Returns true on release.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.state {
            GuardState::Programmatic { settle: Some(timer) } if now >= timer.deadline => {
                self.state = GuardState::UserDriven;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending timer and hand the camera back to the user (unmount)
    pub fn cancel(&mut self) {
        self.state = GuardState::UserDriven;
    }

    /// Classify a change report from the orbit controller
    pub fn filter_change(&mut self, position: DVec3, target: DVec3) -> SurfaceChange {
        if self.mode() == InteractionMode::Programmatic {
            return SurfaceChange::Suppressed;
        }

        let last = CameraPose::new(self.last_position, self.last_target, 0.0);
        if !last.differs_from(position, target, self.threshold) {
            return SurfaceChange::Unchanged;
        }

        self.last_position = position;
        self.last_target = target;
        SurfaceChange::Accepted { position, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_echo_suppressed_during_write() {
        let pose = CameraPose::default();
        let mut guard = UpdateGuard::new(&pose);

        guard.begin_write();
        let moved = pose.position + DVec3::splat(5.0);
        assert_eq!(guard.filter_change(moved, pose.target), SurfaceChange::Suppressed);

        guard.finish_write(&pose, ms(100));
        assert_eq!(guard.filter_change(moved, pose.target), SurfaceChange::Suppressed);

        // Suppressed reports never touch the last-known pose
        assert!(guard.poll(ms(150)));
        assert_eq!(
            guard.filter_change(pose.position, pose.target),
            SurfaceChange::Unchanged
        );
    }

    #[test]
    fn test_settle_releases_after_delay() {
        let pose = CameraPose::default();
        let mut guard = UpdateGuard::new(&pose);

        guard.begin_write();
        guard.finish_write(&pose, ms(1000));

        assert!(!guard.poll(ms(1049)));
        assert_eq!(guard.mode(), InteractionMode::Programmatic);
        assert!(guard.poll(ms(1050)));
        assert_eq!(guard.mode(), InteractionMode::UserDriven);
        assert!(!guard.poll(ms(2000)));
    }

    #[test]
    fn test_new_write_reschedules_single_timer() {
        let pose = CameraPose::default();
        let mut guard = UpdateGuard::new(&pose);

        guard.begin_write();
        let first = guard.finish_write(&pose, ms(0));

        guard.begin_write();
        assert_eq!(guard.pending_settle(), None);
        assert!(!guard.poll(ms(60)), "old timer must not fire after a new write began");

        let second = guard.finish_write(&pose, ms(40));
        assert_ne!(first.generation, second.generation);
        assert_eq!(guard.pending_settle(), Some(second));
        assert!(!guard.poll(ms(60)));
        assert!(guard.poll(ms(90)));
    }

    #[test]
    fn test_user_change_threshold() {
        let pose = CameraPose::default();
        let mut guard = UpdateGuard::new(&pose);

        let jitter = pose.position + DVec3::new(0.0, 0.009, 0.0);
        assert_eq!(guard.filter_change(jitter, pose.target), SurfaceChange::Unchanged);

        let dragged = pose.position + DVec3::new(1.0, 0.0, 0.0);
        assert_eq!(
            guard.filter_change(dragged, pose.target),
            SurfaceChange::Accepted { position: dragged, target: pose.target }
        );
        // Same report again is not a new edit
        assert_eq!(guard.filter_change(dragged, pose.target), SurfaceChange::Unchanged);
    }

    #[test]
    fn test_cancel_drops_pending_timer() {
        let pose = CameraPose::default();
        let mut guard = UpdateGuard::new(&pose);

        guard.begin_write();
        guard.finish_write(&pose, ms(0));
        guard.cancel();

        assert_eq!(guard.mode(), InteractionMode::UserDriven);
        assert_eq!(guard.pending_settle(), None);
        assert!(!guard.poll(ms(100)));
    }
}
