//! Smoothed page scroll offset
//!
//! The page scroll position is not fed to the camera director raw. Each new
//! target offset starts an eased glide from wherever the smoothed value is now,
//! sampled once per frame.

use serde::{Deserialize, Serialize};

/// Page-wide smooth scrolling parameters, configured once at startup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothScrollConfig {
    /// Glide duration in seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_duration() -> f64 {
    1.2
}

fn default_true() -> bool {
    true
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            enabled: true,
        }
    }
}

/// Exponential ease-out used for scroll glides
pub fn expo_out(t: f64) -> f64 {
    (1.001 - 2f64.powf(-10.0 * t)).min(1.0)
}

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    config: SmoothScrollConfig,
    from: f64,
    to: f64,
    current: f64,
    elapsed: f64,
}

impl SmoothScroll {
    pub fn new(config: SmoothScrollConfig, initial: f64) -> Self {
        Self {
            config,
            from: initial,
            to: initial,
            current: initial,
            elapsed: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.to
    }

    /// Begin gliding towards `offset`; no-op if already heading there
    pub fn scroll_to(&mut self, offset: f64) {
        if offset == self.to {
            return;
        }
        if !self.config.enabled || self.config.duration <= 0.0 {
            self.jump_to(offset);
            return;
        }
        self.from = self.current;
        self.to = offset;
        self.elapsed = 0.0;
    }

    /// Move straight to `offset` without gliding
    pub fn jump_to(&mut self, offset: f64) {
        self.from = offset;
        self.to = offset;
        self.current = offset;
        self.elapsed = 0.0;
    }

    /// Advance the glide by `dt` seconds and return the smoothed offset
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.is_settled() {
            return self.current;
        }
        self.elapsed += dt;
        let t = (self.elapsed / self.config.duration).min(1.0);
        self.current = if t >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * expo_out(t)
        };
        self.current
    }
}
