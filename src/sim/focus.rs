//! Stage-3 focus trigger: the target a player touches to unlock a question

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::{FOCUS_HIT_PADDING, FOCUS_SIZE};

/// Pulse animation bounds
const PULSE_MAX: f32 = 1.1;
const PULSE_MIN: f32 = 0.95;
const PULSE_STEP: f32 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTarget {
    /// Top-left corner of the visual bounds
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    pulse: f32,
    pulse_dir: f32,
}

impl Default for FocusTarget {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::splat(FOCUS_SIZE),
            active: false,
            pulse: 1.0,
            pulse_dir: 1.0,
        }
    }
}

impl FocusTarget {
    /// Show the target centered on the canvas
    pub fn activate(&mut self, canvas: Vec2) {
        self.active = true;
        self.pos = (canvas - self.size) / 2.0;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Advance the pulse animation one frame
    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        self.pulse += PULSE_STEP * self.pulse_dir;
        if self.pulse >= PULSE_MAX {
            self.pulse_dir = -1.0;
        } else if self.pulse <= PULSE_MIN {
            self.pulse_dir = 1.0;
        }
    }

    /// Current visual scale
    pub fn pulse_scale(&self) -> f32 {
        self.pulse
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Touch region, padded beyond the visual bounds to ease interaction
    pub fn hit_region(&self) -> Rect {
        self.bounds().expand(FOCUS_HIT_PADDING)
    }

    pub fn check_collision(&self, point: Vec2) -> bool {
        self.active && self.hit_region().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_centers_on_canvas() {
        let mut focus = FocusTarget::default();
        focus.activate(Vec2::new(1280.0, 720.0));
        assert_eq!(focus.bounds().center(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn test_hit_region_is_padded() {
        let mut focus = FocusTarget::default();
        focus.activate(Vec2::new(1000.0, 1000.0));
        let bounds = focus.bounds();

        // Just outside the visual bounds but within the padding: still a hit
        let near = Vec2::new(bounds.x - 20.0, bounds.y - 20.0);
        assert!(focus.check_collision(near));
        // Beyond the padding: miss
        let far = Vec2::new(bounds.x - 40.0, bounds.y);
        assert!(!focus.check_collision(far));

        focus.deactivate();
        assert!(!focus.check_collision(bounds.center()));
    }

    #[test]
    fn test_pulse_stays_in_bounds() {
        let mut focus = FocusTarget::default();
        focus.activate(Vec2::new(800.0, 600.0));
        for _ in 0..500 {
            focus.update();
            assert!(focus.pulse_scale() >= PULSE_MIN - PULSE_STEP);
            assert!(focus.pulse_scale() <= PULSE_MAX + PULSE_STEP);
        }
    }
}
