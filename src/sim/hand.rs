//! Hand observations entering the core
//!
//! Keypoint estimation and player identity resolution happen outside (the
//! perception provider and the color-matching heuristic). The core only
//! consumes per-frame (hand, player slot) pairs in game-space coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::mirror_point;

/// MediaPipe-style hand keypoint indices used by the core
pub mod keypoint {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;

    /// Keypoints tested against item hit-boxes: wrist + five fingertips
    pub const CONTACT: [usize; 6] = [WRIST, THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// One detected hand: ordered keypoints plus a confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedHand {
    pub keypoints: Vec<Vec2>,
    pub score: f32,
}

impl TrackedHand {
    pub fn new(keypoints: Vec<Vec2>, score: f32) -> Self {
        Self { keypoints, score }
    }

    /// Whether this hand participates in collision checks
    pub fn is_confident(&self, min_score: f32) -> bool {
        !self.keypoints.is_empty() && self.score > min_score
    }

    /// The keypoints tested against item hit-boxes (missing indices skipped)
    pub fn contact_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        keypoint::CONTACT
            .iter()
            .filter_map(|&i| self.keypoints.get(i).copied())
    }

    /// Index fingertip: the pointer used for focus and quiz interaction
    pub fn fingertip(&self) -> Option<Vec2> {
        self.keypoints.get(keypoint::INDEX_TIP).copied()
    }

    /// Map from camera space into game space (selfie-view horizontal flip).
    ///
    /// Call exactly once where observations cross into the core; everything
    /// downstream assumes game space.
    pub fn mirrored(&self, canvas_width: f32) -> Self {
        Self {
            keypoints: self
                .keypoints
                .iter()
                .map(|&p| mirror_point(canvas_width, p))
                .collect(),
            score: self.score,
        }
    }
}

/// A hand paired with the player slot the identity heuristic assigned it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandInput {
    pub hand: TrackedHand,
    /// `None` when the heuristic could not attribute the hand to a player
    pub player: Option<usize>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// All 21 keypoints collapsed onto one point
    pub(crate) fn hand_at(p: Vec2, score: f32) -> TrackedHand {
        TrackedHand::new(vec![p; 21], score)
    }

    #[test]
    fn test_confidence_gate() {
        let h = hand_at(Vec2::new(10.0, 10.0), 0.7);
        assert!(!h.is_confident(0.7)); // strictly above threshold required
        let h = hand_at(Vec2::new(10.0, 10.0), 0.71);
        assert!(h.is_confident(0.7));
        let empty = TrackedHand::new(vec![], 0.99);
        assert!(!empty.is_confident(0.7));
    }

    #[test]
    fn test_contact_points_skip_missing() {
        // Only 9 keypoints: wrist (0), thumb tip (4) and index tip (8) exist
        let h = TrackedHand::new(vec![Vec2::ZERO; 9], 0.9);
        assert_eq!(h.contact_points().count(), 3);

        let full = hand_at(Vec2::ONE, 0.9);
        assert_eq!(full.contact_points().count(), 6);
    }

    #[test]
    fn test_mirrored_flips_x_only() {
        let h = TrackedHand::new(vec![Vec2::new(100.0, 40.0)], 0.9);
        let m = h.mirrored(640.0);
        assert_eq!(m.keypoints[0], Vec2::new(540.0, 40.0));
        assert_eq!(m.score, h.score);
    }
}
