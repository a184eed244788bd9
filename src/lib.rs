//! Celiac Catch - a webcam two-player food-catching and quiz game
//!
//! Core modules:
//! - `sim`: Frame-driven session state machine (spawning, collisions, scoring)
//! - `scene`: Display list the host renders (the core decides what and where)
//! - `questions`: Validated multiple-choice question bank
//! - `config`: Data-driven stage rules and timing constants

pub mod config;
pub mod questions;
pub mod scene;
pub mod sim;

pub use config::{GameConfig, StageRules};
pub use questions::{BankError, Question, QuestionBank};

use glam::Vec2;

/// Fixed gameplay constants (everything stage-variant lives in [`GameConfig`])
pub mod consts {
    /// Minimum perception confidence for a hand to participate in collisions
    pub const HAND_CONFIDENCE_MIN: f32 = 0.7;

    /// Base visual size of a food item in pixels (square bounds before jitter)
    pub const FOOD_BASE_SIZE: f32 = 150.0;
    /// Hit-box inset per side, as a fraction of the item bounds
    pub const FOOD_HITBOX_INSET: f32 = 0.15;
    /// Random visual scale jitter applied at spawn (0.9 - 1.1)
    pub const FOOD_SCALE_JITTER: f32 = 0.2;

    /// Focus-trigger target size in pixels
    pub const FOCUS_SIZE: f32 = 200.0;
    /// Extra padding around the focus target accepted as a touch
    pub const FOCUS_HIT_PADDING: f32 = 30.0;

    /// Margin kept between spawned items and the canvas edges
    pub const SPAWN_EDGE_MARGIN: f32 = 15.0;
    /// Conservative square footprint used for the exclusion-zone overlap test
    pub const SPAWN_FOOTPRINT: f32 = 140.0;

    /// Exclusion zone height as a fraction of canvas height
    pub const EXCLUSION_HEIGHT_PCT: f32 = 0.25;
    /// Lower bound on the exclusion zone height in pixels
    pub const EXCLUSION_MIN_HEIGHT: f32 = 80.0;
    /// Upper bound on the exclusion zone height, as a fraction of canvas height
    pub const EXCLUSION_MAX_HEIGHT_PCT: f32 = 0.35;

    /// Number of player slots
    pub const PLAYER_COUNT: usize = 2;
}

/// Mirror an x coordinate across the vertical canvas axis.
///
/// The webcam feed is displayed selfie-style, so perception coordinates are
/// horizontally flipped relative to game space. This transform is applied
/// exactly once, where hand observations enter the core.
#[inline]
pub fn mirror_x(canvas_width: f32, x: f32) -> f32 {
    canvas_width - x
}

/// Mirror a point across the vertical canvas axis
#[inline]
pub fn mirror_point(canvas_width: f32, p: Vec2) -> Vec2 {
    Vec2::new(canvas_width - p.x, p.y)
}
