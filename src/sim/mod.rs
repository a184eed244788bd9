//! Frame-driven session core
//!
//! All gameplay logic lives here. This module must stay pure and host-free:
//! - Time enters as the host's frame timestamp, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod focus;
pub mod food;
pub mod hand;
pub mod quiz;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use focus::FocusTarget;
pub use food::{FoodItem, FoodKind};
pub use hand::{HandInput, TrackedHand, keypoint};
pub use quiz::{FixedMeasure, QuizLayout, QuizPrompt, Selection, TextMeasure};
pub use rect::Rect;
pub use spawn::{find_spawn_position, spawn_food};
pub use state::{
    DeferredAction, FoodTally, GameEvent, GamePhase, GameState, PlayerState, Scheduled,
};
pub use tick::{FrameInput, update};
