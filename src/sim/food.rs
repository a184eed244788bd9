//! Spawnable food items

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hand::TrackedHand;
use super::rect::Rect;
use crate::consts::FOOD_HITBOX_INSET;

/// Classification driving scoring and per-stage spawn eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    /// Gluten-free and healthy
    Wholesome,
    /// Gluten-free but not healthy
    Indulgent,
    /// Contains gluten
    Allergen,
}

impl FoodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodKind::Wholesome => "wholesome",
            FoodKind::Indulgent => "indulgent",
            FoodKind::Allergen => "allergen",
        }
    }
}

/// A positioned, time-bounded, collectable item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u32,
    /// Top-left corner of the visual bounds
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: FoodKind,
    /// Opaque artwork selector; the host resolves it modulo its asset list
    pub image_index: u32,
    pub spawned_at: f64,
    pub lifetime_ms: f64,
    /// Cleared exactly once, on expiry or collection
    pub active: bool,
}

impl FoodItem {
    pub fn new(
        id: u32,
        pos: Vec2,
        size: Vec2,
        kind: FoodKind,
        image_index: u32,
        spawned_at: f64,
        lifetime_ms: f64,
    ) -> Self {
        Self {
            id,
            pos,
            size,
            kind,
            image_index,
            spawned_at,
            lifetime_ms,
            active: true,
        }
    }

    /// Visual bounds
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Collision bounds: visual bounds shrunk per side so ragged artwork
    /// edges do not register as touches
    pub fn hitbox(&self) -> Rect {
        self.bounds()
            .inset(self.size.x * FOOD_HITBOX_INSET, self.size.y * FOOD_HITBOX_INSET)
    }

    /// Expire the item once its lifetime has elapsed
    pub fn update(&mut self, now: f64) {
        if now - self.spawned_at > self.lifetime_ms {
            self.active = false;
        }
    }

    /// True when any contact keypoint of `hand` lies inside the hit-box
    pub fn check_collision(&self, hand: &TrackedHand) -> bool {
        if !self.active {
            return false;
        }
        let hitbox = self.hitbox();
        hand.contact_points().any(|p| hitbox.contains(p))
    }
}
