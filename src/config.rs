//! Game configuration and stage rules
//!
//! The legacy variants of this game hardcoded diverging stage counts,
//! durations and score policies; here they are all data. Persisted
//! separately from any session state in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::FoodKind;

/// Points granted (or deducted) per collected food kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindPoints {
    pub wholesome: i32,
    pub indulgent: i32,
    pub allergen: i32,
}

impl KindPoints {
    pub const ZERO: KindPoints = KindPoints {
        wholesome: 0,
        indulgent: 0,
        allergen: 0,
    };

    pub fn for_kind(&self, kind: FoodKind) -> i32 {
        match kind {
            FoodKind::Wholesome => self.wholesome,
            FoodKind::Indulgent => self.indulgent,
            FoodKind::Allergen => self.allergen,
        }
    }
}

/// Rules for a single stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRules {
    /// Short description shown on the intro card and results screen
    pub description: String,
    /// Food kinds eligible to spawn during this stage (empty = no spawning)
    pub spawn_kinds: Vec<FoodKind>,
    /// Score deltas applied on collection
    pub points: KindPoints,
    /// Quiz stage: questions gated behind the focus trigger instead of items
    pub quiz: bool,
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of active play per stage (ms)
    pub stage_duration_ms: f64,
    /// Pre-stage countdown length (ms)
    pub countdown_ms: f64,
    /// How long the stage intro card is held (ms)
    pub stage_intro_ms: f64,

    // === Spawner ===
    /// Interval between spawn attempts (ms)
    pub spawn_interval_ms: f64,
    /// Cap on simultaneously active items
    pub max_active_items: usize,
    /// Minimum center distance between active items (px)
    pub min_item_distance: f32,
    /// Placement attempts per spawn tick before giving up
    pub max_spawn_attempts: u32,
    /// Item lifetime range (ms)
    pub item_lifetime_min_ms: f64,
    pub item_lifetime_max_ms: f64,

    // === Quiz ===
    /// Continuous hover time required to confirm an option (ms)
    pub dwell_threshold_ms: f64,
    /// How long answer feedback is held before the prompt is discarded (ms)
    pub feedback_ms: f64,
    /// Points per correct quiz answer
    pub quiz_correct_points: i32,

    // === Scoring policy ===
    /// Clamp cumulative scores at zero after negative deltas
    pub clamp_score_at_zero: bool,

    /// Per-stage rules, in play order
    pub stages: Vec<StageRules>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stage_duration_ms: 120_000.0,
            countdown_ms: 3_000.0,
            stage_intro_ms: 4_000.0,

            spawn_interval_ms: 500.0,
            max_active_items: 12,
            min_item_distance: 170.0,
            max_spawn_attempts: 15,
            item_lifetime_min_ms: 4_000.0,
            item_lifetime_max_ms: 7_000.0,

            dwell_threshold_ms: 3_000.0,
            feedback_ms: 1_000.0,
            quiz_correct_points: 10,

            clamp_score_at_zero: true,

            stages: vec![
                StageRules {
                    description: "Spotting foods with and without gluten".into(),
                    spawn_kinds: vec![
                        FoodKind::Wholesome,
                        FoodKind::Indulgent,
                        FoodKind::Allergen,
                    ],
                    points: KindPoints {
                        wholesome: 10,
                        indulgent: 3,
                        allergen: -15,
                    },
                    quiz: false,
                },
                StageRules {
                    description: "Choosing the healthier gluten-free option".into(),
                    spawn_kinds: vec![FoodKind::Wholesome, FoodKind::Indulgent],
                    points: KindPoints {
                        wholesome: 7,
                        indulgent: -10,
                        allergen: 0,
                    },
                    quiz: false,
                },
                StageRules {
                    description: "Cross-contamination in everyday situations".into(),
                    spawn_kinds: Vec::new(),
                    points: KindPoints::ZERO,
                    quiz: true,
                },
            ],
        }
    }
}

impl GameConfig {
    /// Number of stages in a full session
    pub fn stage_count(&self) -> u32 {
        self.stages.len() as u32
    }

    /// Rules for a 1-based stage number
    pub fn rules_for(&self, stage: u32) -> &StageRules {
        &self.stages[(stage as usize - 1).min(self.stages.len() - 1)]
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "celiac_catch_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(config) = serde_json::from_str(&json) {
                    log::info!("Loaded game config from LocalStorage");
                    return config;
                }
            }
        }

        log::info!("Using default game config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Game config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
