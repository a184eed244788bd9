//! Session state and core types
//!
//! Everything the stage machine mutates lives here. Timers are captured
//! start timestamps compared against the host-supplied frame time; deferred
//! mutations are explicit scheduled entries carrying a generation token so a
//! stage reset can never be corrupted by a stale action.

use std::collections::HashSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::focus::FocusTarget;
use super::food::{FoodItem, FoodKind};
use super::quiz::QuizPrompt;
use super::rect::Rect;
use crate::config::{GameConfig, StageRules};
use crate::consts::{
    EXCLUSION_HEIGHT_PCT, EXCLUSION_MAX_HEIGHT_PCT, EXCLUSION_MIN_HEIGHT, PLAYER_COUNT,
};
use crate::questions::{QuestionBank, QuestionKey};

/// Current phase of the session.
///
/// Exactly one phase holds at any time; Intro, StageVideo and StageResults
/// advance only through explicit host calls, the rest are timer-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Blocking intro overlay; dismissed by an explicit user action
    Intro,
    /// Host is playing the stage video; ends via `stage_video_finished`
    StageVideo,
    /// Timed stage intro card
    StageIntro,
    /// 3..2..1 before active play
    Countdown,
    /// Active play
    Playing,
    /// Per-stage results; host triggers repeat or continue
    StageResults,
    /// Session finished
    GameOver,
}

/// Per-kind collection tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FoodTally {
    pub wholesome: u32,
    pub indulgent: u32,
    pub allergen: u32,
}

impl FoodTally {
    pub fn record(&mut self, kind: FoodKind) {
        match kind {
            FoodKind::Wholesome => self.wholesome += 1,
            FoodKind::Indulgent => self.indulgent += 1,
            FoodKind::Allergen => self.allergen += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.wholesome + self.indulgent + self.allergen
    }

    /// Rounded percentages for the results screen, in kind order.
    /// All zeros when nothing was collected.
    pub fn percentages(&self) -> [u32; 3] {
        let total = self.total();
        if total == 0 {
            return [0, 0, 0];
        }
        let pct = |n: u32| ((n as f32 / total as f32) * 100.0).round() as u32;
        [pct(self.wholesome), pct(self.indulgent), pct(self.allergen)]
    }
}

/// Per-player accumulators
#[derive(Debug, Clone, Serialize)]
pub struct PlayerState {
    pub slot: usize,
    pub score: i32,
    pub collected: FoodTally,
    pub correct_answers: u32,
}

impl PlayerState {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            score: 0,
            collected: FoodTally::default(),
            correct_answers: 0,
        }
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.collected = FoodTally::default();
        self.correct_answers = 0;
    }

    /// Apply a score delta, clamping at zero when the policy asks for it.
    /// Returns the new cumulative score.
    pub fn apply_points(&mut self, delta: i32, clamp_at_zero: bool) -> i32 {
        self.score += delta;
        if clamp_at_zero && self.score < 0 {
            self.score = 0;
        }
        self.score
    }
}

/// State-change notifications drained by the presentation layer each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A stage is about to be (re)played; the host shows its video
    StageChanged { stage: u32 },
    /// Whole-second countdown display value changed
    CountdownTick { remaining: u32 },
    /// Countdown finished; canvas and player info become visible
    PlayStarted { stage: u32 },
    /// An item was collected (drives the floating score effect + sound cue)
    ItemCollected {
        player: usize,
        kind: FoodKind,
        points: i32,
        at: Vec2,
    },
    ScoreChanged {
        player: usize,
        score: i32,
        delta: i32,
    },
    /// A player touched the focus trigger
    FocusTriggered { player: usize },
    QuestionAsked { player: usize, question_id: u32 },
    /// Dwell selection confirmed; feedback display begins
    QuizFeedback {
        player: usize,
        question_id: u32,
        correct: bool,
    },
    /// Active play elapsed; results are on screen
    StageCompleted { stage: u32, winner: Option<usize> },
    /// Session finished; host stops the camera and re-arms initial controls
    GameEnded,
}

/// Deferred mutations applied on a later tick
#[derive(Debug, Clone)]
pub enum DeferredAction {
    /// Feedback display elapsed: apply score, record the answer, discard the
    /// prompt and re-arm the focus trigger
    ResolveQuiz {
        player: usize,
        question_id: u32,
        correct: bool,
    },
}

/// A scheduled deferred action; dropped unapplied if `generation` no longer
/// matches the session (stage was reset in the meantime)
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub due: f64,
    pub generation: u32,
    pub action: DeferredAction,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub seed: u64,
    pub(crate) rng: Pcg32,

    /// Canvas pixel dimensions (width, height); external, may change any time
    pub canvas: Vec2,
    /// Top band reserved for UI overlays; items never spawn inside it
    pub exclusion_zone: Rect,

    pub phase: GamePhase,
    /// Current stage, 1-based
    pub stage: u32,
    pub stage_started_at: f64,
    pub countdown_started_at: f64,
    pub stage_intro_shown_at: f64,
    pub last_spawn_at: f64,
    pub(crate) last_countdown_value: Option<u32>,

    pub items: Vec<FoodItem>,
    pub players: [PlayerState; PLAYER_COUNT],
    pub prompts: [Option<QuizPrompt>; PLAYER_COUNT],
    pub answered: HashSet<QuestionKey>,
    pub last_question: [Option<u32>; PLAYER_COUNT],

    pub focus: FocusTarget,
    /// Stage-3 sub-state: questions are gated until someone touches the focus
    pub waiting_for_focus: bool,
    pub focus_touched_by: Option<usize>,

    pub bank: QuestionBank,

    /// Bumped on every stage reset; stale scheduled actions check it
    pub generation: u32,
    pub(crate) scheduled: Vec<Scheduled>,
    pub(crate) events: Vec<GameEvent>,

    /// Set while paused; cleared by `resume`, which shifts all timestamps
    pub(crate) pause_started: Option<f64>,

    next_id: u32,
}

impl GameState {
    pub fn new(
        config: GameConfig,
        bank: QuestionBank,
        seed: u64,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Self {
        let mut state = Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            canvas: Vec2::new(canvas_width, canvas_height),
            exclusion_zone: Rect::ZERO,
            phase: GamePhase::Intro,
            stage: 1,
            stage_started_at: 0.0,
            countdown_started_at: 0.0,
            stage_intro_shown_at: 0.0,
            last_spawn_at: 0.0,
            last_countdown_value: None,
            items: Vec::new(),
            players: [PlayerState::new(0), PlayerState::new(1)],
            prompts: [None, None],
            answered: HashSet::new(),
            last_question: [None, None],
            focus: FocusTarget::default(),
            waiting_for_focus: false,
            focus_touched_by: None,
            bank,
            generation: 0,
            scheduled: Vec::new(),
            events: Vec::new(),
            pause_started: None,
            next_id: 1,
        };
        state.update_exclusion_zone();
        state
    }

    /// Allocate a new item ID
    pub(crate) fn next_item_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rules for the current stage
    pub fn stage_rules(&self) -> &StageRules {
        self.config.rules_for(self.stage)
    }

    pub fn active_items(&self) -> impl Iterator<Item = &FoodItem> {
        self.items.iter().filter(|i| i.active)
    }

    /// Winner by strictly-greater score; tie means no winner
    pub fn winner(&self) -> Option<usize> {
        let (a, b) = (self.players[0].score, self.players[1].score);
        if a > b {
            Some(0)
        } else if b > a {
            Some(1)
        } else {
            None
        }
    }

    /// Replace the question bank (sensible before the quiz stage begins)
    pub fn set_question_bank(&mut self, bank: QuestionBank) {
        if self.prompts.iter().any(Option::is_some) {
            log::warn!("replacing question bank while a prompt is active");
        }
        self.bank = bank;
    }

    /// (Re)start a full session from stage 1
    pub fn start_game(&mut self) {
        self.stage = 1;
        self.reset_stage_values();
        self.pause_started = None;
        self.phase = GamePhase::Intro;
        log::info!("game started (seed {})", self.seed);
    }

    /// Finish the session immediately
    pub fn end_game(&mut self) {
        self.prompts = [None, None];
        self.items.clear();
        self.scheduled.clear();
        self.focus.deactivate();
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameEnded);
        log::info!("game ended at stage {}", self.stage);
    }

    /// Host dismissed the intro overlay
    pub fn dismiss_intro(&mut self) {
        if self.phase != GamePhase::Intro {
            log::warn!("dismiss_intro ignored in phase {:?}", self.phase);
            return;
        }
        self.phase = GamePhase::StageVideo;
        self.events.push(GameEvent::StageChanged { stage: self.stage });
    }

    /// Host finished (or skipped) the stage video
    pub fn stage_video_finished(&mut self, now: f64) {
        if self.phase != GamePhase::StageVideo {
            log::warn!("stage_video_finished ignored in phase {:?}", self.phase);
            return;
        }
        self.stage_intro_shown_at = now;
        self.phase = GamePhase::StageIntro;
    }

    /// Replay the current stage from its video
    pub fn repeat_current_stage(&mut self) {
        if self.phase != GamePhase::StageResults {
            log::warn!("repeat_current_stage ignored in phase {:?}", self.phase);
            return;
        }
        self.reset_stage_values();
        self.phase = GamePhase::StageVideo;
        self.events.push(GameEvent::StageChanged { stage: self.stage });
    }

    /// Advance to the next stage, or finish the session after the last one
    pub fn continue_to_next_stage(&mut self) {
        if self.phase != GamePhase::StageResults {
            log::warn!("continue_to_next_stage ignored in phase {:?}", self.phase);
            return;
        }
        self.stage += 1;
        if self.stage > self.config.stage_count() {
            self.end_game();
            return;
        }
        self.reset_stage_values();
        self.phase = GamePhase::StageVideo;
        self.events.push(GameEvent::StageChanged { stage: self.stage });
    }

    /// Clear all per-stage transient state and invalidate pending deferred
    /// actions. Stage number is left untouched.
    pub(crate) fn reset_stage_values(&mut self) {
        self.items.clear();
        self.prompts = [None, None];
        self.answered.clear();
        self.last_question = [None, None];
        self.waiting_for_focus = false;
        self.focus_touched_by = None;
        self.focus.deactivate();
        for p in &mut self.players {
            p.reset();
        }
        self.scheduled.clear();
        self.generation += 1;
        self.last_countdown_value = None;
    }

    /// Freeze all timers
    pub fn pause(&mut self, now: f64) {
        if self.phase == GamePhase::GameOver || self.pause_started.is_some() {
            return;
        }
        self.pause_started = Some(now);
        log::info!("paused");
    }

    /// Unfreeze, shifting every captured timestamp by the pause duration so
    /// elapsed-time math is unaffected
    pub fn resume(&mut self, now: f64) {
        let Some(paused_at) = self.pause_started.take() else {
            return;
        };
        let delta = now - paused_at;
        self.stage_started_at += delta;
        self.countdown_started_at += delta;
        self.stage_intro_shown_at += delta;
        self.last_spawn_at += delta;
        for item in &mut self.items {
            item.spawned_at += delta;
        }
        for prompt in self.prompts.iter_mut().flatten() {
            prompt.shift_time(delta);
        }
        for s in &mut self.scheduled {
            s.due += delta;
        }
        log::info!("resumed after {delta:.0}ms");
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started.is_some()
    }

    /// Update canvas dimensions, recomputing everything keyed by them
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        let new = Vec2::new(width, height);
        if new == self.canvas {
            return;
        }
        self.canvas = new;
        self.update_exclusion_zone();
        for prompt in self.prompts.iter_mut().flatten() {
            prompt.invalidate_layout();
        }
    }

    /// Full-width top band; height is a canvas fraction with sane bounds for
    /// unusual camera aspect ratios
    pub(crate) fn update_exclusion_zone(&mut self) {
        let ch = self.canvas.y;
        let h = EXCLUSION_MIN_HEIGHT
            .max((ch * EXCLUSION_HEIGHT_PCT).round().min((ch * EXCLUSION_MAX_HEIGHT_PCT).round()));
        self.exclusion_zone = Rect::new(0.0, 0.0, self.canvas.x, h);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain pending events for the presentation layer
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(
            GameConfig::default(),
            QuestionBank::builtin(),
            42,
            1280.0,
            720.0,
        )
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let mut p = PlayerState::new(0);
        assert_eq!(p.apply_points(3, true), 3);
        assert_eq!(p.apply_points(-15, true), 0);
        assert_eq!(p.apply_points(10, true), 10);
    }

    #[test]
    fn test_score_unclamped_goes_negative() {
        let mut p = PlayerState::new(0);
        assert_eq!(p.apply_points(3, false), 3);
        assert_eq!(p.apply_points(-15, false), -12);
        assert_eq!(p.apply_points(10, false), -2);
    }

    #[test]
    fn test_tally_percentages() {
        let mut t = FoodTally::default();
        assert_eq!(t.percentages(), [0, 0, 0]);
        t.record(FoodKind::Wholesome);
        t.record(FoodKind::Wholesome);
        t.record(FoodKind::Indulgent);
        t.record(FoodKind::Allergen);
        assert_eq!(t.percentages(), [50, 25, 25]);
    }

    #[test]
    fn test_winner_requires_strictly_greater() {
        let mut s = state();
        assert_eq!(s.winner(), None);
        s.players[1].score = 10;
        assert_eq!(s.winner(), Some(1));
        s.players[0].score = 10;
        assert_eq!(s.winner(), None);
        s.players[0].score = 11;
        assert_eq!(s.winner(), Some(0));
    }

    #[test]
    fn test_exclusion_zone_bounds() {
        let s = state();
        // 25% of 720 = 180, within [80, 252]
        assert_eq!(s.exclusion_zone, Rect::new(0.0, 0.0, 1280.0, 180.0));

        let mut small = state();
        small.set_canvas_size(320.0, 200.0);
        // 25% of 200 = 50, floored to the 80px minimum
        assert_eq!(small.exclusion_zone.h, 80.0);

        let mut tall = state();
        tall.set_canvas_size(1280.0, 2000.0);
        // 25% of 2000 = 500, capped at 35% = 700 -> stays 500
        assert_eq!(tall.exclusion_zone.h, 500.0);
    }

    #[test]
    fn test_reset_preserves_stage_number() {
        let mut s = state();
        s.stage = 2;
        s.phase = GamePhase::StageResults;
        s.players[0].score = 50;
        s.players[0].collected.record(FoodKind::Wholesome);
        s.answered.insert((0, 1));
        s.last_question[0] = Some(1);
        let generation = s.generation;

        s.repeat_current_stage();

        assert_eq!(s.stage, 2);
        assert_eq!(s.phase, GamePhase::StageVideo);
        assert_eq!(s.players[0].score, 0);
        assert_eq!(s.players[0].collected.total(), 0);
        assert!(s.answered.is_empty());
        assert_eq!(s.last_question[0], None);
        assert_eq!(s.generation, generation + 1);
    }

    #[test]
    fn test_continue_past_last_stage_ends_game() {
        let mut s = state();
        s.stage = 3;
        s.phase = GamePhase::StageResults;
        s.continue_to_next_stage();
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.take_events().contains(&GameEvent::GameEnded));
    }

    #[test]
    fn test_resume_shifts_timestamps() {
        let mut s = state();
        s.phase = GamePhase::Playing;
        s.stage_started_at = 1_000.0;
        s.last_spawn_at = 1_500.0;
        s.scheduled.push(Scheduled {
            due: 2_000.0,
            generation: s.generation,
            action: DeferredAction::ResolveQuiz {
                player: 0,
                question_id: 1,
                correct: true,
            },
        });

        s.pause(2_000.0);
        assert!(s.is_paused());
        s.resume(5_000.0);

        assert_eq!(s.stage_started_at, 4_000.0);
        assert_eq!(s.last_spawn_at, 4_500.0);
        assert_eq!(s.scheduled[0].due, 5_000.0);
    }

    #[test]
    fn test_transition_guards() {
        let mut s = state();
        // continue from a non-results phase is ignored
        s.continue_to_next_stage();
        assert_eq!(s.stage, 1);
        assert_eq!(s.phase, GamePhase::Intro);

        s.dismiss_intro();
        assert_eq!(s.phase, GamePhase::StageVideo);
        // dismissing twice is ignored
        s.dismiss_intro();
        assert_eq!(s.phase, GamePhase::StageVideo);
    }
}
