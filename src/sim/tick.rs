//! Frame update
//!
//! One update per rendered frame, driven by the host's animation loop.
//! Advances phase timers, spawns and expires items, dispatches hand
//! collisions and fires due deferred actions. All mutation is synchronous
//! within the call.

use glam::Vec2;

use super::food::FoodKind;
use super::hand::HandInput;
use super::quiz::{QuizPrompt, TextMeasure};
use super::spawn::spawn_food;
use super::state::{DeferredAction, GameEvent, GamePhase, GameState, Scheduled};
use crate::consts::{HAND_CONFIDENCE_MIN, PLAYER_COUNT};

/// Per-frame input: the frame timestamp (ms) and this frame's
/// player-attributed hand observations, already mapped into game space
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub now: f64,
    pub hands: Vec<HandInput>,
}

impl FrameInput {
    /// A frame with no detected hands (normal, not an error)
    pub fn empty(now: f64) -> Self {
        Self {
            now,
            hands: Vec::new(),
        }
    }
}

/// Advance the session by one frame
pub fn update(state: &mut GameState, input: &FrameInput, text: &dyn TextMeasure) {
    if state.is_paused() {
        return;
    }

    match state.phase {
        // Externally driven phases: nothing to do per frame
        GamePhase::Intro
        | GamePhase::StageVideo
        | GamePhase::StageResults
        | GamePhase::GameOver => {}

        GamePhase::StageIntro => {
            if input.now - state.stage_intro_shown_at >= state.config.stage_intro_ms {
                state.countdown_started_at = input.now;
                state.last_countdown_value = None;
                state.phase = GamePhase::Countdown;
            }
        }

        GamePhase::Countdown => handle_countdown(state, input.now),

        GamePhase::Playing => handle_playing(state, input, text),
    }
}

fn handle_countdown(state: &mut GameState, now: f64) {
    let elapsed = now - state.countdown_started_at;
    if elapsed >= state.config.countdown_ms {
        begin_play(state, now);
        return;
    }

    let remaining = ((state.config.countdown_ms - elapsed) / 1000.0).ceil() as u32;
    if state.last_countdown_value != Some(remaining) {
        state.last_countdown_value = Some(remaining);
        state.push_event(GameEvent::CountdownTick { remaining });
    }
}

/// Countdown finished: reset per-stage transients, capture the stage start
/// time and reveal the play field
fn begin_play(state: &mut GameState, now: f64) {
    state.items.clear();
    state.prompts = [None, None];
    state.stage_started_at = now;
    state.last_spawn_at = now;
    state.update_exclusion_zone();

    if state.stage_rules().quiz {
        state.waiting_for_focus = true;
        state.focus_touched_by = None;
        let canvas = state.canvas;
        state.focus.activate(canvas);
    }

    state.phase = GamePhase::Playing;
    state.push_event(GameEvent::PlayStarted { stage: state.stage });
    log::info!("stage {} play started", state.stage);
}

fn handle_playing(state: &mut GameState, input: &FrameInput, text: &dyn TextMeasure) {
    let now = input.now;

    if now - state.stage_started_at > state.config.stage_duration_ms {
        finish_stage(state);
        return;
    }

    fire_scheduled(state, now);

    if !state.stage_rules().spawn_kinds.is_empty()
        && now - state.last_spawn_at > state.config.spawn_interval_ms
    {
        spawn_food(state, now);
        state.last_spawn_at = now;
    }

    if state.stage_rules().quiz {
        if state.waiting_for_focus {
            state.focus.update();
            handle_focus_touch(state, input);
        } else {
            handle_quiz(state, input, text);
        }
    } else {
        for item in &mut state.items {
            item.update(now);
        }
        state.items.retain(|i| i.active);
        dispatch_item_collisions(state, input);
    }
}

/// Active play elapsed: freeze the field and surface results
fn finish_stage(state: &mut GameState) {
    state.prompts = [None, None];
    let winner = state.winner();
    state.push_event(GameEvent::StageCompleted {
        stage: state.stage,
        winner,
    });
    state.phase = GamePhase::StageResults;
    log::info!("stage {} complete, winner {:?}", state.stage, winner);
}

/// Apply due deferred actions; stale generations are dropped unapplied
fn fire_scheduled(state: &mut GameState, now: f64) {
    if state.scheduled.is_empty() {
        return;
    }

    let mut fired: Vec<Scheduled> = Vec::new();
    state.scheduled.retain(|s| {
        if s.due <= now {
            fired.push(s.clone());
            false
        } else {
            true
        }
    });

    for s in fired {
        if s.generation != state.generation {
            log::debug!("dropping stale deferred action (generation {})", s.generation);
            continue;
        }
        apply_deferred(state, s.action);
    }
}

fn apply_deferred(state: &mut GameState, action: DeferredAction) {
    match action {
        DeferredAction::ResolveQuiz {
            player,
            question_id,
            correct,
        } => {
            if correct {
                let points = state.config.quiz_correct_points;
                let clamp = state.config.clamp_score_at_zero;
                let score = state.players[player].apply_points(points, clamp);
                state.events.push(GameEvent::ScoreChanged {
                    player,
                    score,
                    delta: points,
                });
            }
            state.answered.insert((player, question_id));
            state.prompts[player] = None;

            // Re-arm the focus trigger for the next question
            state.waiting_for_focus = true;
            state.focus_touched_by = None;
            let canvas = state.canvas;
            state.focus.activate(canvas);
        }
    }
}

/// Stages 1-2: every confident, player-attributed hand is tested against
/// every active item. Iteration does not short-circuit, so one hand may
/// collect several overlapping items in the same frame.
fn dispatch_item_collisions(state: &mut GameState, input: &FrameInput) {
    let mut collected: Vec<(usize, FoodKind, Vec2)> = Vec::new();

    for hi in &input.hands {
        let Some(player) = hi.player else { continue };
        if player >= PLAYER_COUNT || !hi.hand.is_confident(HAND_CONFIDENCE_MIN) {
            continue;
        }
        for item in &mut state.items {
            if item.check_collision(&hi.hand) {
                item.active = false;
                collected.push((player, item.kind, item.bounds().center()));
            }
        }
    }

    if collected.is_empty() {
        return;
    }

    let clamp = state.config.clamp_score_at_zero;
    for (player, kind, at) in collected {
        let points = state.stage_rules().points.for_kind(kind);
        let p = &mut state.players[player];
        p.collected.record(kind);
        let score = p.apply_points(points, clamp);
        state.events.push(GameEvent::ItemCollected {
            player,
            kind,
            points,
            at,
        });
        state.events.push(GameEvent::ScoreChanged {
            player,
            score,
            delta: points,
        });
    }
}

/// Quiz stage, waiting sub-state: the first confident fingertip on the
/// focus target claims the next question for its player
fn handle_focus_touch(state: &mut GameState, input: &FrameInput) {
    for hi in &input.hands {
        let Some(player) = hi.player else { continue };
        if player >= PLAYER_COUNT || !hi.hand.is_confident(HAND_CONFIDENCE_MIN) {
            continue;
        }
        let Some(tip) = hi.hand.fingertip() else { continue };
        if state.focus.check_collision(tip) {
            state.waiting_for_focus = false;
            state.focus_touched_by = Some(player);
            state.focus.deactivate();
            state.push_event(GameEvent::FocusTriggered { player });
            create_question_for(state, player);
            return;
        }
    }
}

fn create_question_for(state: &mut GameState, player: usize) {
    let question = state
        .bank
        .pick_for(
            &mut state.rng,
            &mut state.answered,
            player,
            state.last_question[player],
        )
        .clone();

    state.last_question[player] = Some(question.id);
    state.push_event(GameEvent::QuestionAsked {
        player,
        question_id: question.id,
    });
    log::debug!("player {player} gets question {}", question.id);
    state.prompts[player] = Some(QuizPrompt::new(&question, state.config.dwell_threshold_ms));
}

/// Quiz stage, answering sub-state: only the triggering player's fingertip
/// drives their prompt
fn handle_quiz(state: &mut GameState, input: &FrameInput, text: &dyn TextMeasure) {
    let Some(player) = state.focus_touched_by else {
        return;
    };
    let now = input.now;
    let canvas = state.canvas;
    let feedback_ms = state.config.feedback_ms;
    let generation = state.generation;

    let Some(prompt) = state.prompts[player].as_mut() else {
        return;
    };
    prompt.ensure_layout(canvas, text);
    if prompt.feedback.is_some() {
        return;
    }

    for hi in &input.hands {
        if hi.player != Some(player) || !hi.hand.is_confident(HAND_CONFIDENCE_MIN) {
            continue;
        }
        let Some(tip) = hi.hand.fingertip() else { continue };
        if let Some(option) = prompt.check_collision(tip, now) {
            let correct = option == prompt.correct;
            let question_id = prompt.question_id;
            prompt.show_feedback(option, correct, now);

            if correct {
                state.players[player].correct_answers += 1;
            }
            state.events.push(GameEvent::QuizFeedback {
                player,
                question_id,
                correct,
            });
            // Score and prompt teardown happen after the feedback display
            state.scheduled.push(Scheduled {
                due: now + feedback_ms,
                generation,
                action: DeferredAction::ResolveQuiz {
                    player,
                    question_id,
                    correct,
                },
            });
            break;
        }
    }
}
