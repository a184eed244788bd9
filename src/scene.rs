//! Display list
//!
//! The core decides what to draw and where; painting is the host's job.
//! `build_scene` flattens the current state into ordered draw ops, which the
//! wasm wrapper ships to the JS side as JSON.

use serde::Serialize;

use crate::sim::{FoodKind, GamePhase, GameState, Rect};

/// Visual state of one quiz option box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OptionVisual {
    Normal,
    /// Dwell in progress; `progress` in [0, 1] drives the fill bar
    Selecting { progress: f32 },
    FeedbackCorrect,
    FeedbackIncorrect,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionDraw {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub visual: OptionVisual,
}

/// One paint instruction, in back-to-front order
#[derive(Debug, Clone, Serialize)]
pub enum DrawOp {
    /// The reserved UI band items never spawn under
    ExclusionZone { rect: Rect },
    Food {
        rect: Rect,
        kind: FoodKind,
        /// Host resolves this modulo its per-kind asset list
        image_index: u32,
    },
    FocusTarget {
        rect: Rect,
        /// Pulse animation scale
        scale: f32,
        caption: &'static str,
    },
    QuizCard {
        card: Rect,
        question_font: f32,
        option_font: f32,
        question_lines: Vec<String>,
        options: Vec<OptionDraw>,
    },
    /// Whole-second countdown display (3, 2, 1)
    CountdownNumber { value: u32 },
    /// Remaining stage time for the HUD; `warning` in the final seconds
    StageTimer { remaining_ms: f64, warning: bool },
}

const FOCUS_CAPTION: &str = "Touch the target to start!";
/// HUD switches to the warning style in the last 10 seconds
const TIMER_WARNING_MS: f64 = 10_000.0;

/// Flatten the current state into draw ops
pub fn build_scene(state: &GameState, now: f64) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    match state.phase {
        GamePhase::Countdown => {
            let elapsed = now - state.countdown_started_at;
            let remaining = ((state.config.countdown_ms - elapsed) / 1000.0).ceil();
            ops.push(DrawOp::CountdownNumber {
                value: remaining.max(1.0) as u32,
            });
        }

        GamePhase::Playing => {
            ops.push(DrawOp::ExclusionZone {
                rect: state.exclusion_zone,
            });

            for item in state.active_items() {
                ops.push(DrawOp::Food {
                    rect: item.bounds(),
                    kind: item.kind,
                    image_index: item.image_index,
                });
            }

            if state.stage_rules().quiz {
                if state.waiting_for_focus && state.focus.active {
                    ops.push(DrawOp::FocusTarget {
                        rect: state.focus.bounds(),
                        scale: state.focus.pulse_scale(),
                        caption: FOCUS_CAPTION,
                    });
                } else if let Some(player) = state.focus_touched_by {
                    if let Some(prompt) = state.prompts[player].as_ref() {
                        if let Some(op) = quiz_card(prompt, now) {
                            ops.push(op);
                        }
                    }
                }
            }

            let remaining_ms =
                (state.config.stage_duration_ms - (now - state.stage_started_at)).max(0.0);
            ops.push(DrawOp::StageTimer {
                remaining_ms,
                warning: remaining_ms <= TIMER_WARNING_MS,
            });
        }

        // Intro, videos, results and the final screen are host-rendered
        _ => {}
    }

    ops
}

/// None until the prompt's layout has been computed (first update after it
/// appears or after a resize)
fn quiz_card(prompt: &crate::sim::QuizPrompt, now: f64) -> Option<DrawOp> {
    let layout = prompt.layout()?;
    let selecting = prompt.selection_progress(now);

    let options = layout
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let visual = match (prompt.feedback, selecting) {
                (Some(fb), _) if fb.option == i => {
                    if fb.correct {
                        OptionVisual::FeedbackCorrect
                    } else {
                        OptionVisual::FeedbackIncorrect
                    }
                }
                (None, Some((sel, progress))) if sel == i => OptionVisual::Selecting { progress },
                _ => OptionVisual::Normal,
            };
            OptionDraw {
                rect: opt.rect,
                lines: opt.lines.clone(),
                visual,
            }
        })
        .collect();

    Some(DrawOp::QuizCard {
        card: layout.card,
        question_font: layout.question_font,
        option_font: layout.option_font,
        question_lines: layout.question_lines.clone(),
        options,
    })
}
