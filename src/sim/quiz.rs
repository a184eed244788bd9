//! Quiz prompts: dwell-time selection over text-wrapped option boxes
//!
//! Hovering an option continuously for the dwell threshold confirms it.
//! Layout depends on text measurement, which only the host can do (canvas
//! fonts), so it enters through the `TextMeasure` seam and is cached per
//! canvas size.

use glam::Vec2;
use serde::Serialize;

use super::rect::Rect;
use crate::questions::Question;

/// Text width oracle supplied by the host
pub trait TextMeasure {
    /// Width in pixels of `text` at the given font size
    fn text_width(&self, text: &str, font_px: f32) -> f32;
}

/// Fixed-advance measurer for tests and the headless demo
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasure {
    /// Glyph advance as a fraction of the font size
    pub advance: f32,
}

impl Default for FixedMeasure {
    fn default() -> Self {
        Self { advance: 0.55 }
    }
}

impl TextMeasure for FixedMeasure {
    fn text_width(&self, text: &str, font_px: f32) -> f32 {
        text.chars().count() as f32 * font_px * self.advance
    }
}

// Card layout constants
const CARD_WIDTH_PCT: f32 = 0.85;
const PADDING: f32 = 20.0;
const QUESTION_FONT: f32 = 24.0;
const QUESTION_LINE_GAP: f32 = 8.0;
const QUESTION_GAP: f32 = 16.0;
const OPTION_FONT: f32 = 18.0;
const OPTION_LINE_GAP: f32 = 7.0;
const OPTION_SPACING: f32 = 8.0;
const OPTION_MIN_HEIGHT: f32 = 55.0;
const OPTION_H_PADDING: f32 = 16.0;
/// Room reserved on the right of each option for the selection indicator
const OPTION_MARKER_WIDTH: f32 = 50.0;

/// Computed option geometry
#[derive(Debug, Clone, Serialize)]
pub struct OptionLayout {
    pub rect: Rect,
    pub lines: Vec<String>,
}

/// Computed card geometry, cached per canvas size
#[derive(Debug, Clone, Serialize)]
pub struct QuizLayout {
    pub card: Rect,
    pub question_font: f32,
    pub option_font: f32,
    pub question_lines: Vec<String>,
    pub options: Vec<OptionLayout>,
    key: (u32, u32),
}

/// Dwell-selection state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Idle,
    Selecting { option: usize, since: f64 },
}

/// Feedback shown after a confirmed selection; freezes further selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub option: usize,
    pub correct: bool,
    pub since: f64,
}

/// An on-screen multiple-choice prompt for one player
#[derive(Debug, Clone)]
pub struct QuizPrompt {
    pub question_id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub selection: Selection,
    pub feedback: Option<Feedback>,
    dwell_ms: f64,
    layout: Option<QuizLayout>,
}

impl QuizPrompt {
    pub fn new(question: &Question, dwell_ms: f64) -> Self {
        Self {
            question_id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            correct: question.correct,
            selection: Selection::Idle,
            feedback: None,
            dwell_ms,
            layout: None,
        }
    }

    pub fn layout(&self) -> Option<&QuizLayout> {
        self.layout.as_ref()
    }

    /// Drop the cached layout (canvas resized or prompt relocated)
    pub fn invalidate_layout(&mut self) {
        self.layout = None;
    }

    /// Compute (or reuse) the card layout for the given canvas size
    pub fn ensure_layout(&mut self, canvas: Vec2, measure: &dyn TextMeasure) -> &QuizLayout {
        let key = (canvas.x as u32, canvas.y as u32);
        let stale = self.layout.as_ref().map(|l| l.key) != Some(key);
        if stale {
            self.layout = Some(self.compute_layout(canvas, key, measure));
        }
        self.layout.as_ref().expect("layout just ensured")
    }

    fn compute_layout(&self, canvas: Vec2, key: (u32, u32), measure: &dyn TextMeasure) -> QuizLayout {
        let width = (canvas.x * CARD_WIDTH_PCT).floor();
        let question_font = (width / 18.0).floor().min(QUESTION_FONT).max(18.0);
        let option_font = (width / 24.0).floor().min(OPTION_FONT).max(17.0);

        let max_text_width = width - PADDING * 2.0;
        let question_lines = wrap_lines(measure, &self.prompt, max_text_width, question_font);
        let question_height = question_lines.len() as f32 * (question_font + QUESTION_LINE_GAP);

        let option_wrap_width = max_text_width - OPTION_H_PADDING * 2.0 - OPTION_MARKER_WIDTH;
        let option_line_height = option_font + OPTION_LINE_GAP;
        let wrapped: Vec<(Vec<String>, f32)> = self
            .options
            .iter()
            .map(|opt| {
                let lines = wrap_lines(measure, opt, option_wrap_width, option_font);
                let h = (lines.len() as f32 * option_line_height + 20.0).max(OPTION_MIN_HEIGHT);
                (lines, h)
            })
            .collect();

        let options_height: f32 = wrapped.iter().map(|(_, h)| h).sum::<f32>()
            + (self.options.len().saturating_sub(1)) as f32 * OPTION_SPACING;
        let total_height = PADDING + question_height + QUESTION_GAP + options_height + PADDING;

        let card = Rect::new(
            ((canvas.x - width) / 2.0).floor(),
            ((canvas.y - total_height) / 2.0).floor(),
            width,
            total_height,
        );

        let option_width = width - PADDING * 2.0;
        let mut y = card.y + PADDING + question_height + QUESTION_GAP;
        let options = wrapped
            .into_iter()
            .map(|(lines, h)| {
                let rect = Rect::new(card.x + PADDING, y, option_width, h);
                y += h + OPTION_SPACING;
                OptionLayout { rect, lines }
            })
            .collect();

        QuizLayout {
            card,
            question_font,
            option_font,
            question_lines,
            options,
            key,
        }
    }

    /// Track one pointer sample against the option rectangles.
    ///
    /// Returns the confirmed option index on the first frame the dwell
    /// threshold is met; otherwise updates the selection state. While
    /// feedback is showing, no new selection can begin.
    pub fn check_collision(&mut self, point: Vec2, now: f64) -> Option<usize> {
        if self.feedback.is_some() {
            return None;
        }
        let Some(layout) = self.layout.as_ref() else {
            return None;
        };

        for (i, option) in layout.options.iter().enumerate() {
            if !option.rect.contains(point) {
                continue;
            }
            match self.selection {
                Selection::Selecting { option: current, since } if current == i => {
                    if now - since >= self.dwell_ms {
                        return Some(i);
                    }
                }
                // Entering a rect (or moving to a different one) restarts
                // the dwell timer
                _ => {
                    self.selection = Selection::Selecting { option: i, since: now };
                }
            }
            return None;
        }

        self.selection = Selection::Idle;
        None
    }

    /// Currently-selecting option and its dwell progress in [0, 1]
    pub fn selection_progress(&self, now: f64) -> Option<(usize, f32)> {
        match self.selection {
            Selection::Selecting { option, since } if self.feedback.is_none() => {
                let progress = ((now - since) / self.dwell_ms).clamp(0.0, 1.0) as f32;
                Some((option, progress))
            }
            _ => None,
        }
    }

    /// Enter the feedback state; selection is frozen until discarded
    pub fn show_feedback(&mut self, option: usize, correct: bool, now: f64) {
        self.feedback = Some(Feedback {
            option,
            correct,
            since: now,
        });
    }

    /// Shift captured timestamps (pause/resume)
    pub fn shift_time(&mut self, delta: f64) {
        if let Selection::Selecting { ref mut since, .. } = self.selection {
            *since += delta;
        }
        if let Some(ref mut fb) = self.feedback {
            fb.since += delta;
        }
    }
}

/// Greedy word wrap against the measured width
fn wrap_lines(measure: &dyn TextMeasure, text: &str, max_width: f32, font_px: f32) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measure.text_width(&candidate, font_px) > max_width && !line.is_empty() {
            lines.push(line);
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(1280.0, 720.0);

    fn question() -> Question {
        Question {
            id: 1,
            prompt: "Can a knife used on regular bread be reused?".into(),
            options: vec!["Yes, washed well".into(), "Never".into(), "Only plastic".into()],
            correct: 0,
        }
    }

    fn laid_out_prompt() -> QuizPrompt {
        let mut p = QuizPrompt::new(&question(), 3_000.0);
        p.ensure_layout(CANVAS, &FixedMeasure::default());
        p
    }

    fn option_center(p: &QuizPrompt, i: usize) -> Vec2 {
        p.layout().unwrap().options[i].rect.center()
    }

    #[test]
    fn test_layout_covers_all_options() {
        let p = laid_out_prompt();
        let layout = p.layout().unwrap();
        assert_eq!(layout.options.len(), 3);
        for opt in &layout.options {
            assert!(opt.rect.h >= 55.0);
            assert!(layout.card.contains(Vec2::new(opt.rect.x, opt.rect.y)));
        }
        // Options are stacked without overlap
        for pair in layout.options.windows(2) {
            assert!(pair[0].rect.y + pair[0].rect.h <= pair[1].rect.y);
        }
    }

    #[test]
    fn test_layout_cache_invalidated_by_resize() {
        let mut p = laid_out_prompt();
        let card_before = p.layout().unwrap().card;
        // Same size: cached layout object is reused (same key)
        p.ensure_layout(CANVAS, &FixedMeasure::default());
        assert_eq!(p.layout().unwrap().card, card_before);
        // New size: recomputed
        p.ensure_layout(Vec2::new(800.0, 600.0), &FixedMeasure::default());
        assert_ne!(p.layout().unwrap().card, card_before);
    }

    #[test]
    fn test_dwell_below_threshold_never_confirms() {
        let mut p = laid_out_prompt();
        let target = option_center(&p, 0);
        for frame in 0..180 {
            let now = frame as f64 * 16.0; // just under 3000ms total
            assert_eq!(p.check_collision(target, now), None);
        }
    }

    #[test]
    fn test_dwell_confirms_at_first_frame_past_threshold() {
        let mut p = laid_out_prompt();
        let target = option_center(&p, 1);
        assert_eq!(p.check_collision(target, 0.0), None); // enters, since = 0
        assert_eq!(p.check_collision(target, 2_999.9), None);
        assert_eq!(p.check_collision(target, 3_000.0), Some(1));
    }

    #[test]
    fn test_moving_between_options_restarts_dwell() {
        let mut p = laid_out_prompt();
        let a = option_center(&p, 0);
        let b = option_center(&p, 1);

        assert_eq!(p.check_collision(a, 0.0), None);
        assert_eq!(p.check_collision(b, 2_000.0), None); // restart on b
        // 3000ms after first entry but only 1500ms on b: not confirmed
        assert_eq!(p.check_collision(b, 3_500.0), None);
        assert_eq!(p.check_collision(b, 5_000.0), Some(1));
    }

    #[test]
    fn test_leaving_all_options_resets_to_idle() {
        let mut p = laid_out_prompt();
        let target = option_center(&p, 0);
        assert_eq!(p.check_collision(target, 0.0), None);
        assert_eq!(p.check_collision(Vec2::new(-10.0, -10.0), 1_000.0), None);
        assert_eq!(p.selection, Selection::Idle);
        // Re-entry measures from the new entry time
        assert_eq!(p.check_collision(target, 2_000.0), None);
        assert_eq!(p.check_collision(target, 4_999.0), None);
        assert_eq!(p.check_collision(target, 5_000.0), Some(0));
    }

    #[test]
    fn test_feedback_freezes_selection() {
        let mut p = laid_out_prompt();
        let target = option_center(&p, 2);
        p.show_feedback(2, false, 100.0);
        for frame in 0..400 {
            assert_eq!(p.check_collision(target, frame as f64 * 16.0), None);
        }
        assert_eq!(p.selection, Selection::Idle);
    }

    #[test]
    fn test_selection_progress() {
        let mut p = laid_out_prompt();
        let target = option_center(&p, 0);
        assert_eq!(p.selection_progress(0.0), None);
        p.check_collision(target, 0.0);
        let (option, progress) = p.selection_progress(1_500.0).unwrap();
        assert_eq!(option, 0);
        assert!((progress - 0.5).abs() < 0.01);
    }
}
