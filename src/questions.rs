//! Multiple-choice question bank
//!
//! Content is host-supplied data (JSON); the bank validates it up front
//! because an empty or malformed bank would silently block the quiz stage.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key into the answered set: (player slot, question id)
pub type QuestionKey = (usize, u32);

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct: usize,
}

/// Validation errors for question-bank content
#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank is empty")]
    Empty,
    #[error("question {id}: needs at least two options, got {got}")]
    TooFewOptions { id: u32, got: usize },
    #[error("question {id}: correct index {correct} out of range for {options} options")]
    CorrectOutOfRange {
        id: u32,
        correct: usize,
        options: usize,
    },
    #[error("duplicate question id {0}")]
    DuplicateId(u32),
    #[error("question bank is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A validated, immutable set of questions
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, rejecting content that would break the quiz stage
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(BankError::DuplicateId(q.id));
            }
            if q.options.len() < 2 {
                return Err(BankError::TooFewOptions {
                    id: q.id,
                    got: q.options.len(),
                });
            }
            if q.correct >= q.options.len() {
                return Err(BankError::CorrectOutOfRange {
                    id: q.id,
                    correct: q.correct,
                    options: q.options.len(),
                });
            }
        }

        Ok(Self { questions })
    }

    /// Parse and validate a bank from JSON (an array of questions)
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Small built-in bank so the demo and tests run without host content
    pub fn builtin() -> Self {
        let q = |id: u32, prompt: &str, options: &[&str], correct: usize| Question {
            id,
            prompt: prompt.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct,
        };

        // Validated literals; construction cannot fail.
        Self::new(vec![
            q(
                1,
                "A knife was just used to cut regular bread. Can it be used on gluten-free food?",
                &["Yes, if it is washed well first", "No, never again", "Yes, if it is plastic"],
                0,
            ),
            q(
                2,
                "Is it safe to keep gluten-free food next to regular food in the fridge?",
                &[
                    "No, never",
                    "Yes, on different shelves",
                    "Yes, in sealed containers",
                ],
                2,
            ),
            q(
                3,
                "Gluten-free meat was grilled next to sausages with bread on the same grill. What should you do?",
                &[
                    "Eat it if they never touched",
                    "Avoid it: contact or drippings may have carried gluten",
                    "Just trim the part that touched the bread",
                ],
                1,
            ),
            q(
                4,
                "Can the same oil be reused to fry plain potatoes after frying breaded food?",
                &[
                    "No, never",
                    "Yes, if the oil is replaced afterwards",
                    "Yes, if the oil is filtered well",
                ],
                0,
            ),
            q(
                5,
                "A strainer was used for regular pasta. What is recommended for gluten-free pasta?",
                &[
                    "Do not use it: gluten can stay trapped in the mesh",
                    "Use it after rinsing with hot water",
                    "Wash only the outside",
                ],
                0,
            ),
            q(
                6,
                "Which of these can carry hidden gluten in a kitchen?",
                &[
                    "Oil previously used to fry breaded cutlets",
                    "Tap water",
                    "A clean glass",
                ],
                0,
            ),
        ])
        .expect("builtin bank is valid")
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Pick the next question for a player.
    ///
    /// Filters out questions the player already answered; once exhausted the
    /// player's answered entries are cleared so questions may repeat. With
    /// more than one candidate the immediately-previous question is excluded
    /// to avoid back-to-back repeats. Uniform pick among the remainder.
    pub fn pick_for<R: Rng>(
        &self,
        rng: &mut R,
        answered: &mut HashSet<QuestionKey>,
        player: usize,
        last: Option<u32>,
    ) -> &Question {
        let mut available: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| !answered.contains(&(player, q.id)))
            .collect();

        if available.is_empty() {
            answered.retain(|&(p, _)| p != player);
            available = self.questions.iter().collect();
        }

        if available.len() > 1 {
            if let Some(last_id) = last {
                available.retain(|q| q.id != last_id);
            }
        }

        available[rng.random_range(0..available.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bank3() -> QuestionBank {
        QuestionBank::new(
            (1..=3)
                .map(|id| Question {
                    id,
                    prompt: format!("q{id}"),
                    options: vec!["a".into(), "b".into()],
                    correct: 0,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert!(matches!(QuestionBank::new(vec![]), Err(BankError::Empty)));
    }

    #[test]
    fn test_bad_correct_index_rejected() {
        let result = QuestionBank::new(vec![Question {
            id: 1,
            prompt: "q".into(),
            options: vec!["a".into(), "b".into()],
            correct: 2,
        }]);
        assert!(matches!(
            result,
            Err(BankError::CorrectOutOfRange { id: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let q = Question {
            id: 7,
            prompt: "q".into(),
            options: vec!["a".into(), "b".into()],
            correct: 0,
        };
        assert!(matches!(
            QuestionBank::new(vec![q.clone(), q]),
            Err(BankError::DuplicateId(7))
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{"id":1,"prompt":"q","options":["a","b","c"],"correct":1}]"#;
        let bank = QuestionBank::from_json(json).unwrap();
        assert_eq!(bank.len(), 1);

        assert!(QuestionBank::from_json("[]").is_err());
        assert!(QuestionBank::from_json("not json").is_err());
    }

    #[test]
    fn test_pick_skips_answered() {
        let bank = bank3();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut answered = HashSet::from([(0, 1), (0, 2)]);

        for _ in 0..20 {
            let q = bank.pick_for(&mut rng, &mut answered, 0, None);
            assert_eq!(q.id, 3);
        }
    }

    #[test]
    fn test_pick_avoids_back_to_back_repeat() {
        let bank = bank3();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut answered = HashSet::new();

        let mut last = None;
        for _ in 0..50 {
            let q = bank.pick_for(&mut rng, &mut answered, 0, last);
            if let Some(prev) = last {
                assert_ne!(q.id, prev);
            }
            last = Some(q.id);
        }
    }

    #[test]
    fn test_exhaustion_clears_only_that_player() {
        let bank = bank3();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut answered: HashSet<QuestionKey> =
            HashSet::from([(0, 1), (0, 2), (0, 3), (1, 1)]);

        // Player 0 exhausted the bank: their entries clear, player 1's stay.
        let _ = bank.pick_for(&mut rng, &mut answered, 0, None);
        assert!(!answered.contains(&(0, 1)));
        assert!(answered.contains(&(1, 1)));
    }

    #[test]
    fn test_builtin_bank_is_valid() {
        let bank = QuestionBank::builtin();
        assert!(bank.len() >= 4);
        for q in bank.iter() {
            assert!(q.correct < q.options.len());
        }
    }
}
