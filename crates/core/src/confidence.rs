use serde::{Deserialize, Serialize};

use crate::model::{Question, QuizResponseMap};

/// Percentage at or above which confidence is `High`.
pub const HIGH_CONFIDENCE: f64 = 70.0;
/// Percentage at or above which confidence is `Medium`.
pub const MEDIUM_CONFIDENCE: f64 = 40.0;

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Coarse bucket of a confidence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Buckets a percentage, checking thresholds high to low.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= HIGH_CONFIDENCE {
            Self::High
        } else if percentage >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Score over the answered questions of one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

impl ConfidenceResult {
    #[must_use]
    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_percentage(self.percentage)
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Scores `responses` against `bank`.
///
/// Only answered questions count: a response whose question id is not in the
/// bank is skipped, and a bank question without a response adds nothing to
/// `total`. One correct answer out of one answered reads as 100%.
///
/// The result depends only on its inputs, so recomputing from the stored map
/// after each new answer gives the same value as any incremental tally would.
///
/// # Examples
///
/// ```
/// # use restart_core::confidence::compute_confidence;
/// # use restart_core::model::{Question, QuestionId, QuizResponseMap};
/// let bank = vec![
///     Question::new(QuestionId::new(1), "q1", vec!["a".into(), "b".into(), "c".into()], 2),
///     Question::new(QuestionId::new(2), "q2", vec!["a".into(), "b".into()], 0),
/// ];
/// let responses: QuizResponseMap = [(QuestionId::new(1), 2)].into_iter().collect();
///
/// let result = compute_confidence(&responses, &bank);
/// assert_eq!((result.correct, result.total), (1, 1));
/// assert_eq!(result.percentage, 100.0);
/// ```
#[must_use]
pub fn compute_confidence(responses: &QuizResponseMap, bank: &[Question]) -> ConfidenceResult {
    let mut correct = 0_u32;
    let mut total = 0_u32;

    for (question_id, selected) in responses.iter() {
        let Some(question) = bank.iter().find(|q| q.id == question_id) else {
            continue;
        };
        total = total.saturating_add(1);
        if question.is_correct(selected) {
            correct = correct.saturating_add(1);
        }
    }

    let percentage = if total > 0 {
        f64::from(correct) / f64::from(total) * 100.0
    } else {
        0.0
    };

    ConfidenceResult {
        correct,
        total,
        percentage,
    }
}

/// Questions a review quiz should cover after `lessons_completed` lessons.
///
/// Questions tied to a lesson are included once that lesson is done (at least
/// lesson 1 counts as done); untied questions are always included. If nothing
/// qualifies, the first question of the bank is used so a quiz is never empty.
#[must_use]
pub fn review_questions(bank: &[Question], lessons_completed: u32) -> Vec<Question> {
    let reached = lessons_completed.max(1);
    let mut selected: Vec<Question> = bank
        .iter()
        .filter(|q| q.lesson.is_none_or(|lesson| lesson <= reached))
        .cloned()
        .collect();

    if selected.is_empty() {
        selected.extend(bank.first().cloned());
    }
    selected
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
