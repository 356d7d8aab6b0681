use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("current lesson must be >= 1")]
    InvalidCurrentLesson,

    #[error("confidence score must be within [0, 100], got {provided}")]
    ConfidenceOutOfRange { provided: f64 },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Triage decision the learner made for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    DoNow,
    Schedule,
    Simplify,
    Drop,
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// Answers collected by the goal-setup flow when a course is started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePlan {
    pub goal: String,
    pub time_commitment: String,
    #[serde(default)]
    pub motivation: String,
}

impl CoursePlan {
    #[must_use]
    pub fn new(goal: impl Into<String>, time_commitment: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            time_commitment: time_commitment.into(),
            motivation: String::new(),
        }
    }

    #[must_use]
    pub fn with_motivation(mut self, motivation: impl Into<String>) -> Self {
        self.motivation = motivation.into();
        self
    }
}

//
// ─── COURSE PROGRESS ───────────────────────────────────────────────────────────
//

/// Per-course progress record, created when the learner starts a course.
///
/// Deserialization runs the same checks as [`CourseProgress::from_persisted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CourseProgressRecord")]
pub struct CourseProgress {
    lessons_completed: u32,
    current_lesson: u32,
    xp_earned: u32,
    streak: u32,
    plan: CoursePlan,
    status: CourseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence_score: Option<f64>,
    started_at: DateTime<Utc>,
    last_accessed: Option<DateTime<Utc>>,
}

/// Unvalidated wire shape of [`CourseProgress`].
#[derive(Deserialize)]
struct CourseProgressRecord {
    lessons_completed: u32,
    current_lesson: u32,
    xp_earned: u32,
    streak: u32,
    plan: CoursePlan,
    #[serde(default)]
    status: CourseStatus,
    #[serde(default)]
    confidence_score: Option<f64>,
    started_at: DateTime<Utc>,
    #[serde(default)]
    last_accessed: Option<DateTime<Utc>>,
}

impl TryFrom<CourseProgressRecord> for CourseProgress {
    type Error = ProgressError;

    fn try_from(raw: CourseProgressRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            raw.plan,
            raw.lessons_completed,
            raw.current_lesson,
            raw.xp_earned,
            raw.streak,
            raw.status,
            raw.confidence_score,
            raw.started_at,
            raw.last_accessed,
        )
    }
}

/// Started courses keyed by id. Iteration order is the course id order.
pub type ProgressMap = BTreeMap<CourseId, CourseProgress>;

impl CourseProgress {
    /// Fresh progress for a course started at `now`.
    ///
    /// Counters start at zero, the next lesson is 1, and `last_accessed` is
    /// stamped so the new course becomes the active one.
    #[must_use]
    pub fn start(plan: CoursePlan, now: DateTime<Utc>) -> Self {
        Self {
            lessons_completed: 0,
            current_lesson: 1,
            xp_earned: 0,
            streak: 0,
            plan,
            status: CourseStatus::DoNow,
            confidence_score: None,
            started_at: now,
            last_accessed: Some(now),
        }
    }

    /// Rehydrate a progress record from an external snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidCurrentLesson` if `current_lesson` is zero.
    /// Returns `ProgressError::ConfidenceOutOfRange` if the score is outside `[0, 100]`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        plan: CoursePlan,
        lessons_completed: u32,
        current_lesson: u32,
        xp_earned: u32,
        streak: u32,
        status: CourseStatus,
        confidence_score: Option<f64>,
        started_at: DateTime<Utc>,
        last_accessed: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressError> {
        if current_lesson == 0 {
            return Err(ProgressError::InvalidCurrentLesson);
        }
        if let Some(score) = confidence_score {
            validate_score(score)?;
        }

        Ok(Self {
            lessons_completed,
            current_lesson,
            xp_earned,
            streak,
            plan,
            status,
            confidence_score,
            started_at,
            last_accessed,
        })
    }

    /// Record a finished lesson worth `xp` and mark the course as accessed.
    pub fn complete_lesson(&mut self, xp: u32, now: DateTime<Utc>) {
        self.lessons_completed = self.lessons_completed.saturating_add(1);
        self.current_lesson = self.current_lesson.saturating_add(1);
        self.xp_earned = self.xp_earned.saturating_add(xp);
        self.streak = self.streak.saturating_add(1);
        self.last_accessed = Some(now);
    }

    pub fn set_status(&mut self, status: CourseStatus) {
        self.status = status;
    }

    /// Store a freshly derived confidence percentage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ConfidenceOutOfRange` if `score` is outside `[0, 100]`.
    pub fn set_confidence(&mut self, score: f64) -> Result<(), ProgressError> {
        validate_score(score)?;
        self.confidence_score = Some(score);
        Ok(())
    }

    #[must_use]
    pub fn lessons_completed(&self) -> u32 {
        self.lessons_completed
    }

    #[must_use]
    pub fn current_lesson(&self) -> u32 {
        self.current_lesson
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn plan(&self) -> &CoursePlan {
        &self.plan
    }

    #[must_use]
    pub fn status(&self) -> CourseStatus {
        self.status
    }

    #[must_use]
    pub fn confidence_score(&self) -> Option<f64> {
        self.confidence_score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn last_accessed(&self) -> Option<DateTime<Utc>> {
        self.last_accessed
    }
}

fn validate_score(score: f64) -> Result<(), ProgressError> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(ProgressError::ConfidenceOutOfRange { provided: score });
    }
    Ok(())
}

//
// ─── QUIZ RESPONSES ────────────────────────────────────────────────────────────
//

/// Selected option per question for one course. Later answers overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizResponseMap(BTreeMap<QuestionId, usize>);

impl QuizResponseMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, returning the option it replaced, if any.
    pub fn record(&mut self, question: QuestionId, selected: usize) -> Option<usize> {
        self.0.insert(question, selected)
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<usize> {
        self.0.get(&question).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, usize)> + '_ {
        self.0.iter().map(|(id, selected)| (*id, *selected))
    }
}

impl FromIterator<(QuestionId, usize)> for QuizResponseMap {
    fn from_iter<T: IntoIterator<Item = (QuestionId, usize)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (question, selected) in iter {
            map.record(question, selected);
        }
        map
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn start_zeroes_counters_and_stamps_access() {
        let now = fixed_now();
        let progress = CourseProgress::start(CoursePlan::new("job", "10min"), now);

        assert_eq!(progress.lessons_completed(), 0);
        assert_eq!(progress.current_lesson(), 1);
        assert_eq!(progress.xp_earned(), 0);
        assert_eq!(progress.streak(), 0);
        assert_eq!(progress.status(), CourseStatus::DoNow);
        assert_eq!(progress.confidence_score(), None);
        assert_eq!(progress.started_at(), now);
        assert_eq!(progress.last_accessed(), Some(now));
    }

    #[test]
    fn complete_lesson_advances_counters() {
        let now = fixed_now();
        let later = now + Duration::hours(3);
        let mut progress = CourseProgress::start(CoursePlan::new("skill", "5min"), now);

        progress.complete_lesson(50, later);
        progress.complete_lesson(50, later);

        assert_eq!(progress.lessons_completed(), 2);
        assert_eq!(progress.current_lesson(), 3);
        assert_eq!(progress.xp_earned(), 100);
        assert_eq!(progress.streak(), 2);
        assert_eq!(progress.last_accessed(), Some(later));
    }

    #[test]
    fn set_confidence_rejects_out_of_range() {
        let mut progress = CourseProgress::start(CoursePlan::default(), fixed_now());

        assert!(progress.set_confidence(66.5).is_ok());
        assert_eq!(progress.confidence_score(), Some(66.5));

        let err = progress.set_confidence(101.0).unwrap_err();
        assert!(matches!(err, ProgressError::ConfidenceOutOfRange { .. }));
        assert!(progress.set_confidence(f64::NAN).is_err());
        assert_eq!(progress.confidence_score(), Some(66.5));
    }

    #[test]
    fn from_persisted_validates_fields() {
        let now = fixed_now();
        let err = CourseProgress::from_persisted(
            CoursePlan::default(),
            0,
            0,
            0,
            0,
            CourseStatus::DoNow,
            None,
            now,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ProgressError::InvalidCurrentLesson);

        let ok = CourseProgress::from_persisted(
            CoursePlan::default(),
            4,
            5,
            200,
            4,
            CourseStatus::Schedule,
            Some(35.0),
            now,
            None,
        )
        .unwrap();
        assert_eq!(ok.status(), CourseStatus::Schedule);
        assert_eq!(ok.last_accessed(), None);
    }

    #[test]
    fn status_defaults_to_do_now_when_missing() {
        let json = r#"{
            "lessons_completed": 1,
            "current_lesson": 2,
            "xp_earned": 50,
            "streak": 1,
            "plan": { "goal": "job", "time_commitment": "10min" },
            "started_at": "2023-11-14T22:13:20Z"
        }"#;
        let progress: CourseProgress = serde_json::from_str(json).unwrap();

        assert_eq!(progress.status(), CourseStatus::DoNow);
        assert_eq!(progress.confidence_score(), None);
        assert_eq!(progress.last_accessed(), None);
        assert_eq!(progress.plan().motivation, "");
    }

    #[test]
    fn deserialize_rejects_invalid_records() {
        let zero_lesson = r#"{
            "lessons_completed": 0,
            "current_lesson": 0,
            "xp_earned": 0,
            "streak": 0,
            "plan": { "goal": "job", "time_commitment": "10min" },
            "started_at": "2023-11-14T22:13:20Z"
        }"#;
        let err = serde_json::from_str::<CourseProgress>(zero_lesson).unwrap_err();
        assert!(err.to_string().contains("current lesson"));

        let bad_score = r#"{
            "lessons_completed": 2,
            "current_lesson": 3,
            "xp_earned": 100,
            "streak": 2,
            "plan": { "goal": "job", "time_commitment": "10min" },
            "confidence_score": 250.0,
            "started_at": "2023-11-14T22:13:20Z"
        }"#;
        let err = serde_json::from_str::<CourseProgress>(bad_score).unwrap_err();
        assert!(err.to_string().contains("confidence score"));
    }

    #[test]
    fn serialized_progress_loads_back() {
        let mut progress = CourseProgress::start(CoursePlan::new("job", "10min"), fixed_now());
        progress.complete_lesson(50, fixed_now());
        progress.set_confidence(75.0).unwrap();

        let json = serde_json::to_string(&progress).unwrap();
        let loaded: CourseProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, progress);
    }

    #[test]
    fn later_answer_overwrites_earlier_one() {
        let mut responses = QuizResponseMap::new();
        assert_eq!(responses.record(QuestionId::new(1), 0), None);
        assert_eq!(responses.record(QuestionId::new(1), 2), Some(0));

        assert_eq!(responses.len(), 1);
        assert_eq!(responses.get(QuestionId::new(1)), Some(2));
    }
}
