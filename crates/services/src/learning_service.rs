use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use restart_core::{
    badges::evaluate_badges,
    confidence::{ConfidenceLevel, ConfidenceResult, compute_confidence, review_questions},
    decision::{DecisionEngine, DecisionInput},
    model::{
        Badge, BadgeId, Celebration, Course, CourseId, CoursePlan, CourseProgress, CourseStatus,
        LearnerState, Question, QuestionId, Recommendation, UserProfile,
    },
    settings::EngineSettings,
    time::Clock,
};
use storage::{CatalogRepository, LearnerRepository, Storage, StorageError};

use crate::error::LearningServiceError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// What changed when a lesson was completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCompletion {
    pub course_id: CourseId,
    pub lessons_completed: u32,
    pub xp_gained: u32,
    pub total_xp: u32,
    pub streak: u32,
    pub unlocked: Vec<BadgeId>,
}

/// Outcome of answering one quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizFeedback {
    pub is_correct: bool,
    pub confidence: ConfidenceResult,
    pub level: ConfidenceLevel,
    pub unlocked: Vec<BadgeId>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Applies learner events to the stored state and re-runs the engines.
///
/// Every operation loads the state, applies one transition in full, and saves
/// it back before returning, so callers see transitions strictly one at a time.
#[derive(Clone)]
pub struct LearningService {
    clock: Clock,
    settings: EngineSettings,
    decisions: DecisionEngine,
    learners: Arc<dyn LearnerRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl LearningService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: EngineSettings,
        learners: Arc<dyn LearnerRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            clock,
            decisions: DecisionEngine::from_settings(&settings),
            settings,
            learners,
            catalog,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, settings: EngineSettings, storage: &Storage) -> Self {
        Self::new(
            clock,
            settings,
            Arc::clone(&storage.learners),
            Arc::clone(&storage.catalog),
        )
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Snapshot of the full learner state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read.
    pub async fn state(&self) -> Result<LearnerState, LearningServiceError> {
        Ok(self.learners.load().await?)
    }

    // ─── Session ───────────────────────────────────────────────────────────────

    /// Log in and start the global streak at one day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn login(
        &self,
        name: &str,
        email: &str,
    ) -> Result<UserProfile, LearningServiceError> {
        let mut state = self.learners.load().await?;
        state.login(name, email, self.now());
        let unlocked = self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;

        info!(user = %state.user.name, unlocked = unlocked.len(), "learner logged in");
        Ok(state.user)
    }

    /// Wipe all progress, XP, streak, responses, and badges.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be cleared.
    pub async fn logout(&self) -> Result<(), LearningServiceError> {
        self.learners.reset().await?;
        info!("learner logged out; state reset");
        Ok(())
    }

    // ─── Courses ───────────────────────────────────────────────────────────────

    /// Start a course with zeroed progress and make it current.
    ///
    /// Starting a course that is already started keeps its progress as is and
    /// only makes it current again; the new `plan` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a session and `UnknownCourse` if the id is
    /// not in the catalog.
    pub async fn start_course(
        &self,
        course_id: &CourseId,
        plan: CoursePlan,
    ) -> Result<CourseProgress, LearningServiceError> {
        let course = self.course(course_id).await?;
        let mut state = self.learners.load().await?;
        ensure_logged_in(&state)?;

        if let Some(existing) = state.progress.get(&course.id).cloned() {
            state.current_course = Some(course.id.clone());
            self.learners.save(&state).await?;
            debug!(course = %course.id, "course already started; resumed");
            return Ok(existing);
        }

        let progress = CourseProgress::start(plan, self.now());
        state.progress.insert(course.id.clone(), progress.clone());
        state.current_course = Some(course.id.clone());
        self.learners.save(&state).await?;

        info!(course = %course.id, goal = %progress.plan().goal, "course started");
        Ok(progress)
    }

    /// Make a started course the current one.
    ///
    /// # Errors
    ///
    /// Returns `CourseNotStarted` if there is no progress for the course.
    pub async fn resume_course(&self, course_id: &CourseId) -> Result<(), LearningServiceError> {
        let mut state = self.learners.load().await?;
        if !state.progress.contains_key(course_id) {
            return Err(LearningServiceError::CourseNotStarted(course_id.clone()));
        }
        state.current_course = Some(course_id.clone());
        self.learners.save(&state).await?;
        Ok(())
    }

    /// Progress for a course, `None` if it was never started.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read.
    pub async fn course_progress(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseProgress>, LearningServiceError> {
        let state = self.learners.load().await?;
        Ok(state.progress.get(course_id).cloned())
    }

    /// Record the learner's triage decision for a course.
    ///
    /// # Errors
    ///
    /// Returns `CourseNotStarted` if there is no progress for the course.
    pub async fn update_course_status(
        &self,
        course_id: &CourseId,
        status: CourseStatus,
    ) -> Result<(), LearningServiceError> {
        let mut state = self.learners.load().await?;
        let progress = state
            .progress
            .get_mut(course_id)
            .ok_or_else(|| LearningServiceError::CourseNotStarted(course_id.clone()))?;
        progress.set_status(status);
        self.learners.save(&state).await?;

        debug!(course = %course_id, ?status, "course status updated");
        Ok(())
    }

    // ─── Lessons, XP, streaks ──────────────────────────────────────────────────

    /// Finish the next lesson: course and global XP, both streaks, badges.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a session and `CourseNotStarted` if there
    /// is no progress for the course.
    pub async fn complete_lesson(
        &self,
        course_id: &CourseId,
    ) -> Result<LessonCompletion, LearningServiceError> {
        let now = self.now();
        let xp = self.settings.lesson_xp();
        let mut state = self.learners.load().await?;
        ensure_logged_in(&state)?;

        let progress = state
            .progress
            .get_mut(course_id)
            .ok_or_else(|| LearningServiceError::CourseNotStarted(course_id.clone()))?;
        progress.complete_lesson(xp, now);
        let lessons_completed = progress.lessons_completed();

        state.add_xp(xp);
        state.update_streak(now);
        state.celebrations.push_back(Celebration::LessonComplete { xp });
        let unlocked = self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;

        info!(
            course = %course_id,
            lessons_completed,
            total_xp = state.xp,
            streak = state.streak,
            "lesson completed"
        );
        Ok(LessonCompletion {
            course_id: course_id.clone(),
            lessons_completed,
            xp_gained: xp,
            total_xp: state.xp,
            streak: state.streak,
            unlocked,
        })
    }

    /// Award XP outside a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn add_xp(&self, amount: u32) -> Result<Vec<BadgeId>, LearningServiceError> {
        let mut state = self.learners.load().await?;
        state.add_xp(amount);
        let unlocked = self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;
        Ok(unlocked)
    }

    /// Award recap XP at the end of a memory refresh.
    ///
    /// Returns the XP granted for `cards_viewed` recap cards.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn complete_memory_refresh(
        &self,
        cards_viewed: u32,
    ) -> Result<u32, LearningServiceError> {
        let xp = cards_viewed.saturating_mul(self.settings.recap_card_xp());
        let mut state = self.learners.load().await?;
        state.add_xp(xp);
        if xp > 0 {
            state.celebrations.push_back(Celebration::MemoryRefreshed { xp });
        }
        self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;

        debug!(cards_viewed, xp, "memory refresh completed");
        Ok(xp)
    }

    /// Count today's activity toward the global streak.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn update_streak(&self) -> Result<u32, LearningServiceError> {
        let mut state = self.learners.load().await?;
        state.update_streak(self.now());
        self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;
        Ok(state.streak)
    }

    /// Break the global streak if the learner skipped a day. Run on app load.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn refresh_streak(&self) -> Result<bool, LearningServiceError> {
        let mut state = self.learners.load().await?;
        let broken = state.refresh_streak(self.now());
        if broken {
            self.learners.save(&state).await?;
            info!("streak broken; reset to 0");
        }
        Ok(broken)
    }

    /// Sum of completed lessons across all started courses.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read.
    pub async fn total_lessons_completed(&self) -> Result<u32, LearningServiceError> {
        Ok(self.learners.load().await?.total_lessons_completed())
    }

    // ─── Quizzes ───────────────────────────────────────────────────────────────

    /// Questions to ask in a review quiz, based on lessons completed so far.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCourse` if the id is not in the catalog.
    pub async fn quiz_questions(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Question>, LearningServiceError> {
        let bank = self.question_bank(course_id).await?;
        let state = self.learners.load().await?;
        let lessons_completed = state
            .progress
            .get(course_id)
            .map_or(0, CourseProgress::lessons_completed);
        Ok(review_questions(&bank, lessons_completed))
    }

    /// Record an answer without rescoring. Call `recalculate_confidence` once
    /// the quiz ends.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCourse` if the id is not in the catalog and
    /// `CourseNotStarted` if there is no progress for it.
    pub async fn save_quiz_response(
        &self,
        course_id: &CourseId,
        question: QuestionId,
        selected: usize,
    ) -> Result<(), LearningServiceError> {
        self.course(course_id).await?;
        let mut state = self.learners.load().await?;
        if !state.progress.contains_key(course_id) {
            return Err(LearningServiceError::CourseNotStarted(course_id.clone()));
        }
        state
            .quiz_responses
            .entry(course_id.clone())
            .or_default()
            .record(question, selected);
        self.learners.save(&state).await?;
        Ok(())
    }

    /// Record an answer, award quiz XP, and rescore the course from all of its
    /// stored responses.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a session, `UnknownCourse` if the id is not
    /// in the catalog, and `CourseNotStarted` if there is no progress for it.
    pub async fn submit_quiz_answer(
        &self,
        course_id: &CourseId,
        question: QuestionId,
        selected: usize,
    ) -> Result<QuizFeedback, LearningServiceError> {
        let bank = self.question_bank(course_id).await?;
        let mut state = self.learners.load().await?;
        ensure_logged_in(&state)?;
        if !state.progress.contains_key(course_id) {
            return Err(LearningServiceError::CourseNotStarted(course_id.clone()));
        }

        state
            .quiz_responses
            .entry(course_id.clone())
            .or_default()
            .record(question, selected);
        let is_correct = bank
            .iter()
            .find(|q| q.id == question)
            .is_some_and(|q| q.is_correct(selected));

        let confidence = apply_confidence(&mut state, course_id, &bank)?;
        state.add_xp(self.settings.quiz_answer_xp());
        let unlocked = self.settle_badges(&mut state).await?;
        self.learners.save(&state).await?;

        Ok(QuizFeedback {
            is_correct,
            confidence,
            level: confidence.level(),
            unlocked,
        })
    }

    /// Rescore a course from its stored responses.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCourse` if the id is not in the catalog and
    /// `CourseNotStarted` if there is no progress for it.
    pub async fn recalculate_confidence(
        &self,
        course_id: &CourseId,
    ) -> Result<ConfidenceResult, LearningServiceError> {
        let bank = self.question_bank(course_id).await?;
        let mut state = self.learners.load().await?;
        if !state.progress.contains_key(course_id) {
            return Err(LearningServiceError::CourseNotStarted(course_id.clone()));
        }

        let confidence = apply_confidence(&mut state, course_id, &bank)?;
        self.learners.save(&state).await?;
        Ok(confidence)
    }

    // ─── Recommendation & feedback ─────────────────────────────────────────────

    /// The best next action for the learner right now.
    ///
    /// `None` means the state references a course the catalog no longer has;
    /// callers should show a neutral state instead of a call to action.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state or catalog cannot be read.
    pub async fn recommendation(&self) -> Result<Option<Recommendation>, LearningServiceError> {
        let state = self.learners.load().await?;
        let catalog = self.catalog.list_courses().await?;
        let input = DecisionInput::from_state(&state, &catalog, self.now());
        let recommendation = self.decisions.best_next_action(&input);

        match &recommendation {
            Some(rec) => debug!(kind = ?rec.kind, course = %rec.course_id, "recommendation"),
            None => debug!("no recommendation"),
        }
        Ok(recommendation)
    }

    /// Pop the oldest badge unlock that has not been shown yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state or badge rules cannot be read. The
    /// queue is left untouched when the badge rules are unavailable.
    pub async fn next_unlock(&self) -> Result<Option<Badge>, LearningServiceError> {
        let definitions = self.catalog.badge_definitions().await?;
        let mut state = self.learners.load().await?;
        let Some(id) = state.pending_unlocks.pop_front() else {
            return Ok(None);
        };
        self.learners.save(&state).await?;

        Ok(definitions.into_iter().find(|badge| badge.id == id))
    }

    /// Pop the oldest queued celebration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read or stored.
    pub async fn next_celebration(&self) -> Result<Option<Celebration>, LearningServiceError> {
        let mut state = self.learners.load().await?;
        let celebration = state.celebrations.pop_front();
        if celebration.is_some() {
            self.learners.save(&state).await?;
        }
        Ok(celebration)
    }

    // ─── Helpers ───────────────────────────────────────────────────────────────

    async fn course(&self, course_id: &CourseId) -> Result<Course, LearningServiceError> {
        self.catalog
            .get_course(course_id)
            .await
            .map_err(|e| not_found_as_unknown(e, course_id))
    }

    async fn question_bank(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Question>, LearningServiceError> {
        self.catalog
            .question_bank(course_id)
            .await
            .map_err(|e| not_found_as_unknown(e, course_id))
    }

    /// Run the badge rules and queue every new unlock, in rule order.
    async fn settle_badges(
        &self,
        state: &mut LearnerState,
    ) -> Result<Vec<BadgeId>, LearningServiceError> {
        let definitions = self.catalog.badge_definitions().await?;
        let stats = state.badge_stats();
        let unlocked = evaluate_badges(&stats, &definitions, &mut state.earned_badges);

        let mut ids = Vec::with_capacity(unlocked.len());
        for badge in unlocked {
            info!(badge = %badge.id, name = %badge.name, "badge unlocked");
            state.pending_unlocks.push_back(badge.id.clone());
            state.celebrations.push_back(Celebration::BadgeUnlocked {
                badge: badge.id.clone(),
                name: badge.name.clone(),
            });
            ids.push(badge.id.clone());
        }
        Ok(ids)
    }
}

fn ensure_logged_in(state: &LearnerState) -> Result<(), LearningServiceError> {
    if state.user.is_logged_in {
        Ok(())
    } else {
        Err(LearningServiceError::NotLoggedIn)
    }
}

fn not_found_as_unknown(err: StorageError, course_id: &CourseId) -> LearningServiceError {
    match err {
        StorageError::NotFound => LearningServiceError::UnknownCourse(course_id.clone()),
        other => LearningServiceError::Storage(other),
    }
}

/// Rescore from the full response map and store percentage and level.
///
/// With no graded answers the stored score and level are left alone.
fn apply_confidence(
    state: &mut LearnerState,
    course_id: &CourseId,
    bank: &[Question],
) -> Result<ConfidenceResult, LearningServiceError> {
    let responses = state.responses(course_id);
    let confidence = compute_confidence(&responses, bank);

    if confidence.total > 0 {
        if let Some(progress) = state.progress.get_mut(course_id) {
            progress.set_confidence(confidence.percentage)?;
        }
        state.confidence_level = confidence.level();
    }

    debug!(
        course = %course_id,
        correct = confidence.correct,
        total = confidence.total,
        percentage = confidence.percentage,
        "confidence recomputed"
    );
    Ok(confidence)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
