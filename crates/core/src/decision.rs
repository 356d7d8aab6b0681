use chrono::{DateTime, Utc};

use crate::model::{
    Course, CourseId, CourseProgress, LearnerState, ProgressMap, Recommendation,
    RecommendationKind, Route, UserProfile, find_course,
};
use crate::settings::EngineSettings;

/// Confidence assumed for a course that has never been quizzed.
pub const DEFAULT_CONFIDENCE: f64 = 100.0;

/// Snapshot of the state the decision rules read.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub user: &'a UserProfile,
    pub progress: &'a ProgressMap,
    pub catalog: &'a [Course],
    pub now: DateTime<Utc>,
}

impl<'a> DecisionInput<'a> {
    #[must_use]
    pub fn from_state(state: &'a LearnerState, catalog: &'a [Course], now: DateTime<Utc>) -> Self {
        Self {
            user: &state.user,
            progress: &state.progress,
            catalog,
            now,
        }
    }
}

/// Picks the single best next action for the learner.
///
/// Rules run in a fixed order and the first match wins:
///
/// 1. nothing started: first step into the first catalog course
/// 2. active course idle for too long: quick memory refresh
/// 3. quiz confidence too low: confidence review
/// 4. every lesson done: maintenance quiz
/// 5. otherwise: the next lesson
///
/// Re-engagement outranks confidence repair, which outranks progression.
///
/// # Examples
///
/// ```
/// # use restart_core::decision::{DecisionEngine, DecisionInput};
/// # use restart_core::model::{Course, CourseId, ProgressMap, RecommendationKind, UserProfile};
/// let catalog = vec![Course::new(CourseId::new("python-basics"), "Python Programming Basics", 20)];
/// let progress = ProgressMap::new();
/// let user = UserProfile::default();
///
/// let input = DecisionInput { user: &user, progress: &progress, catalog: &catalog, now: chrono::Utc::now() };
/// let rec = DecisionEngine::new().best_next_action(&input).unwrap();
/// assert_eq!(rec.kind, RecommendationKind::FirstStep);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionEngine {
    stale_after_days: i64,
    low_confidence_threshold: f64,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&EngineSettings::default())
    }

    #[must_use]
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            stale_after_days: i64::from(settings.stale_after_days()),
            low_confidence_threshold: settings.low_confidence_threshold(),
        }
    }

    /// Returns the recommendation, or `None` when the active course is not in
    /// the catalog (or there is nothing at all to recommend).
    #[must_use]
    pub fn best_next_action(&self, input: &DecisionInput<'_>) -> Option<Recommendation> {
        let Some((course_id, progress)) = active_course(input.progress) else {
            return input.catalog.first().map(first_step);
        };
        let course = find_course(input.catalog, course_id)?;

        // Missing timestamp means "accessed now".
        let last_accessed = progress.last_accessed().unwrap_or(input.now);
        let idle_days = (input.now - last_accessed).num_days();
        if idle_days > self.stale_after_days {
            return Some(quick_win(course_id));
        }

        // Never quizzed reads as fully confident.
        let confidence = progress.confidence_score().unwrap_or(DEFAULT_CONFIDENCE);
        if confidence < self.low_confidence_threshold {
            return Some(confidence_review(course_id));
        }

        let next_lesson = progress.lessons_completed().saturating_add(1);
        if next_lesson > course.total_lessons {
            return Some(maintenance(course_id));
        }

        Some(next_lesson_challenge(course_id, next_lesson))
    }
}

/// The started course with the latest `last_accessed`.
///
/// Records without a timestamp sort as the Unix epoch. Ties go to the
/// smallest course id.
#[must_use]
pub fn active_course(progress: &ProgressMap) -> Option<(&CourseId, &CourseProgress)> {
    let accessed = |p: &CourseProgress| p.last_accessed().unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    progress
        .iter()
        .min_by(|(_, a), (_, b)| accessed(b).cmp(&accessed(a)))
}

fn first_step(course: &Course) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::FirstStep,
        course_id: course.id.clone(),
        title: format!("Start {}", course.name),
        reason: "Begin your learning journey today!".into(),
        action_label: "Start Course".into(),
        route: Route::Course(course.id.clone()),
    }
}

fn quick_win(course_id: &CourseId) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::QuickWin,
        course_id: course_id.clone(),
        title: "Quick Memory Refresh".into(),
        reason: "It's been a few days. Let's warm up your brain without pressure.".into(),
        action_label: "Do a 5-min Refresh".into(),
        route: Route::MemoryRefresh(course_id.clone()),
    }
}

fn confidence_review(course_id: &CourseId) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Confidence,
        course_id: course_id.clone(),
        title: "Boost Your Confidence".into(),
        reason: "You found the last topic a bit tricky. Let's solidify it.".into(),
        action_label: "Review & Quiz".into(),
        route: Route::SmartRestart(course_id.clone()),
    }
}

fn maintenance(course_id: &CourseId) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Maintenance,
        course_id: course_id.clone(),
        title: "Course Complete!".into(),
        reason: "You've mastered this! Keep your skills sharp.".into(),
        action_label: "Practice Quiz".into(),
        route: Route::Quiz(course_id.clone()),
    }
}

fn next_lesson_challenge(course_id: &CourseId, lesson: u32) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Challenge,
        course_id: course_id.clone(),
        title: format!("Continue: Lesson {lesson}"),
        reason: "You're on a roll! Ready for the next concept?".into(),
        action_label: "Start Lesson".into(),
        route: Route::Lesson(course_id.clone()),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoursePlan, CourseStatus};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn catalog() -> Vec<Course> {
        vec![
            Course::new(CourseId::new("python-basics"), "Python Programming Basics", 20),
            Course::new(CourseId::new("web-dev"), "Web Development Fundamentals", 25),
        ]
    }

    fn progress(
        lessons_completed: u32,
        confidence: Option<f64>,
        last_accessed: Option<DateTime<Utc>>,
    ) -> CourseProgress {
        CourseProgress::from_persisted(
            CoursePlan::new("skill", "10min"),
            lessons_completed,
            lessons_completed + 1,
            lessons_completed * 50,
            lessons_completed,
            CourseStatus::DoNow,
            confidence,
            fixed_now() - Duration::days(30),
            last_accessed,
        )
        .unwrap()
    }

    fn recommend(map: &ProgressMap, now: DateTime<Utc>) -> Option<Recommendation> {
        let user = UserProfile::default();
        let catalog = catalog();
        let input = DecisionInput {
            user: &user,
            progress: map,
            catalog: &catalog,
            now,
        };
        DecisionEngine::new().best_next_action(&input)
    }

    fn single(course: &str, p: CourseProgress) -> ProgressMap {
        let mut map = ProgressMap::new();
        map.insert(CourseId::new(course), p);
        map
    }

    #[test]
    fn empty_progress_suggests_first_catalog_course() {
        let rec = recommend(&ProgressMap::new(), fixed_now()).unwrap();

        assert_eq!(rec.kind, RecommendationKind::FirstStep);
        assert_eq!(rec.course_id, CourseId::new("python-basics"));
        assert_eq!(rec.title, "Start Python Programming Basics");
        assert_eq!(rec.route.to_string(), "/course/python-basics");
    }

    #[test]
    fn empty_progress_and_catalog_yields_nothing() {
        let user = UserProfile::default();
        let progress = ProgressMap::new();
        let input = DecisionInput {
            user: &user,
            progress: &progress,
            catalog: &[],
            now: fixed_now(),
        };
        assert!(DecisionEngine::new().best_next_action(&input).is_none());
    }

    #[test]
    fn staleness_dominates_high_confidence() {
        let now = fixed_now();
        let map = single(
            "python-basics",
            progress(3, Some(80.0), Some(now - Duration::days(5))),
        );
        let rec = recommend(&map, now).unwrap();

        assert_eq!(rec.kind, RecommendationKind::QuickWin);
        assert_eq!(rec.route.to_string(), "/memory-refresh/python-basics");
    }

    #[test]
    fn staleness_dominates_low_confidence() {
        let now = fixed_now();
        let map = single(
            "python-basics",
            progress(3, Some(10.0), Some(now - Duration::days(7))),
        );
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::QuickWin
        );
    }

    #[test]
    fn two_idle_days_are_not_stale() {
        let now = fixed_now();
        let map = single(
            "python-basics",
            progress(3, None, Some(now - Duration::days(2) - Duration::hours(23))),
        );
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::Challenge
        );

        let map = single("python-basics", progress(3, None, Some(now - Duration::days(3))));
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::QuickWin
        );
    }

    #[test]
    fn low_confidence_suggests_review() {
        let now = fixed_now();
        let map = single("python-basics", progress(3, Some(35.0), Some(now)));
        let rec = recommend(&map, now).unwrap();

        assert_eq!(rec.kind, RecommendationKind::Confidence);
        assert_eq!(rec.route.to_string(), "/smart-restart/python-basics");
    }

    #[test]
    fn confidence_threshold_is_strict() {
        let now = fixed_now();
        let map = single("python-basics", progress(3, Some(60.0), Some(now)));
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::Challenge
        );
    }

    #[test]
    fn zero_confidence_is_not_treated_as_missing() {
        let now = fixed_now();
        let map = single("python-basics", progress(3, Some(0.0), Some(now)));
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::Confidence
        );
    }

    #[test]
    fn completed_course_suggests_maintenance() {
        let now = fixed_now();
        let map = single("python-basics", progress(20, Some(90.0), Some(now)));
        let rec = recommend(&map, now).unwrap();

        assert_eq!(rec.kind, RecommendationKind::Maintenance);
        assert_eq!(rec.route.to_string(), "/quiz/python-basics");
    }

    #[test]
    fn low_confidence_outranks_completion() {
        let now = fixed_now();
        let map = single("python-basics", progress(20, Some(20.0), Some(now)));
        assert_eq!(
            recommend(&map, now).unwrap().kind,
            RecommendationKind::Confidence
        );
    }

    #[test]
    fn unquizzed_course_continues_with_next_lesson() {
        let now = fixed_now();
        let map = single("python-basics", progress(4, None, Some(now)));
        let rec = recommend(&map, now).unwrap();

        assert_eq!(rec.kind, RecommendationKind::Challenge);
        assert_eq!(rec.title, "Continue: Lesson 5");
        assert_eq!(rec.route.to_string(), "/lesson/python-basics");
    }

    #[test]
    fn missing_timestamp_counts_as_now() {
        let map = single("python-basics", progress(1, None, None));
        assert_eq!(
            recommend(&map, fixed_now()).unwrap().kind,
            RecommendationKind::Challenge
        );
    }

    #[test]
    fn most_recently_accessed_course_is_active() {
        let now = fixed_now();
        let mut map = ProgressMap::new();
        map.insert(
            CourseId::new("python-basics"),
            progress(2, None, Some(now - Duration::days(6))),
        );
        map.insert(
            CourseId::new("web-dev"),
            progress(7, None, Some(now - Duration::hours(1))),
        );

        let rec = recommend(&map, now).unwrap();
        assert_eq!(rec.course_id, CourseId::new("web-dev"));
        assert_eq!(rec.title, "Continue: Lesson 8");
    }

    #[test]
    fn untimestamped_course_loses_to_any_timestamp() {
        let now = fixed_now();
        let mut map = ProgressMap::new();
        map.insert(CourseId::new("python-basics"), progress(2, None, None));
        map.insert(
            CourseId::new("web-dev"),
            progress(1, None, Some(now - Duration::days(10))),
        );

        let (id, _) = active_course(&map).unwrap();
        assert_eq!(id, &CourseId::new("web-dev"));
    }

    #[test]
    fn unknown_active_course_yields_nothing() {
        let now = fixed_now();
        let map = single("rust-advanced", progress(1, None, Some(now)));
        assert!(recommend(&map, now).is_none());
    }

    #[test]
    fn custom_settings_shift_thresholds() {
        let now = fixed_now();
        let settings = EngineSettings::new(7, 80.0, 50, 10, 10).unwrap();
        let engine = DecisionEngine::from_settings(&settings);
        let user = UserProfile::default();
        let catalog = catalog();
        let map = single(
            "python-basics",
            progress(3, Some(75.0), Some(now - Duration::days(5))),
        );
        let input = DecisionInput {
            user: &user,
            progress: &map,
            catalog: &catalog,
            now,
        };

        let rec = engine.best_next_action(&input).unwrap();
        assert_eq!(rec.kind, RecommendationKind::Confidence);
    }

    #[test]
    fn repeated_calls_agree() {
        let now = fixed_now();
        let map = single("web-dev", progress(9, Some(65.0), Some(now)));
        assert_eq!(recommend(&map, now), recommend(&map, now));
    }
}
