use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use crate::badges::BadgeStats;
use crate::confidence::ConfidenceLevel;
use crate::model::badge::EarnedBadges;
use crate::model::ids::{BadgeId, CourseId};
use crate::model::progress::{ProgressMap, QuizResponseMap};

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// Display profile of the (single) learner. There is no real authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub is_logged_in: bool,
}

//
// ─── CELEBRATIONS ──────────────────────────────────────────────────────────────
//

/// Feedback moment queued for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Celebration {
    LessonComplete { xp: u32 },
    BadgeUnlocked { badge: BadgeId, name: String },
    MemoryRefreshed { xp: u32 },
}

impl fmt::Display for Celebration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Celebration::LessonComplete { xp } => write!(f, "🎉 Lesson Complete! +{xp} XP"),
            Celebration::BadgeUnlocked { name, .. } => write!(f, "🏆 New Badge: {name}!"),
            Celebration::MemoryRefreshed { xp } => write!(f, "🧠 Memory refreshed! +{xp} XP"),
        }
    }
}

//
// ─── LEARNER STATE ─────────────────────────────────────────────────────────────
//

/// Everything the engines read or the services mutate, as one explicit value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerState {
    pub user: UserProfile,
    pub xp: u32,
    pub streak: u32,
    pub last_active: Option<DateTime<Utc>>,
    pub earned_badges: EarnedBadges,
    pub progress: ProgressMap,
    pub current_course: Option<CourseId>,
    pub quiz_responses: BTreeMap<CourseId, QuizResponseMap>,
    pub confidence_level: ConfidenceLevel,
    /// Unlocks not yet shown, oldest first.
    pub pending_unlocks: VecDeque<BadgeId>,
    pub celebrations: VecDeque<Celebration>,
}

impl LearnerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the learner in with a starter streak of one day.
    pub fn login(&mut self, name: impl Into<String>, email: impl Into<String>, now: DateTime<Utc>) {
        self.user = UserProfile {
            name: name.into(),
            email: email.into(),
            is_logged_in: true,
        };
        self.streak = 1;
        self.last_active = Some(now);
    }

    /// Count today's activity once. A broken streak restarts at one.
    pub fn update_streak(&mut self, now: DateTime<Utc>) {
        self.refresh_streak(now);
        let today = now.date_naive();
        if self.last_active.map(|at| at.date_naive()) != Some(today) {
            self.streak = self.streak.saturating_add(1);
            self.last_active = Some(now);
        }
    }

    /// Reset the streak when the last activity was before yesterday.
    ///
    /// Returns `true` if the streak was broken.
    pub fn refresh_streak(&mut self, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_active else {
            return false;
        };
        let today = now.date_naive();
        let last_day = last.date_naive();
        let yesterday = today.checked_sub_days(Days::new(1));

        if last_day != today && Some(last_day) != yesterday && self.streak > 0 {
            self.streak = 0;
            return true;
        }
        false
    }

    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    #[must_use]
    pub fn total_lessons_completed(&self) -> u32 {
        self.progress
            .values()
            .map(crate::model::CourseProgress::lessons_completed)
            .fold(0_u32, u32::saturating_add)
    }

    /// Cumulative totals the badge rules are measured against.
    #[must_use]
    pub fn badge_stats(&self) -> BadgeStats {
        BadgeStats {
            total_lessons_completed: self.total_lessons_completed(),
            current_streak: self.streak,
            total_xp: self.xp,
        }
    }

    /// Responses for a course, empty if the learner never answered.
    #[must_use]
    pub fn responses(&self, course: &CourseId) -> QuizResponseMap {
        self.quiz_responses.get(course).cloned().unwrap_or_default()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
