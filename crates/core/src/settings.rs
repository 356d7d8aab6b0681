use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("low confidence threshold must be within [0, 100], got {provided}")]
    InvalidConfidenceThreshold { provided: f64 },

    #[error("lesson XP must be > 0")]
    InvalidLessonXp,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for the recommendation rules and XP rewards.
///
/// The defaults are the product values:
/// - a course untouched for more than 2 whole days gets a gentle re-entry
/// - quiz confidence below 60% gets a review before moving on
/// - 50 XP per lesson, 10 XP per quiz answer, 10 XP per recap card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    stale_after_days: u32,
    low_confidence_threshold: f64,
    lesson_xp: u32,
    quiz_answer_xp: u32,
    recap_card_xp: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            stale_after_days: 2,
            low_confidence_threshold: 60.0,
            lesson_xp: 50,
            quiz_answer_xp: 10,
            recap_card_xp: 10,
        }
    }
}

impl EngineSettings {
    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidConfidenceThreshold` if the threshold is not a
    /// finite value in `[0, 100]`, and `SettingsError::InvalidLessonXp` if `lesson_xp` is zero.
    pub fn new(
        stale_after_days: u32,
        low_confidence_threshold: f64,
        lesson_xp: u32,
        quiz_answer_xp: u32,
        recap_card_xp: u32,
    ) -> Result<Self, SettingsError> {
        if !low_confidence_threshold.is_finite()
            || !(0.0..=100.0).contains(&low_confidence_threshold)
        {
            return Err(SettingsError::InvalidConfidenceThreshold {
                provided: low_confidence_threshold,
            });
        }
        if lesson_xp == 0 {
            return Err(SettingsError::InvalidLessonXp);
        }

        Ok(Self {
            stale_after_days,
            low_confidence_threshold,
            lesson_xp,
            quiz_answer_xp,
            recap_card_xp,
        })
    }

    /// Whole days of inactivity tolerated before a re-entry is suggested.
    #[must_use]
    pub fn stale_after_days(&self) -> u32 {
        self.stale_after_days
    }

    #[must_use]
    pub fn low_confidence_threshold(&self) -> f64 {
        self.low_confidence_threshold
    }

    #[must_use]
    pub fn lesson_xp(&self) -> u32 {
        self.lesson_xp
    }

    #[must_use]
    pub fn quiz_answer_xp(&self) -> u32 {
        self.quiz_answer_xp
    }

    #[must_use]
    pub fn recap_card_xp(&self) -> u32 {
        self.recap_card_xp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_values() {
        let s = EngineSettings::default();
        assert_eq!(s.stale_after_days(), 2);
        assert_eq!(s.low_confidence_threshold(), 60.0);
        assert_eq!(s.lesson_xp(), 50);
        assert_eq!(s.quiz_answer_xp(), 10);
        assert_eq!(s.recap_card_xp(), 10);
    }

    #[test]
    fn new_rejects_invalid_values() {
        assert!(matches!(
            EngineSettings::new(2, 120.0, 50, 10, 10),
            Err(SettingsError::InvalidConfidenceThreshold { .. })
        ));
        assert!(matches!(
            EngineSettings::new(2, f64::NAN, 50, 10, 10),
            Err(SettingsError::InvalidConfidenceThreshold { .. })
        ));
        assert_eq!(
            EngineSettings::new(2, 60.0, 0, 10, 10),
            Err(SettingsError::InvalidLessonXp)
        );
        assert!(EngineSettings::new(0, 0.0, 1, 0, 0).is_ok());
    }
}
