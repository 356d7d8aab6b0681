use serde::{Deserialize, Serialize};

use crate::model::ids::BadgeId;

/// Which cumulative stat a badge threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Lessons,
    Streak,
    Xp,
}

/// Static badge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: u32,
    pub kind: BadgeKind,
}

impl Badge {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        requirement: u32,
        kind: BadgeKind,
    ) -> Self {
        Self {
            id: BadgeId::new(id),
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            requirement,
            kind,
        }
    }
}

/// The built-in badge rule set, in evaluation order.
#[must_use]
pub fn default_badges() -> Vec<Badge> {
    vec![
        Badge::new(
            "first-lesson",
            "First Steps",
            "Complete your first lesson",
            "🌟",
            1,
            BadgeKind::Lessons,
        ),
        Badge::new(
            "three-day-streak",
            "On Fire",
            "Maintain a 3-day learning streak",
            "🔥",
            3,
            BadgeKind::Streak,
        ),
        Badge::new(
            "week-streak",
            "Week Warrior",
            "Maintain a 7-day learning streak",
            "⚔️",
            7,
            BadgeKind::Streak,
        ),
        Badge::new(
            "xp-champion",
            "XP Champion",
            "Earn 500 XP",
            "🏆",
            500,
            BadgeKind::Xp,
        ),
        Badge::new(
            "consistency-champion",
            "Consistency Champion",
            "Maintain a 14-day learning streak",
            "👑",
            14,
            BadgeKind::Streak,
        ),
        Badge::new(
            "quick-learner",
            "Quick Learner",
            "Complete 5 lessons",
            "⚡",
            5,
            BadgeKind::Lessons,
        ),
    ]
}

/// Badges the learner has earned, in unlock order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EarnedBadges(Vec<BadgeId>);

impl EarnedBadges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &BadgeId) -> bool {
        self.0.contains(id)
    }

    /// Adds `id`; returns `false` if it was already earned.
    pub fn insert(&mut self, id: BadgeId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeId> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_has_unique_ids() {
        let badges = default_badges();
        assert_eq!(badges.len(), 6);

        let mut earned = EarnedBadges::new();
        for badge in &badges {
            assert!(earned.insert(badge.id.clone()), "duplicate id {}", badge.id);
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let mut earned = EarnedBadges::new();
        assert!(earned.insert(BadgeId::new("first-lesson")));
        assert!(!earned.insert(BadgeId::new("first-lesson")));
        assert_eq!(earned.len(), 1);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&BadgeKind::Xp).unwrap();
        assert_eq!(json, "\"xp\"");
    }
}
