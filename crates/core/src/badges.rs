use crate::model::{Badge, BadgeKind, EarnedBadges};

/// Cumulative totals the badge rules compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgeStats {
    pub total_lessons_completed: u32,
    pub current_streak: u32,
    pub total_xp: u32,
}

impl BadgeStats {
    #[must_use]
    pub fn value_for(&self, kind: BadgeKind) -> u32 {
        match kind {
            BadgeKind::Lessons => self.total_lessons_completed,
            BadgeKind::Streak => self.current_streak,
            BadgeKind::Xp => self.total_xp,
        }
    }
}

impl Badge {
    /// Whether `stats` meet this badge's threshold.
    #[must_use]
    pub fn is_met_by(&self, stats: &BadgeStats) -> bool {
        stats.value_for(self.kind) >= self.requirement
    }
}

/// Unlocks every definition whose threshold `stats` now meet.
///
/// Newly earned badges are added to `earned` and returned in definition
/// order. Badges already in `earned` are skipped, so re-running with the same
/// stats returns nothing. Nothing is ever removed from `earned`.
pub fn evaluate_badges<'a>(
    stats: &BadgeStats,
    definitions: &'a [Badge],
    earned: &mut EarnedBadges,
) -> Vec<&'a Badge> {
    let mut unlocked = Vec::new();
    for badge in definitions {
        if earned.contains(&badge.id) || !badge.is_met_by(stats) {
            continue;
        }
        if earned.insert(badge.id.clone()) {
            unlocked.push(badge);
        }
    }
    unlocked
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
