use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;

/// Category of a best-next-action recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Re-entry after a break.
    QuickWin,
    /// Keep progressing with the next lesson.
    Challenge,
    /// Repair low quiz confidence.
    Confidence,
    /// Nothing started yet.
    FirstStep,
    /// Course finished; keep skills sharp.
    Maintenance,
}

/// Screen a recommendation navigates to. Internal navigation key, not a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "screen", content = "course_id", rename_all = "snake_case")]
pub enum Route {
    Course(CourseId),
    MemoryRefresh(CourseId),
    SmartRestart(CourseId),
    Quiz(CourseId),
    Lesson(CourseId),
}

impl Route {
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        match self {
            Route::Course(id)
            | Route::MemoryRefresh(id)
            | Route::SmartRestart(id)
            | Route::Quiz(id)
            | Route::Lesson(id) => id,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Course(id) => write!(f, "/course/{id}"),
            Route::MemoryRefresh(id) => write!(f, "/memory-refresh/{id}"),
            Route::SmartRestart(id) => write!(f, "/smart-restart/{id}"),
            Route::Quiz(id) => write!(f, "/quiz/{id}"),
            Route::Lesson(id) => write!(f, "/lesson/{id}"),
        }
    }
}

/// The single action surfaced to the learner. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub course_id: CourseId,
    pub title: String,
    pub reason: String,
    pub action_label: String,
    pub route: Route,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_renders_navigation_key() {
        let id = CourseId::new("python-basics");
        assert_eq!(Route::Course(id.clone()).to_string(), "/course/python-basics");
        assert_eq!(
            Route::MemoryRefresh(id.clone()).to_string(),
            "/memory-refresh/python-basics"
        );
        assert_eq!(
            Route::SmartRestart(id.clone()).to_string(),
            "/smart-restart/python-basics"
        );
        assert_eq!(Route::Quiz(id.clone()).to_string(), "/quiz/python-basics");
        assert_eq!(Route::Lesson(id.clone()).to_string(), "/lesson/python-basics");
        assert_eq!(Route::Lesson(id.clone()).course_id(), &id);
    }

    #[test]
    fn recommendation_serializes_tagged_route() {
        let rec = Recommendation {
            kind: RecommendationKind::QuickWin,
            course_id: CourseId::new("web-dev"),
            title: "t".into(),
            reason: "r".into(),
            action_label: "a".into(),
            route: Route::MemoryRefresh(CourseId::new("web-dev")),
        };

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["kind"], "quick_win");
        assert_eq!(value["route"]["screen"], "memory_refresh");
        assert_eq!(value["route"]["course_id"], "web-dev");
    }
}
