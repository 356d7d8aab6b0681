mod badge;
mod course;
mod ids;
mod learner;
mod progress;
mod recommendation;

pub use ids::{BadgeId, CourseId, ParseIdError, QuestionId};

pub use badge::{Badge, BadgeKind, EarnedBadges, default_badges};
pub use course::{Course, Question, find_course};
pub use learner::{Celebration, LearnerState, UserProfile};
pub use progress::{
    CoursePlan, CourseProgress, CourseStatus, ProgressError, ProgressMap, QuizResponseMap,
};
pub use recommendation::{Recommendation, RecommendationKind, Route};
