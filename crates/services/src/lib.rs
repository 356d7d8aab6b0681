#![forbid(unsafe_code)]

pub mod error;
pub mod learning_service;

pub use restart_core::Clock;

pub use error::LearningServiceError;
pub use learning_service::{LearningService, LessonCompletion, QuizFeedback};
