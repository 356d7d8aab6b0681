//! Shared error types for the services crate.

use thiserror::Error;

use restart_core::model::{CourseId, ProgressError};
use storage::StorageError;

/// Errors emitted by `LearningService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningServiceError {
    #[error("no learner is logged in")]
    NotLoggedIn,
    #[error("unknown course: {0}")]
    UnknownCourse(CourseId),
    #[error("course has not been started: {0}")]
    CourseNotStarted(CourseId),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
