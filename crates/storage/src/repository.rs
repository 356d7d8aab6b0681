use async_trait::async_trait;
use restart_core::model::{Badge, Course, CourseId, LearnerState, Question, default_badges};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Read-only content the engines consume: courses, question banks, badge rules.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub question_banks: HashMap<CourseId, Vec<Question>>,
    pub badges: Vec<Badge>,
}

impl Catalog {
    /// Catalog with the given courses and the built-in badge rules.
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses,
            question_banks: HashMap::new(),
            badges: default_badges(),
        }
    }

    #[must_use]
    pub fn with_question_bank(mut self, course: CourseId, bank: Vec<Question>) -> Self {
        self.question_banks.insert(course, bank);
        self
    }
}

/// Repository contract for the learner's mutable state.
#[async_trait]
pub trait LearnerRepository: Send + Sync {
    /// Fetch the current learner state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be read.
    async fn load(&self) -> Result<LearnerState, StorageError>;

    /// Replace the stored learner state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn save(&self, state: &LearnerState) -> Result<(), StorageError>;

    /// Drop everything back to an empty state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be cleared.
    async fn reset(&self) -> Result<(), StorageError>;
}

/// Repository contract for catalog content.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All courses in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Fetch a course by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course is not in the catalog.
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError>;

    /// Question bank for a course; empty when the course has no quiz yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course is not in the catalog.
    async fn question_bank(&self, id: &CourseId) -> Result<Vec<Question>, StorageError>;

    /// Badge rules in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn badge_definitions(&self) -> Result<Vec<Badge>, StorageError>;
}

/// Memory-resident store. State is lost when the process exits.
#[derive(Clone)]
pub struct InMemoryRepository {
    state: Arc<Mutex<LearnerState>>,
    catalog: Arc<Catalog>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(Mutex::new(LearnerState::new())),
            catalog: Arc::new(catalog),
        }
    }
}

#[async_trait]
impl LearnerRepository for InMemoryRepository {
    async fn load(&self) -> Result<LearnerState, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, state: &LearnerState) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = state.clone();
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = LearnerState::new();
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Ok(self.catalog.courses.clone())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        self.catalog
            .courses
            .iter()
            .find(|course| &course.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn question_bank(&self, id: &CourseId) -> Result<Vec<Question>, StorageError> {
        self.get_course(id).await?;
        Ok(self
            .catalog
            .question_banks
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn badge_definitions(&self) -> Result<Vec<Badge>, StorageError> {
        Ok(self.catalog.badges.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub learners: Arc<dyn LearnerRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(catalog: Catalog) -> Self {
        let repo = InMemoryRepository::with_catalog(catalog);
        let learners: Arc<dyn LearnerRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo);
        Self { learners, catalog }
    }
}
