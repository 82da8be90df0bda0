//! Shared error types for the services crate.

use thiserror::Error;

use study_core::model::{AssignmentId, CourseError, PlanError, QuizError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("no quiz for assignment {0}")]
    NotFound(AssignmentId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted by `AssignmentStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentStoreError {
    #[error("assignment {0} not found")]
    NotFound(AssignmentId),
    #[error("assignment state lock poisoned")]
    Poisoned,
}

/// Errors emitted by `CourseCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseCatalogError {
    #[error("course state lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Assignments(#[from] AssignmentStoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudyPlanService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyPlanServiceError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ApiClient` construction and `ApiResponse::into_result`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed: {0}")]
    Backend(String),
    #[error("response carried no data")]
    EmptyResponse,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] study_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}
