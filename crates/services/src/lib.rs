#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod assignment_store;
pub mod attempts;
pub mod catalog;
pub mod course_catalog;
pub mod error;
pub mod plan_service;
pub mod quiz_service;
pub mod tracker_service;

pub use study_core::Clock;

pub use api::{ApiClient, ApiConfig, ApiResponse};
pub use app_services::AppServices;
pub use assignment_store::AssignmentStore;
pub use attempts::{AttemptRecorder, NoopRecorder};
pub use catalog::Catalog;
pub use course_catalog::CourseCatalog;
pub use error::{
    ApiError, AppServicesError, AssignmentStoreError, CourseCatalogError, QuizServiceError,
    StudyPlanServiceError,
};
pub use plan_service::StudyPlanService;
pub use quiz_service::{QuizService, QuizSession};
pub use tracker_service::{ProgressTracker, TrackerService};
