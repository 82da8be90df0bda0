use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiClient, ApiConfig};
use crate::assignment_store::AssignmentStore;
use crate::catalog::Catalog;
use crate::course_catalog::CourseCatalog;
use crate::error::AppServicesError;
use crate::plan_service::StudyPlanService;
use crate::quiz_service::QuizService;
use crate::tracker_service::TrackerService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    quizzes: Arc<QuizService>,
    trackers: Arc<TrackerService>,
    plans: Arc<StudyPlanService>,
    assignments: Arc<AssignmentStore>,
    courses: Arc<CourseCatalog>,
    api: Arc<ApiClient>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        api: ApiConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, api).await
    }

    /// Build services over a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog setup fails.
    pub async fn new_in_memory(clock: Clock, api: ApiConfig) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, api).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the demo catalog is invalid or the API
    /// client cannot be built.
    pub async fn with_storage(
        storage: Storage,
        clock: Clock,
        api: ApiConfig,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::demo()?);
        let kv = storage.kv;

        let assignments =
            Arc::new(AssignmentStore::load(Arc::clone(&kv), catalog.assignments()).await);
        let quizzes = Arc::new(QuizService::new(
            clock,
            Arc::clone(&kv),
            Arc::clone(&catalog),
            assignments.clone(),
        ));
        let trackers = Arc::new(TrackerService::new(Arc::clone(&kv)));
        let plans = Arc::new(StudyPlanService::new(Arc::clone(&kv), Arc::clone(&catalog)));
        let courses = Arc::new(CourseCatalog::new(
            clock,
            Arc::clone(&kv),
            Arc::clone(&assignments),
            catalog.courses(),
        ));
        let api = Arc::new(ApiClient::with_store(api, kv).await?);

        Ok(Self {
            catalog,
            quizzes,
            trackers,
            plans,
            assignments,
            courses,
            api,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn trackers(&self) -> Arc<TrackerService> {
        Arc::clone(&self.trackers)
    }

    #[must_use]
    pub fn plans(&self) -> Arc<StudyPlanService> {
        Arc::clone(&self.plans)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentStore> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseCatalog> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api)
    }
}
