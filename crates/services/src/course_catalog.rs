use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::KeyValueStore;
use study_core::model::{
    Assignment, AssignmentDraft, AssignmentKind, AssignmentStatus, Course, CourseDraft, CourseId,
};
use study_core::progress::merge_progress;

use crate::Clock;
use crate::assignment_store::AssignmentStore;
use crate::error::CourseCatalogError;

/// First id handed to courses created at runtime.
pub const FIRST_CREATED_COURSE_ID: u64 = 1000;

/// Days until the starter quiz of a new course is due.
const STARTER_QUIZ_DUE_DAYS: i64 = 7;

/// Courses for the session plus the local reader-progress overlay.
pub struct CourseCatalog {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    assignments: Arc<AssignmentStore>,
    courses: Mutex<Vec<Course>>,
    next_id: AtomicU64,
}

impl CourseCatalog {
    #[must_use]
    pub fn new(
        clock: Clock,
        kv: Arc<dyn KeyValueStore>,
        assignments: Arc<AssignmentStore>,
        seed: &[Course],
    ) -> Self {
        let next_id = seed
            .iter()
            .map(|c| c.id.value().saturating_add(1))
            .max()
            .unwrap_or(0)
            .max(FIRST_CREATED_COURSE_ID);
        Self {
            clock,
            kv,
            assignments,
            courses: Mutex::new(seed.to_vec()),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// # Errors
    ///
    /// Returns `CourseCatalogError::Poisoned` if the state lock is poisoned.
    pub fn list(&self) -> Result<Vec<Course>, CourseCatalogError> {
        let guard = self.courses.lock().map_err(|_| CourseCatalogError::Poisoned)?;
        Ok(guard.clone())
    }

    /// # Errors
    ///
    /// Returns `CourseCatalogError::Poisoned` if the state lock is poisoned.
    pub fn get(&self, id: CourseId) -> Result<Option<Course>, CourseCatalogError> {
        let guard = self.courses.lock().map_err(|_| CourseCatalogError::Poisoned)?;
        Ok(guard.iter().find(|c| c.id == id).cloned())
    }

    /// Add a course and its starter quiz assignment.
    ///
    /// # Errors
    ///
    /// Returns `CourseCatalogError::Course` when the draft is invalid and
    /// `CourseCatalogError::Assignments` when the starter quiz cannot be added.
    pub async fn create_course(
        &self,
        draft: CourseDraft,
    ) -> Result<(Course, Assignment), CourseCatalogError> {
        let mut course = draft.validate(CourseId::new(0))?;
        course.id = CourseId::new(self.next_id.fetch_add(1, Ordering::SeqCst));

        let starter = self
            .assignments
            .create_assignment(AssignmentDraft {
                title: format!("{} – Intro Quiz", course.title),
                course_id: course.id,
                course: course.title.clone(),
                kind: AssignmentKind::Quiz,
                due_date: self.clock.days_from_today(STARTER_QUIZ_DUE_DAYS),
                status: AssignmentStatus::Pending,
                points: 20,
                time_limit: "15 minutes".into(),
                attempts: 0,
                max_attempts: 3,
            })
            .await?;
        {
            let mut guard = self.courses.lock().map_err(|_| CourseCatalogError::Poisoned)?;
            guard.push(course.clone());
        }
        debug!(course_id = %course.id, assignment_id = %starter.id, "course created");
        Ok((course, starter))
    }

    /// Locally stored progress for `course_id`, if any.
    pub async fn local_progress(&self, course_id: CourseId) -> Option<u8> {
        let key = keys::course_progress(course_id);
        match read_json::<u8>(self.kv.as_ref(), &key).await {
            Ok(value) => value.map(|v| v.min(100)),
            Err(err) => {
                warn!(%course_id, error = %err, "ignoring unreadable course progress");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns `CourseCatalogError::Storage` if the value cannot be written.
    pub async fn set_local_progress(
        &self,
        course_id: CourseId,
        progress: u8,
    ) -> Result<(), CourseCatalogError> {
        let key = keys::course_progress(course_id);
        write_json(self.kv.as_ref(), &key, &progress.min(100)).await?;
        Ok(())
    }

    /// Progress to display: local overlay, then `server`, then 0.
    pub async fn effective_progress(&self, course_id: CourseId, server: Option<u8>) -> u8 {
        merge_progress(server, self.local_progress(course_id).await)
    }
}
