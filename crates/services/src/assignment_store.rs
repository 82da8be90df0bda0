use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::KeyValueStore;
use study_core::model::{Assignment, AssignmentDraft, AssignmentId, AssignmentPatch};

use crate::attempts::AttemptRecorder;
use crate::error::AssignmentStoreError;

/// First id handed to assignments created at runtime.
pub const FIRST_CREATED_ASSIGNMENT_ID: u64 = 5000;

/// Session-wide assignment list, mirrored to the key-value store.
pub struct AssignmentStore {
    kv: Arc<dyn KeyValueStore>,
    assignments: Mutex<Vec<Assignment>>,
    next_id: AtomicU64,
}

impl AssignmentStore {
    /// Restore the saved list, or start from `seed` when nothing usable is
    /// stored.
    pub async fn load(kv: Arc<dyn KeyValueStore>, seed: &[Assignment]) -> Self {
        let assignments = match read_json::<Vec<Assignment>>(kv.as_ref(), keys::ASSIGNMENTS).await
        {
            Ok(Some(saved)) => saved,
            Ok(None) => seed.to_vec(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable assignment list");
                seed.to_vec()
            }
        };
        let next_id = assignments
            .iter()
            .map(|a| a.id.value().saturating_add(1))
            .max()
            .unwrap_or(0)
            .max(FIRST_CREATED_ASSIGNMENT_ID);

        Self {
            kv,
            assignments: Mutex::new(assignments),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// # Errors
    ///
    /// Returns `AssignmentStoreError::Poisoned` if the state lock is poisoned.
    pub fn list(&self) -> Result<Vec<Assignment>, AssignmentStoreError> {
        Ok(self.lock()?.clone())
    }

    /// # Errors
    ///
    /// Returns `AssignmentStoreError::Poisoned` if the state lock is poisoned.
    pub fn get(&self, id: AssignmentId) -> Result<Option<Assignment>, AssignmentStoreError> {
        Ok(self.lock()?.iter().find(|a| a.id == id).cloned())
    }

    /// Add an assignment with the next free id at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentStoreError::Poisoned` if the state lock is poisoned.
    pub async fn create_assignment(
        &self,
        draft: AssignmentDraft,
    ) -> Result<Assignment, AssignmentStoreError> {
        let id = AssignmentId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let assignment = Assignment::from_draft(id, draft);
        let snapshot = {
            let mut guard = self.lock()?;
            guard.insert(0, assignment.clone());
            guard.clone()
        };
        debug!(%id, title = %assignment.title, "assignment created");
        self.persist(&snapshot).await;
        Ok(assignment)
    }

    /// # Errors
    ///
    /// Returns `AssignmentStoreError::NotFound` for an unknown id.
    pub async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment, AssignmentStoreError> {
        let (updated, snapshot) = {
            let mut guard = self.lock()?;
            let assignment = guard
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(AssignmentStoreError::NotFound(id))?;
            assignment.apply_patch(patch);
            let updated = assignment.clone();
            (updated, guard.clone())
        };
        self.persist(&snapshot).await;
        Ok(updated)
    }

    /// Count a graded attempt against `id`.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentStoreError::NotFound` for an unknown id.
    pub async fn record_attempt(
        &self,
        id: AssignmentId,
        percent: u8,
    ) -> Result<Assignment, AssignmentStoreError> {
        let (updated, snapshot) = {
            let mut guard = self.lock()?;
            let assignment = guard
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(AssignmentStoreError::NotFound(id))?;
            assignment.record_attempt(percent);
            let updated = assignment.clone();
            (updated, guard.clone())
        };
        debug!(%id, percent, attempts = updated.attempts, "quiz attempt recorded");
        self.persist(&snapshot).await;
        Ok(updated)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Assignment>>, AssignmentStoreError> {
        self.assignments
            .lock()
            .map_err(|_| AssignmentStoreError::Poisoned)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.assignments.lock();
            panic!("poisoning assignment state");
        }));
    }

    async fn persist(&self, assignments: &[Assignment]) {
        if let Err(err) = write_json(self.kv.as_ref(), keys::ASSIGNMENTS, assignments).await {
            warn!(error = %err, "failed to persist assignment list");
        }
    }
}

#[async_trait]
impl AttemptRecorder for AssignmentStore {
    async fn record_quiz_attempt(&self, assignment_id: AssignmentId, percent: u8) {
        if let Err(err) = self.record_attempt(assignment_id, percent).await {
            warn!(%assignment_id, error = %err, "quiz attempt not recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use storage::repository::InMemoryStore;
    use study_core::model::{AssignmentKind, AssignmentStatus, CourseId};

    use crate::catalog::Catalog;

    fn draft(title: &str) -> AssignmentDraft {
        AssignmentDraft {
            title: title.into(),
            course_id: CourseId::new(1000),
            course: "Rust".into(),
            kind: AssignmentKind::Quiz,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            status: AssignmentStatus::Pending,
            points: 20,
            time_limit: "15 minutes".into(),
            attempts: 0,
            max_attempts: 3,
        }
    }

    async fn seeded(kv: Arc<InMemoryStore>) -> AssignmentStore {
        let catalog = Catalog::demo().unwrap();
        AssignmentStore::load(kv, catalog.assignments()).await
    }

    #[tokio::test]
    async fn seeds_from_catalog_when_empty() {
        let store = seeded(Arc::new(InMemoryStore::new())).await;
        assert_eq!(store.list().unwrap().len(), 4);
        let exam = store.get(AssignmentId::new(4)).unwrap().unwrap();
        assert_eq!(exam.score, Some(92));
    }

    #[tokio::test]
    async fn recording_attempt_updates_and_persists() {
        let kv = Arc::new(InMemoryStore::new());
        let store = seeded(kv.clone()).await;

        store.record_quiz_attempt(AssignmentId::new(1), 67).await;
        let quiz = store.get(AssignmentId::new(1)).unwrap().unwrap();
        assert_eq!(quiz.attempts, 1);
        assert_eq!(quiz.score, Some(67));
        assert_eq!(quiz.status, AssignmentStatus::Completed);

        let reloaded = AssignmentStore::load(kv, &[]).await;
        assert_eq!(reloaded.get(AssignmentId::new(1)).unwrap(), Some(quiz));
    }

    #[tokio::test]
    async fn unknown_attempt_is_ignored() {
        let store = seeded(Arc::new(InMemoryStore::new())).await;
        let before = store.list().unwrap();
        store.record_quiz_attempt(AssignmentId::new(77), 50).await;
        assert_eq!(store.list().unwrap(), before);

        let err = store
            .record_attempt(AssignmentId::new(77), 50)
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn created_ids_start_at_5000_and_continue_after_reload() {
        let kv = Arc::new(InMemoryStore::new());
        let store = seeded(kv.clone()).await;
        let first = store.create_assignment(draft("A")).await.unwrap();
        let second = store.create_assignment(draft("B")).await.unwrap();
        assert_eq!(first.id, AssignmentId::new(5000));
        assert_eq!(second.id, AssignmentId::new(5001));

        let reloaded = AssignmentStore::load(kv, &[]).await;
        let third = reloaded.create_assignment(draft("C")).await.unwrap();
        assert_eq!(third.id, AssignmentId::new(5002));
    }

    #[tokio::test]
    async fn created_assignments_are_listed_first() {
        let store = seeded(Arc::new(InMemoryStore::new())).await;
        store.create_assignment(draft("A")).await.unwrap();
        store.create_assignment(draft("B")).await.unwrap();

        let titles: Vec<_> = store.list().unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles.len(), 6);
        assert_eq!(titles[..2], ["B".to_string(), "A".to_string()]);
    }

    #[tokio::test]
    async fn max_persisted_id_does_not_overflow() {
        let top = Assignment::from_draft(AssignmentId::new(u64::MAX), draft("Top"));
        let store = AssignmentStore::load(Arc::new(InMemoryStore::new()), &[top]).await;
        let created = store.create_assignment(draft("Next")).await.unwrap();
        assert_eq!(created.title, "Next");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let store = seeded(Arc::new(InMemoryStore::new())).await;
        let updated = store
            .update_assignment(
                AssignmentId::new(2),
                AssignmentPatch {
                    points: Some(175),
                    ..AssignmentPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.points, 175);
        assert_eq!(updated.status, AssignmentStatus::InProgress);
    }

    #[tokio::test]
    async fn corrupt_list_reseeds() {
        let kv = Arc::new(InMemoryStore::new());
        kv.set(keys::ASSIGNMENTS, "{").await.unwrap();
        let store = seeded(kv).await;
        assert_eq!(store.list().unwrap().len(), 4);
    }
}
