use std::sync::Arc;

use tracing::{debug, warn};

use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::KeyValueStore;
use study_core::model::{PlanId, StudyPlan, StudyPlanDraft};

use crate::catalog::Catalog;
use crate::error::StudyPlanServiceError;
use crate::tracker_service::TrackerService;

/// Built-in study plans plus the ones created by the learner.
#[derive(Clone)]
pub struct StudyPlanService {
    kv: Arc<dyn KeyValueStore>,
    catalog: Arc<Catalog>,
    tracker: TrackerService,
}

impl StudyPlanService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            tracker: TrackerService::new(Arc::clone(&kv)),
            kv,
            catalog,
        }
    }

    /// Plans created so far. Unreadable data counts as none.
    pub async fn created_plans(&self) -> Vec<StudyPlan> {
        match read_json::<Vec<StudyPlan>>(self.kv.as_ref(), keys::CREATED_PLANS).await {
            Ok(plans) => plans.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable created plans");
                Vec::new()
            }
        }
    }

    /// Built-in plans first, then created ones in creation order.
    pub async fn list_plans(&self) -> Vec<StudyPlan> {
        let mut plans = self.catalog.plans().to_vec();
        plans.extend(self.created_plans().await);
        plans
    }

    /// Validate `draft`, give it a fresh id and week milestones, and store it.
    ///
    /// # Errors
    ///
    /// Returns `StudyPlanServiceError::Plan` for invalid drafts.
    /// Returns `StudyPlanServiceError::Storage` if the plan cannot be saved.
    pub async fn create_plan(
        &self,
        draft: StudyPlanDraft,
    ) -> Result<StudyPlan, StudyPlanServiceError> {
        let plan = draft.validate(PlanId::generate())?;
        let mut created = self.created_plans().await;
        created.push(plan.clone());
        write_json(self.kv.as_ref(), keys::CREATED_PLANS, &created).await?;
        debug!(plan_id = %plan.id, weeks = plan.milestones.len(), "study plan created");
        Ok(plan)
    }

    /// Look a plan up by id. Milestones saved by a tracker replace the
    /// plan's own list.
    pub async fn find_plan(&self, id: &PlanId) -> Option<StudyPlan> {
        let mut plan = match self.catalog.plan(id) {
            Some(plan) => plan.clone(),
            None => self
                .created_plans()
                .await
                .into_iter()
                .find(|p| &p.id == id)?,
        };
        if let Some(saved) = self.tracker.saved_milestones(id).await {
            plan.milestones = saved;
        }
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use storage::repository::InMemoryStore;
    use study_core::model::{MilestoneId, PlanError};

    fn service(kv: Arc<InMemoryStore>) -> StudyPlanService {
        StudyPlanService::new(kv, Arc::new(Catalog::demo().unwrap()))
    }

    fn draft() -> StudyPlanDraft {
        StudyPlanDraft {
            title: "Systems Rust".into(),
            description: "Async and unsafe.".into(),
            duration: "6 weeks".into(),
            subjects: vec!["Rust".into(), "Tokio".into()],
            difficulty: "Advanced".into(),
            study_hours_per_week: 8,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            goals: Vec::new(),
            prerequisites: Vec::new(),
        }
    }

    #[tokio::test]
    async fn created_plan_is_listed_and_findable() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = service(kv.clone());
        let plan = svc.create_plan(draft()).await.unwrap();
        assert_eq!(plan.milestones.len(), 6);
        assert_eq!(
            plan.milestones[0].id,
            MilestoneId::new(format!("gen-1-{}", plan.id))
        );

        let listed = svc.list_plans().await;
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.last().map(|p| &p.id), Some(&plan.id));

        let again = service(kv);
        assert_eq!(again.find_plan(&plan.id).await, Some(plan));
    }

    #[tokio::test]
    async fn invalid_draft_is_not_stored() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = service(kv.clone());
        let mut bad = draft();
        bad.study_hours_per_week = 0;
        let err = svc.create_plan(bad).await.unwrap_err();
        assert!(matches!(err, StudyPlanServiceError::Plan(PlanError::InvalidStudyHours(0))));
        assert!(kv.is_empty().unwrap());
    }

    #[tokio::test]
    async fn find_prefers_saved_tracker_milestones() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = service(kv.clone());
        let id = PlanId::new("2");

        let plan = svc.find_plan(&id).await.unwrap();
        let tracker = TrackerService::new(kv.clone());
        let mut live = tracker.open(&plan).await;
        tracker
            .toggle_milestone(&mut live, &MilestoneId::new("ds3"))
            .await;

        let found = svc.find_plan(&id).await.unwrap();
        assert!(found.milestones.iter().all(|m| m.completed));
        assert!(svc.find_plan(&PlanId::new("missing")).await.is_none());
    }
}
