use std::sync::Arc;

use tracing::{debug, warn};

use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::KeyValueStore;
use study_core::model::{
    Milestone, MilestoneId, PartialTrackerState, PlanId, StudyPlan, TrackerState,
};
use study_core::progress;

/// Live tracker for one study plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    plan_id: PlanId,
    state: TrackerState,
}

impl ProgressTracker {
    #[must_use]
    pub fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.state.milestones
    }

    #[must_use]
    pub fn current_week(&self) -> u32 {
        self.state.current_week
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.state.notes
    }

    #[must_use]
    pub fn overall_progress(&self) -> u8 {
        progress::overall_progress(&self.state.milestones)
    }

    #[must_use]
    pub fn week_progress(&self, week: u32) -> u8 {
        progress::week_progress(&self.state.milestones, week)
    }

    /// Sorted distinct weeks with at least one milestone.
    #[must_use]
    pub fn weeks(&self) -> Vec<u32> {
        progress::weeks(&self.state.milestones)
    }

    pub fn set_current_week(&mut self, week: u32) {
        self.state.set_current_week(week);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.state.set_notes(notes);
    }
}

/// Loads and saves per-plan tracker state. Storage failures never reach
/// the caller; they are logged and the in-memory state stays authoritative.
#[derive(Clone)]
pub struct TrackerService {
    kv: Arc<dyn KeyValueStore>,
}

impl TrackerService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn open(&self, plan: &StudyPlan) -> ProgressTracker {
        ProgressTracker {
            plan_id: plan.id.clone(),
            state: self.load_state(plan).await,
        }
    }

    /// Saved state for `plan`, merged field by field over the plan defaults.
    pub async fn load_state(&self, plan: &StudyPlan) -> TrackerState {
        let defaults = TrackerState::for_plan(plan);
        let key = keys::tracker_state(&plan.id);
        match read_json::<PartialTrackerState>(self.kv.as_ref(), &key).await {
            Ok(Some(saved)) => saved.merge_into(defaults),
            Ok(None) => defaults,
            Err(err) => {
                warn!(plan_id = %plan.id, error = %err, "ignoring unreadable tracker state");
                defaults
            }
        }
    }

    /// Milestones saved for `plan_id`, if a tracker has ever stored any.
    pub async fn saved_milestones(&self, plan_id: &PlanId) -> Option<Vec<Milestone>> {
        let key = keys::tracker_state(plan_id);
        match read_json::<PartialTrackerState>(self.kv.as_ref(), &key).await {
            Ok(saved) => saved.and_then(|s| s.milestones),
            Err(err) => {
                warn!(%plan_id, error = %err, "ignoring unreadable tracker state");
                None
            }
        }
    }

    pub async fn save_state(&self, plan_id: &PlanId, state: &TrackerState) {
        let key = keys::tracker_state(plan_id);
        match write_json(self.kv.as_ref(), &key, state).await {
            Ok(()) => debug!(%plan_id, week = state.current_week, "tracker state saved"),
            Err(err) => warn!(%plan_id, error = %err, "failed to persist tracker state"),
        }
    }

    /// Flip one milestone and persist right away.
    ///
    /// Returns the new completion flag, or `None` when the id is not part of
    /// the plan (nothing changes in that case).
    pub async fn toggle_milestone(
        &self,
        tracker: &mut ProgressTracker,
        milestone_id: &MilestoneId,
    ) -> Option<bool> {
        let next = progress::toggle_milestone(&tracker.state.milestones, milestone_id);
        let completed = next.iter().find(|m| &m.id == milestone_id)?.completed;
        tracker.state.milestones = next;
        self.save_state(&tracker.plan_id, &tracker.state).await;
        Some(completed)
    }

    pub async fn save_and_exit(&self, tracker: &ProgressTracker) {
        self.save_state(&tracker.plan_id, &tracker.state).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use storage::repository::InMemoryStore;

    fn twelve_milestone_plan() -> StudyPlan {
        let milestones = (1..=12_u32)
            .map(|i| {
                Milestone::new(format!("m{i}"), format!("M{i}"), "", (i - 1) / 3 + 1)
                    .completed(i <= 3)
            })
            .collect();
        StudyPlan {
            id: PlanId::new("p1"),
            title: "Plan".into(),
            description: "d".into(),
            duration: "4 weeks".into(),
            subjects: vec!["Rust".into()],
            difficulty: "Beginner".into(),
            study_hours_per_week: 5,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            goals: Vec::new(),
            prerequisites: Vec::new(),
            milestones,
        }
    }

    #[tokio::test]
    async fn fresh_tracker_uses_plan_defaults() {
        let svc = TrackerService::new(Arc::new(InMemoryStore::new()));
        let tracker = svc.open(&twelve_milestone_plan()).await;
        assert_eq!(tracker.current_week(), 1);
        assert_eq!(tracker.overall_progress(), 25);
        assert_eq!(tracker.week_progress(1), 100);
        assert_eq!(tracker.week_progress(2), 0);
        assert_eq!(tracker.weeks(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn toggle_persists_immediately() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = TrackerService::new(kv.clone());
        let plan = twelve_milestone_plan();

        let mut tracker = svc.open(&plan).await;
        assert_eq!(svc.toggle_milestone(&mut tracker, &MilestoneId::new("m4")).await, Some(true));
        assert_eq!(tracker.week_progress(2), 33);

        let reopened = svc.open(&plan).await;
        assert_eq!(reopened.milestones(), tracker.milestones());

        assert_eq!(svc.toggle_milestone(&mut tracker, &MilestoneId::new("m4")).await, Some(false));
        assert_eq!(tracker.milestones(), plan.milestones.as_slice());
    }

    #[tokio::test]
    async fn unknown_milestone_is_a_no_op() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = TrackerService::new(kv.clone());
        let mut tracker = svc.open(&twelve_milestone_plan()).await;
        let before = tracker.clone();

        assert_eq!(svc.toggle_milestone(&mut tracker, &MilestoneId::new("zzz")).await, None);
        assert_eq!(tracker, before);
        assert!(kv.is_empty().unwrap());
    }

    #[tokio::test]
    async fn partial_saved_state_keeps_defaults() {
        let kv = Arc::new(InMemoryStore::new());
        kv.set("sp-state-p1", r#"{"currentWeek":3}"#).await.unwrap();
        let svc = TrackerService::new(kv);

        let tracker = svc.open(&twelve_milestone_plan()).await;
        assert_eq!(tracker.current_week(), 3);
        assert_eq!(tracker.milestones().len(), 12);
        assert_eq!(tracker.notes(), "");
    }

    #[tokio::test]
    async fn mistyped_week_keeps_saved_milestones_and_notes() {
        let kv = Arc::new(InMemoryStore::new());
        kv.set(
            "sp-state-p1",
            r#"{"milestones":[{"id":"a","title":"A","description":"","week":1,"completed":true}],"currentWeek":1.5,"notes":"keep me"}"#,
        )
        .await
        .unwrap();
        let svc = TrackerService::new(kv);

        let tracker = svc.open(&twelve_milestone_plan()).await;
        assert_eq!(tracker.current_week(), 1);
        assert_eq!(tracker.milestones().len(), 1);
        assert!(tracker.milestones()[0].completed);
        assert_eq!(tracker.notes(), "keep me");
    }

    #[tokio::test]
    async fn save_and_exit_round_trips_notes_and_week() {
        let kv = Arc::new(InMemoryStore::new());
        let svc = TrackerService::new(kv.clone());
        let plan = twelve_milestone_plan();

        let mut tracker = svc.open(&plan).await;
        tracker.set_current_week(9);
        tracker.set_notes("review chapter 2");
        svc.save_and_exit(&tracker).await;

        let reopened = svc.open(&plan).await;
        assert_eq!(reopened.current_week(), 4);
        assert_eq!(reopened.notes(), "review chapter 2");
        assert_eq!(
            svc.saved_milestones(&plan.id).await.map(|m| m.len()),
            Some(12)
        );
    }

    #[tokio::test]
    async fn corrupt_state_falls_back_and_write_failures_are_swallowed() {
        let kv = Arc::new(InMemoryStore::with_quota(16));
        kv.set("sp-state-p1", "[oops").await.unwrap();
        let svc = TrackerService::new(kv);

        let mut tracker = svc.open(&twelve_milestone_plan()).await;
        assert_eq!(tracker.overall_progress(), 25);
        assert_eq!(svc.toggle_milestone(&mut tracker, &MilestoneId::new("m12")).await, Some(true));
        assert_eq!(tracker.overall_progress(), 33);
    }
}
