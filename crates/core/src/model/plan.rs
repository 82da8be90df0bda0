use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::ids::{MilestoneId, PlanId};

/// Weeks assumed when a duration label has no leading number.
pub const DEFAULT_PLAN_WEEKS: u32 = 8;

/// Inclusive bounds for the weekly study-hour target.
pub const STUDY_HOURS_RANGE: std::ops::RangeInclusive<u32> = 1..=40;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlanError {
    #[error("title is required")]
    EmptyTitle,

    #[error("description is required")]
    EmptyDescription,

    #[error("duration is required")]
    EmptyDuration,

    #[error("at least one subject is required")]
    NoSubjects,

    #[error("start date is required")]
    MissingStartDate,

    #[error("study hours must be between 1 and 40, got {0}")]
    InvalidStudyHours(u32),
}

//
// ─── MILESTONE ─────────────────────────────────────────────────────────────────
//

/// A trackable unit of a study plan, tagged to a 1-based week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub title: String,
    pub description: String,
    pub week: u32,
    pub completed: bool,
}

impl Milestone {
    #[must_use]
    pub fn new(
        id: impl Into<MilestoneId>,
        title: impl Into<String>,
        description: impl Into<String>,
        week: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            week,
            completed: false,
        }
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Leading integer of a duration label (`"12 weeks"` → 12).
///
/// Labels without a positive leading number fall back to
/// [`DEFAULT_PLAN_WEEKS`].
#[must_use]
pub fn duration_weeks(label: &str) -> u32 {
    let label = label.trim_start();
    let digits = label
        .find(|c: char| !c.is_ascii_digit())
        .map_or(label, |end| &label[..end]);
    digits
        .parse::<u32>()
        .ok()
        .filter(|weeks| *weeks > 0)
        .unwrap_or(DEFAULT_PLAN_WEEKS)
}

/// One milestone per week, ids `gen-{week}-{plan}`.
#[must_use]
pub fn generate_milestones(plan_id: &PlanId, weeks: u32) -> Vec<Milestone> {
    (1..=weeks)
        .map(|week| {
            Milestone::new(
                format!("gen-{week}-{plan_id}"),
                format!("Week {week} milestone"),
                format!("Complete planned study tasks for week {week}."),
                week,
            )
        })
        .collect()
}

//
// ─── STUDY PLAN ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: PlanId,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub subjects: Vec<String>,
    pub difficulty: String,
    pub study_hours_per_week: u32,
    pub start_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl StudyPlan {
    #[must_use]
    pub fn weeks(&self) -> u32 {
        duration_weeks(&self.duration)
    }

    #[must_use]
    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }
}

/// Study-plan creation form, validated before a plan is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub subjects: Vec<String>,
    pub difficulty: String,
    pub study_hours_per_week: u32,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl StudyPlanDraft {
    /// Check the form rules and build a plan with generated milestones.
    ///
    /// # Errors
    ///
    /// Returns the first `PlanError` found, in form field order.
    pub fn validate(self, id: PlanId) -> Result<StudyPlan, PlanError> {
        if self.title.trim().is_empty() {
            return Err(PlanError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(PlanError::EmptyDescription);
        }
        if self.duration.trim().is_empty() {
            return Err(PlanError::EmptyDuration);
        }
        if self.subjects.iter().all(|s| s.trim().is_empty()) {
            return Err(PlanError::NoSubjects);
        }
        let start_date = self.start_date.ok_or(PlanError::MissingStartDate)?;
        if !STUDY_HOURS_RANGE.contains(&self.study_hours_per_week) {
            return Err(PlanError::InvalidStudyHours(self.study_hours_per_week));
        }

        let milestones = generate_milestones(&id, duration_weeks(&self.duration));
        let difficulty = if self.difficulty.trim().is_empty() {
            "Beginner".to_string()
        } else {
            self.difficulty.trim().to_string()
        };

        Ok(StudyPlan {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            duration: self.duration.trim().to_string(),
            subjects: self
                .subjects
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            difficulty,
            study_hours_per_week: self.study_hours_per_week,
            start_date,
            created_at: start_date,
            goals: self.goals,
            prerequisites: self.prerequisites,
            milestones,
        })
    }
}

//
// ─── TRACKER STATE ─────────────────────────────────────────────────────────────
//

/// Persisted bundle for one plan: milestones, current week pointer, notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub milestones: Vec<Milestone>,
    pub current_week: u32,
    pub notes: String,
}

impl TrackerState {
    #[must_use]
    pub fn for_plan(plan: &StudyPlan) -> Self {
        Self {
            milestones: plan.milestones.clone(),
            current_week: 1,
            notes: String::new(),
        }
    }

    /// Highest week referenced by any milestone, at least 1.
    #[must_use]
    pub fn last_week(&self) -> u32 {
        self.milestones.iter().map(|m| m.week).max().unwrap_or(1).max(1)
    }

    /// Move the week pointer, clamped to `1..=last_week()`.
    pub fn set_current_week(&mut self, week: u32) {
        self.current_week = week.clamp(1, self.last_week());
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }
}

/// Saved tracker payload where every field may be missing.
///
/// Each field is decoded on its own; a field of the wrong shape reads as
/// missing and leaves the others intact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialTrackerState {
    #[serde(default, deserialize_with = "lenient")]
    pub milestones: Option<Vec<Milestone>>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_week: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl PartialTrackerState {
    /// Overlay the saved fields onto `defaults`.
    #[must_use]
    pub fn merge_into(self, mut defaults: TrackerState) -> TrackerState {
        if let Some(milestones) = self.milestones {
            defaults.milestones = milestones;
        }
        if let Some(week) = self.current_week {
            defaults.current_week = week;
        }
        if let Some(notes) = self.notes {
            defaults.notes = notes;
        }
        defaults
    }
}
