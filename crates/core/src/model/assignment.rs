use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ids::{AssignmentId, CourseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentKind {
    Quiz,
    Assignment,
    Project,
    Exam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl AssignmentStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

/// An assignment as tracked by the local assignment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    pub course_id: CourseId,
    pub course: String,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    pub due_date: NaiveDate,
    pub status: AssignmentStatus,
    pub points: u32,
    pub time_limit: String,
    pub attempts: u32,
    pub max_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl Assignment {
    #[must_use]
    pub fn from_draft(id: AssignmentId, draft: AssignmentDraft) -> Self {
        Self {
            id,
            title: draft.title,
            course_id: draft.course_id,
            course: draft.course,
            kind: draft.kind,
            due_date: draft.due_date,
            status: draft.status,
            points: draft.points,
            time_limit: draft.time_limit,
            attempts: draft.attempts,
            max_attempts: draft.max_attempts,
            score: None,
        }
    }

    /// Count one scored attempt: bumps `attempts`, keeps the latest score and
    /// marks the assignment completed.
    pub fn record_attempt(&mut self, percent: u8) {
        self.attempts = self.attempts.saturating_add(1);
        self.score = Some(percent.min(100));
        self.status = AssignmentStatus::Completed;
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn apply_patch(&mut self, patch: AssignmentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(points) = patch.points {
            self.points = points;
        }
        if let Some(max_attempts) = patch.max_attempts {
            self.max_attempts = max_attempts;
        }
    }
}

/// Everything needed to create an assignment except its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub title: String,
    pub course_id: CourseId,
    pub course: String,
    pub kind: AssignmentKind,
    pub due_date: NaiveDate,
    pub status: AssignmentStatus,
    pub points: u32,
    pub time_limit: String,
    pub attempts: u32,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<AssignmentStatus>,
    pub points: Option<u32>,
    pub max_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assignment {
        Assignment::from_draft(
            AssignmentId::new(1),
            AssignmentDraft {
                title: "Linear Algebra Quiz".into(),
                course_id: CourseId::new(1),
                course: "Linear Algebra".into(),
                kind: AssignmentKind::Quiz,
                due_date: NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
                status: AssignmentStatus::Pending,
                points: 20,
                time_limit: "15 minutes".into(),
                attempts: 0,
                max_attempts: 3,
            },
        )
    }

    #[test]
    fn recording_attempts_completes_assignment() {
        let mut a = sample();
        a.record_attempt(67);
        assert_eq!(a.attempts, 1);
        assert_eq!(a.score, Some(67));
        assert_eq!(a.status, AssignmentStatus::Completed);
        assert_eq!(a.attempts_remaining(), 2);

        a.record_attempt(100);
        a.record_attempt(100);
        a.record_attempt(100);
        assert_eq!(a.attempts, 4);
        assert_eq!(a.attempts_remaining(), 0);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut a = sample();
        a.apply_patch(AssignmentPatch {
            status: Some(AssignmentStatus::InProgress),
            ..AssignmentPatch::default()
        });
        assert_eq!(a.status, AssignmentStatus::InProgress);
        assert_eq!(a.title, "Linear Algebra Quiz");
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "Quiz");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["dueDate"], "2024-01-30");
        assert_eq!(json["maxAttempts"], 3);
        assert!(json.get("score").is_none());
        assert_eq!(AssignmentStatus::InProgress.label(), "in-progress");
    }
}
