//! Key layout of the persisted key-value data. Values are JSON strings.

use study_core::model::{AssignmentId, CourseId, PlanId};

/// Assignment list mirrored by the assignment store.
pub const ASSIGNMENTS: &str = "studymate.assignments";

/// Study plans created during the session.
pub const CREATED_PLANS: &str = "created-sp-plans";

/// Bearer token for the REST backend.
pub const AUTH_TOKEN: &str = "authToken";

/// Cached profile of the signed-in user.
pub const USER: &str = "user";

/// In-flight answers for one quiz.
#[must_use]
pub fn quiz_answers(id: AssignmentId) -> String {
    format!("studymate.quiz.{id}.answers")
}

/// Snapshot of the latest submission for one quiz.
#[must_use]
pub fn quiz_result(id: AssignmentId) -> String {
    format!("studymate.quiz.{id}.result")
}

/// Tracker state for one study plan.
#[must_use]
pub fn tracker_state(id: &PlanId) -> String {
    format!("sp-state-{id}")
}

/// Local reader progress overlay for one course.
#[must_use]
pub fn course_progress(id: CourseId) -> String {
    format!("course-progress-{id}")
}
