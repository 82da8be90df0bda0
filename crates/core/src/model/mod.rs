mod assignment;
mod course;
mod ids;
mod plan;
mod quiz;

pub use ids::{AssignmentId, CourseId, MilestoneId, ParseIdError, PlanId, QuestionId};

pub use assignment::{
    Assignment, AssignmentDraft, AssignmentKind, AssignmentPatch, AssignmentStatus,
};
pub use course::{Course, CourseDraft, CourseError, DEFAULT_COURSE_IMAGE};
pub use plan::{
    DEFAULT_PLAN_WEEKS, Milestone, PartialTrackerState, PlanError, STUDY_HOURS_RANGE, StudyPlan,
    StudyPlanDraft, TrackerState, duration_weeks, generate_milestones,
};
pub use quiz::{
    AnswerState, Question, Quiz, QuizAttempt, QuizError, QuizResult, percent, select_answer,
};
