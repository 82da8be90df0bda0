use async_trait::async_trait;

use study_core::model::AssignmentId;

/// Receives quiz scores once a submission has been graded.
///
/// Callers treat notification as fire-and-forget, so implementations log
/// their own failures instead of returning them.
#[async_trait]
pub trait AttemptRecorder: Send + Sync {
    async fn record_quiz_attempt(&self, assignment_id: AssignmentId, percent: u8);
}

/// Recorder that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

#[async_trait]
impl AttemptRecorder for NoopRecorder {
    async fn record_quiz_attempt(&self, _assignment_id: AssignmentId, _percent: u8) {}
}
