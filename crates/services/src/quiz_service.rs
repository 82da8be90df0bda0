use std::sync::Arc;

use tracing::{debug, warn};

use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::KeyValueStore;
use study_core::model::{AnswerState, AssignmentId, QuestionId, Quiz, QuizAttempt, QuizResult};

use crate::Clock;
use crate::attempts::AttemptRecorder;
use crate::catalog::Catalog;
use crate::error::QuizServiceError;

/// One learner's pass through a quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    attempt: QuizAttempt,
}

impl QuizSession {
    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn assignment_id(&self) -> AssignmentId {
        self.quiz.assignment_id()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerState {
        self.attempt.answers()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.attempt.is_submitted()
    }

    #[must_use]
    pub fn is_result_visible(&self) -> bool {
        self.attempt.is_result_visible()
    }

    pub fn show_result(&mut self) {
        self.attempt.show_result();
    }

    pub fn hide_result(&mut self) {
        self.attempt.hide_result();
    }

    /// Score of the current answers without submitting.
    #[must_use]
    pub fn score(&self) -> (u32, u32) {
        self.quiz.score(self.attempt.answers())
    }
}

/// Opens quiz sessions and keeps their answers and results persisted.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    catalog: Arc<Catalog>,
    recorder: Arc<dyn AttemptRecorder>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        kv: Arc<dyn KeyValueStore>,
        catalog: Arc<Catalog>,
        recorder: Arc<dyn AttemptRecorder>,
    ) -> Self {
        Self {
            clock,
            kv,
            catalog,
            recorder,
        }
    }

    /// Start a session for `assignment_id`, restoring any saved answers.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` when no quiz exists for the id.
    pub async fn open(&self, assignment_id: AssignmentId) -> Result<QuizSession, QuizServiceError> {
        let quiz = self
            .catalog
            .quiz(assignment_id)
            .cloned()
            .ok_or(QuizServiceError::NotFound(assignment_id))?;

        let key = keys::quiz_answers(assignment_id);
        let answers = match read_json::<AnswerState>(self.kv.as_ref(), &key).await {
            Ok(saved) => saved.unwrap_or_default(),
            Err(err) => {
                warn!(%assignment_id, error = %err, "ignoring unreadable saved answers");
                AnswerState::new()
            }
        };
        debug!(%assignment_id, answered = answers.answered(), "quiz session opened");

        Ok(QuizSession {
            quiz,
            attempt: QuizAttempt::with_answers(answers),
        })
    }

    /// Record a selection and persist the full answer map.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` when the question or option does not
    /// exist. Persistence failures are logged, not returned.
    pub async fn select_answer(
        &self,
        session: &mut QuizSession,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), QuizServiceError> {
        session.quiz.check_answer(question_id, option_index)?;
        session.attempt.select(question_id, option_index);
        self.persist_answers(session.assignment_id(), session.answers())
            .await;
        Ok(())
    }

    /// Grade the session, persist the snapshot and notify the recorder.
    pub async fn submit(&self, session: &mut QuizSession) -> QuizResult {
        let result = session.attempt.submit(&session.quiz, self.clock.now());
        let assignment_id = session.assignment_id();

        let key = keys::quiz_result(assignment_id);
        if let Err(err) = write_json(self.kv.as_ref(), &key, &result).await {
            warn!(%assignment_id, error = %err, "failed to persist quiz result");
        }
        debug!(
            %assignment_id,
            raw = result.raw,
            total = result.total,
            percent = result.percent,
            "quiz submitted"
        );

        self.recorder
            .record_quiz_attempt(assignment_id, result.percent)
            .await;
        result
    }

    /// Clear answers and flags. The last result snapshot is kept.
    pub async fn retry(&self, session: &mut QuizSession) {
        session.attempt.retry();
        self.persist_answers(session.assignment_id(), session.answers())
            .await;
    }

    /// Most recent persisted submission, if any.
    pub async fn last_result(&self, assignment_id: AssignmentId) -> Option<QuizResult> {
        let key = keys::quiz_result(assignment_id);
        match read_json(self.kv.as_ref(), &key).await {
            Ok(result) => result,
            Err(err) => {
                warn!(%assignment_id, error = %err, "ignoring unreadable quiz result");
                None
            }
        }
    }

    async fn persist_answers(&self, assignment_id: AssignmentId, answers: &AnswerState) {
        let key = keys::quiz_answers(assignment_id);
        if let Err(err) = write_json(self.kv.as_ref(), &key, answers).await {
            warn!(%assignment_id, error = %err, "failed to persist quiz answers");
        }
    }
}
