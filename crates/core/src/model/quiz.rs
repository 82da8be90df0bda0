use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AssignmentId, QuestionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question {0} needs at least two options")]
    TooFewOptions(QuestionId),

    #[error("question {id}: correct index {index} is outside {len} options")]
    CorrectIndexOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("question {id}: option {index} is outside {len} options")]
    OptionOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single-answer multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuizError::TooFewOptions` for fewer than two options and
    /// `QuizError::CorrectIndexOutOfRange` when `correct_index` does not
    /// point at an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuizError> {
        if options.len() < 2 {
            return Err(QuizError::TooFewOptions(id));
        }
        if correct_index >= options.len() {
            return Err(QuizError::CorrectIndexOutOfRange {
                id,
                index: correct_index,
                len: options.len(),
            });
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self, chosen: Option<usize>) -> bool {
        chosen == Some(self.correct_index)
    }
}

//
// ─── QUIZ ─────────────────────────────────────────────────────────────────────
//

/// A fixed quiz attached to an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    assignment_id: AssignmentId,
    title: String,
    instructions: String,
    time_limit_minutes: u32,
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::DuplicateQuestion` if two questions share an id.
    pub fn new(
        assignment_id: AssignmentId,
        title: impl Into<String>,
        instructions: impl Into<String>,
        time_limit_minutes: u32,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(QuizError::DuplicateQuestion(q.id()));
            }
        }
        Ok(Self {
            assignment_id,
            title: title.into(),
            instructions: instructions.into(),
            time_limit_minutes,
            questions,
        })
    }

    #[must_use]
    pub fn assignment_id(&self) -> AssignmentId {
        self.assignment_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    /// Validate a selection before handing it to `select_answer`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownQuestion` or `QuizError::OptionOutOfRange`.
    pub fn check_answer(&self, id: QuestionId, option_index: usize) -> Result<(), QuizError> {
        let question = self.question(id).ok_or(QuizError::UnknownQuestion(id))?;
        if option_index >= question.options().len() {
            return Err(QuizError::OptionOutOfRange {
                id,
                index: option_index,
                len: question.options().len(),
            });
        }
        Ok(())
    }

    /// Count correct answers. Unanswered questions are incorrect and answers
    /// for ids outside the quiz are ignored.
    #[must_use]
    pub fn score(&self, answers: &AnswerState) -> (u32, u32) {
        let raw = self
            .questions
            .iter()
            .filter(|q| q.is_correct(answers.get(q.id())))
            .count();
        (u32::try_from(raw).unwrap_or(u32::MAX), self.total())
    }

    /// Score `answers` and stamp the result with `at`.
    #[must_use]
    pub fn submit(&self, answers: &AnswerState, at: DateTime<Utc>) -> QuizResult {
        let (raw, total) = self.score(answers);
        QuizResult {
            answers: answers.clone(),
            raw,
            total,
            percent: percent(raw, total),
            at,
        }
    }
}

/// `round(raw / total * 100)`, with 0 for an empty quiz.
#[must_use]
pub fn percent(raw: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let raw = raw.min(total);
    let value = (f64::from(raw) / f64::from(total) * 100.0).round();
    // raw <= total keeps value inside 0..=100
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let value = value as u8;
    value
}

//
// ─── ANSWERS ──────────────────────────────────────────────────────────────────
//

/// Learner selections keyed by question id. `None` marks a question that was
/// explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerState(BTreeMap<QuestionId, Option<usize>>);

impl AnswerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `question_id` set to `option_index`.
    #[must_use]
    pub fn select(&self, question_id: QuestionId, option_index: usize) -> Self {
        let mut next = self.clone();
        next.0.insert(question_id, Some(option_index));
        next
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<usize> {
        self.0.get(&question_id).copied().flatten()
    }

    /// Number of questions with a selected option.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.0.values().filter(|v| v.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, Option<usize>)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(QuestionId, usize)> for AnswerState {
    fn from_iter<I: IntoIterator<Item = (QuestionId, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

/// Pure selection step: `state` with `question_id` answered as `option_index`.
#[must_use]
pub fn select_answer(
    state: &AnswerState,
    question_id: QuestionId,
    option_index: usize,
) -> AnswerState {
    state.select(question_id, option_index)
}

//
// ─── RESULT ───────────────────────────────────────────────────────────────────
//

/// Outcome of one submission. Also the persisted snapshot shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub answers: AnswerState,
    pub raw: u32,
    pub total: u32,
    pub percent: u8,
    pub at: DateTime<Utc>,
}

impl QuizResult {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.raw == self.total
    }
}

//
// ─── ATTEMPT ──────────────────────────────────────────────────────────────────
//

/// In-progress attempt: answers plus the submitted/result-visible flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizAttempt {
    answers: AnswerState,
    submitted: bool,
    result_visible: bool,
}

impl QuizAttempt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_answers(answers: AnswerState) -> Self {
        Self {
            answers,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerState {
        &self.answers
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_result_visible(&self) -> bool {
        self.result_visible
    }

    pub fn select(&mut self, question_id: QuestionId, option_index: usize) {
        self.answers = select_answer(&self.answers, question_id, option_index);
    }

    /// Score the current answers and move to `submitted`.
    pub fn submit(&mut self, quiz: &Quiz, at: DateTime<Utc>) -> QuizResult {
        let result = quiz.submit(&self.answers, at);
        self.submitted = true;
        self.result_visible = true;
        result
    }

    pub fn show_result(&mut self) {
        self.result_visible = true;
    }

    pub fn hide_result(&mut self) {
        self.result_visible = false;
    }

    /// Back to an empty, unsubmitted attempt.
    pub fn retry(&mut self) {
        *self = Self::default();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn q(id: u64, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn sample_quiz() -> Quiz {
        Quiz::new(
            AssignmentId::new(1),
            "Linear Algebra",
            "Answer all questions.",
            15,
            vec![q(1, 1), q(2, 2), q(3, 1)],
        )
        .unwrap()
    }

    #[test]
    fn scores_example_quiz() {
        let quiz = sample_quiz();
        let answers: AnswerState = [
            (QuestionId::new(1), 1),
            (QuestionId::new(2), 0),
            (QuestionId::new(3), 1),
        ]
        .into_iter()
        .collect();

        let result = quiz.submit(&answers, fixed_now());
        assert_eq!(result.raw, 2);
        assert_eq!(result.total, 3);
        assert_eq!(result.percent, 67);
    }

    #[test]
    fn unanswered_and_unknown_ids_do_not_score() {
        let quiz = sample_quiz();
        let answers = AnswerState::new()
            .select(QuestionId::new(1), 1)
            .select(QuestionId::new(99), 1);
        assert_eq!(quiz.score(&answers), (1, 3));
    }

    #[test]
    fn empty_quiz_scores_zero_percent() {
        let quiz = Quiz::new(AssignmentId::new(2), "Empty", "", 5, Vec::new()).unwrap();
        let result = quiz.submit(&AnswerState::new(), fixed_now());
        assert_eq!((result.raw, result.total, result.percent), (0, 0, 0));
    }

    #[test]
    fn percent_stays_in_range() {
        for total in 1..=25_u32 {
            for raw in 0..=total {
                assert!(percent(raw, total) <= 100);
            }
            assert_eq!(percent(total, total), 100);
            assert_eq!(percent(0, total), 0);
        }
    }

    #[test]
    fn submit_is_repeatable() {
        let quiz = sample_quiz();
        let answers = AnswerState::new().select(QuestionId::new(2), 2);
        let first = quiz.submit(&answers, fixed_now());
        let second = quiz.submit(&answers, fixed_now());
        assert_eq!(first, second);
    }

    #[test]
    fn retry_then_all_correct_is_perfect() {
        let quiz = sample_quiz();
        let mut attempt = QuizAttempt::new();
        attempt.select(QuestionId::new(1), 0);
        let first = attempt.submit(&quiz, fixed_now());
        assert!(attempt.is_submitted());
        assert_eq!(first.raw, 0);

        attempt.retry();
        assert!(!attempt.is_submitted());
        assert!(!attempt.is_result_visible());
        assert!(attempt.answers().is_empty());

        for question in quiz.questions() {
            attempt.select(question.id(), question.correct_index());
        }
        let result = attempt.submit(&quiz, fixed_now());
        assert_eq!(result.percent, 100);
        assert!(result.is_perfect());
    }

    #[test]
    fn result_visibility_is_independent_of_score() {
        let quiz = sample_quiz();
        let mut attempt = QuizAttempt::new();
        let before = attempt.submit(&quiz, fixed_now());
        attempt.hide_result();
        assert!(attempt.is_submitted());
        assert!(!attempt.is_result_visible());
        attempt.show_result();
        assert_eq!(quiz.submit(attempt.answers(), fixed_now()), before);
    }

    #[test]
    fn question_validation() {
        let err = Question::new(QuestionId::new(1), "Q", vec!["only".into()], 0).unwrap_err();
        assert_eq!(err, QuizError::TooFewOptions(QuestionId::new(1)));

        let err = Question::new(QuestionId::new(1), "Q", vec!["a".into(), "b".into()], 2)
            .unwrap_err();
        assert!(matches!(err, QuizError::CorrectIndexOutOfRange { index: 2, len: 2, .. }));

        let err =
            Quiz::new(AssignmentId::new(1), "T", "", 5, vec![q(1, 0), q(1, 1)]).unwrap_err();
        assert_eq!(err, QuizError::DuplicateQuestion(QuestionId::new(1)));
    }

    #[test]
    fn check_answer_rejects_bad_selection() {
        let quiz = sample_quiz();
        assert!(quiz.check_answer(QuestionId::new(1), 3).is_ok());
        assert!(matches!(
            quiz.check_answer(QuestionId::new(1), 4),
            Err(QuizError::OptionOutOfRange { .. })
        ));
        assert_eq!(
            quiz.check_answer(QuestionId::new(7), 0),
            Err(QuizError::UnknownQuestion(QuestionId::new(7)))
        );
    }

    #[test]
    fn answers_persist_as_object_keyed_by_question() {
        let answers = AnswerState::new().select(QuestionId::new(2), 0);
        assert_eq!(serde_json::to_string(&answers).unwrap(), r#"{"2":0}"#);

        let parsed: AnswerState = serde_json::from_str(r#"{"1":1,"3":null}"#).unwrap();
        assert_eq!(parsed.get(QuestionId::new(1)), Some(1));
        assert_eq!(parsed.get(QuestionId::new(3)), None);
        assert_eq!(parsed.answered(), 1);
    }
}
