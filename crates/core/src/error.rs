use thiserror::Error;

use crate::model::{CourseError, ParseIdError, PlanError, QuizError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
