use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CourseId;

/// Image shown for courses created without one.
pub const DEFAULT_COURSE_IMAGE: &str = "📘";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("progress must be between 0 and 100, got {0}")]
    InvalidProgress(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub progress: u8,
    pub duration: String,
    pub level: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: String,
    pub image: Option<String>,
    pub progress: Option<u8>,
}

impl CourseDraft {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` for a blank title and
    /// `CourseError::InvalidProgress` for progress above 100.
    pub fn validate(self, id: CourseId) -> Result<Course, CourseError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let progress = self.progress.unwrap_or(0);
        if progress > 100 {
            return Err(CourseError::InvalidProgress(progress));
        }
        Ok(Course {
            id,
            title: title.to_string(),
            description: self.description,
            progress,
            duration: self.duration,
            level: self.level,
            image: self
                .image
                .filter(|img| !img.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COURSE_IMAGE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults() {
        let course = CourseDraft {
            title: " Rust Basics ".into(),
            ..CourseDraft::default()
        }
        .validate(CourseId::new(1000))
        .unwrap();
        assert_eq!(course.title, "Rust Basics");
        assert_eq!(course.progress, 0);
        assert_eq!(course.image, DEFAULT_COURSE_IMAGE);
    }

    #[test]
    fn draft_rejects_bad_input() {
        let err = CourseDraft::default().validate(CourseId::new(1)).unwrap_err();
        assert_eq!(err, CourseError::EmptyTitle);

        let err = CourseDraft {
            title: "T".into(),
            progress: Some(101),
            ..CourseDraft::default()
        }
        .validate(CourseId::new(1))
        .unwrap_err();
        assert_eq!(err, CourseError::InvalidProgress(101));
    }
}
