//! Built-in demo content: quizzes, assignments, courses and study plans.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use study_core::model::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentKind, AssignmentStatus, Course,
    CourseId, Milestone, PlanId, Question, QuestionId, Quiz, StudyPlan,
};

/// Read-only content the services fall back to when nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    quizzes: BTreeMap<AssignmentId, Quiz>,
    assignments: Vec<Assignment>,
    courses: Vec<Course>,
    plans: Vec<StudyPlan>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        quizzes: Vec<Quiz>,
        assignments: Vec<Assignment>,
        courses: Vec<Course>,
        plans: Vec<StudyPlan>,
    ) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.assignment_id(), q)).collect(),
            assignments,
            courses,
            plans,
        }
    }

    /// The demo data set shipped with the app.
    ///
    /// # Errors
    ///
    /// Returns `study_core::Error` if any built-in quiz fails validation.
    pub fn demo() -> Result<Self, study_core::Error> {
        Ok(Self::new(
            vec![linear_algebra_quiz()?],
            demo_assignments(),
            demo_courses(),
            vec![web_development_plan(), data_science_plan()],
        ))
    }

    #[must_use]
    pub fn quiz(&self, id: AssignmentId) -> Option<&Quiz> {
        self.quizzes.get(&id)
    }

    pub fn quizzes(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.values()
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn plans(&self) -> &[StudyPlan] {
        &self.plans
    }

    #[must_use]
    pub fn plan(&self, id: &PlanId) -> Option<&StudyPlan> {
        self.plans.iter().find(|p| &p.id == id)
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn linear_algebra_quiz() -> Result<Quiz, study_core::Error> {
    let questions = vec![
        Question::new(
            QuestionId::new(1),
            "Which of the following is a scalar?",
            strings(&["[1, 2, 3]", "5", "(1, 2)", "[[1, 0], [0, 1]]"]),
            1,
        )?,
        Question::new(
            QuestionId::new(2),
            "What is the dot product of vectors (1, 2) and (3, 4)?",
            strings(&["7", "11", "14", "24"]),
            2,
        )?,
        Question::new(
            QuestionId::new(3),
            "The identity matrix multiplied by any vector returns:",
            strings(&["Zero vector", "The same vector", "A scalar", "A transposed vector"]),
            1,
        )?,
    ];
    Ok(Quiz::new(
        AssignmentId::new(1),
        "Linear Algebra Fundamentals Quiz",
        "Answer all questions. Choose the best option. This is a simple mock quiz for demo purposes.",
        15,
        questions,
    )?)
}

#[allow(clippy::too_many_arguments)]
fn assignment(
    id: u64,
    title: &str,
    course_id: u64,
    course: &str,
    kind: AssignmentKind,
    due_date: NaiveDate,
    status: AssignmentStatus,
    points: u32,
    time_limit: &str,
    attempts: u32,
    max_attempts: u32,
) -> Assignment {
    Assignment::from_draft(
        AssignmentId::new(id),
        AssignmentDraft {
            title: title.into(),
            course_id: CourseId::new(course_id),
            course: course.into(),
            kind,
            due_date,
            status,
            points,
            time_limit: time_limit.into(),
            attempts,
            max_attempts,
        },
    )
}

fn demo_assignments() -> Vec<Assignment> {
    let mut exam = assignment(
        4,
        "Data Structures Final Exam",
        3,
        "Data Structures & Algorithms",
        AssignmentKind::Exam,
        date(2023, 12, 30),
        AssignmentStatus::Completed,
        250,
        "2 hours",
        1,
        1,
    );
    exam.score = Some(92);

    vec![
        assignment(
            1,
            "Linear Algebra Fundamentals Quiz",
            1,
            "AI Fundamentals Mastery",
            AssignmentKind::Quiz,
            date(2024, 1, 15),
            AssignmentStatus::Pending,
            100,
            "45 minutes",
            0,
            3,
        ),
        assignment(
            2,
            "Python Functions Assignment",
            2,
            "Python Programming Bootcamp",
            AssignmentKind::Assignment,
            date(2024, 1, 20),
            AssignmentStatus::InProgress,
            150,
            "No limit",
            1,
            5,
        ),
        assignment(
            3,
            "Neural Network Implementation",
            1,
            "AI Fundamentals Mastery",
            AssignmentKind::Project,
            date(2024, 1, 25),
            AssignmentStatus::Pending,
            200,
            "No limit",
            0,
            3,
        ),
        exam,
    ]
}

fn course(
    id: u64,
    title: &str,
    description: &str,
    progress: u8,
    duration: &str,
    level: &str,
    image: &str,
) -> Course {
    Course {
        id: CourseId::new(id),
        title: title.into(),
        description: description.into(),
        progress,
        duration: duration.into(),
        level: level.into(),
        image: image.into(),
    }
}

fn demo_courses() -> Vec<Course> {
    vec![
        course(
            1,
            "Introduction to Artificial Intelligence",
            "Learn the fundamentals of AI and machine learning",
            75,
            "8 weeks",
            "Beginner",
            "🤖",
        ),
        course(
            2,
            "Machine Learning Fundamentals",
            "Deep dive into ML algorithms and applications",
            45,
            "12 weeks",
            "Intermediate",
            "🧠",
        ),
        course(
            3,
            "Data Science with Python",
            "Master data analysis and visualization",
            90,
            "10 weeks",
            "Intermediate",
            "🐍",
        ),
        course(
            4,
            "Neural Networks & Deep Learning",
            "Advanced concepts in deep learning",
            20,
            "16 weeks",
            "Advanced",
            "🔗",
        ),
    ]
}

fn web_development_plan() -> StudyPlan {
    let m = |id: &str, title: &str, description: &str, week: u32, done: bool| {
        Milestone::new(id, title, description, week).completed(done)
    };
    StudyPlan {
        id: PlanId::new("1"),
        title: "Advanced Web Development Mastery".into(),
        description: "Master modern web development: React, Node.js, TypeScript and advanced CSS \
            through hands-on projects."
            .into(),
        duration: "12 weeks".into(),
        subjects: strings(&["React", "TypeScript", "Node.js", "CSS", "MongoDB", "Testing"]),
        difficulty: "Advanced".into(),
        study_hours_per_week: 15,
        start_date: date(2024, 1, 15),
        created_at: date(2024, 1, 15),
        goals: strings(&[
            "Build 3 full-stack applications",
            "Master React hooks and advanced patterns",
            "Implement comprehensive testing strategies",
            "Deploy applications to production",
        ]),
        prerequisites: strings(&[
            "Basic JavaScript knowledge",
            "HTML/CSS fundamentals",
            "Git version control",
        ]),
        milestones: vec![
            m(
                "m1",
                "Set up development environment",
                "Install and configure VS Code, Node.js, Git and project dependencies",
                1,
                true,
            ),
            m(
                "m2",
                "Master React fundamentals",
                "Components, props, state and lifecycle methods",
                1,
                true,
            ),
            m(
                "m3",
                "Build first React application",
                "A todo application with CRUD operations using hooks",
                2,
                true,
            ),
            m(
                "m4",
                "Learn TypeScript basics",
                "Syntax, interfaces, generics and type definitions",
                2,
                false,
            ),
            m("m5", "Implement state management", "Redux Toolkit for complex state", 3, false),
            m(
                "m6",
                "Build RESTful API",
                "A Node.js Express API with MongoDB integration",
                3,
                false,
            ),
            m(
                "m7",
                "Authentication system",
                "JWT authentication and authorization in the API",
                4,
                false,
            ),
            m("m8", "Database design", "MongoDB schemas for the application", 4, false),
            m(
                "m9",
                "Frontend-backend integration",
                "Connect the React frontend with the API",
                5,
                false,
            ),
            m(
                "m10",
                "Testing implementation",
                "Unit and integration tests for frontend and backend",
                6,
                false,
            ),
            m("m11", "Deployment preparation", "Prepare the applications for production", 7, false),
            m(
                "m12",
                "Final project completion",
                "Deploy the full-stack application and finish testing",
                8,
                false,
            ),
        ],
    }
}

fn data_science_plan() -> StudyPlan {
    StudyPlan {
        id: PlanId::new("2"),
        title: "Data Science Fundamentals".into(),
        description: "Python, statistics, machine learning and data visualization basics.".into(),
        duration: "8 weeks".into(),
        subjects: strings(&[
            "Python",
            "Statistics",
            "Machine Learning",
            "Data Visualization",
            "Pandas",
            "NumPy",
        ]),
        difficulty: "Intermediate".into(),
        study_hours_per_week: 10,
        start_date: date(2024, 1, 20),
        created_at: date(2024, 1, 20),
        goals: strings(&[
            "Master Python for data analysis",
            "Understand statistical concepts",
            "Build machine learning models",
            "Create data visualizations",
        ]),
        prerequisites: strings(&["Basic programming knowledge", "High school mathematics"]),
        milestones: vec![
            Milestone::new(
                "ds1",
                "Python fundamentals",
                "Syntax, data structures and basic programming concepts",
                1,
            )
            .completed(true),
            Milestone::new(
                "ds2",
                "NumPy and Pandas",
                "Data manipulation with arrays and DataFrames",
                2,
            )
            .completed(true),
            Milestone::new(
                "ds3",
                "Data visualization",
                "Visualizations with Matplotlib and Seaborn",
                3,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::progress::overall_progress;

    #[test]
    fn demo_catalog_is_consistent() {
        let catalog = Catalog::demo().unwrap();
        let quiz = catalog.quiz(AssignmentId::new(1)).unwrap();
        let correct: Vec<usize> = quiz.questions().iter().map(Question::correct_index).collect();
        assert_eq!(correct, vec![1, 2, 1]);
        assert!(catalog.quiz(AssignmentId::new(2)).is_none());

        for quiz in catalog.quizzes() {
            assert!(
                catalog.assignments().iter().any(|a| a.id == quiz.assignment_id()),
                "quiz {} has no assignment",
                quiz.assignment_id()
            );
        }
    }

    #[test]
    fn demo_plans_have_expected_progress() {
        let catalog = Catalog::demo().unwrap();
        let web = catalog.plan(&PlanId::new("1")).unwrap();
        assert_eq!(web.milestones.len(), 12);
        assert_eq!(overall_progress(&web.milestones), 25);

        let ds = catalog.plan(&PlanId::new("2")).unwrap();
        assert_eq!(overall_progress(&ds.milestones), 67);
    }
}
