use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self::new(trimmed))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifies an assignment and the quiz attached to it.
    AssignmentId
);
numeric_id!(
    /// Identifies a question; unique only within its quiz.
    QuestionId
);
numeric_id!(
    /// Identifies a course.
    CourseId
);

string_id!(
    /// Identifies a study plan. Built-in plans use short numeric strings,
    /// created plans use a UUID.
    PlanId
);
string_id!(
    /// Identifies a milestone within its plan.
    MilestoneId
);

impl PlanId {
    /// Fresh id for a plan created at runtime.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_id_display() {
        let id = AssignmentId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "AssignmentId(42)");
    }

    #[test]
    fn test_assignment_id_from_str() {
        let id: AssignmentId = "123".parse().unwrap();
        assert_eq!(id, AssignmentId::new(123));
    }

    #[test]
    fn test_question_id_from_str_invalid() {
        let err = "not-a-number".parse::<QuestionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse QuestionId from string");
    }

    #[test]
    fn test_plan_id_rejects_blank() {
        assert!("   ".parse::<PlanId>().is_err());
        assert_eq!("ds1".parse::<MilestoneId>().unwrap().as_str(), "ds1");
    }

    #[test]
    fn test_generated_plan_ids_differ() {
        assert_ne!(PlanId::generate(), PlanId::generate());
    }

    #[test]
    fn test_question_id_as_json_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(QuestionId::new(3), 1_usize);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3":1}"#);
        let back: std::collections::BTreeMap<QuestionId, usize> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
