use serde::{Deserialize, Serialize};

/// Canonical course record produced by the transcript extraction pipeline.
///
/// `grade` and `credits` stay `None` when undeterminable; downstream
/// consumers must tolerate both fields missing. A record whose `course`
/// value fails `predicates::is_course_row` is dropped before it ever
/// reaches a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub credits: Option<String>,
}

impl CourseRecord {
    /// A course with no grade/credits information (names-only extraction).
    pub fn name_only(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            grade: None,
            credits: None,
        }
    }
}

/// Defensive bound on pipeline output: no stage may emit more records.
pub const MAX_COURSE_RECORDS: usize = 120;
