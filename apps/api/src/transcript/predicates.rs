//! Shape predicates for transcript rows.
//!
//! Pure functions over strings, shared by the heuristic table parser, the
//! generative fallback normalizer, and the fill layer. Keeping them here
//! (rather than inline patterns at each call site) is what makes the row
//! classification independently testable.

use std::sync::OnceLock;

use regex::Regex;

/// Labels from transcript PDFs that are not course names (the Student
/// Information block, column headers, GPA summary rows, and so on).
const NON_COURSE_LABELS: &[&str] = &[
    "student information",
    "student id",
    "student name",
    "phone",
    "address",
    "advisor",
    "degree",
    "term",
    "cumulative",
    "gpa group",
    "graduate",
    "undergraduate",
    "course",
    "course name",
    "grade",
    "credits",
    "subject",
    "code",
    "attempted",
    "earned",
    "hours",
    "grade points",
    "repeat",
    "—",
    "-",
    "",
];

/// Prefixes that mark a row as student-info or summary, not a course.
const NON_COURSE_PREFIXES: &[&str] = &[
    "student id",
    "phone",
    "degree",
    "address",
    "advisor",
    "cumulative",
    "attempted",
    "earned",
    "gpa group",
    "graduate",
    "undergraduate",
];

fn letter_grade() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i)[A-F][+-]?$").expect("static regex"))
}

fn numeric_grade() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(\.\d+)?$").expect("static regex"))
}

fn numeric_credits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}(\.\d+)?$").expect("static regex"))
}

/// Returns false if this looks like a Student Info label, a header word,
/// or a bare number rather than a real course.
pub fn is_course_row(course: &str) -> bool {
    let key = course.trim().to_lowercase();
    if key.chars().count() < 2 {
        return false;
    }
    // "Student ID: 12345" style rows: the label before the colon decides.
    if let Some((label, _)) = key.split_once(':') {
        let label = label.trim();
        if NON_COURSE_LABELS.contains(&label) {
            return false;
        }
        // "GPA Group: Graduate" style rows
        if label == "gpa group" || key.starts_with("gpa group") {
            return false;
        }
    }
    if NON_COURSE_LABELS.contains(&key.as_str()) {
        return false;
    }
    if NON_COURSE_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return false;
    }
    // Purely numeric once dots and spaces are stripped (includes "3.0",
    // "12 34", and dot-only strings).
    let stripped: String = key.chars().filter(|c| *c != '.' && *c != ' ').collect();
    if stripped.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    true
}

/// True if the value looks like a letter grade (A, B+, A-), `IP`
/// (in progress, any case), or a numeric grade (e.g. 85, 3.7).
pub fn looks_like_grade(val: &str) -> bool {
    let v = val.trim();
    if v.is_empty() {
        return false;
    }
    letter_grade().is_match(v) || v.eq_ignore_ascii_case("ip") || numeric_grade().is_match(v)
}

/// True if the value looks like credit hours: a 1-2 digit number whose
/// value falls in [0.5, 15].
pub fn looks_like_credits(val: &str) -> bool {
    let v = val.trim();
    if !numeric_credits().is_match(v) {
        return false;
    }
    match v.parse::<f64>() {
        Ok(n) => (0.5..=15.0).contains(&n),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_row_rejects_denylist_labels() {
        for label in NON_COURSE_LABELS {
            assert!(!is_course_row(label), "denylist label accepted: {label:?}");
        }
    }

    #[test]
    fn test_course_row_rejects_colon_prefixed_labels() {
        assert!(!is_course_row("Student ID: 12345"));
        assert!(!is_course_row("Phone: 555-0100"));
        assert!(!is_course_row("GPA Group: Graduate"));
        assert!(!is_course_row("Degree: MS Computer Science"));
    }

    #[test]
    fn test_course_row_rejects_prefixes() {
        assert!(!is_course_row("Cumulative GPA 3.7"));
        assert!(!is_course_row("Attempted 12"));
        assert!(!is_course_row("Undergraduate Division"));
    }

    #[test]
    fn test_course_row_rejects_numeric_strings() {
        assert!(!is_course_row("12345"));
        assert!(!is_course_row("3.0"));
        assert!(!is_course_row("12 34"));
        assert!(!is_course_row("..."));
    }

    #[test]
    fn test_course_row_rejects_short_and_empty() {
        assert!(!is_course_row(""));
        assert!(!is_course_row("A"));
        assert!(!is_course_row(" "));
    }

    #[test]
    fn test_course_row_accepts_real_courses() {
        assert!(is_course_row("DS512 - Data Engineering"));
        assert!(is_course_row("Intro to AI"));
        assert!(is_course_row("CS521"));
        // Colon inside a real title is fine when the label part is not a known one.
        assert!(is_course_row("Capstone: Stream Processing"));
    }

    #[test]
    fn test_grade_accepts_letter_grades_with_modifiers() {
        for letter in ["A", "B", "C", "D", "F"] {
            for suffix in ["", "+", "-"] {
                let grade = format!("{letter}{suffix}");
                assert!(looks_like_grade(&grade), "rejected {grade}");
                assert!(looks_like_grade(&grade.to_lowercase()), "rejected lowercase {grade}");
            }
        }
    }

    #[test]
    fn test_grade_accepts_in_progress_and_numeric() {
        assert!(looks_like_grade("IP"));
        assert!(looks_like_grade("ip"));
        assert!(looks_like_grade("85"));
        assert!(looks_like_grade("3.7"));
        assert!(looks_like_grade("100"));
    }

    #[test]
    fn test_grade_rejects_everything_else() {
        assert!(!looks_like_grade("G"));
        assert!(!looks_like_grade("A++"));
        assert!(!looks_like_grade("1000"));
        assert!(!looks_like_grade(""));
        assert!(!looks_like_grade("Pass"));
        assert!(!looks_like_grade("+"));
    }

    #[test]
    fn test_credits_accepts_in_range_values() {
        assert!(looks_like_credits("3"));
        assert!(looks_like_credits("1"));
        assert!(looks_like_credits("4.0"));
        assert!(looks_like_credits("0.5"));
        assert!(looks_like_credits("15"));
    }

    #[test]
    fn test_credits_rejects_out_of_range_and_non_numeric() {
        assert!(!looks_like_credits("0"));
        assert!(!looks_like_credits("20"));
        assert!(!looks_like_credits("abc"));
        assert!(!looks_like_credits(""));
        assert!(!looks_like_credits("3a"));
        assert!(!looks_like_credits("0.4"));
    }
}
