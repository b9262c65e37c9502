//! Reconciliation layer: backfills missing grade/credits by proximity
//! search over the raw document text.
//!
//! Strictly additive — a field that already holds a value is never
//! touched, which also makes the pass idempotent. The credits scan walks
//! numeric tokens from the end of a matched line backwards because
//! credit/grade columns typically trail the course name; see DESIGN notes
//! before changing that tie-break.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::course::CourseRecord;

fn letter_grade_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Bounded by whitespace/commas or line edges so letters embedded in
    // words ("Advanced") never match.
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[\s,])([A-F][+-]?|IP)(?:[\s,]|$)").expect("static regex")
    })
}

fn numeric_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2}(?:\.\d+)?)\b").expect("static regex"))
}

/// Fills missing grade and/or credits on each record by scanning raw-text
/// lines that mention the course. Existing values are preserved verbatim.
pub fn fill_grades_credits(records: Vec<CourseRecord>, raw_text: &str) -> Vec<CourseRecord> {
    if records.is_empty() || raw_text.is_empty() {
        return records;
    }

    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    records
        .into_iter()
        .map(|record| fill_record(record, &lines))
        .collect()
}

fn fill_record(mut record: CourseRecord, lines: &[&str]) -> CourseRecord {
    normalize_blank_fields(&mut record);

    let course = record.course.trim();
    if course.is_empty() || (record.grade.is_some() && record.credits.is_some()) {
        return record;
    }

    // Search key: the course's first whitespace token (falling back to the
    // whole name), matched case-insensitively.
    let first_word = course.split_whitespace().next();
    let key = first_word.unwrap_or(course).to_uppercase();

    for line in lines {
        let upper = line.to_uppercase();
        let mentions_course =
            upper.contains(&key) || first_word.is_some_and(|w| line.contains(w));
        if !mentions_course {
            continue;
        }

        if record.grade.is_none() {
            if let Some(caps) = letter_grade_token().captures(line) {
                record.grade = Some(caps[1].to_string());
            }
        }
        if record.credits.is_none() {
            record.credits = last_in_range_number(line);
        }
        if record.grade.is_some() && record.credits.is_some() {
            break;
        }
    }
    record
}

/// Later numeric tokens are preferred: scan from the end of the line
/// backward and take the first value in [0.5, 15].
fn last_in_range_number(line: &str) -> Option<String> {
    let tokens: Vec<&str> = numeric_token()
        .find_iter(line)
        .map(|m| m.as_str())
        .collect();
    tokens
        .into_iter()
        .rev()
        .find(|t| matches!(t.parse::<f64>(), Ok(v) if (0.5..=15.0).contains(&v)))
        .map(String::from)
}

/// Upstream sources occasionally hand us `Some("")`; treat that as missing
/// so the additive guarantee applies to real values only.
fn normalize_blank_fields(record: &mut CourseRecord) {
    if record.grade.as_deref().is_some_and(|g| g.trim().is_empty()) {
        record.grade = None;
    }
    if record
        .credits
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        record.credits = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(course: &str, grade: Option<&str>, credits: Option<&str>) -> CourseRecord {
        CourseRecord {
            course: course.to_string(),
            grade: grade.map(String::from),
            credits: credits.map(String::from),
        }
    }

    #[test]
    fn test_fill_backfills_both_fields_from_matching_line() {
        let text = "Fall 2025\nDS512 - Data Engineering  3  A\nCumulative GPA 3.9";
        let out = fill_grades_credits(vec![record("DS512 - Data Engineering", None, None)], text);
        assert_eq!(out[0].grade.as_deref(), Some("A"));
        assert_eq!(out[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_is_case_insensitive_on_key() {
        let text = "ds512 - data engineering  3  b+";
        let out = fill_grades_credits(vec![record("DS512 - Data Engineering", None, None)], text);
        assert_eq!(out[0].grade.as_deref(), Some("b+"));
    }

    #[test]
    fn test_fill_never_overwrites_existing_grade() {
        // The nearby line carries a different grade letter; the existing
        // value must survive while credits may still be filled.
        let text = "Intro to AI  C  4";
        let out = fill_grades_credits(vec![record("Intro to AI", Some("A"), None)], text);
        assert_eq!(out[0].grade.as_deref(), Some("A"));
        assert_eq!(out[0].credits.as_deref(), Some("4"));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let text = "Distributed Systems  3  A-\nMachine Learning  4  B";
        let records = vec![
            record("Distributed Systems", None, None),
            record("Machine Learning", None, Some("4")),
        ];
        let once = fill_grades_credits(records.clone(), text);
        let twice = fill_grades_credits(once.clone(), text);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_prefers_trailing_numeric_token() {
        // Both 2 and 3 are in range; the later token wins.
        let text = "CS502 Operating Systems Section 2  3";
        let out = fill_grades_credits(vec![record("CS502 Operating Systems", None, None)], text);
        assert_eq!(out[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_skips_out_of_range_numbers() {
        // 85 and 2025 are not plausible credit hours; 3 is.
        let text = "Data Mining 2025 85 3";
        let out = fill_grades_credits(vec![record("Data Mining", None, None)], text);
        assert_eq!(out[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_grade_boundary_avoids_embedded_letters() {
        // "Advanced" contains letters A-F but none stand alone.
        let text = "Advanced Algorithms 3";
        let out = fill_grades_credits(vec![record("Advanced Algorithms", None, None)], text);
        assert!(out[0].grade.is_none());
        assert_eq!(out[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_accepts_in_progress_token() {
        let text = "Capstone Project  3  IP";
        let out = fill_grades_credits(vec![record("Capstone Project", None, None)], text);
        assert_eq!(out[0].grade.as_deref(), Some("IP"));
    }

    #[test]
    fn test_fill_leaves_unmatched_records_untouched() {
        let text = "Completely unrelated line";
        let out = fill_grades_credits(vec![record("Quantum Computing", None, None)], text);
        assert!(out[0].grade.is_none());
        assert!(out[0].credits.is_none());
    }

    #[test]
    fn test_fill_normalizes_blank_strings_to_missing() {
        let text = "Networks  3  B";
        let out = fill_grades_credits(vec![record("Networks", Some(""), Some(" "))], text);
        assert_eq!(out[0].grade.as_deref(), Some("B"));
        assert_eq!(out[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_empty_inputs_are_passthrough() {
        assert!(fill_grades_credits(Vec::new(), "text").is_empty());
        let records = vec![record("Networks", None, None)];
        let out = fill_grades_credits(records.clone(), "");
        assert_eq!(out, records);
    }
}
