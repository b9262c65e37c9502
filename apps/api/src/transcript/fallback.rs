//! Generative extraction fallback.
//!
//! Invoked when heuristic table parsing yields nothing, or when only a
//! course-name list is needed. One model call per invocation, a strict
//! JSON-array output contract, and defensive decoding: every failure mode
//! (provider error, no array in the response, malformed JSON, unexpected
//! shapes) degrades to an empty list. This layer must never break the
//! pipeline.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::llm_client::{strip_json_fences, TextGenerator, TEMPERATURE_DEFAULT};
use crate::models::course::{CourseRecord, MAX_COURSE_RECORDS};
use crate::transcript::predicates::{looks_like_credits, looks_like_grade};
use crate::transcript::prompts::{EXTRACT_COURSES_PROMPT, EXTRACT_COURSE_GRADES_PROMPT};

/// Only the first 12,000 characters of a document are considered; later
/// content is dropped. Explicit, accepted limitation for very long
/// transcripts.
const TEXT_SLICE_LIMIT: usize = 12_000;

const COURSES_MAX_TOKENS: u32 = 2000;
const COURSE_GRADES_MAX_TOKENS: u32 = 2500;

/// Extracts a plain list of course names from raw text (mode a).
pub async fn extract_courses(raw_text: &str, llm: &dyn TextGenerator) -> Vec<String> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }
    let prompt = EXTRACT_COURSES_PROMPT.replace("{text}", &slice_chars(raw_text, TEXT_SLICE_LIMIT));

    let response = match llm
        .generate(&prompt, COURSES_MAX_TOKENS, TEMPERATURE_DEFAULT)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("course-name extraction call failed: {e}");
            return Vec::new();
        }
    };

    let Some(array) = first_json_array(strip_json_fences(&response)) else {
        warn!("course-name extraction returned no JSON array");
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Value>>(array) {
        Ok(items) => items
            .into_iter()
            .filter_map(|v| coerce_string(&v))
            .take(MAX_COURSE_RECORDS)
            .collect(),
        Err(e) => {
            warn!("course-name extraction returned malformed JSON: {e}");
            Vec::new()
        }
    }
}

/// Extracts course + grade + credits triples from raw text (mode b).
/// Grade/credit values that fail their shape predicate are treated as
/// absent rather than stored verbatim.
pub async fn extract_course_grades(raw_text: &str, llm: &dyn TextGenerator) -> Vec<CourseRecord> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }
    let prompt =
        EXTRACT_COURSE_GRADES_PROMPT.replace("{text}", &slice_chars(raw_text, TEXT_SLICE_LIMIT));

    let response = match llm
        .generate(&prompt, COURSE_GRADES_MAX_TOKENS, TEMPERATURE_DEFAULT)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("course-grade extraction call failed: {e}");
            return Vec::new();
        }
    };

    decode_course_grades(&response)
}

/// Decodes the model response: locate the outermost JSON array, then pass
/// each element through the schema boundary. Pure; tested directly.
pub fn decode_course_grades(response: &str) -> Vec<CourseRecord> {
    let Some(array) = outer_json_array(strip_json_fences(response)) else {
        warn!("course-grade extraction returned no JSON array");
        return Vec::new();
    };
    let items: Vec<RawCourseItem> = match serde_json::from_str(array) {
        Ok(items) => items,
        Err(e) => {
            warn!("course-grade extraction returned malformed JSON: {e}");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(RawCourseItem::into_record)
        .take(MAX_COURSE_RECORDS)
        .collect()
}

/// Schema boundary for one response element. Key synonyms the model tends
/// to emit (`Course`, `Units`, `Score`, capitalized variants) are folded
/// into the canonical three keys here; plain strings are course names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCourseItem {
    Row(RawCourseRow),
    Name(String),
    Other(Value),
}

#[derive(Debug, Default, Deserialize)]
struct RawCourseRow {
    #[serde(default, alias = "Course")]
    course: Option<Value>,
    #[serde(default, alias = "Grade", alias = "score", alias = "Score")]
    grade: Option<Value>,
    #[serde(default, alias = "Credits", alias = "units", alias = "Units")]
    credits: Option<Value>,
}

impl RawCourseItem {
    fn into_record(self) -> Option<CourseRecord> {
        match self {
            RawCourseItem::Row(row) => {
                let course = row.course.as_ref().and_then(coerce_string)?;
                let grade = row
                    .grade
                    .as_ref()
                    .and_then(coerce_string)
                    .filter(|g| looks_like_grade(g));
                let credits = row
                    .credits
                    .as_ref()
                    .and_then(coerce_string)
                    .filter(|c| looks_like_credits(c));
                Some(CourseRecord {
                    course,
                    grade,
                    credits,
                })
            }
            RawCourseItem::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(CourseRecord::name_only(name))
                }
            }
            RawCourseItem::Other(_) => None,
        }
    }
}

/// Coerces a JSON scalar to a non-empty trimmed string ("3" and 3 are the
/// same credits value to us).
fn coerce_string(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// First top-level bracketed array: first `[` to the first `]` after it.
fn first_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text[start..].find(']')? + start;
    Some(&text[start..=end])
}

/// Outermost bracketed array: first `[` to the last `]` (objects inside
/// arrays contain no nested `]`-free structure worth preserving beyond it).
fn outer_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn slice_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
