//! Transcript import orchestration.
//!
//! Fixed stage order within one request: heuristic table parse first
//! (cheap, deterministic), generative triple extraction only when the
//! heuristic found nothing, reconciliation fill over whatever the
//! generative pass produced, and a names-only extraction as the last
//! resort. Stages are sequential because each one's decision to run
//! depends on the previous stage's output.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::ocr::OcrEngine;
use crate::extract::tables::TableExtractor;
use crate::extract::{extract_document, DocumentKind};
use crate::llm_client::TextGenerator;
use crate::models::course::{CourseRecord, MAX_COURSE_RECORDS};
use crate::transcript::fallback;
use crate::transcript::fill::fill_grades_credits;
use crate::transcript::predicates::is_course_row;
use crate::transcript::table_parser::{parse_transcript_tables, TableScan};

/// A transcript PDF must yield at least this much text to be worth parsing.
pub const MIN_TRANSCRIPT_CHARS: usize = 20;
/// A resume PDF is allowed to be shorter.
pub const MIN_RESUME_CHARS: usize = 10;

/// Collaborators for one import request, injected by the handler layer.
#[derive(Clone, Copy)]
pub struct PipelineDeps<'a> {
    pub llm: &'a dyn TextGenerator,
    pub tables: &'a dyn TableExtractor,
    pub ocr: Option<&'a dyn OcrEngine>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptImport {
    pub course_grades: Vec<CourseRecord>,
    pub extracted_text_preview: String,
    pub extracted_text: String,
}

/// Imports course grades from an uploaded transcript PDF.
///
/// The only user-visible failure is total extraction failure; every
/// downstream stage degrades to "fewer records" instead of erroring.
pub async fn import_course_grades_from_pdf(
    path: &Path,
    deps: PipelineDeps<'_>,
) -> Result<TranscriptImport, AppError> {
    let raw_text = extract_document(DocumentKind::Pdf, path, deps.ocr).into_text();
    if raw_text.trim().chars().count() < MIN_TRANSCRIPT_CHARS {
        return Err(AppError::UnprocessableEntity(
            "Could not extract enough text from the PDF. Try exporting again or use a PDF with selectable text.".to_string(),
        ));
    }

    let scan = parse_transcript_tables(deps.tables, path);
    let course_grades = resolve_course_grades(scan, &raw_text, deps.llm).await;

    Ok(TranscriptImport {
        course_grades,
        extracted_text_preview: slice_chars(&raw_text, 500),
        extracted_text: slice_chars(&raw_text, 8000),
    })
}

/// Turns a heuristic scan plus raw text into the final record list:
/// heuristic rows win outright; otherwise generative triples + fill;
/// otherwise names only. Output is re-filtered and capped.
async fn resolve_course_grades(
    scan: TableScan,
    raw_text: &str,
    llm: &dyn TextGenerator,
) -> Vec<CourseRecord> {
    let mut course_grades = match scan {
        TableScan::Rows(records) => {
            info!("heuristic table parse found {} course rows", records.len());
            records
        }
        TableScan::Empty => Vec::new(),
        TableScan::Failed(reason) => {
            warn!("heuristic table parse failed, falling back: {reason}");
            Vec::new()
        }
    };

    if course_grades.is_empty() {
        course_grades = fallback::extract_course_grades(raw_text, llm).await;
        course_grades = fill_grades_credits(course_grades, raw_text);
    }
    if course_grades.is_empty() {
        course_grades = fallback::extract_courses(raw_text, llm)
            .await
            .into_iter()
            .map(CourseRecord::name_only)
            .collect();
    }

    course_grades.retain(|r| is_course_row(&r.course));
    course_grades.truncate(MAX_COURSE_RECORDS);
    course_grades
}

/// Imports course grades from pasted text (no file, no tables): generative
/// triples with reconciliation, then a names-only last resort.
pub async fn import_course_grades_from_text(
    raw_text: &str,
    llm: &dyn TextGenerator,
) -> Vec<CourseRecord> {
    let course_grades = fallback::extract_course_grades(raw_text, llm).await;
    let mut course_grades = if course_grades.is_empty() {
        fallback::extract_courses(raw_text, llm)
            .await
            .into_iter()
            .map(CourseRecord::name_only)
            .collect()
    } else {
        fill_grades_credits(course_grades, raw_text)
    };
    course_grades.retain(|r| is_course_row(&r.course));
    course_grades.truncate(MAX_COURSE_RECORDS);
    course_grades
}

fn slice_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::llm_client::LlmError;

    /// Fake provider that records each prompt and replays scripted replies.
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, ()>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, ()>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, _: u32, _: f32) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            replies.remove(0).map_err(|_| LlmError::EmptyContent)
        }
    }

    fn heuristic_rows() -> TableScan {
        TableScan::Rows(vec![CourseRecord {
            course: "DS512 - Data Engineering".to_string(),
            grade: Some("A".to_string()),
            credits: Some("3".to_string()),
        }])
    }

    #[tokio::test]
    async fn test_heuristic_rows_skip_the_llm_entirely() {
        let llm = ScriptedGenerator::new(vec![]);
        let records = resolve_course_grades(heuristic_rows(), "raw text", &llm).await;
        assert_eq!(records.len(), 1);
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_scan_invokes_triples_fallback_once() {
        let llm = ScriptedGenerator::new(vec![Ok(
            r#"[{"course": "Intro to AI", "grade": "B+", "credits": "3"}]"#.to_string(),
        )]);
        let records = resolve_course_grades(TableScan::Empty, "raw text", &llm).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].grade.as_deref(), Some("B+"));
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_scan_behaves_like_empty() {
        let llm = ScriptedGenerator::new(vec![Ok(r#"[{"course": "Databases"}]"#.to_string())]);
        let scan = TableScan::Failed("broken xref".to_string());
        let records = resolve_course_grades(scan, "raw text", &llm).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "Databases");
    }

    #[tokio::test]
    async fn test_unparseable_fallback_degrades_to_empty_list() {
        // Triples come back as prose, names come back broken too: the
        // result is an empty list, never an error.
        let llm = ScriptedGenerator::new(vec![
            Ok("I could not find a table in this document.".to_string()),
            Err(()),
        ]);
        let records = resolve_course_grades(TableScan::Empty, "raw text", &llm).await;
        assert!(records.is_empty());
        // Triples prompt exactly once, then the names prompt once.
        assert_eq!(llm.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_final_filter_drops_noise_even_from_heuristic_rows() {
        let scan = TableScan::Rows(vec![
            CourseRecord::name_only("Machine Learning"),
            CourseRecord::name_only("Student ID: 12345"),
        ]);
        let llm = ScriptedGenerator::new(vec![]);
        let records = resolve_course_grades(scan, "raw text", &llm).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "Machine Learning");
    }

    #[tokio::test]
    async fn test_text_import_fills_gaps_from_raw_text() {
        let llm = ScriptedGenerator::new(vec![Ok(
            r#"[{"course": "DS512 - Data Engineering", "credits": null, "grade": null}]"#
                .to_string(),
        )]);
        let raw = "DS512 - Data Engineering  3  A";
        let records = import_course_grades_from_text(raw, &llm).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].grade.as_deref(), Some("A"));
        assert_eq!(records[0].credits.as_deref(), Some("3"));
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_text_import_falls_back_to_names_only() {
        let llm = ScriptedGenerator::new(vec![
            Ok("no JSON here, sorry".to_string()),
            Ok(r#"["Machine Learning", "Databases"]"#.to_string()),
        ]);
        let records = import_course_grades_from_text("transcript text", &llm).await;
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.grade.is_none() && r.credits.is_none()));
    }

    #[tokio::test]
    async fn test_text_import_total_failure_is_empty_not_error() {
        let llm = ScriptedGenerator::new(vec![Err(()), Err(())]);
        let records = import_course_grades_from_text("transcript text", &llm).await;
        assert!(records.is_empty());
    }
}
