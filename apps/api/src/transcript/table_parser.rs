//! Heuristic course extraction from PDF table structures.
//!
//! Deterministic and offline: no model calls. The parser classifies rows
//! as course data vs. student-info noise, locates credit/grade columns by
//! header synonyms (falling back to value-shape detection), and emits
//! `CourseRecord`s with whatever fields it could prove. A table scan that
//! finds nothing (or a table provider that fails outright) triggers the
//! generative fallback upstream.

use std::path::Path;

use tracing::warn;

use crate::extract::tables::{Page, TableExtractor, TableRow};
use crate::models::course::{CourseRecord, MAX_COURSE_RECORDS};
use crate::transcript::predicates::{is_course_row, looks_like_credits, looks_like_grade};

/// Per-table mapping from header row to semantic columns. Computed once
/// per table, reused for every data row, discarded when the table ends.
#[derive(Debug, Clone, Copy, Default)]
struct HeaderColumnMap {
    credits: Option<usize>,
    grade: Option<usize>,
}

impl HeaderColumnMap {
    fn found_any(&self) -> bool {
        self.credits.is_some() || self.grade.is_some()
    }
}

/// Outcome of one heuristic scan over a document's tables.
#[derive(Debug)]
pub enum TableScan {
    Rows(Vec<CourseRecord>),
    /// Tables parsed cleanly but contained no course rows.
    Empty,
    /// The table provider itself failed; treated like `Empty` upstream.
    Failed(String),
}

/// Runs the table provider over `path` and parses every table on every
/// page. Provider failure is contained here and never propagates.
pub fn parse_transcript_tables(extractor: &dyn TableExtractor, path: &Path) -> TableScan {
    let pages = match extractor.extract_tables(path) {
        Ok(pages) => pages,
        Err(e) => {
            warn!("table extraction failed for {}: {e}", path.display());
            return TableScan::Failed(e.to_string());
        }
    };
    let records = parse_pages(&pages);
    if records.is_empty() {
        TableScan::Empty
    } else {
        TableScan::Rows(records)
    }
}

/// Parses already-extracted table structures. Pure; used directly by tests.
pub fn parse_pages(pages: &[Page]) -> Vec<CourseRecord> {
    let mut out = Vec::new();
    for page in pages {
        for table in page {
            if table.len() < 2 {
                continue;
            }
            parse_table(table, &mut out);
        }
    }
    // Belt and braces: the same filter the per-row path applied, plus the
    // defensive output cap.
    out.retain(|r| is_course_row(&r.course));
    out.truncate(MAX_COURSE_RECORDS);
    out
}

fn parse_table(table: &[TableRow], out: &mut Vec<CourseRecord>) {
    let mut columns = HeaderColumnMap::default();
    let mut header_found = false;

    for (i, row) in table.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|c| c.as_deref().unwrap_or("").trim().to_string())
            .collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }

        // Header detection: the first row carrying a credits/grade synonym
        // fixes the column map for the rest of the table.
        if i == 0 || !header_found {
            let detected = find_credits_grade_columns(&cells);
            if detected.found_any() {
                columns = detected;
                header_found = true;
                if is_header_label(&cells[0]) {
                    continue;
                }
            }
        }
        if i == 0 && is_course_header_label(&cells[0]) {
            continue;
        }

        let mut course = cells[0].clone();
        if !is_course_row(&course) {
            continue;
        }

        // Prefer a combined code+title cell over a bare code: "DS512"
        // next to "DS512 - Data Engineering" keeps the fuller form.
        if let Some(second) = cells.get(1) {
            if !second.is_empty()
                && !looks_like_credits(second)
                && !looks_like_grade(second)
                && second.len() > course.len()
                && second.contains(" - ")
            {
                course = second.clone();
            }
        }
        let start_idx = if course == cells[0] { 1 } else { 2 };

        let (grade, credits) = assign_grade_credits(&cells, start_idx, columns);
        out.push(CourseRecord {
            course,
            grade,
            credits,
        });
    }
}

/// Scans a header row for credit/grade column synonyms, returning 0-based
/// indices. Handles "Credits" before or after "Grade" and common variants.
fn find_credits_grade_columns(cells: &[String]) -> HeaderColumnMap {
    let mut map = HeaderColumnMap::default();
    for (i, cell) in cells.iter().enumerate() {
        let k = cell.trim().to_lowercase();
        if matches!(k.as_str(), "credits" | "credit" | "units" | "hrs" | "ch") {
            map.credits = Some(i);
        }
        if matches!(k.as_str(), "grade" | "grades" | "letter" | "score") {
            map.grade = Some(i);
        }
    }
    map
}

fn is_header_label(cell: &str) -> bool {
    matches!(
        cell.to_lowercase().as_str(),
        "course" | "course name" | "subject" | "code" | "credits" | "grade"
    )
}

fn is_course_header_label(cell: &str) -> bool {
    matches!(
        cell.to_lowercase().as_str(),
        "course" | "course name" | "subject" | "code"
    )
}

/// Reads grade and credits from a data row: header-mapped columns first,
/// then a shape-detection scan over up to 6 cells from the first data
/// column for whatever is still missing.
fn assign_grade_credits(
    cells: &[String],
    start_idx: usize,
    columns: HeaderColumnMap,
) -> (Option<String>, Option<String>) {
    let mut grade = None;
    let mut credits = None;

    if let Some(ci) = columns.credits {
        if let Some(v) = cells.get(ci) {
            if looks_like_credits(v) {
                credits = Some(v.trim().to_string());
            }
        }
    }
    if let Some(gi) = columns.grade {
        if let Some(v) = cells.get(gi) {
            if looks_like_grade(v) {
                grade = Some(v.trim().to_string());
            }
        }
    }
    if grade.is_some() && credits.is_some() {
        return (grade, credits);
    }

    for v in cells.iter().skip(start_idx).take(6) {
        let v = v.trim();
        if v.is_empty() {
            continue;
        }
        if credits.is_none() && looks_like_credits(v) {
            credits = Some(v.to_string());
        }
        if grade.is_none() && looks_like_grade(v) {
            grade = Some(v.to_string());
        }
    }
    (grade, credits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TableRow {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    fn single_table(rows: Vec<TableRow>) -> Vec<Page> {
        vec![vec![rows]]
    }

    #[test]
    fn test_header_row_drives_column_assignment() {
        let pages = single_table(vec![
            row(&["Course", "Credits", "Grade"]),
            row(&["DS512 - Data Engineering", "3", "A"]),
        ]);
        let records = parse_pages(&pages);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "DS512 - Data Engineering");
        assert_eq!(records[0].grade.as_deref(), Some("A"));
        assert_eq!(records[0].credits.as_deref(), Some("3"));
    }

    #[test]
    fn test_student_info_rows_are_rejected() {
        let pages = single_table(vec![
            row(&["Student ID:", "12345"]),
            row(&["Phone:", "555-0100"]),
        ]);
        assert!(parse_pages(&pages).is_empty());
    }

    #[test]
    fn test_headerless_table_uses_shape_detection() {
        // Grade before credits: shapes, not positions, decide.
        let pages = single_table(vec![
            row(&["Intro to AI", "B+", "3"]),
            row(&["Data Mining", "A-", "4"]),
        ]);
        let records = parse_pages(&pages);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].grade.as_deref(), Some("B+"));
        assert_eq!(records[0].credits.as_deref(), Some("3"));
        assert_eq!(records[1].grade.as_deref(), Some("A-"));
        assert_eq!(records[1].credits.as_deref(), Some("4"));
    }

    #[test]
    fn test_title_augmentation_prefers_combined_cell() {
        let pages = single_table(vec![
            row(&["Course", "Title", "Credits", "Grade"]),
            row(&["DS512", "DS512 - Data Engineering", "3", "A"]),
        ]);
        let records = parse_pages(&pages);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "DS512 - Data Engineering");
        assert_eq!(records[0].credits.as_deref(), Some("3"));
        assert_eq!(records[0].grade.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let pages = single_table(vec![
            row(&["Course", "Credits", "Grade"]),
            row(&["Machine Learning", "", ""]),
        ]);
        let records = parse_pages(&pages);
        assert_eq!(records.len(), 1);
        assert!(records[0].grade.is_none());
        assert!(records[0].credits.is_none());
    }

    #[test]
    fn test_blank_rows_and_short_tables_are_skipped() {
        let blank: TableRow = vec![Some(String::new()), None];
        let pages = vec![vec![
            vec![row(&["Lonely header row with Credits"])], // single-row table
            vec![
                blank,
                row(&["Course", "Credits", "Grade"]),
                row(&["Distributed Systems", "3", "A-"]),
            ],
        ]];
        let records = parse_pages(&pages);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "Distributed Systems");
    }

    #[test]
    fn test_in_progress_grade_is_kept() {
        let pages = single_table(vec![
            row(&["Course", "Credits", "Grade"]),
            row(&["Capstone Project", "3", "IP"]),
        ]);
        let records = parse_pages(&pages);
        assert_eq!(records[0].grade.as_deref(), Some("IP"));
    }

    #[test]
    fn test_output_is_capped_at_120_records() {
        let mut rows = vec![row(&["Course", "Credits", "Grade"])];
        for n in 0..150 {
            let name = format!("Course Number {n}");
            rows.push(row(&[&name, "3", "A"]));
        }
        let records = parse_pages(&single_table(rows));
        assert_eq!(records.len(), MAX_COURSE_RECORDS);
    }

    #[test]
    fn test_failed_provider_is_contained() {
        struct Exploding;
        impl TableExtractor for Exploding {
            fn extract_tables(&self, _: &Path) -> anyhow::Result<Vec<Page>> {
                anyhow::bail!("malformed xref table")
            }
        }
        let scan = parse_transcript_tables(&Exploding, Path::new("/tmp/x.pdf"));
        assert!(matches!(scan, TableScan::Failed(_)));
    }
}
