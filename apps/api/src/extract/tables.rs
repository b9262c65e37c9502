//! Table-structure provider for PDF transcripts.
//!
//! The heuristic course parser consumes tables through the
//! `TableExtractor` trait so tests can inject canned structures. The
//! default implementation recovers tables from extracted PDF text by
//! column alignment: within a page, contiguous lines that split into two
//! or more cells (tab or 2+ space gaps) form one table.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// One table row; a cell may be missing entirely.
pub type TableRow = Vec<Option<String>>;
/// One table: a non-empty sequence of rows.
pub type Table = Vec<TableRow>;
/// One page: the tables found on it.
pub type Page = Vec<Table>;

pub trait TableExtractor: Send + Sync {
    fn extract_tables(&self, path: &Path) -> anyhow::Result<Vec<Page>>;
}

/// Text-alignment table recovery over `pdf-extract` output.
pub struct TextTableExtractor;

impl TableExtractor for TextTableExtractor {
    fn extract_tables(&self, path: &Path) -> anyhow::Result<Vec<Page>> {
        let text = pdf_extract::extract_text(path)?;
        Ok(text
            .split('\u{c}')
            .map(tables_from_text)
            .collect())
    }
}

fn cell_gap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t+| {2,}").expect("static regex"))
}

/// Splits one text line into table cells on tab / wide-space gaps.
/// Returns `None` for lines that do not look like table rows.
fn split_row(line: &str) -> Option<TableRow> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<Option<String>> = cell_gap()
        .split(trimmed)
        .map(|c| {
            let c = c.trim();
            if c.is_empty() {
                None
            } else {
                Some(c.to_string())
            }
        })
        .collect();
    if cells.iter().flatten().count() >= 2 {
        Some(cells)
    } else {
        None
    }
}

/// Groups the table-like lines of one page's text into tables: a run of
/// consecutive multi-cell lines is one table; anything else ends it.
fn tables_from_text(page_text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();

    for line in page_text.lines() {
        match split_row(line) {
            Some(row) => current.push(row),
            None => {
                if current.len() >= 2 {
                    tables.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() >= 2 {
        tables.push(current);
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_row_on_wide_gaps() {
        let row = split_row("DS512 - Data Engineering   3   A").unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].as_deref(), Some("DS512 - Data Engineering"));
        assert_eq!(row[1].as_deref(), Some("3"));
        assert_eq!(row[2].as_deref(), Some("A"));
    }

    #[test]
    fn test_split_row_on_tabs() {
        let row = split_row("Course\tCredits\tGrade").unwrap();
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_split_row_rejects_prose() {
        // Single-spaced prose is one cell, not a table row.
        assert!(split_row("This transcript is unofficial and for advising only.").is_none());
        assert!(split_row("   ").is_none());
    }

    #[test]
    fn test_tables_from_text_groups_contiguous_rows() {
        let page = "Unofficial Transcript\n\
                    Course   Credits   Grade\n\
                    DS512 - Data Engineering   3   A\n\
                    CS521 - Software Project Management   3   B+\n\
                    \n\
                    Cumulative GPA: 3.7";
        let tables = tables_from_text(page);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
        assert_eq!(tables[0][1][0].as_deref(), Some("DS512 - Data Engineering"));
    }

    #[test]
    fn test_tables_from_text_drops_single_row_runs() {
        // A lone multi-cell line (e.g. "Name:   Jane") is not a table.
        let page = "Name:   Jane Doe\n\nSome prose here.";
        assert!(tables_from_text(page).is_empty());
    }
}
