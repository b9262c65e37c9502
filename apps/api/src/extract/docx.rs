//! DOCX text extraction.
//!
//! DOCX files are ZIP archives of Office Open XML; the main content lives
//! in `word/document.xml`. A single pass over that part yields paragraph
//! and table-cell text in document order. If the main part yields nothing
//! (unusual part naming, malformed package), a second pass scans every
//! `word/*.xml` part for run text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;
use zip::ZipArchive;

use crate::extract::Extraction;

pub fn extract_text(path: &Path) -> Extraction {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return Extraction::Failed(format!("open {}: {e}", path.display())),
    };
    let mut archive = match ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => return Extraction::Failed(format!("not a DOCX archive: {e}")),
    };

    match read_part(&mut archive, "word/document.xml").map(|xml| document_order_text(&xml)) {
        Ok(text) if !text.trim().is_empty() => return Extraction::from_text(text),
        Ok(_) => {}
        Err(e) => warn!("DOCX main part unreadable, trying remaining parts: {e}"),
    }

    // Fallback: run text from any word/ part (headers, footers, odd packages).
    let names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("word/") && n.ends_with(".xml"))
        .map(String::from)
        .collect();
    let mut parts = Vec::new();
    for name in names {
        if let Ok(xml) = read_part(&mut archive, &name) {
            let text = document_order_text(&xml);
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
    }
    if parts.is_empty() {
        Extraction::Empty
    } else {
        Extraction::from_text(parts.join("\n"))
    }
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> anyhow::Result<String> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collects `w:t` run text, breaking lines at paragraph (`w:p`) and
/// table-cell (`w:tc`) boundaries.
fn document_order_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_run_text = false,
            Ok(Event::End(e))
                if matches!(e.name().as_ref(), b"w:p" | b"w:tc") =>
            {
                if !out.ends_with('\n') && !out.is_empty() {
                    out.push('\n');
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => out.push(' '),
            Ok(Event::Text(t)) if in_run_text => {
                if let Ok(text) = t.unescape() {
                    out.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("DOCX XML parse stopped early: {e}");
                break;
            }
            _ => {}
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_text_paragraphs_and_tables() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>Data Engineering Project</w:t></w:r></w:p>
            <w:tbl><w:tr>
                <w:tc><w:p><w:r><w:t>DS512</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
            </w:tr></w:tbl>
        </w:body></w:document>"#;
        let text = document_order_text(xml);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Data Engineering Project", "DS512", "A"]);
    }

    #[test]
    fn test_document_order_text_ignores_non_run_text() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:pPr>style noise</w:pPr><w:r><w:t>Kept</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(document_order_text(xml), "Kept");
    }

    #[test]
    fn test_document_order_text_unescapes_entities() {
        let xml = r#"<w:p><w:r><w:t>AI &amp; ML</w:t></w:r></w:p>"#;
        assert_eq!(document_order_text(xml), "AI & ML");
    }

    #[test]
    fn test_extract_text_rejects_non_archive() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"plain text, not a zip").unwrap();
        assert!(matches!(extract_text(tmp.path()), Extraction::Failed(_)));
    }
}
