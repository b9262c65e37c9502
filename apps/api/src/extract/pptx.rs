//! PPTX text extraction.
//!
//! PPTX files are ZIP archives of Office Open XML: one part per slide
//! under `ppt/slides/`, speaker notes under `ppt/notesSlides/`. The
//! primary pass walks each slide's shape tree (text bodies, grouped
//! shapes, graphic-frame tables) and appends that slide's notes; if it
//! yields nothing — malformed shape trees do happen — a flat scan of
//! every `<a:t>` run across slides and notes is the fallback.

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
        Err(e) => return Extraction::Failed(format!("not a PPTX archive: {e}")),
    };

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|n| is_slide_part(n) || is_notes_part(n))
        .map(String::from)
        .collect();
    slide_names.sort();

    let mut parts = Vec::new();
    for name in &slide_names {
        if let Ok(xml) = read_part(&mut archive, name) {
            let text = shape_tree_text(&xml);
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
    }
    if !parts.is_empty() {
        return Extraction::from_text(parts.join("\n"));
    }

    // Fallback: ignore structure entirely, take every run.
    let mut runs = Vec::new();
    for name in &slide_names {
        if let Ok(xml) = read_part(&mut archive, name) {
            collect_runs(&xml, &mut runs);
        }
    }
    if runs.is_empty() {
        Extraction::Empty
    } else {
        Extraction::from_text(runs.join("\n"))
    }
}

fn is_slide_part(name: &str) -> bool {
    name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
}

fn is_notes_part(name: &str) -> bool {
    name.starts_with("ppt/notesSlides/notesSlide") && name.ends_with(".xml")
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

/// Walks the slide shape tree. Group shapes (`p:grpSp`) and graphic-frame
/// tables (`a:tbl`) nest their runs under the same `a:t` elements, so a
/// depth-tracking pass over paragraphs and table cells covers all of them.
fn shape_tree_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;
    // Only text inside a shape text body or a table cell counts as content.
    let mut body_depth: u32 = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"p:txBody" | b"a:txBody" | b"a:tc" => body_depth += 1,
                b"a:t" if body_depth > 0 => in_run_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"p:txBody" | b"a:txBody" | b"a:tc" => {
                    body_depth = body_depth.saturating_sub(1);
                }
                b"a:t" => in_run_text = false,
                b"a:p" => {
                    if !out.ends_with('\n') && !out.is_empty() {
                        out.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                if let Ok(text) = t.unescape() {
                    out.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("PPTX XML parse stopped early: {e}");
                break;
            }
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Flat scan: every `<a:t>` run in the part, one per line.
fn collect_runs(xml: &str, out: &mut Vec<String>) {
    let mut reader = Reader::from_str(xml);
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_run_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => in_run_text = false,
            Ok(Event::Text(t)) if in_run_text => {
                if let Ok(text) = t.unescape() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        out.push(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_XML: &str = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
        <p:sp><p:txBody>
            <a:p><a:r><a:t>Capstone: Stream Processing</a:t></a:r></a:p>
            <a:p><a:r><a:t>Kafka + Flink</a:t></a:r></a:p>
        </p:txBody></p:sp>
        <p:grpSp><p:sp><p:txBody>
            <a:p><a:r><a:t>Grouped note</a:t></a:r></a:p>
        </p:txBody></p:sp></p:grpSp>
        <p:graphicFrame><a:tbl><a:tr>
            <a:tc><a:txBody><a:p><a:r><a:t>Cell text</a:t></a:r></a:p></a:txBody></a:tc>
        </a:tr></a:tbl></p:graphicFrame>
    </p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_shape_tree_text_covers_shapes_groups_and_tables() {
        let text = shape_tree_text(SLIDE_XML);
        assert!(text.contains("Capstone: Stream Processing"));
        assert!(text.contains("Kafka + Flink"));
        assert!(text.contains("Grouped note"));
        assert!(text.contains("Cell text"));
    }

    #[test]
    fn test_shape_tree_text_splits_paragraphs() {
        let text = shape_tree_text(SLIDE_XML);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Capstone: Stream Processing");
        assert_eq!(lines[1], "Kafka + Flink");
    }

    #[test]
    fn test_collect_runs_flat_scan() {
        let mut runs = Vec::new();
        collect_runs(SLIDE_XML, &mut runs);
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0], "Capstone: Stream Processing");
    }

    #[test]
    fn test_slide_part_naming() {
        assert!(is_slide_part("ppt/slides/slide1.xml"));
        assert!(is_notes_part("ppt/notesSlides/notesSlide2.xml"));
        assert!(!is_slide_part("ppt/slides/_rels/slide1.xml.rels"));
        assert!(!is_slide_part("ppt/media/image1.png"));
    }
}
