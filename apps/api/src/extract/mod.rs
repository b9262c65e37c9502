//! Format extractors: one uploaded file in, plain text out.
//!
//! Every extractor degrades instead of failing: a malformed document, a
//! missing OCR engine, or a library error produces `Empty`/`Failed`, and
//! `Extraction::into_text` collapses both to an empty string so the
//! pipeline never sees an error from this layer. The variants exist so
//! "nothing in the document" and "extractor crashed" stay distinguishable
//! in logs.

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod pptx;
pub mod tables;

use std::path::Path;

use tracing::warn;

use crate::extract::ocr::OcrEngine;

/// Supported document types, derived from the uploaded filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    Txt,
}

impl DocumentKind {
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Some(Self::Docx)
        } else if lower.ends_with(".pptx") {
            Some(Self::Pptx)
        } else if lower.ends_with(".txt") {
            Some(Self::Txt)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Pptx => ".pptx",
            Self::Txt => ".txt",
        }
    }
}

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Non-empty text was extracted.
    Text(String),
    /// The document parsed cleanly but contained no usable text.
    Empty,
    /// The extractor itself failed; callers treat this like `Empty`.
    Failed(String),
}

impl Extraction {
    /// Wraps raw extractor output, mapping whitespace-only text to `Empty`.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(text)
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Collapses to the degraded contract: text or empty string, never an error.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Empty => String::new(),
            Self::Failed(reason) => {
                warn!("extraction failed, degrading to empty text: {reason}");
                String::new()
            }
        }
    }
}

/// Dispatches to the extractor for `kind`. The caller has already rejected
/// unsupported extensions at the boundary.
pub fn extract_document(kind: DocumentKind, path: &Path, ocr: Option<&dyn OcrEngine>) -> Extraction {
    match kind {
        DocumentKind::Pdf => pdf::extract_text(path, ocr),
        DocumentKind::Docx => docx::extract_text(path),
        DocumentKind::Pptx => pptx::extract_text(path),
        DocumentKind::Txt => match std::fs::read(path) {
            Ok(bytes) => Extraction::from_text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => Extraction::Failed(format!("read {}: {e}", path.display())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename_known_extensions() {
        assert_eq!(
            DocumentKind::from_filename("Transcript.PDF"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_filename("report.docx"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_filename("deck.pptx"),
            Some(DocumentKind::Pptx)
        );
        assert_eq!(
            DocumentKind::from_filename("resume.txt"),
            Some(DocumentKind::Txt)
        );
    }

    #[test]
    fn test_kind_from_filename_rejects_unknown() {
        assert_eq!(DocumentKind::from_filename("archive.zip"), None);
        assert_eq!(DocumentKind::from_filename("noextension"), None);
        assert_eq!(DocumentKind::from_filename("evil.pdf.exe"), None);
    }

    #[test]
    fn test_extraction_from_text_maps_blank_to_empty() {
        assert_eq!(Extraction::from_text("  \n\t ".to_string()), Extraction::Empty);
        assert!(Extraction::from_text("CS501".to_string()).is_text());
    }

    #[test]
    fn test_extraction_collapse_never_errors() {
        assert_eq!(Extraction::Empty.into_text(), "");
        assert_eq!(Extraction::Failed("boom".to_string()).into_text(), "");
        assert_eq!(Extraction::Text("abc".to_string()).into_text(), "abc");
    }
}
