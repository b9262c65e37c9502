//! PDF text extraction with an OCR fallback for scanned documents.

use std::path::Path;

use tracing::{debug, warn};

use crate::extract::ocr::{self, OcrEngine};
use crate::extract::Extraction;

/// Embedded-text output at or below this length is treated as "this is a
/// scanned image, not a text PDF" and routed to OCR.
const SCANNED_PDF_THRESHOLD: usize = 100;

/// Extracts text from a PDF. Embedded text first; if the document appears
/// to be scanned, rasterize + deskew + OCR. An absent OCR engine degrades
/// to `Empty` rather than erroring.
pub fn extract_text(path: &Path, ocr: Option<&dyn OcrEngine>) -> Extraction {
    let embedded = match pdf_extract::extract_text(path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("pdf-extract failed for {}: {e}", path.display());
            String::new()
        }
    };

    if embedded.len() > SCANNED_PDF_THRESHOLD {
        return Extraction::Text(embedded);
    }

    debug!(
        "PDF {} yielded {} embedded chars, trying OCR fallback",
        path.display(),
        embedded.len()
    );

    match ocr {
        Some(engine) => match ocr_pages(path, engine) {
            Ok(text) if !text.trim().is_empty() => Extraction::Text(text),
            Ok(_) if !embedded.is_empty() => Extraction::Text(embedded),
            Ok(_) => Extraction::Empty,
            Err(e) => {
                warn!("OCR fallback failed for {}: {e}", path.display());
                if embedded.is_empty() {
                    Extraction::Failed(format!("OCR failed: {e}"))
                } else {
                    Extraction::Text(embedded)
                }
            }
        },
        None if !embedded.is_empty() => Extraction::Text(embedded),
        None => Extraction::Empty,
    }
}

fn ocr_pages(path: &Path, engine: &dyn OcrEngine) -> anyhow::Result<String> {
    let pages = engine.rasterize(path)?;
    let mut parts = Vec::with_capacity(pages.len());
    for page in &pages {
        let straightened = ocr::deskew(page);
        let text = engine.image_to_text(&straightened)?;
        if !text.trim().is_empty() {
            parts.push(text.trim().to_string());
        }
    }
    Ok(parts.join("\n"))
}
