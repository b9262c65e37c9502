use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::extract::ocr::OcrEngine;
use crate::extract::tables::TableExtractor;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum
/// extractors. Collaborators are trait objects so tests substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text-generation provider for the extraction fallback and the
    /// aggregation services.
    pub llm: Arc<dyn TextGenerator>,
    /// Table-structure provider for transcript PDFs.
    pub tables: Arc<dyn TableExtractor>,
    /// OCR engine for scanned PDFs; `None` when feature-detection failed
    /// at startup, in which case scanned documents yield empty text.
    pub ocr: Option<Arc<dyn OcrEngine>>,
    pub config: Config,
}
