//! OCR fallback for scanned PDFs.
//!
//! The engine is feature-detected at startup: without the `tesseract`
//! cargo feature (or when the system libraries are missing) `detect()`
//! returns `None` and the PDF extractor silently yields empty text for
//! scanned documents. Deskew itself is pure image code and always
//! available.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

/// Abstract OCR provider: rasterizes PDF pages and recognizes text on one
/// (already deskewed) page image.
pub trait OcrEngine: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> anyhow::Result<Vec<DynamicImage>>;
    fn image_to_text(&self, page: &DynamicImage) -> anyhow::Result<String>;
}

/// Probes for a usable OCR engine. Absence is not an error.
pub fn detect() -> Option<Arc<dyn OcrEngine>> {
    #[cfg(feature = "tesseract")]
    {
        match tesseract_impl::TesseractOcr::probe() {
            Ok(engine) => return Some(Arc::new(engine)),
            Err(e) => tracing::warn!("OCR unavailable, scanned PDFs will yield no text: {e}"),
        }
    }
    None
}

/// Luma values below this count as foreground (ink) when estimating tilt.
const FOREGROUND_THRESHOLD: u8 = 250;

/// Rotations smaller than this are noise, not tilt.
const MIN_CORRECTION_DEGREES: f32 = 0.1;

/// Straightens a scanned page: finds the minimum-area rectangle around all
/// foreground pixels and rotates the page so its long edge runs horizontal.
pub fn deskew(page: &DynamicImage) -> DynamicImage {
    let gray = page.to_luma8();

    let points: Vec<Point<i32>> = gray
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] < FOREGROUND_THRESHOLD)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect();
    if points.len() < 2 {
        return page.clone();
    }

    let rect = min_area_rect(&points);
    let dx = (rect[1].x - rect[0].x) as f32;
    let dy = (rect[1].y - rect[0].y) as f32;
    let mut angle = dy.atan2(dx).to_degrees();
    // Fold into [-45, 45]: the rect edge may be the short or the long side.
    while angle <= -45.0 {
        angle += 90.0;
    }
    while angle > 45.0 {
        angle -= 90.0;
    }

    if angle.abs() < MIN_CORRECTION_DEGREES {
        return page.clone();
    }

    let rotated = rotate_about_center(
        &gray,
        (-angle).to_radians(),
        Interpolation::Bilinear,
        Luma([255u8]),
    );
    DynamicImage::ImageLuma8(rotated)
}

#[cfg(feature = "tesseract")]
mod tesseract_impl {
    use std::io::Cursor;
    use std::path::Path;

    use anyhow::Context;
    use image::DynamicImage;
    use pdfium_render::prelude::*;

    use super::OcrEngine;

    /// Rasterization target width, roughly 200 dpi on US letter.
    const RENDER_WIDTH_PX: i32 = 1654;

    /// Tesseract-backed engine. Construction probes both the pdfium system
    /// library and the tesseract data files so a broken install surfaces
    /// once, at startup.
    pub struct TesseractOcr;

    impl TesseractOcr {
        pub fn probe() -> anyhow::Result<Self> {
            leptess::LepTess::new(None, "eng").context("tesseract init failed")?;
            Pdfium::bind_to_system_library().context("pdfium library not found")?;
            Ok(Self)
        }
    }

    impl OcrEngine for TesseractOcr {
        fn rasterize(&self, pdf_path: &Path) -> anyhow::Result<Vec<DynamicImage>> {
            let pdfium = Pdfium::new(
                Pdfium::bind_to_system_library().context("pdfium library not found")?,
            );
            let document = pdfium
                .load_pdf_from_file(pdf_path, None)
                .context("failed to open PDF for rasterization")?;
            let config = PdfRenderConfig::new().set_target_width(RENDER_WIDTH_PX);

            let mut pages = Vec::new();
            for page in document.pages().iter() {
                let bitmap = page
                    .render_with_config(&config)
                    .context("failed to render PDF page")?;
                pages.push(bitmap.as_image());
            }
            Ok(pages)
        }

        fn image_to_text(&self, page: &DynamicImage) -> anyhow::Result<String> {
            let mut png = Vec::new();
            page.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .context("failed to encode page for OCR")?;

            let mut tess = leptess::LepTess::new(None, "eng").context("tesseract init failed")?;
            tess.set_image_from_mem(&png)
                .context("tesseract rejected page image")?;
            let text = tess.get_utf8_text().context("tesseract recognition failed")?;
            Ok(text)
        }
    }
}
