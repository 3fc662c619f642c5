use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;
use tracing::debug;

use super::{PageImage, RasterEngine, RasterError, ops};
use crate::config::Settings;
use crate::document::Document;
use crate::opts::{CropRect, MaskRect};
use crate::store;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// In-process engine: pages are rendered straight to bitmaps by pdfium.
///
/// The pdfium shared library is bound per render, from `library_path` when
/// given, otherwise from the working directory or the system library path.
pub struct PdfiumEngine {
    library_path: Option<PathBuf>,
}

impl PdfiumEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            library_path: settings.pdfium_library_path.clone(),
        }
    }
}

fn bind(library_path: Option<&Path>) -> Result<Pdfium, RasterError> {
    let bindings = match library_path {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| RasterError::Unavailable(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

fn render_blocking(
    library_path: Option<&Path>,
    bytes: &[u8],
    password: Option<&str>,
    scale: f32,
    target_dir: &Path,
    base: &str,
) -> Result<Vec<PageImage>, RasterError> {
    let pdfium = bind(library_path)?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| RasterError::Load(e.to_string()))?;

    let page_count = document.pages().len() as usize;
    if page_count == 0 {
        return Err(RasterError::Empty);
    }

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(scale)
        .render_form_data(true)
        .render_annotations(true);

    let mut pages = Vec::with_capacity(page_count);
    for (page_index, page) in document.pages().iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RasterError::Page {
                page: page_index,
                reason: e.to_string(),
            })?;
        let path = store::page_path(target_dir, base, page_index, page_count);
        ops::save(&bitmap.as_image().to_rgba8(), &path)?;
        debug!(page = page_index, path = %path.display(), "rendered page");
        pages.push(PageImage { page_index, path });
    }
    Ok(pages)
}

impl RasterEngine for PdfiumEngine {
    fn name(&self) -> &str {
        "native"
    }

    async fn render(
        &self,
        document: &Document,
        target_dir: &Path,
        settings: &Settings,
    ) -> Result<Vec<PageImage>, RasterError> {
        let library_path = self.library_path.clone();
        let bytes = document.bytes().to_vec();
        let password = settings.password.clone();
        let scale = settings.density as f32 / POINTS_PER_INCH;
        let target_dir = target_dir.to_path_buf();
        let base = document.base_name();

        tokio::task::spawn_blocking(move || {
            render_blocking(
                library_path.as_deref(),
                &bytes,
                password.as_deref(),
                scale,
                &target_dir,
                &base,
            )
        })
        .await?
    }

    async fn mask(
        &self,
        page: &Path,
        rect: MaskRect,
        color: image::Rgba<u8>,
    ) -> Result<(), RasterError> {
        let page = page.to_path_buf();
        tokio::task::spawn_blocking(move || ops::mask_file(&page, rect, color)).await?
    }

    async fn crop(
        &self,
        page: &Path,
        rect: CropRect,
        ordinal: usize,
    ) -> Result<PathBuf, RasterError> {
        let page = page.to_path_buf();
        tokio::task::spawn_blocking(move || ops::crop_file(&page, rect, ordinal)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rendering needs the pdfium shared library.
    // Run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn corrupt_document_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = PdfiumEngine::new(&Settings::default());
        let doc = Document::from_buffer(
            b"not a pdf".to_vec(),
            "broken.pdf",
            crate::document::Side::Actual,
        )
        .unwrap();
        let err = engine
            .render(&doc, dir.path(), &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::Load(_)), "{err}");
    }

    #[tokio::test]
    async fn mask_and_crop_use_shared_ops() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("doc.png");
        ops::save(
            &image::RgbaImage::from_pixel(6, 6, image::Rgba([255, 255, 255, 255])),
            &page,
        )
        .unwrap();

        let engine = PdfiumEngine::new(&Settings::default());
        engine
            .mask(
                &page,
                MaskRect {
                    x0: 0,
                    y0: 0,
                    x1: 5,
                    y1: 5,
                },
                image::Rgba([0, 0, 0, 255]),
            )
            .await
            .unwrap();
        let out = engine
            .crop(
                &page,
                CropRect {
                    width: 2,
                    height: 2,
                    x: 1,
                    y: 1,
                },
                0,
            )
            .await
            .unwrap();
        let cropped = ops::load(&out).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert!(cropped.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}
