//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::config::{Config, Paths, Settings};
use crate::document::{Document, Side};
use crate::opts::{CropRect, MaskRect};
use crate::render::{PageImage, RasterEngine, RasterError, ops};
use crate::store;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Engine that "renders" pre-built page bitmaps keyed by document filename.
/// Unknown filenames fail like an unreadable PDF.
#[derive(Default)]
pub struct StubEngine {
    documents: HashMap<String, Vec<RgbaImage>>,
}

impl StubEngine {
    pub fn with(mut self, filename: &str, pages: Vec<RgbaImage>) -> Self {
        self.documents.insert(filename.to_owned(), pages);
        self
    }
}

impl RasterEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    async fn render(
        &self,
        document: &Document,
        target_dir: &Path,
        _settings: &Settings,
    ) -> Result<Vec<PageImage>, RasterError> {
        let pages = self
            .documents
            .get(document.filename())
            .ok_or_else(|| RasterError::Load("stub has no such document".into()))?;
        let base = document.base_name();
        pages
            .iter()
            .enumerate()
            .map(|(page_index, img)| {
                let path = store::page_path(target_dir, &base, page_index, pages.len());
                ops::save(img, &path)?;
                Ok(PageImage { page_index, path })
            })
            .collect()
    }

    async fn mask(&self, page: &Path, rect: MaskRect, color: Rgba<u8>) -> Result<(), RasterError> {
        ops::mask_file(page, rect, color)
    }

    async fn crop(
        &self,
        page: &Path,
        rect: CropRect,
        ordinal: usize,
    ) -> Result<PathBuf, RasterError> {
        ops::crop_file(page, rect, ordinal)
    }
}

/// White page with black 4x4 squares at the given top-left corners.
pub fn page_with_marks(w: u32, h: u32, marks: &[(u32, u32)]) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(w, h, WHITE);
    for &(x, y) in marks {
        ops::fill_rect(
            &mut img,
            MaskRect {
                x0: x,
                y0: y,
                x1: x + 3,
                y1: y + 3,
            },
            BLACK,
        );
    }
    img
}

/// Config whose output folders live under `root`.
pub fn config_in(root: &Path) -> Config {
    Config {
        paths: Paths {
            actual_pdf_root_folder: root.join("actualPdfs"),
            baseline_pdf_root_folder: root.join("baselinePdfs"),
            actual_png_root_folder: Some(root.join("actualPngs")),
            baseline_png_root_folder: Some(root.join("baselinePngs")),
            diff_png_root_folder: Some(root.join("diffPngs")),
        },
        settings: Settings::default(),
    }
}

pub fn doc(filename: &str, side: Side) -> Document {
    Document::from_buffer(b"%PDF-stub".to_vec(), filename, side).unwrap()
}

/// Install a shell script standing in for ImageMagick. It appends its
/// arguments to `args.log` and copies the first argument to the last, so
/// outputs exist where the engine expects them. It always exits 0.
#[cfg(unix)]
pub fn fake_magick(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("magick");
    let log = dir.join("args.log");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\n\
             echo \"$@\" >> '{}'\n\
             for last; do :; done\n\
             [ \"$1\" = \"$last\" ] || cp \"$1\" \"$last\" 2>/dev/null\n\
             exit 0\n",
            log.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}
