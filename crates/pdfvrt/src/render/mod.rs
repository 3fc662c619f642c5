pub mod magick;
pub mod ops;
pub mod pdfium;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::Rgba;
use thiserror::Error;

use crate::config::Settings;
use crate::document::Document;
use crate::opts::{CropRect, MaskRect};

pub use self::magick::MagickEngine;
pub use self::pdfium::PdfiumEngine;

/// One rendered page on disk. `page_index` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page_index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("pdfium library unavailable: {0}")]
    Unavailable(String),

    #[error("cannot open document: {0}")]
    Load(String),

    #[error("document has no pages")]
    Empty,

    #[error("failed to render page {page}: {reason}")]
    Page { page: usize, reason: String },

    #[error("unknown colour '{0}'")]
    Color(String),

    #[error("region {0} lies outside the {1}x{2} page")]
    OutOfBounds(String, u32, u32),

    #[error("image error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Tool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    #[error("raster task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RasterError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn image(path: &Path, source: image::ImageError) -> Self {
        Self::Image {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Rasterization backend.
///
/// Implementations must be interchangeable: same artifact naming
/// (see [`crate::store`]), same mask and crop geometry.
pub trait RasterEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Render every page of `document` into `target_dir` at `settings.density` DPI.
    ///
    /// Returns the pages ordered by index. `target_dir` must already exist.
    fn render(
        &self,
        document: &Document,
        target_dir: &Path,
        settings: &Settings,
    ) -> impl Future<Output = Result<Vec<PageImage>, RasterError>> + Send;

    /// Overwrite `rect` (both corners included) with an opaque `color`, in place.
    fn mask(
        &self,
        page: &Path,
        rect: MaskRect,
        color: Rgba<u8>,
    ) -> impl Future<Output = Result<(), RasterError>> + Send;

    /// Write the `rect` region of `page` to a new `<stem>-<ordinal>.png`.
    ///
    /// Callers validate `rect` against the page with [`ops::check_crop`];
    /// a region running past the edge is clamped.
    fn crop(
        &self,
        page: &Path,
        rect: CropRect,
        ordinal: usize,
    ) -> impl Future<Output = Result<PathBuf, RasterError>> + Send;
}
