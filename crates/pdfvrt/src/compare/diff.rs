use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

/// Maximum possible delta in YIQ color space (used by dify internally).
const MAX_YIQ_POSSIBLE_DELTA: f32 = 35215.0;

/// Colour dify paints differing pixels with.
const DIFY_DIFF_PIXEL: Rgba<u8> = Rgba([255, 0, 0, 255]);

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write diff image {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("diff task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Knobs for one pixel comparison, taken from [`Settings`].
#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    pub threshold: f64,
    pub tolerance: u64,
    pub detect_anti_aliased: bool,
    pub diff_color: Option<[u8; 3]>,
    pub diff_color_alt: Option<[u8; 3]>,
}

impl From<&Settings> for DiffOptions {
    fn from(s: &Settings) -> Self {
        Self {
            threshold: s.threshold,
            tolerance: s.tolerance,
            detect_anti_aliased: s.detect_anti_aliased,
            diff_color: s.diff_color,
            diff_color_alt: s.diff_color_alt,
        }
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

pub struct CompareResult {
    pub diff_pixels: u64,
    pub total_pixels: u64,
    pub diff_image: RgbaImage,
    /// `Some((actual_w, actual_h, baseline_w, baseline_h))` when sizes differ.
    pub dimension_mismatch: Option<(u32, u32, u32, u32)>,
}

impl CompareResult {
    /// A size mismatch fails regardless of tolerance.
    pub fn is_failure(&self, tolerance: u64) -> bool {
        self.dimension_mismatch.is_some() || self.diff_pixels > tolerance
    }
}

/// Outcome of diffing two PNG files.
#[derive(Debug)]
pub enum FileDiff {
    Pass,
    Fail {
        diff_pixels: u64,
        diff_image: PathBuf,
        dimension_mismatch: Option<(u32, u32, u32, u32)>,
    },
}

/// Perceptual diff via dify (YIQ distance with anti-alias detection).
///
/// `actual` is the base of the diff image.
pub fn compare(actual: &RgbaImage, baseline: &RgbaImage, options: &DiffOptions) -> CompareResult {
    let dimension_mismatch = if actual.dimensions() != baseline.dimensions() {
        Some((
            actual.width(),
            actual.height(),
            baseline.width(),
            baseline.height(),
        ))
    } else {
        None
    };

    // Pad both images to the same canvas size if dimensions differ.
    // Fill colour is magenta (#FF00FF) so the size delta is obvious in the diff overlay.
    let (left, right) = if dimension_mismatch.is_some() {
        let max_w = actual.width().max(baseline.width());
        let max_h = actual.height().max(baseline.height());
        (pad_to(actual, max_w, max_h), pad_to(baseline, max_w, max_h))
    } else {
        (actual.clone(), baseline.clone())
    };

    let (width, height) = left.dimensions();
    let total_pixels = (width as u64) * (height as u64);

    // dify expects a pre-computed threshold: raw_threshold^2 * MAX_YIQ_POSSIBLE_DELTA
    let threshold = options.threshold as f32;
    let computed_threshold = MAX_YIQ_POSSIBLE_DELTA * threshold * threshold;
    let output_base = Some(dify::cli::OutputImageBase::LeftImage);
    let block_out: Option<std::collections::HashSet<(u32, u32)>> = None;

    let recolor_source = (options.diff_color.is_some() || options.diff_color_alt.is_some())
        .then(|| (left.clone(), right.clone()));

    // With a blend factor dify always returns an image, even for zero diffs.
    let (diff_count, mut diff_image) = dify::diff::get_results(
        left,
        right,
        computed_threshold,
        options.detect_anti_aliased,
        Some(0.1),
        &output_base,
        &block_out,
    )
    .unwrap_or_else(|| (0, RgbaImage::new(width, height)));
    if let Some((left, right)) = &recolor_source {
        recolor(&mut diff_image, left, right, options);
    }

    CompareResult {
        diff_pixels: diff_count.max(0) as u64,
        total_pixels,
        diff_image,
        dimension_mismatch,
    }
}

/// Repaint dify's red diff pixels with the configured colours.
/// `diff_color_alt` marks pixels where the actual side is lighter.
fn recolor(diff_image: &mut RgbaImage, actual: &RgbaImage, baseline: &RgbaImage, options: &DiffOptions) {
    let primary = options.diff_color.map(rgb).unwrap_or(DIFY_DIFF_PIXEL);
    let alt = options.diff_color_alt.map(rgb);
    for (x, y, px) in diff_image.enumerate_pixels_mut() {
        if *px != DIFY_DIFF_PIXEL {
            continue;
        }
        let (a, b) = (actual.get_pixel(x, y), baseline.get_pixel(x, y));
        *px = match alt {
            Some(alt) if luma(a) > luma(b) => alt,
            _ => primary,
        };
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Y component of YIQ.
fn luma(p: &Rgba<u8>) -> f64 {
    let [r, g, b, _] = p.0;
    r as f64 * 0.29889531 + g as f64 * 0.58662247 + b as f64 * 0.11448223
}

/// Paste `src` onto a magenta canvas of `w x h`, anchored at top-left.
fn pad_to(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([255, 0, 255, 255]));
    image::imageops::overlay(&mut canvas, src, 0, 0);
    canvas
}

fn decode(path: &Path) -> Result<RgbaImage, DiffError> {
    Ok(image::open(path)
        .map_err(|source| DiffError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8())
}

/// Diff two PNG files, writing the diff image only when the unit fails.
///
/// Runs synchronously. Call via [`diff`] from async code.
pub fn diff_files(
    actual: &Path,
    baseline: &Path,
    diff_path: &Path,
    options: &DiffOptions,
) -> Result<FileDiff, DiffError> {
    let actual_img = decode(actual)?;
    let baseline_img = decode(baseline)?;
    let result = compare(&actual_img, &baseline_img, options);
    debug!(
        actual = %actual.display(),
        diff_pixels = result.diff_pixels,
        total_pixels = result.total_pixels,
        "compared"
    );

    if !result.is_failure(options.tolerance) {
        return Ok(FileDiff::Pass);
    }

    result
        .diff_image
        .save_with_format(diff_path, image::ImageFormat::Png)
        .map_err(|source| DiffError::Write {
            path: diff_path.to_path_buf(),
            source,
        })?;

    Ok(FileDiff::Fail {
        diff_pixels: result.diff_pixels,
        diff_image: diff_path.to_path_buf(),
        dimension_mismatch: result.dimension_mismatch,
    })
}

/// Async wrapper around [`diff_files`] on the blocking pool.
pub async fn diff(
    actual: PathBuf,
    baseline: PathBuf,
    diff_path: PathBuf,
    options: DiffOptions,
) -> Result<FileDiff, DiffError> {
    tokio::task::spawn_blocking(move || diff_files(&actual, &baseline, &diff_path, &options))
        .await?
}
