pub mod diff;

use std::path::Path;

use tracing::{info, warn};

use self::diff::{DiffOptions, FileDiff};
use crate::align::align;
use crate::config::{Config, ImageEngine};
use crate::document::Document;
use crate::error::CompareError;
use crate::opts::Opts;
use crate::render::{MagickEngine, PdfiumEngine, RasterEngine};
use crate::report::{Report, UnitResult};
use crate::store;
use crate::transform::{ComparisonUnit, PagePair, transform};

/// Compare two documents with the engine selected by `config.settings.image_engine`.
pub async fn compare_documents(
    actual: &Document,
    baseline: &Document,
    config: &Config,
    opts: &Opts,
) -> Result<Report, CompareError> {
    match config.settings.image_engine {
        ImageEngine::Native => {
            let engine = PdfiumEngine::new(&config.settings);
            compare_by_image(&engine, actual, baseline, config, opts).await
        }
        ImageEngine::ImageMagick => {
            let engine = MagickEngine::locate(&config.settings)
                .map_err(|e| CompareError::render(actual.filename(), e))?;
            compare_by_image(&engine, actual, baseline, config, opts).await
        }
    }
}

/// Render both documents, align their pages, mask/crop, diff, and aggregate.
///
/// Only configuration, bootstrap and render failures abort; everything that
/// goes wrong for a single page ends up as a failed unit in the report.
/// Pages are processed one after another in index order.
pub async fn compare_by_image<E: RasterEngine>(
    engine: &E,
    actual: &Document,
    baseline: &Document,
    config: &Config,
    opts: &Opts,
) -> Result<Report, CompareError> {
    let paths = &config.paths;
    let settings = &config.settings;

    let (Some(actual_root), Some(baseline_root), Some(diff_root)) = (
        &paths.actual_png_root_folder,
        &paths.baseline_png_root_folder,
        &paths.diff_png_root_folder,
    ) else {
        return Err(CompareError::Config(
            "PNG directory is not set. Please define correctly then try again.".into(),
        ));
    };

    let actual_base = actual.base_name();
    let baseline_base = baseline.base_name();
    let actual_dir = actual_root.join(&actual_base);
    let baseline_dir = baseline_root.join(&baseline_base);
    let diff_dir = diff_root.join(&actual_base);
    check_distinct_dirs(&actual_dir, &baseline_dir, &diff_dir)?;

    // 1. Bootstrap
    for dir in [&actual_dir, &baseline_dir, &diff_dir] {
        store::ensure_clean_dir(dir)?;
    }

    // 2. Render
    info!(
        actual = actual.filename(),
        baseline = baseline.filename(),
        engine = engine.name(),
        density = settings.density,
        "comparing by image"
    );
    let actual_pages = engine
        .render(actual, &actual_dir, settings)
        .await
        .map_err(|e| CompareError::render(actual.filename(), e))?;
    let baseline_pages = engine
        .render(baseline, &baseline_dir, settings)
        .await
        .map_err(|e| CompareError::render(baseline.filename(), e))?;

    // 3. Align
    let alignment = align(
        baseline_pages.len(),
        actual_pages.len(),
        &opts.filter,
        settings.match_page_count,
    );
    if alignment.page_count_mismatch {
        warn!(
            actual = actual_pages.len(),
            baseline = baseline_pages.len(),
            "page count mismatch"
        );
        clean_render_dirs(config, &actual_dir, &baseline_dir);
        return Ok(Report::failed(
            format!(
                "Actual pdf page count ({}) is not the same as Baseline pdf ({}).",
                actual_pages.len(),
                baseline_pages.len()
            ),
            Vec::new(),
        ));
    }

    // 4. Transform and diff, page by page
    let diff_options = DiffOptions::from(settings);
    let mut results = Vec::new();
    for page_index in alignment.pairs {
        let Some(actual_page) = actual_pages.get(page_index) else {
            warn!(page = page_index, "actual pdf has no such page");
            results.push(UnitResult::errored(
                page_index,
                None,
                None,
                format!("actual pdf has no page {page_index}"),
            ));
            continue;
        };
        let pair = PagePair {
            page_index,
            actual: &actual_page.path,
            baseline: &baseline_pages[page_index].path,
            diff_dir: &diff_dir,
            diff_base: &actual_base,
            page_count: baseline_pages.len(),
        };
        for unit in transform(engine, &pair, opts).await {
            results.push(match unit {
                Ok(unit) => diff_unit(unit, diff_options).await,
                Err(failed) => failed,
            });
        }
    }

    clean_render_dirs(config, &actual_dir, &baseline_dir);

    // 5. Aggregate
    let units = results.len();
    let failed: Vec<UnitResult> = results.into_iter().filter(UnitResult::is_failed).collect();
    info!(units, failed = failed.len(), "comparison finished");
    if failed.is_empty() {
        Ok(Report::passed())
    } else {
        Ok(Report::failed(
            format!("{actual_base}.pdf is not the same as {baseline_base}.pdf compared by their images."),
            failed,
        ))
    }
}

async fn diff_unit(unit: ComparisonUnit, options: DiffOptions) -> UnitResult {
    let ComparisonUnit {
        page_index,
        crop_index,
        actual,
        baseline,
        diff,
    } = unit;

    match diff::diff(actual.clone(), baseline, diff, options).await {
        Ok(FileDiff::Pass) => UnitResult::passed(page_index, crop_index),
        Ok(FileDiff::Fail {
            diff_pixels,
            diff_image,
            dimension_mismatch,
        }) => {
            warn!(page = page_index, crop = ?crop_index, diff_pixels, "unit differs");
            let mut result = UnitResult::failed(page_index, crop_index, diff_pixels, diff_image);
            if let Some((aw, ah, bw, bh)) = dimension_mismatch {
                result.error = Some(format!(
                    "dimensions differ: actual {aw}x{ah}, baseline {bw}x{bh}"
                ));
            }
            result
        }
        Err(e) => {
            warn!(page = page_index, crop = ?crop_index, error = %e, "diff failed");
            UnitResult::errored(page_index, crop_index, Some(actual), e)
        }
    }
}

/// Each run wipes all three output directories, so no two may coincide.
fn check_distinct_dirs(actual: &Path, baseline: &Path, diff: &Path) -> Result<(), CompareError> {
    let named = [
        ("actual", store::normalize_dir(actual)?),
        ("baseline", store::normalize_dir(baseline)?),
        ("diff", store::normalize_dir(diff)?),
    ];
    for (i, (left, left_dir)) in named.iter().enumerate() {
        for (right, right_dir) in &named[i + 1..] {
            if left_dir == right_dir {
                return Err(CompareError::Config(format!(
                    "{left} and {right} images would share {}",
                    left_dir.display()
                )));
            }
        }
    }
    Ok(())
}

/// Render directories are purged when configured; diff images stay.
fn clean_render_dirs(config: &Config, actual_dir: &Path, baseline_dir: &Path) {
    if config.settings.clean_png_paths {
        store::purge_dir(actual_dir);
        store::purge_dir(baseline_dir);
    }
}
